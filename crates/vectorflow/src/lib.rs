//! Core abstractions for `VectorFlow`.
//!
//! This crate provides the fundamental types shared by every `VectorFlow`
//! integration crate:
//!
//! - [`core::documents::Document`] - a piece of text with metadata
//! - [`core::embeddings::Embeddings`] - text-to-vector providers
//! - [`core::vector_stores::VectorStore`] - storage and similarity search over
//!   embedded documents
//! - [`core::error::Error`] - the shared error type
//!
//! Backend integrations (ClickHouse, etc.) live in sibling crates and depend
//! on this one.

pub mod core;

pub use crate::core::embeddings::{embed, embed_query};
