//! ClickHouse vector store implementation.
//!
//! The store is a SQL adapter: it lazily creates a MergeTree table sized to
//! the embedding dimensionality, serializes `(vector, document)` batches into
//! multi-row INSERT statements, and translates similarity queries into
//! ORDER-BY-distance SELECT statements with an optional raw pre-filter clause.
//! Indexing, ranking and consistency are all delegated to ClickHouse.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use vectorflow::core::documents::Document;
use vectorflow::core::embeddings::Embeddings;
use vectorflow::core::error::{Error, Result};
use vectorflow::core::vector_stores::{DistanceMetric, VectorStore};
use vectorflow::{embed, embed_query};

use crate::client::ClickHouseHttpClient;

/// Mapping from logical row fields to physical column names.
///
/// The same map drives both INSERT column lists and SELECT projections, so
/// writes and reads always agree on the physical layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickHouseColumnMap {
    /// Logical id column (nullable string)
    pub id: String,
    /// Document content column (nullable string)
    pub document: String,
    /// Embedding vector column (fixed-length `Array(Float32)`)
    pub embedding: String,
    /// JSON metadata column
    pub metadata: String,
    /// Auto-generated row UUID column; also the table's ordering key
    pub uuid: String,
}

impl Default for ClickHouseColumnMap {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            document: "document".to_string(),
            embedding: "embedding".to_string(),
            metadata: "metadata".to_string(),
            uuid: "uuid".to_string(),
        }
    }
}

impl ClickHouseColumnMap {
    /// Column names in the order used by INSERT statements.
    fn columns(&self) -> [&str; 5] {
        [
            &self.id,
            &self.document,
            &self.embedding,
            &self.metadata,
            &self.uuid,
        ]
    }
}

/// Raw pre-filter for similarity searches.
///
/// The clause is a backend-native boolean expression spliced verbatim into the
/// query's PREWHERE position; no parsing or validation is performed, so the
/// caller is responsible for its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickHouseFilter {
    /// Boolean expression, e.g. `metadata.name = '1'`
    pub where_str: String,
}

/// Connection and schema settings for [`ClickHouseVectorStore`].
#[derive(Debug, Clone)]
pub struct ClickHouseSettings {
    /// Server hostname
    pub host: String,
    /// Server port (HTTPS interface defaults to 8443)
    pub port: u16,
    /// URL scheme prefix, `"https://"` unless overridden
    pub protocol: String,
    /// Username for authentication
    pub username: String,
    /// Password for authentication
    pub password: String,
    /// Database holding the vector table
    pub database: String,
    /// Table name
    pub table: String,
    /// Vector index type used in the table DDL
    pub index_type: String,
    /// Vector index build parameters, rendered as `'key', value` pairs in
    /// declaration order
    pub index_param: Vec<(String, i64)>,
    /// Per-query settings appended to search statements as trailing
    /// `SETTING key=value` clauses
    pub index_query_params: Vec<(String, String)>,
    /// Logical-to-physical column names
    pub column_map: ClickHouseColumnMap,
    /// Distance metric used to rank stored vectors against a query
    pub metric: DistanceMetric,
}

impl Default for ClickHouseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8443,
            protocol: "https://".to_string(),
            username: "default".to_string(),
            password: String::new(),
            database: "default".to_string(),
            table: "vector_table".to_string(),
            index_type: "annoy".to_string(),
            index_param: vec![("L2Distance".to_string(), 100)],
            index_query_params: Vec::new(),
            column_map: ClickHouseColumnMap::default(),
            metric: DistanceMetric::Euclidean,
        }
    }
}

/// Metadata argument for [`ClickHouseVectorStore::from_texts`].
///
/// Either one metadata object shared by every text, or one object per text,
/// matched by index.
#[derive(Debug, Clone)]
pub enum Metadatas {
    /// A single metadata object reused for every text.
    Shared(HashMap<String, JsonValue>),
    /// One metadata object per text; the length must match the texts.
    PerText(Vec<HashMap<String, JsonValue>>),
}

impl Default for Metadatas {
    fn default() -> Self {
        Metadatas::Shared(HashMap::new())
    }
}

/// `FORMAT JSON` envelope returned by search queries.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Vec<SearchRow>,
}

#[derive(Debug, Deserialize)]
struct SearchRow {
    #[serde(default)]
    document: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, JsonValue>,
    dist: f32,
}

/// A vector store backed by ClickHouse (or MyScale).
///
/// Rows are append-only: each insert generates fresh row tokens and nothing is
/// updated or deleted by this store. The table is created at most once per
/// instance, sized to the first observed embedding dimensionality.
pub struct ClickHouseVectorStore {
    client: ClickHouseHttpClient,
    embeddings: Arc<dyn Embeddings>,
    database: String,
    table: String,
    index_type: String,
    index_param: Vec<(String, i64)>,
    index_query_params: Vec<(String, String)>,
    column_map: ClickHouseColumnMap,
    metric: DistanceMetric,
    initialized: AtomicBool,
}

impl fmt::Debug for ClickHouseVectorStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickHouseVectorStore")
            .field("database", &self.database)
            .field("table", &self.table)
            .field("index_type", &self.index_type)
            .field("metric", &self.metric)
            .finish_non_exhaustive()
    }
}

/// Escape a string for use inside a single-quoted SQL literal.
///
/// Backslashes are doubled before quotes are escaped; doing it in the other
/// order would double the backslashes introduced for the quotes.
fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Render a vector as a bracketed ClickHouse array literal.
fn format_vector(vector: &[f32]) -> String {
    let components: Vec<String> = vector.iter().map(ToString::to_string).collect();
    format!("[{}]", components.join(","))
}

fn zip_texts_with_metadatas(
    texts: &[impl AsRef<str> + Send + Sync],
    metadatas: &Metadatas,
) -> Result<Vec<Document>> {
    if let Metadatas::PerText(per_text) = metadatas {
        if per_text.len() != texts.len() {
            return Err(Error::invalid_input(format!(
                "metadatas length ({}) must match texts length ({})",
                per_text.len(),
                texts.len()
            )));
        }
    }

    Ok(texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let metadata = match metadatas {
                Metadatas::Shared(shared) => shared.clone(),
                Metadatas::PerText(per_text) => per_text[i].clone(),
            };
            Document {
                page_content: text.as_ref().to_string(),
                metadata,
                id: None,
            }
        })
        .collect())
}

impl ClickHouseVectorStore {
    /// Creates a store connected to the configured ClickHouse server.
    ///
    /// Only the HTTP client is set up here; no statement is issued until the
    /// first write or search.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(embeddings: Arc<dyn Embeddings>, settings: ClickHouseSettings) -> Result<Self> {
        let base_url = format!("{}{}:{}", settings.protocol, settings.host, settings.port);
        let client = ClickHouseHttpClient::new(base_url, settings.username, settings.password)?;

        Ok(Self {
            client,
            embeddings,
            database: settings.database,
            table: settings.table,
            index_type: settings.index_type,
            index_param: settings.index_param,
            index_query_params: settings.index_query_params,
            column_map: settings.column_map,
            metric: settings.metric,
            initialized: AtomicBool::new(false),
        })
    }

    /// Creates a store from texts, inserting one document per text.
    ///
    /// Metadata is paired by index when [`Metadatas::PerText`] is given, or
    /// reused for every text with [`Metadatas::Shared`].
    pub async fn from_texts(
        texts: &[impl AsRef<str> + Send + Sync],
        metadatas: Metadatas,
        embeddings: Arc<dyn Embeddings>,
        settings: ClickHouseSettings,
    ) -> Result<Self> {
        let documents = zip_texts_with_metadatas(texts, &metadatas)?;
        Self::from_documents(&documents, embeddings, settings).await
    }

    /// Creates a store and inserts the given documents.
    ///
    /// When this returns, the table exists and the batch has been accepted by
    /// the backend.
    pub async fn from_documents(
        documents: &[Document],
        embeddings: Arc<dyn Embeddings>,
        settings: ClickHouseSettings,
    ) -> Result<Self> {
        let store = Self::new(embeddings, settings)?;
        store.add_documents(documents).await?;
        Ok(store)
    }

    /// Attaches to a pre-populated table without inserting any rows.
    ///
    /// The table is created if absent, with the dimensionality probed from the
    /// embeddings provider.
    pub async fn from_existing_index(
        embeddings: Arc<dyn Embeddings>,
        settings: ClickHouseSettings,
    ) -> Result<Self> {
        let store = Self::new(embeddings, settings)?;
        store.ensure_initialized(None).await?;
        Ok(store)
    }

    /// Returns the configured database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Returns the configured table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Inserts pre-computed vectors with their documents.
    ///
    /// The whole batch goes out as a single INSERT statement; an empty batch
    /// is a no-op that touches neither the table nor the connection. Returns
    /// the generated logical row ids.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the vector and document counts
    /// differ; backend failures propagate unchanged.
    pub async fn add_vectors(
        &self,
        vectors: &[Vec<f32>],
        documents: &[Document],
    ) -> Result<Vec<String>> {
        self.insert(vectors, documents, None).await
    }

    /// Embeds the documents' contents and inserts them.
    pub async fn add_documents(&self, documents: &[Document]) -> Result<Vec<String>> {
        let contents: Vec<String> = documents
            .iter()
            .map(|doc| doc.page_content.clone())
            .collect();
        let vectors = embed(Arc::clone(&self.embeddings), &contents).await?;
        self.insert(&vectors, documents, None).await
    }

    /// Embeds the query text and returns the k nearest documents.
    pub async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&ClickHouseFilter>,
    ) -> Result<Vec<Document>> {
        let embedding = embed_query(Arc::clone(&self.embeddings), query).await?;
        let results = self
            .similarity_search_vector_with_score(&embedding, k, filter)
            .await?;
        Ok(results.into_iter().map(|(document, _)| document).collect())
    }

    /// Returns the k nearest documents to a query vector with distances.
    ///
    /// Results are in the backend's ranking order, ascending by distance; no
    /// client-side re-ranking, deduplication or score normalization happens.
    pub async fn similarity_search_vector_with_score(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&ClickHouseFilter>,
    ) -> Result<Vec<(Document, f32)>> {
        self.ensure_initialized(Some(query.len())).await?;

        let sql = self.build_search_query(query, k, filter);
        tracing::debug!(k, filtered = filter.is_some(), table = %self.table, "running similarity search");
        let response: SearchResponse = self.client.query_json(sql).await?;

        Ok(response
            .data
            .into_iter()
            .map(|row| {
                (
                    Document {
                        page_content: row.document.unwrap_or_default(),
                        metadata: row.metadata,
                        id: None,
                    },
                    row.dist,
                )
            })
            .collect())
    }

    async fn ensure_initialized(&self, dimension: Option<usize>) -> Result<()> {
        if self.initialized.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.initialize(dimension).await
    }

    /// Creates the vector table, probing the embedding dimensionality if none
    /// is given.
    ///
    /// The DDL is `CREATE TABLE IF NOT EXISTS`, so concurrent first calls are
    /// safe at the database level. The initialized flag is set only after the
    /// round trip succeeds; on failure the next operation retries.
    async fn initialize(&self, dimension: Option<usize>) -> Result<()> {
        let dim = match dimension {
            Some(dim) => dim,
            None => embed_query(Arc::clone(&self.embeddings), "test").await?.len(),
        };

        let ddl = self.build_ddl(dim);
        tracing::debug!(database = %self.database, table = %self.table, dimension = dim, "creating vector table");
        self.client
            .execute(
                ddl,
                &[
                    ("allow_experimental_object_type", "1"),
                    ("allow_experimental_annoy_index", "1"),
                ],
            )
            .await?;
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn insert(
        &self,
        vectors: &[Vec<f32>],
        documents: &[Document],
        ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        if vectors.len() != documents.len() {
            return Err(Error::invalid_input(format!(
                "vector count ({}) must match document count ({})",
                vectors.len(),
                documents.len()
            )));
        }
        if vectors.is_empty() {
            return Ok(Vec::new());
        }

        self.ensure_initialized(Some(vectors[0].len())).await?;

        let (sql, row_ids) = self.build_insert_query(vectors, documents, ids)?;
        tracing::debug!(rows = row_ids.len(), table = %self.table, "inserting embedded documents");
        self.client.execute(sql, &[]).await?;
        Ok(row_ids)
    }

    fn build_ddl(&self, dimension: usize) -> String {
        let col = &self.column_map;
        let index_params = self
            .index_param
            .iter()
            .map(|(key, value)| format!("'{key}', {value}"))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "CREATE TABLE IF NOT EXISTS {}.{}({} Nullable(String), {} Nullable(String), \
             {} Array(Float32), {} JSON, {} UUID DEFAULT generateUUIDv4(), \
             CONSTRAINT cons_vec_len CHECK length({}) = {}, \
             INDEX vec_idx {} TYPE {}({}) GRANULARITY 1000) \
             ENGINE = MergeTree ORDER BY {} SETTINGS index_granularity = 8192",
            self.database,
            self.table,
            col.id,
            col.document,
            col.embedding,
            col.metadata,
            col.uuid,
            col.embedding,
            dimension,
            col.embedding,
            self.index_type,
            index_params,
            col.uuid
        )
    }

    fn build_insert_query(
        &self,
        vectors: &[Vec<f32>],
        documents: &[Document],
        ids: Option<&[String]>,
    ) -> Result<(String, Vec<String>)> {
        let columns = self.column_map.columns().join(", ");

        let mut row_ids = Vec::with_capacity(vectors.len());
        let mut rows = Vec::with_capacity(vectors.len());
        for (i, (vector, document)) in vectors.iter().zip(documents).enumerate() {
            let id = ids
                .and_then(|ids| ids.get(i))
                .cloned()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            let metadata = serde_json::to_string(&document.metadata)?;
            rows.push(format!(
                "('{}', '{}', {}, '{}', '{}')",
                id,
                escape_string(&document.page_content),
                format_vector(vector),
                metadata,
                Uuid::new_v4()
            ));
            row_ids.push(id);
        }

        let sql = format!(
            "INSERT INTO TABLE {}.{}({}) VALUES {}",
            self.database,
            self.table,
            columns,
            rows.join(", ")
        );
        Ok((sql, row_ids))
    }

    fn build_search_query(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&ClickHouseFilter>,
    ) -> String {
        let col = &self.column_map;
        let where_str = filter
            .map(|f| format!("PREWHERE {} ", f.where_str))
            .unwrap_or_default();
        let settings: String = self
            .index_query_params
            .iter()
            .map(|(key, value)| format!(" SETTING {key}={value}"))
            .collect();

        format!(
            "SELECT {} AS document, {} AS metadata, dist FROM {}.{} {}ORDER BY {} AS dist ASC LIMIT {}{}",
            col.document,
            col.metadata,
            self.database,
            self.table,
            where_str,
            self.distance_expression(&col.embedding, &format_vector(query)),
            k,
            settings
        )
    }

    fn distance_expression(&self, column: &str, query_literal: &str) -> String {
        match self.metric {
            DistanceMetric::Euclidean => format!("L2Distance({column}, {query_literal})"),
            DistanceMetric::Cosine => format!("cosineDistance({column}, {query_literal})"),
            // ClickHouse sorts ascending; flip the sign so larger inner
            // products rank first
            DistanceMetric::DotProduct | DistanceMetric::MaxInnerProduct => {
                format!("negate(dotProduct({column}, {query_literal}))")
            }
        }
    }

    /// Translates a metadata map filter into a raw where-string over the JSON
    /// metadata column. Empty maps yield no filter.
    fn metadata_filter(
        &self,
        filter: Option<&HashMap<String, JsonValue>>,
    ) -> Option<ClickHouseFilter> {
        let filter = filter.filter(|f| !f.is_empty())?;
        let mut conditions: Vec<String> = filter
            .iter()
            .map(|(key, value)| {
                let literal = match value {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!(
                    "{}.{} = '{}'",
                    self.column_map.metadata,
                    key,
                    escape_string(&literal)
                )
            })
            .collect();
        // HashMap iteration order is unspecified; keep the clause order stable
        conditions.sort();
        Some(ClickHouseFilter {
            where_str: conditions.join(" AND "),
        })
    }
}

#[async_trait]
impl VectorStore for ClickHouseVectorStore {
    fn embeddings(&self) -> Option<Arc<dyn Embeddings>> {
        Some(Arc::clone(&self.embeddings))
    }

    fn distance_metric(&self) -> DistanceMetric {
        self.metric
    }

    async fn add_texts(
        &mut self,
        texts: &[impl AsRef<str> + Send + Sync],
        metadatas: Option<&[HashMap<String, JsonValue>]>,
        ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        let text_count = texts.len();
        if let Some(metadatas) = metadatas {
            if metadatas.len() != text_count {
                return Err(Error::invalid_input(format!(
                    "metadatas length ({}) must match texts length ({text_count})",
                    metadatas.len()
                )));
            }
        }
        if let Some(ids) = ids {
            if ids.len() != text_count {
                return Err(Error::invalid_input(format!(
                    "ids length ({}) must match texts length ({text_count})",
                    ids.len()
                )));
            }
        }

        let documents: Vec<Document> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Document {
                page_content: text.as_ref().to_string(),
                metadata: metadatas
                    .and_then(|m| m.get(i))
                    .cloned()
                    .unwrap_or_default(),
                id: None,
            })
            .collect();

        let contents: Vec<String> = documents
            .iter()
            .map(|doc| doc.page_content.clone())
            .collect();
        let vectors = embed(Arc::clone(&self.embeddings), &contents).await?;
        self.insert(&vectors, &documents, ids).await
    }

    async fn _similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, JsonValue>>,
    ) -> Result<Vec<Document>> {
        let filter = self.metadata_filter(filter);
        self.similarity_search(query, k, filter.as_ref()).await
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, JsonValue>>,
    ) -> Result<Vec<(Document, f32)>> {
        let embedding = embed_query(Arc::clone(&self.embeddings), query).await?;
        let filter = self.metadata_filter(filter);
        self.similarity_search_vector_with_score(&embedding, k, filter.as_ref())
            .await
    }

    async fn similarity_search_by_vector(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&HashMap<String, JsonValue>>,
    ) -> Result<Vec<Document>> {
        let filter = self.metadata_filter(filter);
        let results = self
            .similarity_search_vector_with_score(embedding, k, filter.as_ref())
            .await?;
        Ok(results.into_iter().map(|(document, _)| document).collect())
    }

    async fn similarity_search_by_vector_with_score(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&HashMap<String, JsonValue>>,
    ) -> Result<Vec<(Document, f32)>> {
        let filter = self.metadata_filter(filter);
        self.similarity_search_vector_with_score(embedding, k, filter.as_ref())
            .await
    }
}
