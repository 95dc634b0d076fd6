// src/db/store.rs

//! Abstração do "document store": coleções sem schema endereçadas por caminho
//! (`tournaments`, `tournaments/{id}/teams`, `users`) e documentos por chave opaca.
//!
//! Existem dois backends: [`MemoryDocumentStore`](super::MemoryDocumentStore) e
//! [`PgDocumentStore`](super::PgDocumentStore). Os repositórios só conhecem o trait.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::broadcast;

pub type Fields = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Documento não encontrado: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Documento inválido: {0}")]
    InvalidDocument(String),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Erro de banco de dados: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Erro ao executar migrações: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Store indisponível: {0}")]
    Unavailable(String),
}

// Falhas de conexão são transitórias: o cliente pode tentar de novo
impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

// ---
// Documento
// ---
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Fields,
}

impl Document {
    /// Converte o documento numa entidade tipada. A chave entra no campo `id`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let mut data = self.data;
        data.insert("id".to_string(), Value::String(self.id));
        Ok(serde_json::from_value(Value::Object(data))?)
    }
}

/// Serializa uma struct num mapa de campos (o "corpo" do documento).
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "esperado um objeto JSON, recebido {}",
            other
        ))),
    }
}

// ---
// Consultas
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Filtros de igualdade + ordenação por um único campo.
/// Sem ordenação explícita, os documentos saem na ordem de inserção.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn matches(&self, data: &Fields) -> bool {
        self.filters
            .iter()
            .all(|f| data.get(&f.field) == Some(&f.value))
    }
}

/// Ordem entre valores JSON do mesmo tipo (números e textos).
/// Tipos diferentes ou ausentes são considerados iguais, preservando a ordem de inserção.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

// ---
// Eventos de mudança (base das assinaturas ao vivo)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEvent {
    pub collection: String,
    pub id: String,
    pub kind: ChangeKind,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Insere com chave gerada pelo store e devolve a chave.
    async fn insert(&self, collection: &str, data: Fields) -> Result<String, StoreError>;

    /// Cria ou substitui o documento na chave informada.
    async fn set(&self, collection: &str, id: &str, data: Fields) -> Result<(), StoreError>;

    /// Mescla campos num documento existente. Falha com `NotFound` se ele não existir.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Remove o documento. Remover algo inexistente não é erro.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Incremento numérico atômico de um campo (ausente conta como 0).
    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), StoreError>;

    /// Canal de eventos de mudança de todas as coleções.
    fn watch(&self) -> broadcast::Receiver<StoreEvent>;
}
