// src/db/memory_store.rs

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::store::{
    compare_values, ChangeKind, Direction, Document, DocumentStore, Fields, Query, StoreError,
    StoreEvent,
};

const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone)]
struct StoredDocument {
    seq: u64,
    data: Fields,
}

#[derive(Default)]
struct Collections {
    next_seq: u64,
    by_path: HashMap<String, HashMap<String, StoredDocument>>,
}

/// Document store em memória. Cada operação é atômica sob o lock,
/// mas nada garante atomicidade entre duas operações distintas.
pub struct MemoryDocumentStore {
    inner: RwLock<Collections>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: RwLock::new(Collections::default()),
            events,
        }
    }

    /// Quantas assinaturas ao vivo estão ligadas ao store.
    pub fn watcher_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn publish(&self, collection: &str, id: &str, kind: ChangeKind) {
        // Sem ouvintes o envio falha, e tudo bem.
        let _ = self.events.send(StoreEvent {
            collection: collection.to_string(),
            id: id.to_string(),
            kind,
        });
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_path
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|stored| Document {
                id: id.to_string(),
                data: stored.data.clone(),
            }))
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read().await;
        let Some(docs) = inner.by_path.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<(&String, &StoredDocument)> = docs
            .iter()
            .filter(|(_, stored)| query.matches(&stored.data))
            .collect();

        // Empates no campo de ordenação seguem a ordem de inserção, no mesmo sentido
        match &query.order_by {
            Some(order) => matched.sort_by(|(_, a), (_, b)| {
                let ord = compare_values(a.data.get(&order.field), b.data.get(&order.field))
                    .then(a.seq.cmp(&b.seq));
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            }),
            None => matched.sort_by_key(|(_, stored)| stored.seq),
        }

        Ok(matched
            .into_iter()
            .map(|(id, stored)| Document {
                id: id.clone(),
                data: stored.data.clone(),
            })
            .collect())
    }

    async fn insert(&self, collection: &str, data: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.set(collection, &id, data).await?;
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, data: Fields) -> Result<(), StoreError> {
        let kind = {
            let mut inner = self.inner.write().await;
            inner.next_seq += 1;
            let seq = inner.next_seq;
            let docs = inner.by_path.entry(collection.to_string()).or_default();
            match docs.get_mut(id) {
                Some(existing) => {
                    existing.data = data;
                    ChangeKind::Update
                }
                None => {
                    docs.insert(id.to_string(), StoredDocument { seq, data });
                    ChangeKind::Insert
                }
            }
        };
        self.publish(collection, id, kind);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.write().await;
            let stored = inner
                .by_path
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| StoreError::not_found(collection, id))?;
            for (key, value) in fields {
                stored.data.insert(key, value);
            }
        }
        self.publish(collection, id, ChangeKind::Update);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let removed = {
            let mut inner = self.inner.write().await;
            inner
                .by_path
                .get_mut(collection)
                .and_then(|docs| docs.remove(id))
                .is_some()
        };
        if removed {
            self.publish(collection, id, ChangeKind::Delete);
        }
        Ok(())
    }

    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.write().await;
            let stored = inner
                .by_path
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| StoreError::not_found(collection, id))?;
            let current = match stored.data.get(field) {
                None | Some(Value::Null) => 0,
                Some(value) => value.as_i64().ok_or_else(|| {
                    StoreError::InvalidDocument(format!("campo '{}' não é um inteiro", field))
                })?,
            };
            stored
                .data
                .insert(field.to_string(), Value::from(current + delta));
        }
        self.publish(collection, id, ChangeKind::Update);
        Ok(())
    }

    fn watch(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}
