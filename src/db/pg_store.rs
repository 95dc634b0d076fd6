// src/db/pg_store.rs

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    postgres::{PgListener, PgPoolOptions},
    types::Json,
    PgPool, Postgres, QueryBuilder,
};
use tokio::{sync::broadcast, task::JoinHandle};
use uuid::Uuid;

use super::store::{
    Direction, Document, DocumentStore, Fields, Query, StoreError, StoreEvent,
};

const NOTIFY_CHANNEL: &str = "document_changes";
const EVENT_BUFFER: usize = 256;

type DocumentRow = (String, Json<Fields>);

/// Document store sobre uma tabela JSONB no Postgres.
/// Mudanças chegam via LISTEN/NOTIFY (trigger criada na migração).
pub struct PgDocumentStore {
    pool: PgPool,
    events: broadcast::Sender<StoreEvent>,
    listener_task: JoinHandle<()>,
}

impl PgDocumentStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!().run(&pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> Result<Self, StoreError> {
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(NOTIFY_CHANNEL).await?;

        let sender = events.clone();
        let listener_task = tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        match serde_json::from_str::<StoreEvent>(notification.payload()) {
                            Ok(event) => {
                                let _ = sender.send(event);
                            }
                            Err(e) => {
                                tracing::warn!("Notificação de documento ilegível: {}", e);
                            }
                        }
                    }
                    Err(e) => {
                        // O PgListener reconecta sozinho na próxima chamada
                        tracing::error!("Falha no LISTEN {}: {}", NOTIFY_CHANNEL, e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        Ok(Self {
            pool,
            events,
            listener_task,
        })
    }
}

impl Drop for PgDocumentStore {
    fn drop(&mut self) {
        self.listener_task.abort();
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, Json(data))| Document { id, data }))
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT id, data FROM documents WHERE collection = ");
        builder.push_bind(collection.to_string());

        for filter in &query.filters {
            builder.push(" AND data -> ");
            builder.push_bind(filter.field.clone());
            builder.push(" = ");
            builder.push_bind(Json(filter.value.clone()));
        }

        match &query.order_by {
            Some(order) => {
                builder.push(" ORDER BY data -> ");
                builder.push_bind(order.field.clone());
                builder.push(match order.direction {
                    Direction::Ascending => " ASC, seq ASC",
                    Direction::Descending => " DESC, seq DESC",
                });
            }
            None => {
                builder.push(" ORDER BY seq ASC");
            }
        }

        let rows = builder
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, Json(data))| Document { id, data })
            .collect())
    }

    async fn insert(&self, collection: &str, data: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&id)
            .bind(Json(data))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, data: Fields) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(data))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(fields))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), StoreError> {
        // Um único UPDATE: o Postgres trava a linha durante a leitura-e-escrita.
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET data = jsonb_set(
                    data,
                    ARRAY[$3::text],
                    to_jsonb(COALESCE((data ->> $3::text)::bigint, 0) + $4)
                ),
                updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(delta)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }

    fn watch(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}
