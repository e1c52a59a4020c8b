use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::store::{
    with_id, Collection, DeleteResult, Document, DocumentId, DocumentStore, Filter, FindOptions,
    InsertOneResult, SortDirection, StoreError, UpdateResult, ID_FIELD,
};
use crate::config::DatabaseConfig;

/// Shared predicate: $1 = optional id, $2 = containment document
const MATCH_CLAUSE: &str = "($1::uuid IS NULL OR id = $1) AND doc @> $2";

/// Document store over PostgreSQL, one JSONB table per collection
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    /// Create collection tables that do not exist yet
    pub async fn ensure_collections(&self) -> Result<(), StoreError> {
        for collection in Collection::ALL {
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id UUID PRIMARY KEY,
                    doc JSONB NOT NULL,
                    inserted_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )",
                quote_identifier(collection.name())
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }
        info!("Collections ready: {:?}", Collection::ALL.map(Collection::name));
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        // Unsorted reads order by an empty key, which is NULL for every row,
        // leaving insertion order.
        let (sort_field, direction) = match &options.sort {
            Some(sort) => (sort.field.clone(), sort.direction),
            None => (String::new(), SortDirection::Asc),
        };
        let nulls = match direction {
            SortDirection::Asc => "NULLS FIRST",
            SortDirection::Desc => "NULLS LAST",
        };
        let sql = format!(
            "SELECT id, doc FROM {table} WHERE {MATCH_CLAUSE}
             ORDER BY doc -> $3 {dir} {nulls}, inserted_at {dir}
             OFFSET $4 LIMIT $5",
            table = quote_identifier(collection.name()),
            dir = direction.to_sql(),
        );

        let rows: Vec<(Uuid, Json<Document>)> = sqlx::query_as(&sql)
            .bind(filter.id.map(|id| id.0))
            .bind(Json(&filter.fields))
            .bind(sort_field)
            .bind(to_i64(options.skip.unwrap_or(0)))
            .bind(options.limit.map(to_i64))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, Json(doc))| with_id(doc, DocumentId(id)))
            .collect())
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let sql = format!(
            "SELECT count(*) FROM {} WHERE {}",
            quote_identifier(collection.name()),
            MATCH_CLAUSE
        );
        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(filter.id.map(|id| id.0))
            .bind(Json(&filter.fields))
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn estimated_count(&self, collection: Collection) -> Result<u64, StoreError> {
        // reltuples is -1 until the table has been analyzed
        let estimate: Option<(i64,)> =
            sqlx::query_as("SELECT reltuples::bigint FROM pg_class WHERE relname = $1")
                .bind(collection.name())
                .fetch_optional(&self.pool)
                .await?;

        match estimate {
            Some((n,)) if n >= 0 => Ok(n as u64),
            _ => self.count(collection, &Filter::all()).await,
        }
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut doc: Document,
    ) -> Result<InsertOneResult, StoreError> {
        doc.remove(ID_FIELD);
        let id = DocumentId::generate();
        let sql = format!(
            "INSERT INTO {} (id, doc) VALUES ($1, $2)",
            quote_identifier(collection.name())
        );
        sqlx::query(&sql)
            .bind(id.0)
            .bind(Json(&doc))
            .execute(&self.pool)
            .await?;

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: Some(id),
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        mut patch: Document,
    ) -> Result<UpdateResult, StoreError> {
        patch.remove(ID_FIELD);
        let table = quote_identifier(collection.name());
        let sql = format!(
            "WITH target AS (
                SELECT id FROM {table} WHERE {MATCH_CLAUSE} LIMIT 1 FOR UPDATE
            ), updated AS (
                UPDATE {table} t SET doc = t.doc || $3
                FROM target
                WHERE t.id = target.id AND t.doc IS DISTINCT FROM t.doc || $3
                RETURNING t.id
            )
            SELECT (SELECT count(*) FROM target), (SELECT count(*) FROM updated)"
        );

        let (matched, modified): (i64, i64) = sqlx::query_as(&sql)
            .bind(filter.id.map(|id| id.0))
            .bind(Json(&filter.fields))
            .bind(Json(&patch))
            .fetch_one(&self.pool)
            .await?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: matched.max(0) as u64,
            modified_count: modified.max(0) as u64,
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError> {
        let table = quote_identifier(collection.name());
        let sql = format!(
            "DELETE FROM {table} WHERE id = (SELECT id FROM {table} WHERE {MATCH_CLAUSE} LIMIT 1)"
        );
        let result = sqlx::query(&sql)
            .bind(filter.id.map(|id| id.0))
            .bind(Json(&filter.fields))
            .execute(&self.pool)
            .await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
