use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tokio::sync::RwLock;

use super::store::{
    with_id, Collection, DeleteResult, Document, DocumentId, DocumentStore, Filter, FindOptions,
    InsertOneResult, SortDirection, StoreError, UpdateResult, ID_FIELD,
};

#[derive(Debug, Clone)]
struct StoredDocument {
    id: DocumentId,
    /// Insertion order, used to break sort ties
    seq: u64,
    doc: Document,
}

/// In-process store for tests and `--in-memory` runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<StoredDocument>>>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut matched: Vec<&StoredDocument> = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d.id, &d.doc)).collect())
            .unwrap_or_default();

        if let Some(sort) = &options.sort {
            matched.sort_by(|a, b| {
                let ordering = compare_fields(a.doc.get(&sort.field), b.doc.get(&sort.field))
                    .then(a.seq.cmp(&b.seq));
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let skip = options.skip.unwrap_or(0) as usize;
        let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|d| with_id(d.doc.clone(), d.id))
            .collect())
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d.id, &d.doc)).count())
            .unwrap_or(0) as u64)
    }

    async fn estimated_count(&self, collection: Collection) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).map(Vec::len).unwrap_or(0) as u64)
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut doc: Document,
    ) -> Result<InsertOneResult, StoreError> {
        doc.remove(ID_FIELD);
        let id = DocumentId::generate();
        let seq = self.next_seq.fetch_add(1, AtomicOrdering::SeqCst);

        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .push(StoredDocument { id, seq, doc });

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

        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d.id, &d.doc)));

        let Some(target) = target else {
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
            });
        };

        let mut modified = false;
        for (field, value) in patch {
            if target.doc.get(&field) != Some(&value) {
                target.doc.insert(field, value);
                modified = true;
            }
        }

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError> {
        let mut collections = self.collections.write().await;
        let deleted = match collections.get_mut(&collection) {
            Some(docs) => match docs.iter().position(|d| filter.matches(d.id, &d.doc)) {
                Some(index) => {
                    docs.remove(index);
                    1
                }
                None => 0,
            },
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: deleted,
        })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {}
}

/// Order field values the way the JSONB store does: missing < null < string
/// < number < bool, numbers compared numerically.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::String(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::Bool(_)) => 4,
            Some(Value::Array(_)) => 5,
            Some(Value::Object(_)) => 6,
        }
    }

    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
