pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use store::{
    Collection, DeleteResult, Document, DocumentId, DocumentStore, Filter, FindOptions,
    InsertOneResult, Sort, SortDirection, StoreError, UpdateResult, CREATED_AT_FIELD, ID_FIELD,
};
