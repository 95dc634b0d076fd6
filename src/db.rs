pub mod memory_store;
pub mod pg_store;
pub mod store;
pub mod tournament_repo;
pub mod user_repo;

pub use memory_store::MemoryDocumentStore;
pub use pg_store::PgDocumentStore;
pub use store::{DocumentStore, StoreError};
pub use tournament_repo::{TournamentFeed, TournamentRepository};
pub use user_repo::UserRepository;
