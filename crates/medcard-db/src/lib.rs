pub mod error;
pub mod pool;
pub mod repos;
pub mod repository;

// Re-export commonly used items
pub use error::{RepoError, Result};
pub use pool::{create_pool, create_pool_with, run_migrations};
pub use repos::card::{CardRepo, CardRow};
pub use repos::patient::{PatientRepo, PatientRow};
pub use repos::session::{SessionRepo, SessionRow};
pub use repository::{PgRepository, Repository};
