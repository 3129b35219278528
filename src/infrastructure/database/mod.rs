mod memory_repository;
mod pool;
mod postgres_repository;


pub use memory_repository::create_memory_repository;
pub use pool::connect_with_retry;
pub use postgres_repository::create_postgres_repository;
