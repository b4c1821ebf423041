// ABOUTME: Data layer and persistence for the tagging service
// ABOUTME: Storage error type, SQLite pool setup and embedded migrations

pub mod db;
pub mod error;

pub use db::{connect, connect_in_memory, run_migrations};
pub use error::StorageError;
