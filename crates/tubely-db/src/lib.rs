//! Video metadata persistence
//!
//! The [`VideoStore`] trait is the only way the rest of the server reads or writes video
//! records. [`PgVideoStore`] backs it with PostgreSQL; [`InMemoryVideoStore`] serves local
//! development and tests.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemoryVideoStore;
pub use postgres::PgVideoStore;
pub use store::{StoreError, StoreResult, VideoStore};
