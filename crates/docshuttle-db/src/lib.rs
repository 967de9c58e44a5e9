//! Docshuttle Database Library
//!
//! Metadata persistence for file records. [`FileRepository`] is the seam the
//! services program against; [`PgFileRepository`] is the production Postgres
//! implementation and [`MemoryFileRepository`] backs tests and local
//! development.

pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::MemoryFileRepository;
pub use postgres::PgFileRepository;
pub use repository::FileRepository;
