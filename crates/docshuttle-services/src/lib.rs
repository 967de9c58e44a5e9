//! Docshuttle Services Library
//!
//! Orchestration layer between the HTTP surface and the storage, database
//! and conversion crates. [`LifecycleService`] drives the upload, register
//! and delete flows, [`NotificationHub`] fans lifecycle events out to
//! connected clients, and [`ExpirySweeper`] enforces the retention window
//! in the background.

pub mod lifecycle;
pub mod notify;
pub mod sweeper;

pub use lifecycle::LifecycleService;
pub use notify::NotificationHub;
pub use sweeper::{ExpirySweeper, SweepReport};
