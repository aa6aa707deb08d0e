//! Maintenance mode.
//!
//! # Data Flow
//! ```text
//! Request (client IP)
//!     → gate.rs (active? → allow-list membership)
//!     → allowed: dispatch continues
//!     → denied: DispatchOutcome::MaintenanceBlocked, no resolution work
//!
//! Admin API / CLI:
//!     add / remove IP → gate.rs (serialized read-modify-write)
//!     → store.rs (rewrite whole file)
//! ```
//!
//! # Design Decisions
//! - The allow-list is re-read on every check; a slightly stale view is fine
//! - Writers are serialized in-process; the file itself is replaced atomically
//! - Add/remove are idempotent and report whether anything changed

pub mod gate;
pub mod store;

pub use gate::MaintenanceGate;
pub use store::{AllowListStore, FileAllowList, MemoryAllowList, StoreError};
