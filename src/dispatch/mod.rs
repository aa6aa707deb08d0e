//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! DispatchRequest (raw path, client IP)
//!     → resource::path::sanitize
//!     → maintenance gate (blocked clients stop here)
//!     → locator: whole path as controller, method = explicit or `index`
//!     → fallback: parent path as controller, method = last segment
//!     → factory constructs with Services, method invoked
//!     → DispatchOutcome
//! ```

pub mod dispatcher;
pub mod outcome;

pub use dispatcher::{Dispatcher, DispatcherBuilder, MODEL_INIT_METHOD};
pub use outcome::{DispatchOutcome, DispatchRequest, DEFAULT_METHOD};
