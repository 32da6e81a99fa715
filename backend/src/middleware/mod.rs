//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! tracing and request deadlines.

pub mod timeout;
pub mod trace;

pub use timeout::Timeout;
pub use trace::Trace;
