//! Core plumbing shared by every venue flow
//!
//! - `logging` - tracing setup and secret sanitization
//! - `nonce` - millisecond nonces that never repeat
//! - `cancel` - cancellation of in-flight wallet prompts and requests
//! - `http` - the REST submitter

pub mod cancel;
pub mod http;
pub mod logging;
pub mod nonce;

pub use cancel::with_cancel;
pub use http::{RestClient, RestResponse};
pub use nonce::{current_time_ms, current_time_secs, next_nonce_ms};
