//! Model invocation: a raw backend seam plus retry and schema validation.

pub mod backend;
pub mod error;
pub mod invoker;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod retry;


pub use backend::{GenaiBackend, ModelBackend, ModelRequest, ResponseSchema};
pub use error::{ModelError, ModelResult};
pub use invoker::ResilientInvoker;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockModelBackend;
pub use retry::{RetryPolicy, retry_with_backoff};
