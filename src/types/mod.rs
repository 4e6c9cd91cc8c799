pub mod error;

pub use error::{ErrorCategory, ErrorClassifier, LlmError, LoomError, Result};
