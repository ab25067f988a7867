pub mod core;
pub mod logging;
pub mod orchestration;
pub mod plugins;
pub mod security;

pub use crate::core::*;
pub use logging::{TracingLogger, init_tracing};
pub use orchestration::{VideoPublisher, VideoPublisherFactory};
pub use security::{CommandError, ScriptExecutor, SecretMasker};
