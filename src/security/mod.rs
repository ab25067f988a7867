pub mod command_executor;
pub mod token_manager;

pub use command_executor::{CommandError, ScriptExecutor};
pub use token_manager::SecretMasker;
