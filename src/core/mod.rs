pub mod config;
pub mod config_loader;
pub mod error;
pub mod state_machine;
pub mod traits;
pub mod video;

pub use config::*;
pub use config_loader::*;
pub use error::*;
pub use state_machine::*;
pub use traits::*;
pub use video::*;
