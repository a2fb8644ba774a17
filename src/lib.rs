pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::memory::MemoryTokenStore;
pub use config::{cli::FileTokenStore, ClientSettings, CliConfig};
pub use crate::core::{ApiClient, ClockSession};
pub use utils::error::{ClientError, Result};
