pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::hcloud::HcloudClient;
pub use config::{cli::LocalStorage, settings::Settings};
pub use core::rotation::{RotationEngine, RotationOutcome, RotationState};
pub use utils::error::{ApiError, ErrorKind, Result, RotationError};
