pub mod config;
pub mod error;
pub mod observers;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use observers::{ObserverDisposer, Observers};
