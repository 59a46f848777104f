// Library surface for the CLI and integration tests.
pub mod analysis;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod export;
pub mod problem;
pub mod record;
pub mod report;
pub mod session;
pub mod store;
pub mod trainer;
pub mod training;

pub use error::{Result, TrainerError};
pub use record::{ProblemResult, Timestamp};
pub use trainer::Trainer;
