pub mod accessor;
pub mod calculator;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod global_config;
pub mod model;
pub mod ordering;
pub mod reconciler;

pub use calculator::{CalculationMode, RunResult, set_field};
pub use config::Config;
pub use error::CoreError;
pub use global_config::get_config;
pub use reconciler::PositionReconciler;
