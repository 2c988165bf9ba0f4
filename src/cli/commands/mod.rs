//! CLI command implementations.

mod config;
mod doctor;
mod extract;
mod serve;
mod summarize;

pub use config::run_config;
pub use doctor::run_doctor;
pub use extract::run_extract;
pub use serve::run_serve;
pub use summarize::run_summarize;
