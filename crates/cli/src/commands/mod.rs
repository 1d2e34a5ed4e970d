pub mod check;
pub mod run;

pub use check::check_config;
pub use run::{run_validation, RunArgs};
