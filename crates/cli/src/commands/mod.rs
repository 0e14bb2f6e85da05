//! Command implementations.

mod info;
mod run;
mod summary;
mod validate;

pub use info::run_info;
pub use run::run_provider;
pub use validate::run_validate;
