pub mod cli;
pub mod errors;
pub mod loader;

pub use cli::{RunRequest, run};
pub use errors::FrontendError;
