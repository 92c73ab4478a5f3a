pub mod config;
pub mod constants;
pub mod errors;
pub mod fs;
pub mod installer;
pub mod logging;
pub mod types;
pub mod utils;
