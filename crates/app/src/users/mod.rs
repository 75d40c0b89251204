//! Users

mod directory;
mod errors;
mod models;
mod password;
mod repository;

pub use directory::*;
pub use errors::*;
pub use models::*;
pub use password::*;
