//! Authentication and sessions

mod cache;
mod errors;
mod models;
mod notify;
mod repository;
mod service;
mod store;
mod sweeper;
mod token;
mod tombstones;

pub use cache::*;
pub use errors::*;
pub use models::*;
pub use notify::*;
pub use repository::PgTokenStore;
pub use service::*;
pub use store::*;
pub use sweeper::*;
pub use token::*;
