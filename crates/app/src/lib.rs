//! Session authentication core: tokens, session cache, users and their storage.

pub mod auth;
pub mod clock;
pub mod context;
pub mod database;
pub mod users;

#[cfg(test)]
mod test;
