//! Test support shared by the app crate's unit tests.

mod db;

pub(crate) use context::TestContext;
