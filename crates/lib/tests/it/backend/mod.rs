//! Backend-specific tests
//!
//! Unlike the other modules these pick their backend explicitly.

mod save_load;
#[cfg(feature = "sqlite")]
mod sqlite_tests;
