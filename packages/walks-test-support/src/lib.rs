//! Walks test support utilities
//!
//! Shared helpers for the backend's integration tests. Currently this is the
//! unified logging initialization; fixtures live next to the tests that use them.

pub mod logging;
