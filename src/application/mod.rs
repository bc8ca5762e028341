//! Application layer: the account resolution policy, the session object the
//! transfer screen drives, and the engine that confirms transfers.
//!
//! Resolution runs are cooperative `tokio` futures. A session tags each run
//! with a generation token so that only the latest run can publish an outcome.

pub mod resolver;
pub mod session;
pub mod transfer;
