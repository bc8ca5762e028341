//! Domain types: the bank directory, resolution outcomes, the wallet and the
//! lookup port the application layer depends on.

pub mod bank;
pub mod ports;
pub mod receipt;
pub mod resolution;
pub mod wallet;
