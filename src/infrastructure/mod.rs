//! Lookup client adapters.

pub mod in_memory;
pub mod paystack;
