//! Outbound adapters implementing the domain's driven ports.

pub mod imagery;
pub mod persistence;
