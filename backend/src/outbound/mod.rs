//! Outbound adapters implement the domain's driven ports.

pub mod gemini;
pub mod memory;
pub mod persistence;
