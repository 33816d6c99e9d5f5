//! Inbound adapters translate external requests into domain calls.

pub mod http;
