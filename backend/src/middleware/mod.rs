//! Actix middleware.

pub mod trace;

pub use self::trace::{RequestTrace, TRACE_ID_HEADER, TraceId};
