//! # candb
//!
//! Rust library for reading, writing and computing against **CAN DBC**
//! database files.
//!
//! ## Highlights
//! - **DBC parser**: two-pass, line-oriented, forward references allowed;
//!   builds a name-keyed [`Network`] and reports structured
//!   [`Diagnostic`]s instead of failing on recoverable problems.
//! - **Canonical serializer**: `save::to_string()` emits a fixed section
//!   order, so canonical files round-trip byte-for-byte.
//! - **Signal codec**: [`Signal`](dbc::types::signal::Signal) decodes and
//!   encodes payload bits in both Intel and Motorola sawtooth layouts,
//!   with sign extension, IEEE float/double reinterpretation and
//!   raw↔physical conversion.
//! - **Full side-band**: comments, value tables, environment variables,
//!   signal types/groups, attributes and relation attributes.

pub mod dbc;

// Convenience re-exports for the common entry points.
pub use crate::dbc::parse::{ParseOutcome, Parser, from_file, from_str};
pub use crate::dbc::save;
pub use crate::dbc::types::diagnostics::{Diagnostic, DiagnosticKind, Status};
pub use crate::dbc::types::network::Network;
