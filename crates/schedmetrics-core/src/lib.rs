//! schedmetrics core: instrument identity, label schema, bucket layouts and
//! the shared error surface.
//!
//! This crate describes *what* an instrument is (its stable exported
//! identity) without owning any storage. The recorder crate builds the
//! concurrent registry on top of these contracts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Invalid names, label schemas and bucket layouts surface as
//! `MetricsError` so they are caught at start-up.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod buckets;
pub mod error;
pub mod identity;
pub mod labels;

/// Shared result type.
pub use error::{MetricsError, Result};
pub use identity::{InstrumentDesc, InstrumentKind};
