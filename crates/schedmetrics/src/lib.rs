//! Top-level facade crate for schedmetrics.
//!
//! Re-exports core types and the recorder library so users can depend on a single crate.

pub mod core {
    pub use schedmetrics_core::*;
}

pub mod recorder {
    pub use schedmetrics_recorder::*;
}
