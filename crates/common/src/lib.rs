//! Shared value types used by every worldmap crate.

mod types;

pub use types::Point;
