//! Row filters over extract tables
//!
//! Filters compute a boolean keep-mask per batch and share
//! [`filter_record_batch`] to materialise the kept rows.

pub mod code;
pub mod core;
pub mod membership;

pub use code::CodeFilter;
pub use self::core::{BatchFilter, filter_record_batch};
pub use membership::membership_mask;
