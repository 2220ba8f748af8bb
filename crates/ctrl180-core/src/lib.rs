//! ctrl180-core
//!
//! Pure text and layout logic for the assessment report overlay service:
//! normalization, word wrap, overlay layout, payload field resolution and
//! template selection. No I/O; this is the shared vocabulary of the
//! export and lambda crates.

pub mod error;
pub mod fields;
pub mod layout;
pub mod measure;
pub mod models;
pub mod naming;
pub mod normalize;
pub mod overlay;
pub mod payload;
pub mod template;
pub mod wrap;
