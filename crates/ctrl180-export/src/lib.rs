//! ctrl180-export
//!
//! Draws resolved report content onto a pre-authored PDF template.

pub mod chart;
pub mod error;
pub mod fonts;
pub mod pdf;
pub mod render;
pub mod styles;
pub mod templates;
