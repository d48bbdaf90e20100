#![warn(rust_2018_idioms)]

//! Unicode bidirectional analysis and complex-script shaping.
//!
//! The crate has two independent halves that consume the same logical
//! text:
//!
//! - [`bidi`] resolves per-character embedding levels (UAX #9 rules
//!   X/W/N/I) and produces visual-order permutations.
//! - [`shape`] segments, reorders, and substitutes glyphs for complex
//!   scripts, driven by a font's `GSUB` table.

/// Reading of binary data.
pub mod binary;
pub mod bidi;
pub mod error;
pub mod gsub;
pub mod layout;
pub mod scripts;
pub mod shape;
pub mod size;
pub mod tag;
pub mod unicode;

/// U+25CC DOTTED CIRCLE, the conventional stand-in base for orphaned marks.
pub const DOTTED_CIRCLE: char = '\u{25CC}';
