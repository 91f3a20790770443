//! Text helpers shared by the importers and the narration engine.
//!
//! [`segment`] turns one page of extracted text into the ordered list of
//! narration units ("lines") the reader speaks and highlights.

pub mod segment;

pub use segment::segment;
