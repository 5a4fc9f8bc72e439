//! # Review Text Processing
//!
//! Normalization of review text and its conversion into fixed-size embedding matrices.

pub mod cleaner;
pub mod embedding;
pub mod normalize;
pub mod stopwords;
