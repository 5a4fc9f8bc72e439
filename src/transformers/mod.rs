//! # Transformer Implementations
//!
//! The submodules contain the transformers used to clean the wine dataset.

pub mod categorical_encoding;
pub mod imputation;
pub mod outlier_handling;
