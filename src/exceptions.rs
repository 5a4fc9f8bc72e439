//! ## Custom Errors for Sommelier
//!
//! This module defines the error type shared by every part of the library.
//! It uses the `thiserror` crate to derive the `Error` trait.
//! The `SommelierError` enum covers failures from the dataframe engine, from reading input
//! files, and from invalid inputs to the cleaning, text and embedding steps.
//!
//! The `SommelierResult` type alias is the result type returned throughout the library.
//!
//! ### Example
//!
//! ```rust
//! use sommelier::exceptions::{SommelierError, SommelierResult};
//!
//! fn check_length(max_len: usize) -> SommelierResult<()> {
//!     if max_len == 0 {
//!         return Err(SommelierError::InvalidParameter("max_len must be positive".into()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Errors specific to the Sommelier library.
#[derive(Debug, Error)]
pub enum SommelierError {
    /// Wraps underlying I/O errors.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Wraps errors from DataFusion.
    #[error("DataFusion error: {0}")]
    DataFusionError(#[from] datafusion::error::DataFusionError),

    /// Wraps errors from Arrow.
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Wraps errors from Parquet.
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// Wraps array shape errors from ndarray.
    #[error("Shape error: {0}")]
    ShapeError(#[from] ndarray::ShapeError),

    /// Indicates that an invalid parameter was provided (e.g., a non-positive threshold).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Indicates that the provided data format is unsupported (e.g., unknown file extension).
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Indicates that the specified column does not exist in the DataFrame.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Indicates the transform method was called before calling fit for a stateful transformer.
    #[error("Transform called before fit for stateful transformer")]
    FitNotCalled,

    /// Indicates a malformed word vector file.
    #[error("Invalid word vectors: {0}")]
    InvalidWordVectors(String),
}

/// A convenient result type for Sommelier operations.
pub type SommelierResult<T> = std::result::Result<T, SommelierError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "winemag.csv");
        let err: SommelierError = io_err.into();
        let err_msg = format!("{}", err);
        assert!(err_msg.contains("I/O error:"));
        assert!(err_msg.contains("winemag.csv"));
    }

    #[test]
    fn test_datafusion_error() {
        let df_err = datafusion::error::DataFusionError::Plan("test plan error".into());
        let err: SommelierError = df_err.into();
        let err_msg = format!("{}", err);
        assert!(err_msg.contains("DataFusion error:"));
        assert!(err_msg.contains("test plan error"));
    }

    #[test]
    fn test_arrow_error() {
        let arrow_err = arrow::error::ArrowError::CastError("cannot cast".into());
        let err: SommelierError = arrow_err.into();
        assert!(format!("{}", err).starts_with("Arrow error:"));
    }

    #[test]
    fn test_shape_error() {
        let shape_err = ndarray::Array2::<f32>::from_shape_vec((2, 2), vec![1.0; 3]).unwrap_err();
        let err: SommelierError = shape_err.into();
        assert!(format!("{}", err).starts_with("Shape error:"));
    }

    #[test]
    fn test_missing_column_error() {
        let err = SommelierError::MissingColumn("price".into());
        assert_eq!(format!("{}", err), "Missing column: price");
    }

    #[test]
    fn test_invalid_word_vectors_error() {
        let err = SommelierError::InvalidWordVectors("line 3: expected 50 values".into());
        let err_msg = format!("{}", err);
        assert!(err_msg.contains("Invalid word vectors:"));
        assert!(err_msg.contains("line 3"));
    }

    #[test]
    fn test_fit_not_called_error() {
        let err = SommelierError::FitNotCalled;
        assert!(format!("{}", err).contains("Transform called before fit"));
    }
}
