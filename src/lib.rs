//! # Sommelier
//!
//! Data preparation for predicting a wine's critic score from its review:
//!
//! - [`wine`]: loading and cleaning of the wine review dataset (missing values, group mean
//!   imputation of prices, z-score outlier filtering, new/old world tagging), built from the
//!   DataFusion transformers in [`transformers`] and chained with [`pipeline`].
//! - [`text`]: review normalization (lowercasing, punctuation and stopword removal) and
//!   conversion of tokens into fixed-size word-vector matrices.
//! - [`model`]: the seam where a pretrained sequence model scores embedded reviews.
//!
//! Set `DEBUG_SOMMELIER=true` to enable debug logging (see [`logging`]); runtime defaults
//! are described in [`settings`].

pub mod exceptions;
pub mod io;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod settings;
pub mod text;
pub mod transformers;
pub mod wine;
