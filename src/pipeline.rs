//! ## Cleaning Pipeline
//!
//! Core abstractions for chaining the wine cleaning and text steps over DataFusion DataFrames.
//!
//! ### Overview
//!
//! - The [`Transformer`] trait is the common interface of every step. Stateful steps (such as the
//!   group mean imputer or the z-score filter) learn parameters in `fit`; stateless steps only
//!   rewrite the logical plan in `transform`.
//! - The [`Pipeline`] struct runs named steps in order, feeding each step's output to the next.
//! - Macros [`crate::impl_transformer`] and [`crate::make_pipeline`] implement the trait for a type
//!   with matching inherent methods and build pipelines without manual boxing.

use crate::exceptions::{SommelierError, SommelierResult};
use async_trait::async_trait;
use datafusion::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Trait for components used in the data transformation pipeline.
///
/// Every transformer must provide a `fit` method (which may collect data to compute parameters)
/// and a `transform` method (which updates the DataFrame's logical plan without triggering execution).
#[async_trait]
pub trait Transformer {
    /// Fit the transformer given a DataFrame.
    async fn fit(&mut self, df: &DataFrame) -> SommelierResult<()>;

    /// Transform the input DataFrame, returning a new DataFrame with the transformation applied.
    fn transform(&self, df: DataFrame) -> SommelierResult<DataFrame>;

    /// Returns true if the transformer requires a call to fit before transform can be called.
    fn is_stateful(&self) -> bool;
}

/// Implements [`Transformer`] for a type that already has inherent methods:
/// - `async fn fit(&mut self, &DataFrame) -> SommelierResult<()>`
/// - `fn transform(&self, DataFrame) -> SommelierResult<DataFrame>`
/// - `fn inherent_is_stateful(&self) -> bool`
///
/// # Example
///
/// ```rust,no_run
/// use sommelier::exceptions::SommelierResult;
/// use datafusion::prelude::DataFrame;
/// use sommelier::impl_transformer;
///
/// pub struct KeepAll;
///
/// impl KeepAll {
///     pub async fn fit(&mut self, _df: &DataFrame) -> SommelierResult<()> {
///         Ok(())
///     }
///
///     pub fn transform(&self, df: DataFrame) -> SommelierResult<DataFrame> {
///         Ok(df)
///     }
///
///     pub fn inherent_is_stateful(&self) -> bool {
///         false
///     }
/// }
///
/// impl_transformer!(KeepAll);
/// ```
#[macro_export]
macro_rules! impl_transformer {
    ($ty:ty) => {
        #[async_trait::async_trait]
        impl $crate::pipeline::Transformer for $ty {
            async fn fit(
                &mut self,
                df: &datafusion::prelude::DataFrame,
            ) -> $crate::exceptions::SommelierResult<()> {
                <$ty>::fit(self, df).await
            }
            fn transform(
                &self,
                df: datafusion::prelude::DataFrame,
            ) -> $crate::exceptions::SommelierResult<datafusion::prelude::DataFrame> {
                <$ty>::transform(self, df)
            }
            fn is_stateful(&self) -> bool {
                <$ty>::inherent_is_stateful(self)
            }
        }
    };
}

/// A pipeline that chains a sequence of transformers.
///
/// Each transformer's output (a new logical plan) is passed as input to the next transformer.
/// Execution only happens when a step needs to fit or when the caller collects the result.
pub struct Pipeline {
    steps: Vec<(String, Box<dyn Transformer + Send + Sync>)>,
    verbose: bool,
}

impl Pipeline {
    /// Creates a new pipeline.
    ///
    /// # Arguments
    ///
    /// * `steps` - A vector of (name, transformer) pairs (each transformer is already boxed).
    /// * `verbose` - If true, step timings are logged at info level instead of debug.
    pub fn new(steps: Vec<(String, Box<dyn Transformer + Send + Sync>)>, verbose: bool) -> Self {
        Self { steps, verbose }
    }

    /// Names of the steps, in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn log_step(&self, message: &str, name: &str) {
        if self.verbose {
            info!(step = name, "{}", message);
        } else {
            debug!(step = name, "{}", message);
        }
    }

    /// Fits each transformer (sequentially) on the output of the previous one.
    pub async fn fit(&mut self, df: &DataFrame) -> SommelierResult<DataFrame> {
        if self.steps.is_empty() {
            return Err(SommelierError::InvalidParameter(
                "Pipeline must have at least one transformer.".to_string(),
            ));
        }
        let verbose = self.verbose;
        let mut current_df = df.clone();
        for (name, step) in self.steps.iter_mut() {
            let start = Instant::now();
            step.fit(&current_df).await.map_err(|e| {
                SommelierError::InvalidParameter(format!(
                    "Error fitting transformer '{}': {}",
                    name, e
                ))
            })?;
            current_df = step.transform(current_df).map_err(|e| {
                SommelierError::InvalidParameter(format!(
                    "Error transforming in '{}': {}",
                    name, e
                ))
            })?;
            let elapsed = start.elapsed();
            if verbose {
                info!(step = name.as_str(), ?elapsed, "Fitted step");
            } else {
                debug!(step = name.as_str(), ?elapsed, "Fitted step");
            }
        }
        Ok(current_df)
    }

    /// Applies the `transform` method of each transformer (without fitting).
    pub fn transform(&self, df: DataFrame) -> SommelierResult<DataFrame> {
        if self.steps.is_empty() {
            return Err(SommelierError::InvalidParameter(
                "Pipeline must have at least one transformer.".to_string(),
            ));
        }
        let mut current_df = df;
        for (name, step) in self.steps.iter() {
            self.log_step("Applying transformer", name);
            current_df = step.transform(current_df).map_err(|e| {
                SommelierError::InvalidParameter(format!(
                    "Error in transformer '{}': {}",
                    name, e
                ))
            })?;
        }
        Ok(current_df)
    }

    /// Convenience method to call `fit` and then return the final transformed DataFrame.
    pub async fn fit_transform(&mut self, df: &DataFrame) -> SommelierResult<DataFrame> {
        self.fit(df).await
    }
}

/// Macro to simplify pipeline creation by automatically boxing transformers.
///
/// # Example
///
/// ```rust,no_run
/// use sommelier::make_pipeline;
/// use sommelier::transformers::imputation::DropMissingData;
///
/// let pipeline = make_pipeline!(false,
///     ("drop_missing", DropMissingData::new()),
/// );
/// ```
#[macro_export]
macro_rules! make_pipeline {
    ($verbose:expr, $(($name:expr, $transformer:expr)),+ $(,)?) => {
        {
            let steps: Vec<(String, Box<dyn $crate::pipeline::Transformer + Send + Sync>)> = vec![
                $(
                    ($name.to_string(), Box::new($transformer)),
                )+
            ];
            $crate::pipeline::Pipeline::new(steps, $verbose)
        }
    };
}
