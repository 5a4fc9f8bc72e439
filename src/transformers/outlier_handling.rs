//! ## Transformers for handling outliers
//!
//! Currently, the following transformer is implemented:
//!
//! - **ZScoreOutlierFilter:** Keeps either the inliers or the outliers of a numeric column, where a
//!   value is an outlier when the magnitude of its z-score reaches a threshold.
//!
//! The z-score of `x` is `(x - mean) / std`, where `std` is the population standard deviation
//! (no degrees-of-freedom correction). Rows with a missing value in the column are dropped in
//! both modes since their z-score is undefined.
//! Errors are returned as `SommelierError` and results are wrapped in `SommelierResult`.

use crate::exceptions::{SommelierError, SommelierResult};
use crate::impl_transformer;
use crate::settings::DEFAULT_OUTLIER_Z;
use crate::transformers::imputation::validate_columns;
use datafusion::functions_aggregate::expr_fn::{avg, count, stddev_pop};
use datafusion::prelude::*;
use datafusion::scalar::ScalarValue;
use datafusion_expr::{col, lit, Expr};
use datafusion_functions::math;
use tracing::debug;

/// Which side of the threshold a [`ZScoreOutlierFilter`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlierMode {
    /// Keep rows with `|z| < threshold`.
    Inliers,
    /// Keep rows with `|z| >= threshold`.
    Outliers,
}

/// Column statistics learned by [`ZScoreOutlierFilter::fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnMoments {
    pub mean: f64,
    pub std_dev: f64,
    pub count: i64,
}

/// Filters rows by the z-score of a numeric column.
pub struct ZScoreOutlierFilter {
    pub column: String,
    pub threshold: f64,
    pub mode: OutlierMode,
    pub moments: Option<ColumnMoments>,
}

impl ZScoreOutlierFilter {
    pub fn new(column: impl Into<String>, threshold: f64, mode: OutlierMode) -> Self {
        Self {
            column: column.into(),
            threshold,
            mode,
            moments: None,
        }
    }

    /// Keeps rows whose z-score magnitude is below the default threshold of 3.
    pub fn inliers(column: impl Into<String>) -> Self {
        Self::new(column, DEFAULT_OUTLIER_Z, OutlierMode::Inliers)
    }

    /// Keeps rows whose z-score magnitude is at least the default threshold of 3.
    pub fn outliers(column: impl Into<String>) -> Self {
        Self::new(column, DEFAULT_OUTLIER_Z, OutlierMode::Outliers)
    }

    fn validate_threshold(&self) -> SommelierResult<()> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(SommelierError::InvalidParameter(format!(
                "z-score threshold {} must be a positive finite number",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Computes the mean and population standard deviation of the column.
    pub async fn fit(&mut self, df: &DataFrame) -> SommelierResult<()> {
        self.validate_threshold()?;
        validate_columns(df, &[self.column.clone()])?;
        let batches = df
            .clone()
            .aggregate(
                vec![],
                vec![
                    avg(col(&self.column)).alias("mean"),
                    stddev_pop(col(&self.column)).alias("std_dev"),
                    count(col(&self.column)).alias("count"),
                ],
            )?
            .collect()
            .await?;
        let batch = batches.first().ok_or_else(|| {
            SommelierError::InvalidParameter(format!(
                "No data found when computing z-scores for column {}",
                self.column
            ))
        })?;

        let mean = ScalarValue::try_from_array(batch.column(0), 0)?;
        let std_dev = ScalarValue::try_from_array(batch.column(1), 0)?;
        let count = ScalarValue::try_from_array(batch.column(2), 0)?;
        match (mean, std_dev, count) {
            (
                ScalarValue::Float64(Some(mean)),
                ScalarValue::Float64(Some(std_dev)),
                ScalarValue::Int64(Some(count)),
            ) if count > 0 => {
                debug!(
                    column = self.column.as_str(),
                    mean, std_dev, count, "Computed z-score moments"
                );
                self.moments = Some(ColumnMoments {
                    mean,
                    std_dev,
                    count,
                });
                Ok(())
            }
            _ => Err(SommelierError::InvalidParameter(format!(
                "Column {} has no values to compute z-scores from",
                self.column
            ))),
        }
    }

    /// The absolute z-score expression of the column under the fitted moments.
    fn abs_z_expr(&self, moments: &ColumnMoments) -> Expr {
        let z = (col(&self.column) - lit(moments.mean)) / lit(moments.std_dev);
        math::abs().call(vec![z])
    }

    /// Returns a new DataFrame holding only the rows on the requested side of the threshold.
    pub fn transform(&self, df: DataFrame) -> SommelierResult<DataFrame> {
        let moments = self.moments.as_ref().ok_or(SommelierError::FitNotCalled)?;
        validate_columns(&df, &[self.column.clone()])?;

        // A constant column has z = 0 everywhere.
        let predicate = if moments.std_dev == 0.0 {
            match self.mode {
                OutlierMode::Inliers => col(&self.column).is_not_null(),
                OutlierMode::Outliers => lit(false),
            }
        } else {
            let abs_z = self.abs_z_expr(moments);
            match self.mode {
                OutlierMode::Inliers => abs_z.lt(lit(self.threshold)),
                OutlierMode::Outliers => abs_z.gt_eq(lit(self.threshold)),
            }
        };
        df.filter(predicate).map_err(SommelierError::from)
    }

    fn inherent_is_stateful(&self) -> bool {
        true
    }
}

impl_transformer!(ZScoreOutlierFilter);
