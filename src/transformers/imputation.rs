//! ## Transformers for missing values
//!
//! Currently, the following transformers are implemented:
//!
//! - **DropMissingData**: Filters out rows that contain a missing value in the specified columns.
//! - **CategoricalImputer**: Replaces missing strings with a fixed fill value (e.g. `"None"`).
//! - **GroupMeanImputer**: Replaces missing numbers with the mean of the row's group
//!   (e.g. a missing price with the mean price of the wine's country).
//!
//! Each transformer returns a new DataFrame with the imputation applied to the specified columns.
//! Errors are returned as `SommelierError` and results are wrapped in `SommelierResult`.

use crate::exceptions::{SommelierError, SommelierResult};
use crate::impl_transformer;
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use datafusion::functions_aggregate::expr_fn::avg;
use datafusion::logical_expr::{col, lit, not, Case as DFCase, Expr};
use datafusion::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Validates that every column in `target_cols` exists in the DataFrame.
/// Returns an error if any target column is missing.
pub(crate) fn validate_columns(df: &DataFrame, target_cols: &[String]) -> SommelierResult<()> {
    let schema = df.schema();
    for col_name in target_cols {
        if schema.field_with_name(None, col_name).is_err() {
            return Err(SommelierError::MissingColumn(format!(
                "Column '{}' not found in DataFrame",
                col_name
            )));
        }
    }
    Ok(())
}

/// Constructs an expression equivalent to SQL COALESCE(col, fallback) as a CASE expression.
fn coalesce_expr_for(name: &str, fallback: Expr) -> Expr {
    Expr::Case(DFCase {
        expr: None,
        when_then_expr: vec![(Box::new(not(col(name).is_null())), Box::new(col(name)))],
        else_expr: Some(Box::new(fallback)),
    })
}

/// Replaces every column named in `target_cols` (for which `get_fallback` yields an expression)
/// with its null-coalesced version; other columns pass through.
fn apply_imputation<F>(
    df: DataFrame,
    target_cols: &[String],
    get_fallback: F,
) -> SommelierResult<DataFrame>
where
    F: Fn(&str) -> Option<Expr>,
{
    let exprs: Vec<Expr> = df
        .schema()
        .fields()
        .iter()
        .map(|field| {
            let name = field.name();
            match get_fallback(name) {
                Some(fallback_expr) if target_cols.contains(name) => {
                    coalesce_expr_for(name, fallback_expr).alias(name)
                }
                _ => col(name),
            }
        })
        .collect();
    df.select(exprs).map_err(SommelierError::from)
}

/// Removes rows that contain a missing value in the given columns.
pub struct DropMissingData {
    /// Optional list of column names to check for missing values.
    /// If None, all columns in the DataFrame are checked.
    pub columns: Option<Vec<String>>,
}

impl DropMissingData {
    /// Create a new drop-missing-data transformer that checks all columns.
    pub fn new() -> Self {
        Self { columns: None }
    }

    /// Create a new drop-missing-data transformer that checks only the specified columns.
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns: Some(columns),
        }
    }

    pub async fn fit(&mut self, df: &DataFrame) -> SommelierResult<()> {
        if let Some(cols) = &self.columns {
            validate_columns(df, cols)?;
        }
        Ok(())
    }

    /// Returns a new DataFrame that excludes rows with any missing values in the given columns.
    pub fn transform(&self, df: DataFrame) -> SommelierResult<DataFrame> {
        let target_columns = match &self.columns {
            Some(cols) => {
                validate_columns(&df, cols)?;
                cols.clone()
            }
            None => df
                .schema()
                .fields()
                .iter()
                .map(|f| f.name().to_string())
                .collect(),
        };

        let combined = target_columns
            .iter()
            .map(|col_name| col(col_name).is_not_null())
            .reduce(|acc, expr| acc.and(expr));
        match combined {
            Some(predicate) => df.filter(predicate).map_err(SommelierError::from),
            None => Ok(df),
        }
    }

    fn inherent_is_stateful(&self) -> bool {
        false
    }
}

impl Default for DropMissingData {
    fn default() -> Self {
        Self::new()
    }
}

/// Replaces missing values in string columns with a fixed fill value.
pub struct CategoricalImputer {
    pub columns: Vec<String>,
    pub fill_value: String,
}

impl CategoricalImputer {
    pub fn new(columns: Vec<String>, fill_value: impl Into<String>) -> Self {
        Self {
            columns,
            fill_value: fill_value.into(),
        }
    }

    /// This transformer is stateless; fit only checks that the columns exist.
    pub async fn fit(&mut self, df: &DataFrame) -> SommelierResult<()> {
        validate_columns(df, &self.columns)
    }

    /// Returns a new DataFrame where missing values in the target columns are the fill value.
    pub fn transform(&self, df: DataFrame) -> SommelierResult<DataFrame> {
        validate_columns(&df, &self.columns)?;
        apply_imputation(df, &self.columns, |_| Some(lit(self.fill_value.clone())))
    }

    fn inherent_is_stateful(&self) -> bool {
        false
    }
}

/// Replaces missing values in a numeric column with the mean of that column within the row's group.
///
/// Rows whose group is null, or whose group has no non-null values to average, keep the null.
pub struct GroupMeanImputer {
    pub group_column: String,
    pub value_column: String,
    pub group_means: BTreeMap<String, f64>,
    fitted: bool,
}

impl GroupMeanImputer {
    pub fn new(group_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            group_column: group_column.into(),
            value_column: value_column.into(),
            group_means: BTreeMap::new(),
            fitted: false,
        }
    }

    /// Computes the mean of the value column for every distinct group.
    pub async fn fit(&mut self, df: &DataFrame) -> SommelierResult<()> {
        validate_columns(
            df,
            &[self.group_column.clone(), self.value_column.clone()],
        )?;
        let batches = df
            .clone()
            .aggregate(
                vec![col(&self.group_column)],
                vec![avg(col(&self.value_column)).alias("group_mean")],
            )?
            .collect()
            .await?;

        self.group_means.clear();
        for batch in batches {
            let groups = cast(batch.column(0), &DataType::Utf8)?;
            let groups = groups.as_string::<i32>();
            let means = cast(batch.column(1), &DataType::Float64)?;
            let means = means.as_primitive::<Float64Type>();
            for i in 0..batch.num_rows() {
                if groups.is_null(i) || means.is_null(i) {
                    continue;
                }
                self.group_means
                    .insert(groups.value(i).to_string(), means.value(i));
            }
        }
        debug!(
            group = self.group_column.as_str(),
            value = self.value_column.as_str(),
            groups = self.group_means.len(),
            "Computed group means"
        );
        self.fitted = true;
        Ok(())
    }

    /// Returns a new DataFrame where missing values are replaced with their group's mean.
    pub fn transform(&self, df: DataFrame) -> SommelierResult<DataFrame> {
        if !self.fitted {
            return Err(SommelierError::FitNotCalled);
        }
        validate_columns(
            &df,
            &[self.group_column.clone(), self.value_column.clone()],
        )?;
        if self.group_means.is_empty() {
            return Ok(df);
        }
        let when_then_expr: Vec<(Box<Expr>, Box<Expr>)> = self
            .group_means
            .iter()
            .map(|(group, mean)| {
                (
                    Box::new(col(&self.group_column).eq(lit(group.clone()))),
                    Box::new(lit(*mean)),
                )
            })
            .collect();
        let group_mean = Expr::Case(DFCase {
            expr: None,
            when_then_expr,
            else_expr: None,
        });
        apply_imputation(df, &[self.value_column.clone()], |_| {
            Some(group_mean.clone())
        })
    }

    fn inherent_is_stateful(&self) -> bool {
        true
    }
}

impl_transformer!(DropMissingData);
impl_transformer!(CategoricalImputer);
impl_transformer!(GroupMeanImputer);
