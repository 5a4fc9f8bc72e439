//! ## Review columns in DataFrames
//!
//! - [`ReviewTextCleaner`]: a pipeline step writing the normalized form of a text column.
//! - [`collect_text_column`]: materializes a text column for tokenization and embedding.

use crate::exceptions::{SommelierError, SommelierResult};
use crate::impl_transformer;
use crate::text::normalize::ReviewPreprocessor;
use crate::transformers::imputation::validate_columns;
use arrow::array::{Array, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use datafusion::error::Result as DFResult;
use datafusion::logical_expr::{create_udf, ColumnarValue, ScalarUDF, Volatility};
use datafusion::prelude::*;
use datafusion_expr::{col, Expr};
use std::sync::Arc;
use tracing::debug;

/// Wraps a [`ReviewPreprocessor`] as a scalar function over Utf8 values.
fn normalize_udf(preprocessor: Arc<ReviewPreprocessor>) -> ScalarUDF {
    create_udf(
        "normalize_review",
        vec![DataType::Utf8],
        DataType::Utf8,
        Volatility::Immutable,
        Arc::new(move |args: &[ColumnarValue]| -> DFResult<ColumnarValue> {
            let arrays = ColumnarValue::values_to_arrays(args)?;
            let input = cast(&arrays[0], &DataType::Utf8)?;
            let normalized: StringArray = input
                .as_string::<i32>()
                .iter()
                .map(|text| text.map(|t| preprocessor.normalize(t)))
                .collect();
            Ok(ColumnarValue::Array(Arc::new(normalized)))
        }),
    )
}

/// Writes the normalized text of `column` into `output_column`. Nulls stay null.
pub struct ReviewTextCleaner {
    pub column: String,
    pub output_column: String,
    preprocessor: Arc<ReviewPreprocessor>,
}

impl ReviewTextCleaner {
    /// Cleans `column` into `<column>_clean` with the default preprocessor.
    pub fn new(column: impl Into<String>) -> Self {
        let column = column.into();
        let output_column = format!("{}_clean", column);
        Self {
            column,
            output_column,
            preprocessor: Arc::new(ReviewPreprocessor::new()),
        }
    }

    /// Writes into `output_column` instead; using the input name replaces the column in place.
    pub fn with_output_column(mut self, output_column: impl Into<String>) -> Self {
        self.output_column = output_column.into();
        self
    }

    pub fn with_preprocessor(mut self, preprocessor: ReviewPreprocessor) -> Self {
        self.preprocessor = Arc::new(preprocessor);
        self
    }

    pub async fn fit(&mut self, df: &DataFrame) -> SommelierResult<()> {
        validate_columns(df, &[self.column.clone()])
    }

    pub fn transform(&self, df: DataFrame) -> SommelierResult<DataFrame> {
        validate_columns(&df, &[self.column.clone()])?;
        if self.output_column.trim().is_empty() {
            return Err(SommelierError::InvalidParameter(
                "ReviewTextCleaner: output column name cannot be empty".to_string(),
            ));
        }
        let cleaned = normalize_udf(self.preprocessor.clone())
            .call(vec![col(&self.column)])
            .alias(&self.output_column);

        let mut replaced = false;
        let mut exprs: Vec<Expr> = df
            .schema()
            .fields()
            .iter()
            .map(|field| {
                if field.name() == &self.output_column {
                    replaced = true;
                    cleaned.clone()
                } else {
                    col(field.name())
                }
            })
            .collect();
        if !replaced {
            exprs.push(cleaned);
        }
        debug!(
            column = self.column.as_str(),
            output = self.output_column.as_str(),
            "Normalizing review text"
        );
        df.select(exprs).map_err(SommelierError::from)
    }

    fn inherent_is_stateful(&self) -> bool {
        false
    }
}

impl_transformer!(ReviewTextCleaner);

/// Collects a text column into memory, one entry per row.
pub async fn collect_text_column(
    df: DataFrame,
    column: &str,
) -> SommelierResult<Vec<Option<String>>> {
    validate_columns(&df, &[column.to_string()])?;
    let batches = df.select(vec![col(column)])?.collect().await?;
    let mut values = Vec::new();
    for batch in batches {
        let array = cast(batch.column(0), &DataType::Utf8)?;
        let strings = array.as_string::<i32>();
        for i in 0..strings.len() {
            if strings.is_null(i) {
                values.push(None);
            } else {
                values.push(Some(strings.value(i).to_string()));
            }
        }
    }
    Ok(values)
}
