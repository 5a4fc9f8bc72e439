//! ## Loading datasets
//!
//! Reads CSV or Parquet files into DataFusion DataFrames, choosing the reader by file extension.

use crate::exceptions::{SommelierError, SommelierResult};
use datafusion::prelude::*;
use datafusion_expr::{ident, Expr};
use std::path::Path;
use tracing::debug;

/// Name given to the dataset's row identifier column.
pub const ID_COLUMN: &str = "id";

/// Header names that pandas-style exports give to an unnamed index column.
const UNNAMED_INDEX_HEADERS: &[&str] = &["", "Unnamed: 0"];

/// Loads data from a given path and detects the format (CSV or Parquet) from the extension.
pub async fn load_data(path: impl AsRef<Path>) -> SommelierResult<DataFrame> {
    load_data_with_context(&SessionContext::new(), path).await
}

/// Same as [`load_data`] but reads through an existing session.
pub async fn load_data_with_context(
    ctx: &SessionContext,
    path: impl AsRef<Path>,
) -> SommelierResult<DataFrame> {
    let path = path.as_ref();
    let path_str = path.to_str().ok_or_else(|| {
        SommelierError::InvalidParameter(format!("Path {:?} is not valid UTF-8", path))
    })?;
    if !path.exists() {
        return Err(SommelierError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path_str),
        )));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    let df = match extension.as_deref() {
        Some("parquet") => ctx.read_parquet(path_str, ParquetReadOptions::default()).await?,
        // Review texts may span several lines inside quotes.
        Some("csv") => {
            ctx.read_csv(path_str, CsvReadOptions::new().newlines_in_values(true))
                .await?
        }
        _ => {
            return Err(SommelierError::UnsupportedFormat(format!(
                "{}: please provide a CSV or Parquet file",
                path_str
            )))
        }
    };
    debug!(path = path_str, columns = df.schema().fields().len(), "Loaded dataset");
    Ok(df)
}

/// Renames an unnamed leading index column to [`ID_COLUMN`].
///
/// The frame is returned unchanged when it already has an `id` column or has no unnamed column.
pub fn with_id_column(df: DataFrame) -> SommelierResult<DataFrame> {
    let names: Vec<String> = df
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    if names.iter().any(|name| name == ID_COLUMN) {
        return Ok(df);
    }
    let Some(unnamed) = names
        .iter()
        .position(|name| UNNAMED_INDEX_HEADERS.contains(&name.as_str()))
    else {
        return Ok(df);
    };

    let exprs: Vec<Expr> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i == unnamed {
                ident(name).alias(ID_COLUMN)
            } else {
                ident(name)
            }
        })
        .collect();
    df.select(exprs).map_err(SommelierError::from)
}
