//! ## Wine review dataset
//!
//! Loading and cleaning of the Wine Enthusiast review dataset (one row per review with the
//! columns `country`, `description`, `designation`, `points`, `price`, `province`, `region_1`,
//! `region_2`, `taster_name`, `taster_twitter_handle`, `title`, `variety`, `winery`).
//!
//! The functions can be called one by one:
//!
//! ```rust,no_run
//! use sommelier::wine;
//!
//! # async fn run() -> sommelier::exceptions::SommelierResult<()> {
//! let df = wine::load_data("winemag-data-130k-v2.csv").await?;
//! let df = wine::clean_nan_strings(df)?;
//! let df = wine::clean_nan_values(df).await?;
//! let df = wine::ohe_new_old_world(df)?;
//! let df = wine::no_outliers(df, 3.0).await?;
//! df.show_limit(5).await?;
//! # Ok(())
//! # }
//! ```
//!
//! or as a single [`Pipeline`] built by [`cleaning_pipeline`].

use crate::exceptions::SommelierResult;
use crate::io::{self, with_id_column};
use crate::make_pipeline;
use crate::pipeline::Pipeline;
use crate::text::cleaner::collect_text_column;
use crate::text::embedding::SequenceEmbedder;
use crate::text::normalize::ReviewPreprocessor;
use crate::transformers::categorical_encoding::MembershipEncoder;
use crate::transformers::imputation::{CategoricalImputer, DropMissingData, GroupMeanImputer};
use crate::transformers::outlier_handling::{OutlierMode, ZScoreOutlierFilter};
use datafusion::prelude::*;
use ndarray::Array3;
use std::path::Path;
use tracing::info;

pub const COUNTRY: &str = "country";
pub const VARIETY: &str = "variety";
pub const PRICE: &str = "price";
pub const DESCRIPTION: &str = "description";

/// Descriptive columns whose missing values are filled rather than dropped.
pub const OPTIONAL_STRING_COLUMNS: &[&str] = &[
    "designation",
    "region_1",
    "region_2",
    "taster_name",
    "taster_twitter_handle",
];

/// Fill value for missing descriptive strings.
pub const MISSING_STRING_FILL: &str = "None";

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Loads the dataset and names its index column `id`.
pub async fn load_data(path: impl AsRef<Path>) -> SommelierResult<DataFrame> {
    with_id_column(io::load_data(path).await?)
}

/// Drops rows without a country or variety and fills the other missing descriptive strings.
pub fn clean_nan_strings(df: DataFrame) -> SommelierResult<DataFrame> {
    let df = DropMissingData::with_columns(owned(&[COUNTRY, VARIETY])).transform(df)?;
    CategoricalImputer::new(owned(OPTIONAL_STRING_COLUMNS), MISSING_STRING_FILL).transform(df)
}

/// Replaces missing prices with the mean price of the wine's country, then drops every row
/// that still has a missing value.
pub async fn clean_nan_values(df: DataFrame) -> SommelierResult<DataFrame> {
    let mut imputer = GroupMeanImputer::new(COUNTRY, PRICE);
    imputer.fit(&df).await?;
    let df = imputer.transform(df)?;
    DropMissingData::new().transform(df)
}

/// Adds the `new_world` and `old_world` Boolean columns.
pub fn ohe_new_old_world(df: DataFrame) -> SommelierResult<DataFrame> {
    MembershipEncoder::new_old_world(COUNTRY).transform(df)
}

async fn filter_price(df: DataFrame, z: f64, mode: OutlierMode) -> SommelierResult<DataFrame> {
    let mut filter = ZScoreOutlierFilter::new(PRICE, z, mode);
    filter.fit(&df).await?;
    filter.transform(df)
}

/// Keeps the rows whose price z-score magnitude is below `z`.
pub async fn no_outliers(df: DataFrame, z: f64) -> SommelierResult<DataFrame> {
    filter_price(df, z, OutlierMode::Inliers).await
}

/// Keeps only the rows whose price z-score magnitude is at least `z`.
pub async fn outliers_only(df: DataFrame, z: f64) -> SommelierResult<DataFrame> {
    filter_price(df, z, OutlierMode::Outliers).await
}

/// The full cleaning sequence as a pipeline, ending with price outlier removal at threshold `z`.
pub fn cleaning_pipeline(z: f64) -> Pipeline {
    make_pipeline!(
        false,
        (
            "drop_missing_keys",
            DropMissingData::with_columns(owned(&[COUNTRY, VARIETY]))
        ),
        (
            "fill_missing_strings",
            CategoricalImputer::new(owned(OPTIONAL_STRING_COLUMNS), MISSING_STRING_FILL)
        ),
        ("impute_price", GroupMeanImputer::new(COUNTRY, PRICE)),
        ("drop_missing", DropMissingData::new()),
        ("tag_world", MembershipEncoder::new_old_world(COUNTRY)),
        (
            "drop_price_outliers",
            ZScoreOutlierFilter::new(PRICE, z, OutlierMode::Inliers)
        ),
    )
}

/// Tokenizes every review in the `description` column. Missing reviews give no tokens.
pub async fn review_tokens(
    df: DataFrame,
    preprocessor: &ReviewPreprocessor,
) -> SommelierResult<Vec<Vec<String>>> {
    let reviews = collect_text_column(df, DESCRIPTION).await?;
    Ok(reviews
        .iter()
        .map(|review| {
            review
                .as_deref()
                .map(|text| preprocessor.tokenize(text))
                .unwrap_or_default()
        })
        .collect())
}

/// Embeds every review in the `description` column into a `(rows, max_len, dim)` tensor.
pub async fn embed_reviews(
    df: DataFrame,
    preprocessor: &ReviewPreprocessor,
    embedder: &SequenceEmbedder,
) -> SommelierResult<Array3<f32>> {
    let tokens = review_tokens(df, preprocessor).await?;
    info!(reviews = tokens.len(), max_len = embedder.max_len(), "Embedding reviews");
    Ok(embedder.embed_batch(&tokens))
}
