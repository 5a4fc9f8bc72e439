use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::memory::MemTable;
use datafusion::prelude::*;

use sommelier::exceptions::{SommelierError, SommelierResult};
use sommelier::text::cleaner::{collect_text_column, ReviewTextCleaner};
use sommelier::text::normalize::ReviewPreprocessor;

async fn create_df() -> DataFrame {
    let schema = Arc::new(Schema::new(vec![Field::new(
        "description",
        DataType::Utf8,
        true,
    )]));
    let array: ArrayRef = Arc::new(StringArray::from(vec![
        Some("Tart and snappy, the flavors of lime flesh and rind dominate."),
        None,
        Some("It is what it is."),
    ]));
    let batch = RecordBatch::try_new(schema.clone(), vec![array]).unwrap();
    let mem_table = MemTable::try_new(schema, vec![vec![batch]]).unwrap();
    let ctx = SessionContext::new();
    ctx.register_table("reviews", Arc::new(mem_table)).unwrap();
    ctx.table("reviews").await.unwrap()
}

#[tokio::test]
async fn test_cleaner_appends_normalized_column() -> SommelierResult<()> {
    let df = ReviewTextCleaner::new("description").transform(create_df().await)?;
    let names: Vec<String> = df
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    assert_eq!(names, vec!["description", "description_clean"]);

    let cleaned = collect_text_column(df, "description_clean").await?;
    assert_eq!(
        cleaned,
        vec![
            Some("tart snappy flavors lime flesh rind dominate".to_string()),
            None,
            Some(String::new()),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_cleaner_in_place_with_custom_preprocessor() -> SommelierResult<()> {
    let cleaner = ReviewTextCleaner::new("description")
        .with_output_column("description")
        .with_preprocessor(ReviewPreprocessor::new().with_remove_stopwords(false));
    let df = cleaner.transform(create_df().await)?;
    assert_eq!(df.schema().fields().len(), 1);

    let cleaned = collect_text_column(df, "description").await?;
    assert_eq!(cleaned[2].as_deref(), Some("it is what it is"));
    Ok(())
}

#[tokio::test]
async fn test_collect_text_column_preserves_nulls() -> SommelierResult<()> {
    let values = collect_text_column(create_df().await, "description").await?;
    assert_eq!(values.len(), 3);
    assert!(values[1].is_none());
    assert_eq!(values.iter().filter(|v| v.is_some()).count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_missing_text_column() {
    let df = create_df().await;
    assert!(matches!(
        ReviewTextCleaner::new("review").transform(df),
        Err(SommelierError::MissingColumn(_))
    ));
    let df = create_df().await;
    assert!(matches!(
        collect_text_column(df, "review").await,
        Err(SommelierError::MissingColumn(_))
    ));
}

#[tokio::test]
async fn test_null_count_is_unchanged() -> SommelierResult<()> {
    let df = ReviewTextCleaner::new("description").transform(create_df().await)?;
    let batches = df.collect().await?;
    let cleaned = batches[0].column(1);
    assert_eq!(cleaned.null_count(), 1);
    Ok(())
}
