use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::memory::MemTable;
use datafusion::prelude::*;

use sommelier::exceptions::{SommelierError, SommelierResult};
use sommelier::transformers::categorical_encoding::{
    MembershipEncoder, NEW_WORLD_COUNTRIES, OLD_WORLD_COUNTRIES,
};

async fn create_df(countries: Vec<Option<&str>>) -> DataFrame {
    let schema = Arc::new(Schema::new(vec![Field::new(
        "country",
        DataType::Utf8,
        true,
    )]));
    let array: ArrayRef = Arc::new(StringArray::from(countries));
    let batch = RecordBatch::try_new(schema.clone(), vec![array]).unwrap();
    let mem_table = MemTable::try_new(schema, vec![vec![batch]]).unwrap();
    let ctx = SessionContext::new();
    ctx.register_table("wines", Arc::new(mem_table)).unwrap();
    ctx.table("wines").await.unwrap()
}

fn bool_column(batch: &RecordBatch, name: &str) -> Vec<bool> {
    let array = batch
        .column(batch.schema().index_of(name).unwrap())
        .as_any()
        .downcast_ref::<BooleanArray>()
        .expect("Expected BooleanArray");
    assert_eq!(array.null_count(), 0, "column {} has nulls", name);
    (0..array.len()).map(|i| array.value(i)).collect()
}

#[tokio::test]
async fn test_new_old_world_tags() -> SommelierResult<()> {
    let df = create_df(vec![
        Some("US"),
        Some("France"),
        Some("Bosnia and Herzegovina"),
        Some("South Africa"),
        Some("Japan"),
        None,
    ])
    .await;

    let encoder = MembershipEncoder::new_old_world("country");
    let batches = encoder.transform(df)?.collect().await?;
    let batch = &batches[0];

    let names: Vec<String> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    assert_eq!(names, vec!["country", "new_world", "old_world"]);

    assert_eq!(
        bool_column(batch, "new_world"),
        vec![true, false, false, true, false, false]
    );
    assert_eq!(
        bool_column(batch, "old_world"),
        vec![false, true, true, false, false, false]
    );
    Ok(())
}

#[tokio::test]
async fn test_country_lists_are_disjoint() {
    assert_eq!(NEW_WORLD_COUNTRIES.len(), 14);
    assert_eq!(OLD_WORLD_COUNTRIES.len(), 29);
    assert!(NEW_WORLD_COUNTRIES
        .iter()
        .all(|c| !OLD_WORLD_COUNTRIES.contains(c)));
}

#[tokio::test]
async fn test_existing_output_column_is_replaced() -> SommelierResult<()> {
    let df = create_df(vec![Some("Chile")]).await;
    let df = MembershipEncoder::new_old_world("country").transform(df)?;
    let batches = MembershipEncoder::new_old_world("country")
        .transform(df)?
        .collect()
        .await?;
    assert_eq!(batches[0].num_columns(), 3);
    assert_eq!(bool_column(&batches[0], "new_world"), vec![true]);
    Ok(())
}

#[tokio::test]
async fn test_custom_groups() -> SommelierResult<()> {
    let df = create_df(vec![Some("Italy"), Some("Chile")]).await;
    let encoder = MembershipEncoder::new(
        "country",
        vec![
            ("andean".to_string(), vec!["Chile".to_string(), "Peru".to_string()]),
            ("empty".to_string(), vec![]),
        ],
    );
    let batches = encoder.transform(df)?.collect().await?;
    assert_eq!(bool_column(&batches[0], "andean"), vec![false, true]);
    assert_eq!(bool_column(&batches[0], "empty"), vec![false, false]);
    Ok(())
}

#[tokio::test]
async fn test_missing_country_column() {
    let df = create_df(vec![Some("US")]).await;
    let encoder = MembershipEncoder::new_old_world("nation");
    assert!(matches!(
        encoder.transform(df),
        Err(SommelierError::MissingColumn(_))
    ));
}
