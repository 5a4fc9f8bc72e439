// Cleans a Wine Enthusiast review export and embeds its reviews.
// Run with `cargo run --example clean_wine_data -- <reviews.csv> [<vectors.txt>]`

use sommelier::settings::Settings;
use sommelier::text::embedding::{SequenceEmbedder, WordVectors};
use sommelier::text::normalize::ReviewPreprocessor;
use sommelier::wine;
use std::error::Error;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let data_path = args
        .next()
        .ok_or("usage: clean_wine_data <reviews.csv> [<vectors.txt>]")?;
    let settings = Settings::from_env()?;

    let raw = wine::load_data(&data_path).await?;
    println!("Loaded {} reviews", raw.clone().count().await?);

    let mut pipeline = wine::cleaning_pipeline(settings.outlier_z);
    let cleaned = pipeline.fit_transform(&raw).await?;
    println!("{} reviews left after cleaning", cleaned.clone().count().await?);
    cleaned.clone().limit(0, Some(5))?.show().await?;

    if let Some(vectors_path) = args.next() {
        let vectors = Arc::new(WordVectors::load(vectors_path)?);
        let embedder = SequenceEmbedder::from_settings(vectors, &settings)?;
        let tensor =
            wine::embed_reviews(cleaned, &ReviewPreprocessor::new(), &embedder).await?;
        println!("Embedded reviews into a tensor of shape {:?}", tensor.shape());
    }
    Ok(())
}
