use std::sync::Arc;

use approx::assert_relative_eq;
use ndarray::{ArrayView3, Axis};

use sommelier::exceptions::{SommelierError, SommelierResult};
use sommelier::model::{Score, ScoreModel, Sommelier};
use sommelier::text::embedding::{SequenceEmbedder, WordVectors};
use sommelier::text::normalize::ReviewPreprocessor;

/// Scores a review as 80 plus the sum of its first embedding dimension.
struct SumModel;

impl ScoreModel for SumModel {
    fn predict(&self, batch: ArrayView3<'_, f32>) -> SommelierResult<Vec<Score>> {
        Ok(batch
            .axis_iter(Axis(0))
            .map(|review| Score::points(80.0 + review.column(0).sum()))
            .collect())
    }
}

/// Predicts points like `SumModel` and a price of 10 per scored point above 80.
struct PointsAndPriceModel;

impl ScoreModel for PointsAndPriceModel {
    fn predict(&self, batch: ArrayView3<'_, f32>) -> SommelierResult<Vec<Score>> {
        Ok(batch
            .axis_iter(Axis(0))
            .map(|review| {
                let sum = review.column(0).sum();
                Score::with_price(80.0 + sum, 10.0 * sum)
            })
            .collect())
    }
}

/// Returns a single points and price score regardless of the batch size.
struct BrokenModel;

impl ScoreModel for BrokenModel {
    fn predict(&self, _batch: ArrayView3<'_, f32>) -> SommelierResult<Vec<Score>> {
        Ok(vec![Score::with_price(90.0, 25.0)])
    }
}

fn embedder() -> SequenceEmbedder {
    let vectors = WordVectors::from_pairs(vec![
        ("elegant", vec![4.0, 0.0]),
        ("balanced", vec![3.0, 0.0]),
        ("flabby", vec![-5.0, 0.0]),
    ])
    .unwrap();
    SequenceEmbedder::new(Arc::new(vectors), 4).unwrap()
}

#[test]
fn test_predict_review() -> SommelierResult<()> {
    let sommelier = Sommelier::new(ReviewPreprocessor::new(), embedder(), SumModel);
    let prediction = sommelier.predict_review("An elegant, balanced Riesling.")?;
    assert_relative_eq!(prediction.points, 87.0);
    assert_eq!(prediction.tokens_used, 2);
    assert_eq!(prediction.price, None);
    Ok(())
}

#[test]
fn test_predict_points_and_price() -> SommelierResult<()> {
    let sommelier = Sommelier::new(ReviewPreprocessor::new(), embedder(), PointsAndPriceModel);
    let predictions = sommelier.predict_reviews(&["An elegant, balanced Riesling.", "Elegant!"])?;
    assert_eq!(predictions.len(), 2);
    assert_relative_eq!(predictions[0].points, 87.0);
    assert_relative_eq!(predictions[0].price.unwrap(), 70.0);
    assert_relative_eq!(predictions[1].points, 84.0);
    assert_relative_eq!(predictions[1].price.unwrap(), 40.0);
    Ok(())
}

#[test]
fn test_predict_reviews_keeps_order() -> SommelierResult<()> {
    let sommelier = Sommelier::new(ReviewPreprocessor::new(), embedder(), SumModel);
    let predictions = sommelier.predict_reviews(&["Flabby and dull.", "Elegant!", "Nothing known"])?;
    let points: Vec<f32> = predictions.iter().map(|p| p.points).collect();
    assert_eq!(points, vec![75.0, 84.0, 80.0]);
    assert_eq!(predictions[2].tokens_used, 0);
    Ok(())
}

#[test]
fn test_empty_review_rejected() {
    let sommelier = Sommelier::new(ReviewPreprocessor::new(), embedder(), SumModel);
    assert!(matches!(
        sommelier.predict_review("   "),
        Err(SommelierError::InvalidParameter(_))
    ));
}

#[test]
fn test_score_count_mismatch() {
    let sommelier = Sommelier::new(ReviewPreprocessor::new(), embedder(), BrokenModel);
    assert!(matches!(
        sommelier.predict_reviews(&["elegant", "balanced"]),
        Err(SommelierError::InvalidParameter(_))
    ));
    let prediction = sommelier.predict_review("elegant").unwrap();
    assert_eq!(prediction.price, Some(25.0));
}

