//! ## Score prediction
//!
//! The pretrained sequence model is supplied by the caller through the [`ScoreModel`] trait.
//! [`Sommelier`] runs a review through normalization and embedding and hands the resulting
//! `(batch, max_len, dim)` tensor to the model. Models predict the points awarded to a wine and
//! may also predict its price.

use crate::exceptions::{SommelierError, SommelierResult};
use crate::text::embedding::SequenceEmbedder;
use crate::text::normalize::ReviewPreprocessor;
use ndarray::ArrayView3;
use tracing::debug;

/// Model output for one review.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub points: f32,
    /// `None` for models that only predict points.
    pub price: Option<f32>,
}

impl Score {
    pub fn points(points: f32) -> Self {
        Self {
            points,
            price: None,
        }
    }

    pub fn with_price(points: f32, price: f32) -> Self {
        Self {
            points,
            price: Some(price),
        }
    }
}

/// A model that scores a batch of embedded reviews, one score per review.
pub trait ScoreModel {
    fn predict(&self, batch: ArrayView3<'_, f32>) -> SommelierResult<Vec<Score>>;
}

/// Result of scoring one review.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Predicted critic score.
    pub points: f32,
    /// Predicted bottle price, when the model provides one.
    pub price: Option<f32>,
    /// Number of tokens that made it into the embedding matrix (excludes padding).
    pub tokens_used: usize,
}

pub struct Sommelier<M: ScoreModel> {
    preprocessor: ReviewPreprocessor,
    embedder: SequenceEmbedder,
    model: M,
}

impl<M: ScoreModel> Sommelier<M> {
    pub fn new(preprocessor: ReviewPreprocessor, embedder: SequenceEmbedder, model: M) -> Self {
        Self {
            preprocessor,
            embedder,
            model,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Scores a single review.
    pub fn predict_review(&self, review: &str) -> SommelierResult<Prediction> {
        let mut predictions = self.predict_reviews(&[review])?;
        predictions.pop().ok_or_else(|| {
            SommelierError::InvalidParameter("Model returned no prediction".to_string())
        })
    }

    /// Scores a batch of reviews in one model call.
    pub fn predict_reviews(&self, reviews: &[&str]) -> SommelierResult<Vec<Prediction>> {
        if let Some(pos) = reviews.iter().position(|r| r.trim().is_empty()) {
            return Err(SommelierError::InvalidParameter(format!(
                "Review {} is empty",
                pos
            )));
        }
        let tokens: Vec<Vec<String>> = reviews
            .iter()
            .map(|review| self.preprocessor.tokenize(review))
            .collect();
        let batch = self.embedder.embed_batch(&tokens);
        let scores = self.model.predict(batch.view())?;
        if scores.len() != reviews.len() {
            return Err(SommelierError::InvalidParameter(format!(
                "Model returned {} scores for {} reviews",
                scores.len(),
                reviews.len()
            )));
        }
        debug!(reviews = reviews.len(), "Scored reviews");
        Ok(scores
            .into_iter()
            .zip(tokens.iter())
            .map(|(score, tokens)| Prediction {
                points: score.points,
                price: score.price,
                tokens_used: self.embedder.sequence_len(tokens),
            })
            .collect())
    }
}
