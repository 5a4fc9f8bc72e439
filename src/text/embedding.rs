//! ## Word-vector sequence embedding
//!
//! [`WordVectors`] holds a pretrained embedding table read from the word2vec text format:
//!
//! ```text
//! 3 4                   <- optional header: vocabulary size and dimension
//! crisp 0.1 0.2 0.3 0.4
//! tannic 0.5 0.1 0.0 0.2
//! oak 0.3 0.3 0.1 0.9
//! ```
//!
//! GloVe files (same layout without the header) are read as well.
//!
//! [`SequenceEmbedder`] maps a token sequence to a `(max_len, dim)` matrix: every known token
//! contributes its vector as one row, then the rows are truncated or zero-padded to exactly
//! `max_len`, at the start (`Side::Pre`) or the end (`Side::Post`) of the sequence.

use crate::exceptions::{SommelierError, SommelierResult};
use crate::settings::Settings;
use crate::text::normalize::ReviewPreprocessor;
use ndarray::{Array2, Array3, ArrayView1, Axis};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Which end of a sequence padding is added to, or truncation removes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Pre,
    Post,
}

impl FromStr for Side {
    type Err = SommelierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pre" => Ok(Side::Pre),
            "post" => Ok(Side::Post),
            other => Err(SommelierError::InvalidParameter(format!(
                "Unknown side '{}', expected 'pre' or 'post'",
                other
            ))),
        }
    }
}

/// What to do with tokens that have no pretrained vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownToken {
    /// Drop the token before padding.
    Skip,
    /// Keep the token's position as a row of zeros.
    Zero,
}

impl FromStr for UnknownToken {
    type Err = SommelierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(UnknownToken::Skip),
            "zero" => Ok(UnknownToken::Zero),
            other => Err(SommelierError::InvalidParameter(format!(
                "Unknown token policy '{}', expected 'skip' or 'zero'",
                other
            ))),
        }
    }
}

/// A pretrained word embedding table.
#[derive(Debug, Clone)]
pub struct WordVectors {
    index: HashMap<String, usize>,
    vectors: Array2<f32>,
}

impl WordVectors {
    /// Reads vectors in word2vec (or GloVe) text format.
    ///
    /// A first line of two integers is a header only when the line after it holds vectors of
    /// the declared dimension. Otherwise it is a numeric word with a one-value vector.
    pub fn from_reader<R: BufRead>(reader: R) -> SommelierResult<Self> {
        let mut lines = reader
            .lines()
            .enumerate()
            .map(|(i, line)| line.map(|line| (i + 1, line)))
            .filter(|line| line.as_ref().map_or(true, |(_, l)| !l.trim().is_empty()))
            .peekable();

        let mut table = TableBuilder::default();
        let mut expected_count: Option<usize> = None;
        if let Some((line_no, first)) = lines.next().transpose()? {
            let next_len = match lines.peek() {
                Some(Ok((_, next))) => Some(vector_len(next)),
                _ => None,
            };
            match parse_header(&first) {
                Some((count, header_dim)) if next_len.map_or(true, |len| len == header_dim) => {
                    if header_dim == 0 {
                        return Err(SommelierError::InvalidWordVectors(
                            "header declares a dimension of 0".to_string(),
                        ));
                    }
                    expected_count = Some(count);
                    table.dim = Some(header_dim);
                }
                _ => table.push(line_no, &first)?,
            }
        }
        for line in lines {
            let (line_no, line) = line?;
            table.push(line_no, &line)?;
        }

        let TableBuilder { index, values, dim } = table;
        let dim = dim.ok_or_else(|| {
            SommelierError::InvalidWordVectors("no vectors found".to_string())
        })?;
        if index.is_empty() {
            return Err(SommelierError::InvalidWordVectors(
                "no vectors found".to_string(),
            ));
        }
        if let Some(count) = expected_count {
            if count != index.len() {
                return Err(SommelierError::InvalidWordVectors(format!(
                    "header declares {} words, found {}",
                    count,
                    index.len()
                )));
            }
        }
        let vectors = Array2::from_shape_vec((index.len(), dim), values)?;
        Ok(Self { index, vectors })
    }

    /// Reads a vector file from disk.
    pub fn load(path: impl AsRef<Path>) -> SommelierResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let vectors = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            words = vectors.len(),
            dim = vectors.dim(),
            "Loaded word vectors"
        );
        Ok(vectors)
    }

    /// Builds a table from in-memory (word, vector) pairs. The first vector of a word wins.
    pub fn from_pairs<I, S>(pairs: I) -> SommelierResult<Self>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut index = HashMap::new();
        let mut values = Vec::new();
        let mut dim = None;
        for (word, vector) in pairs {
            let expected_dim = *dim.get_or_insert(vector.len());
            if vector.is_empty() || vector.len() != expected_dim {
                return Err(SommelierError::InvalidWordVectors(format!(
                    "expected vectors of {} values, found {}",
                    expected_dim,
                    vector.len()
                )));
            }
            let word: String = word.into();
            if index.contains_key(&word) {
                continue;
            }
            index.insert(word, index.len());
            values.extend(vector);
        }
        let dim = dim.ok_or_else(|| {
            SommelierError::InvalidWordVectors("no vectors found".to_string())
        })?;
        let vectors = Array2::from_shape_vec((index.len(), dim), values)?;
        Ok(Self { index, vectors })
    }

    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn get(&self, word: &str) -> Option<ArrayView1<'_, f32>> {
        self.index.get(word).map(|&row| self.vectors.row(row))
    }
}

/// Accumulates rows of a vector file.
#[derive(Default)]
struct TableBuilder {
    index: HashMap<String, usize>,
    values: Vec<f32>,
    dim: Option<usize>,
}

impl TableBuilder {
    fn push(&mut self, line_no: usize, line: &str) -> SommelierResult<()> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Ok(());
        };
        let row = parts
            .map(|v| v.parse::<f32>())
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|e| SommelierError::InvalidWordVectors(format!("line {}: {}", line_no, e)))?;
        if row.is_empty() {
            return Err(SommelierError::InvalidWordVectors(format!(
                "line {}: word '{}' has no vector",
                line_no, word
            )));
        }
        let expected_dim = *self.dim.get_or_insert(row.len());
        if row.len() != expected_dim {
            return Err(SommelierError::InvalidWordVectors(format!(
                "line {}: expected {} values, found {}",
                line_no,
                expected_dim,
                row.len()
            )));
        }
        if self.index.contains_key(word) {
            debug!(word, line_no, "Ignoring duplicate word vector");
            return Ok(());
        }
        self.index.insert(word.to_string(), self.index.len());
        self.values.extend(row);
        Ok(())
    }
}

/// Parses a `<count> <dim>` header candidate.
fn parse_header(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let count = parts.next()?.parse().ok()?;
    let dim = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some((count, dim))
}

/// Number of values after the word on a vector line.
fn vector_len(line: &str) -> usize {
    line.split_whitespace().count().saturating_sub(1)
}

/// Converts token sequences into fixed-size embedding matrices.
#[derive(Debug, Clone)]
pub struct SequenceEmbedder {
    vectors: Arc<WordVectors>,
    max_len: usize,
    padding: Side,
    truncating: Side,
    unknown: UnknownToken,
}

impl SequenceEmbedder {
    /// Creates an embedder with pre-padding, pre-truncation and unknown tokens skipped.
    pub fn new(vectors: Arc<WordVectors>, max_len: usize) -> SommelierResult<Self> {
        if max_len == 0 {
            return Err(SommelierError::InvalidParameter(
                "max_len must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            vectors,
            max_len,
            padding: Side::Pre,
            truncating: Side::Pre,
            unknown: UnknownToken::Skip,
        })
    }

    pub fn from_settings(vectors: Arc<WordVectors>, settings: &Settings) -> SommelierResult<Self> {
        Ok(Self::new(vectors, settings.max_sequence_length)?
            .with_padding(settings.padding)
            .with_truncating(settings.truncating)
            .with_unknown_tokens(settings.unknown_tokens))
    }

    pub fn with_padding(mut self, side: Side) -> Self {
        self.padding = side;
        self
    }

    pub fn with_truncating(mut self, side: Side) -> Self {
        self.truncating = side;
        self
    }

    pub fn with_unknown_tokens(mut self, policy: UnknownToken) -> Self {
        self.unknown = policy;
        self
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn dim(&self) -> usize {
        self.vectors.dim()
    }

    pub fn vectors(&self) -> &WordVectors {
        &self.vectors
    }

    /// The rows a token sequence occupies after the unknown-token policy and truncation.
    /// `None` stands for a zero row.
    fn resolve<'a, S: AsRef<str>>(&'a self, tokens: &[S]) -> Vec<Option<ArrayView1<'a, f32>>> {
        let mut rows: Vec<Option<ArrayView1<'a, f32>>> = tokens
            .iter()
            .filter_map(|token| match self.vectors.get(token.as_ref()) {
                Some(vector) => Some(Some(vector)),
                None => match self.unknown {
                    UnknownToken::Skip => None,
                    UnknownToken::Zero => Some(None),
                },
            })
            .collect();
        if rows.len() > self.max_len {
            match self.truncating {
                Side::Pre => {
                    rows.drain(..rows.len() - self.max_len);
                }
                Side::Post => rows.truncate(self.max_len),
            }
        }
        rows
    }

    /// Number of non-padding rows the sequence would occupy.
    pub fn sequence_len<S: AsRef<str>>(&self, tokens: &[S]) -> usize {
        self.resolve(tokens).len()
    }

    /// Embeds one token sequence into a `(max_len, dim)` matrix.
    pub fn embed<S: AsRef<str>>(&self, tokens: &[S]) -> Array2<f32> {
        let rows = self.resolve(tokens);
        let offset = match self.padding {
            Side::Pre => self.max_len - rows.len(),
            Side::Post => 0,
        };
        let mut matrix = Array2::zeros((self.max_len, self.dim()));
        for (i, row) in rows.iter().enumerate() {
            if let Some(vector) = row {
                matrix.row_mut(offset + i).assign(vector);
            }
        }
        matrix
    }

    /// Normalizes and embeds a raw review.
    pub fn embed_text(&self, preprocessor: &ReviewPreprocessor, text: &str) -> Array2<f32> {
        self.embed(&preprocessor.tokenize(text))
    }

    /// Embeds a batch of token sequences into a `(batch, max_len, dim)` tensor.
    pub fn embed_batch<S: AsRef<str> + Sync>(&self, batch: &[Vec<S>]) -> Array3<f32> {
        let matrices: Vec<Array2<f32>> = batch.par_iter().map(|tokens| self.embed(tokens)).collect();
        let mut out = Array3::zeros((batch.len(), self.max_len, self.dim()));
        for (i, matrix) in matrices.iter().enumerate() {
            out.index_axis_mut(Axis(0), i).assign(matrix);
        }
        out
    }
}
