//! ## Runtime Settings
//!
//! Default parameters for the cleaning and embedding steps, optionally overridden from the
//! environment:
//!
//! | Variable                        | Meaning                                   | Default |
//! |---------------------------------|-------------------------------------------|---------|
//! | `SOMMELIER_MAX_SEQUENCE_LENGTH` | rows of each review's embedding matrix    | `100`   |
//! | `SOMMELIER_OUTLIER_Z`           | z-score threshold for price outliers      | `3.0`   |
//! | `SOMMELIER_PADDING`             | where padding goes: `pre` or `post`       | `pre`   |
//! | `SOMMELIER_TRUNCATING`          | where long reviews are cut: `pre`/`post`  | `pre`   |
//! | `SOMMELIER_UNKNOWN_TOKENS`      | out-of-vocabulary tokens: `skip`/`zero`   | `skip`  |

use crate::exceptions::{SommelierError, SommelierResult};
use crate::text::embedding::{Side, UnknownToken};
use std::str::FromStr;
use tracing::debug;

pub const MAX_SEQUENCE_LENGTH_VAR: &str = "SOMMELIER_MAX_SEQUENCE_LENGTH";
pub const OUTLIER_Z_VAR: &str = "SOMMELIER_OUTLIER_Z";
pub const PADDING_VAR: &str = "SOMMELIER_PADDING";
pub const TRUNCATING_VAR: &str = "SOMMELIER_TRUNCATING";
pub const UNKNOWN_TOKENS_VAR: &str = "SOMMELIER_UNKNOWN_TOKENS";

pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 100;
pub const DEFAULT_OUTLIER_Z: f64 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub max_sequence_length: usize,
    pub outlier_z: f64,
    pub padding: Side,
    pub truncating: Side,
    pub unknown_tokens: UnknownToken,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
            outlier_z: DEFAULT_OUTLIER_Z,
            padding: Side::Pre,
            truncating: Side::Pre,
            unknown_tokens: UnknownToken::Skip,
        }
    }
}

impl Settings {
    /// Builds settings from the process environment, falling back to the defaults.
    pub fn from_env() -> SommelierResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> SommelierResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let settings = Self {
            max_sequence_length: parse_var(&lookup, MAX_SEQUENCE_LENGTH_VAR)?
                .unwrap_or(defaults.max_sequence_length),
            outlier_z: parse_var(&lookup, OUTLIER_Z_VAR)?.unwrap_or(defaults.outlier_z),
            padding: parse_var(&lookup, PADDING_VAR)?.unwrap_or(defaults.padding),
            truncating: parse_var(&lookup, TRUNCATING_VAR)?.unwrap_or(defaults.truncating),
            unknown_tokens: parse_var(&lookup, UNKNOWN_TOKENS_VAR)?
                .unwrap_or(defaults.unknown_tokens),
        };
        settings.validate()?;
        debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    /// Checks that the numeric settings are usable.
    pub fn validate(&self) -> SommelierResult<()> {
        if self.max_sequence_length == 0 {
            return Err(SommelierError::InvalidParameter(format!(
                "{} must be greater than 0",
                MAX_SEQUENCE_LENGTH_VAR
            )));
        }
        if !self.outlier_z.is_finite() || self.outlier_z <= 0.0 {
            return Err(SommelierError::InvalidParameter(format!(
                "{} must be a positive finite number, got {}",
                OUTLIER_Z_VAR, self.outlier_z
            )));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> SommelierResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            SommelierError::InvalidParameter(format!("Cannot parse {}={:?}", key, raw))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            (MAX_SEQUENCE_LENGTH_VAR, "40"),
            (OUTLIER_Z_VAR, "2.5"),
            (PADDING_VAR, "post"),
            (UNKNOWN_TOKENS_VAR, "zero"),
        ]))
        .unwrap();
        assert_eq!(settings.max_sequence_length, 40);
        assert_eq!(settings.outlier_z, 2.5);
        assert_eq!(settings.padding, Side::Post);
        assert_eq!(settings.truncating, Side::Pre);
        assert_eq!(settings.unknown_tokens, UnknownToken::Zero);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Settings::from_lookup(lookup_from(&[(MAX_SEQUENCE_LENGTH_VAR, "0")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[(OUTLIER_Z_VAR, "-1")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[(PADDING_VAR, "middle")])).is_err());
    }
}
