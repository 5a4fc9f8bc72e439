//! # Categorical Tagging Transformers
//!
//! - **MembershipEncoder:** Appends one Boolean column per named group of categories, true when the
//!   row's category belongs to the group. It is the manual counterpart of a one-hot encoding where
//!   the groups are known up front, such as "new world" and "old world" wine countries.

use crate::exceptions::{SommelierError, SommelierResult};
use crate::impl_transformer;
use crate::transformers::imputation::validate_columns;
use datafusion::logical_expr::Case as DFCase;
use datafusion::prelude::*;
use datafusion_expr::{col, lit, Expr};

/// Wine-producing countries classified as new world by Wine Folly.
pub const NEW_WORLD_COUNTRIES: &[&str] = &[
    "Argentina",
    "Australia",
    "Brazil",
    "Canada",
    "Chile",
    "China",
    "Egypt",
    "India",
    "Mexico",
    "New Zealand",
    "Peru",
    "South Africa",
    "US",
    "Uruguay",
];

/// Wine-producing countries classified as old world by Wine Folly (ancient world included).
pub const OLD_WORLD_COUNTRIES: &[&str] = &[
    "Armenia",
    "Austria",
    "Bosnia and Herzegovina",
    "Bulgaria",
    "Croatia",
    "Cyprus",
    "Czech Republic",
    "England",
    "France",
    "Georgia",
    "Germany",
    "Greece",
    "Hungary",
    "Israel",
    "Italy",
    "Lebanon",
    "Luxembourg",
    "Macedonia",
    "Moldova",
    "Morocco",
    "Portugal",
    "Romania",
    "Serbia",
    "Slovakia",
    "Slovenia",
    "Spain",
    "Switzerland",
    "Turkey",
    "Ukraine",
];

/// Tags rows with Boolean membership columns for fixed groups of categories.
pub struct MembershipEncoder {
    pub column: String,
    /// (output column, member categories) pairs.
    pub groups: Vec<(String, Vec<String>)>,
}

impl MembershipEncoder {
    pub fn new(column: impl Into<String>, groups: Vec<(String, Vec<String>)>) -> Self {
        Self {
            column: column.into(),
            groups,
        }
    }

    /// Tags `column` with `new_world` and `old_world` columns.
    pub fn new_old_world(column: impl Into<String>) -> Self {
        let to_owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self::new(
            column,
            vec![
                ("new_world".to_string(), to_owned(NEW_WORLD_COUNTRIES)),
                ("old_world".to_string(), to_owned(OLD_WORLD_COUNTRIES)),
            ],
        )
    }

    fn membership_expr(&self, members: &[String]) -> Expr {
        if members.is_empty() {
            return lit(false);
        }
        let list = members.iter().map(|m| lit(m.clone())).collect();
        // Nulls are not members of any group.
        Expr::Case(DFCase {
            expr: None,
            when_then_expr: vec![(
                Box::new(col(&self.column).in_list(list, false)),
                Box::new(lit(true)),
            )],
            else_expr: Some(Box::new(lit(false))),
        })
    }

    pub async fn fit(&mut self, df: &DataFrame) -> SommelierResult<()> {
        validate_columns(df, &[self.column.clone()])
    }

    /// Returns the DataFrame with one Boolean column appended per group.
    pub fn transform(&self, df: DataFrame) -> SommelierResult<DataFrame> {
        validate_columns(&df, &[self.column.clone()])?;
        let mut exprs: Vec<Expr> = df
            .schema()
            .fields()
            .iter()
            .filter(|field| !self.groups.iter().any(|(name, _)| name == field.name()))
            .map(|field| col(field.name()))
            .collect();
        for (name, members) in &self.groups {
            if name.trim().is_empty() {
                return Err(SommelierError::InvalidParameter(
                    "MembershipEncoder: output column name cannot be empty".to_string(),
                ));
            }
            exprs.push(self.membership_expr(members).alias(name));
        }
        df.select(exprs).map_err(SommelierError::from)
    }

    fn inherent_is_stateful(&self) -> bool {
        false
    }
}

impl_transformer!(MembershipEncoder);
