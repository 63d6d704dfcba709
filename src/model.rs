//! The terminal evaluation result and its shape rules.

use crate::error::ShapeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

pub const CATEGORY_COUNT: usize = 6;
pub const MIN_TIPS: usize = 3;
pub const MAX_TIPS: usize = 4;
pub const MAX_OVERALL_SCORE: u32 = 100;
pub const MAX_CATEGORY_SCORE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub overall_score: u32,
    pub summary: String,
    /// Order matters: the first category is the default focal selection.
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub score: f64,
    pub label: String,
    pub tips: Vec<Tip>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub text: String,
    /// Must be present on the wire; `null` when not applicable.
    #[serde(deserialize_with = "present_or_null")]
    pub code_snippet: Option<String>,
}

// Unlike a plain `Option` field, a field using `deserialize_with` is required.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl EvaluationResult {
    /// Check the counts, ranges and non-empty text the producer promises.
    pub fn validate(&self) -> Result<(), ShapeError> {
        if self.overall_score > MAX_OVERALL_SCORE {
            return Err(ShapeError::OverallScoreOutOfRange(self.overall_score));
        }
        if is_blank(&self.summary) {
            return Err(ShapeError::BlankSummary);
        }
        if self.categories.len() != CATEGORY_COUNT {
            return Err(ShapeError::CategoryCount {
                expected: CATEGORY_COUNT,
                actual: self.categories.len(),
            });
        }
        let mut seen = HashSet::new();
        for (index, category) in self.categories.iter().enumerate() {
            category.validate(index)?;
            if !seen.insert(category.name.as_str()) {
                return Err(ShapeError::DuplicateCategoryName(category.name.clone()));
            }
        }
        Ok(())
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }
}

impl Category {
    fn validate(&self, index: usize) -> Result<(), ShapeError> {
        if is_blank(&self.name) {
            return Err(ShapeError::BlankCategoryName(index + 1));
        }
        if !(0.0..=MAX_CATEGORY_SCORE).contains(&self.score) {
            return Err(ShapeError::CategoryScoreOutOfRange {
                name: self.name.clone(),
                score: self.score,
            });
        }
        if is_blank(&self.label) {
            return Err(ShapeError::BlankLabel(self.name.clone()));
        }
        if !(MIN_TIPS..=MAX_TIPS).contains(&self.tips.len()) {
            return Err(ShapeError::TipCount {
                name: self.name.clone(),
                count: self.tips.len(),
            });
        }
        if let Some(index) = self.tips.iter().position(|t| is_blank(&t.text)) {
            return Err(ShapeError::BlankTipText {
                name: self.name.clone(),
                index: index + 1,
            });
        }
        Ok(())
    }
}
