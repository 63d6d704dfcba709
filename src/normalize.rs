//! Coerce any decoded value into a display-safe record.
//!
//! [`normalize`] is total: partial, malformed or absent input produces a view
//! with defaults filled in, never an error. Serializing the view yields the
//! same wire shape it was read from, so normalizing twice is a no-op.

use crate::model::EvaluationResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub const PENDING_LABEL: &str = "Pending";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvaluationView {
    /// Absent means "no score yet", which is not the same as a score of 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub categories: Vec<NormalizedCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCategory {
    pub name: String,
    pub score: Number,
    pub label: String,
    pub tips: Vec<NormalizedTip>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTip {
    pub text: String,
    pub code_snippet: Option<String>,
}

impl NormalizedEvaluationView {
    pub fn category(&self, name: &str) -> Option<&NormalizedCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.overall_score.is_none() && self.summary.is_none() && self.categories.is_empty()
    }
}

impl From<&EvaluationResult> for NormalizedEvaluationView {
    fn from(result: &EvaluationResult) -> Self {
        serde_json::to_value(result)
            .map(|v| normalize(Some(&v)))
            .unwrap_or_default()
    }
}

fn non_blank(v: Option<&Value>) -> Option<&str> {
    match v {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

fn number(v: Option<&Value>) -> Option<Number> {
    match v {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    }
}

/// Normalize a decoded value (or nothing at all) into a display record.
pub fn normalize(value: Option<&Value>) -> NormalizedEvaluationView {
    let empty = Map::new();
    let obj = value.and_then(Value::as_object).unwrap_or(&empty);

    let categories = match obj.get("categories") {
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(i, entry)| normalize_category(i, entry))
            .collect(),
        _ => Vec::new(),
    };

    NormalizedEvaluationView {
        overall_score: number(obj.get("overallScore")),
        summary: non_blank(obj.get("summary")).map(str::to_string),
        categories,
    }
}

fn normalize_category(index: usize, entry: &Value) -> NormalizedCategory {
    let empty = Map::new();
    let obj = entry.as_object().unwrap_or(&empty);
    let tips = match obj.get("tips") {
        Some(Value::Array(tips)) => tips.iter().filter_map(normalize_tip).collect(),
        _ => Vec::new(),
    };
    NormalizedCategory {
        name: non_blank(obj.get("name"))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Category {}", index + 1)),
        score: number(obj.get("score")).unwrap_or_else(|| Number::from(0)),
        label: non_blank(obj.get("label"))
            .unwrap_or(PENDING_LABEL)
            .to_string(),
        tips,
    }
}

fn normalize_tip(tip: &Value) -> Option<NormalizedTip> {
    let text = non_blank(tip.get("text"))?;
    let code_snippet = match tip.get("codeSnippet") {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };
    Some(NormalizedTip {
        text: text.to_string(),
        code_snippet,
    })
}

/// The raw, non-blank name of the first category, once it has streamed in.
pub fn first_category_name(value: &Value) -> Option<&str> {
    let first = value.get("categories")?.as_array()?.first()?;
    non_blank(first.get("name"))
}
