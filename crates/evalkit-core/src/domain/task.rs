//! Task definitions and their load-time schema.
//!
//! Task documents are deserialized into the loose [`TaskDocument`] shape
//! first, then checked field by field into a [`Task`]. Nothing unchecked
//! reaches scoring.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// A single weighted acceptance check belonging to a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Criterion {
    pub id: String,
    pub description: String,
    /// Share of the task's maximum score. Always finite and > 0.
    pub weight: f64,
    /// Shell command; `None` marks a manual criterion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
}

impl Criterion {
    /// Whether this criterion needs a human to judge it.
    pub fn is_manual(&self) -> bool {
        self.check.is_none()
    }
}

/// Pass threshold plus the ordered criteria of a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcceptanceSpec {
    /// Minimum score (0–100) for the task to pass.
    pub min_passing_score: u8,
    /// Never empty.
    pub criteria: Vec<Criterion>,
}

impl AcceptanceSpec {
    pub fn total_weight(&self) -> f64 {
        self.criteria.iter().map(|c| c.weight).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskInput {
    pub prompt: String,
}

/// A validated evaluation task, immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub category: String,
    pub input: TaskInput,
    pub acceptance: AcceptanceSpec,
}

impl Task {
    /// First `max_chars` characters of the prompt, for log lines.
    pub fn prompt_preview(&self, max_chars: usize) -> String {
        let prompt = &self.input.prompt;
        match prompt.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}...", &prompt[..idx]),
            None => prompt.clone(),
        }
    }

    /// Check a raw document and build a task from it.
    ///
    /// `path` is only used to label the error.
    pub fn from_document(path: &Path, doc: TaskDocument) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::new(path, reason);

        let id = required_text(doc.id, "id").map_err(invalid)?;
        let category = required_text(doc.category, "category").map_err(invalid)?;
        let prompt = doc
            .input
            .and_then(|input| input.prompt)
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| invalid("missing field `input.prompt`".to_string()))?;

        let acceptance = doc
            .acceptance
            .ok_or_else(|| invalid("missing field `acceptance`".to_string()))?;

        let min_passing_score = match acceptance.min_passing_score {
            None => return Err(invalid("missing field `acceptance.min_passing_score`".into())),
            Some(score) if !(0..=100).contains(&score) => {
                return Err(invalid(format!(
                    "acceptance.min_passing_score must be within 0..=100, got {score}"
                )))
            }
            Some(score) => score as u8,
        };

        if acceptance.criteria.is_empty() {
            return Err(invalid("acceptance.criteria must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        let mut criteria = Vec::with_capacity(acceptance.criteria.len());
        for (idx, raw) in acceptance.criteria.into_iter().enumerate() {
            let criterion_id = required_text(raw.id, &format!("acceptance.criteria[{idx}].id"))
                .map_err(invalid)?;
            if !seen.insert(criterion_id.clone()) {
                return Err(invalid(format!("duplicate criterion id `{criterion_id}`")));
            }

            let weight = raw.weight.ok_or_else(|| {
                invalid(format!("criterion `{criterion_id}` is missing `weight`"))
            })?;
            if !weight.is_finite() || weight <= 0.0 {
                return Err(invalid(format!(
                    "criterion `{criterion_id}` weight must be a positive number, got {weight}"
                )));
            }

            let description = required_text(
                raw.description,
                &format!("acceptance.criteria[{idx}].description"),
            )
            .map_err(invalid)?;

            criteria.push(Criterion {
                id: criterion_id,
                description,
                weight,
                check: raw.check.filter(|c| !c.trim().is_empty()),
            });
        }

        let total_weight: f64 = criteria.iter().map(|c| c.weight).sum();
        if !total_weight.is_finite() {
            return Err(invalid(format!(
                "acceptance.criteria weights must sum to a finite number, got {total_weight}"
            )));
        }

        Ok(Self {
            id,
            category,
            input: TaskInput { prompt },
            acceptance: AcceptanceSpec {
                min_passing_score,
                criteria,
            },
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(format!("missing field `{field}`")),
    }
}

// ---------------------------------------------------------------------------
// Raw document shape
// ---------------------------------------------------------------------------

/// Task definition as written on disk, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub input: Option<InputDocument>,
    #[serde(default)]
    pub acceptance: Option<AcceptanceDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputDocument {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcceptanceDocument {
    #[serde(default)]
    pub min_passing_score: Option<i64>,
    #[serde(default)]
    pub criteria: Vec<CriterionDocument>,
}

/// Every field is optional here; `Task::from_document` requires `id`,
/// `description` and `weight`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CriterionDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub check: Option<String>,
}
