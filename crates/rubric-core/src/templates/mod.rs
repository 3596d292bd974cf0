mod builtin;

pub use builtin::builtin_templates;

use crate::errors::EvalError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub const GENERAL_TEMPLATE_ID: &str = "general";

/// Tolerance for the weights-sum-to-one invariant.
pub const WEIGHT_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub name: String,
    /// Share of the overall score, in (0, 1]. All weights sum to 1.0.
    pub weight: f64,
    pub criteria: Vec<String>,
    /// Remediation text surfaced by analytics recommendations.
    #[serde(default)]
    pub guidance: String,
    #[serde(default)]
    pub good_example: Option<String>,
    #[serde(default)]
    pub bad_example: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptFragments {
    pub system_role: String,
    /// May contain `{content_type}` and `{audience}` placeholders.
    pub evaluation_instruction: String,
    pub scoring_instruction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateMeta {
    pub version: String,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationTemplate {
    pub id: String,
    pub content_type: String,
    /// Audience levels this template targets; empty means any.
    #[serde(default)]
    pub audiences: Vec<String>,
    pub dimensions: Vec<DimensionSpec>,
    pub prompts: PromptFragments,
    pub meta: TemplateMeta,
}

impl EvaluationTemplate {
    pub fn dimension(&self, name: &str) -> Option<&DimensionSpec> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn validate(&self) -> Result<(), EvalError> {
        if self.id.trim().is_empty() {
            return Err(EvalError::validation("template id must not be empty"));
        }
        if self.dimensions.is_empty() {
            return Err(EvalError::validation(format!(
                "template '{}' declares no dimensions",
                self.id
            )));
        }
        for dim in &self.dimensions {
            if dim.weight <= 0.0 || dim.weight > 1.0 {
                return Err(EvalError::validation(format!(
                    "template '{}': dimension '{}' weight {} outside (0, 1]",
                    self.id, dim.name, dim.weight
                )));
            }
        }
        let sum: f64 = self.dimensions.iter().map(|d| d.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(EvalError::validation(format!(
                "template '{}': dimension weights sum to {:.4}, expected 1.0",
                self.id, sum
            )));
        }
        Ok(())
    }
}

/// In-process template registry. Explicitly constructed and injected; reads
/// clone the current map snapshot, mutations swap in a rebuilt map so batch
/// evaluations never observe a half-applied change.
pub struct TemplateStore {
    inner: RwLock<Arc<HashMap<String, Arc<EvaluationTemplate>>>>,
}

impl TemplateStore {
    pub fn empty() -> Self {
        Self {
            inner: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Store preloaded with the built-in definition/tutorial/general templates.
    pub fn with_builtins() -> Self {
        let store = Self::empty();
        {
            let mut map = HashMap::new();
            for template in builtin_templates() {
                map.insert(template.id.clone(), Arc::new(template));
            }
            *store.inner.write().unwrap() = Arc::new(map);
        }
        store
    }

    fn snapshot(&self) -> Arc<HashMap<String, Arc<EvaluationTemplate>>> {
        self.inner.read().unwrap().clone()
    }

    pub fn get(&self, id: &str) -> Result<Arc<EvaluationTemplate>, EvalError> {
        self.snapshot()
            .get(id)
            .cloned()
            .ok_or_else(|| EvalError::not_found(format!("template '{}' not found", id)))
    }

    pub fn all(&self) -> Vec<Arc<EvaluationTemplate>> {
        let mut templates: Vec<_> = self.snapshot().values().cloned().collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        templates
    }

    pub fn templates_for_content_type(&self, content_type: &str) -> Vec<Arc<EvaluationTemplate>> {
        let mut templates: Vec<_> = self
            .snapshot()
            .values()
            .filter(|t| t.content_type == content_type)
            .cloned()
            .collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        templates
    }

    /// Deterministic selection: exact (content type, audience) match first,
    /// then any template for the content type, then `None` so the caller
    /// falls back to the general template.
    pub fn recommend(
        &self,
        content_type: &str,
        audience: &str,
    ) -> Option<Arc<EvaluationTemplate>> {
        let candidates = self.templates_for_content_type(content_type);
        candidates
            .iter()
            .find(|t| t.audiences.iter().any(|a| a == audience))
            .or_else(|| candidates.first())
            .cloned()
    }

    pub fn create_custom(&self, template: EvaluationTemplate) -> Result<(), EvalError> {
        template.validate()?;
        let mut guard = self.inner.write().unwrap();
        if guard.contains_key(&template.id) {
            return Err(EvalError::validation(format!(
                "template '{}' already exists",
                template.id
            )));
        }
        let mut map: HashMap<_, _> = guard.as_ref().clone();
        map.insert(template.id.clone(), Arc::new(template));
        *guard = Arc::new(map);
        Ok(())
    }

    /// Idempotent: removing an unknown id is not an error. Returns whether
    /// a template was actually removed.
    pub fn delete(&self, id: &str) -> bool {
        let mut guard = self.inner.write().unwrap();
        if !guard.contains_key(id) {
            return false;
        }
        let mut map: HashMap<_, _> = guard.as_ref().clone();
        map.remove(id);
        *guard = Arc::new(map);
        true
    }

    /// Look up a dimension spec by name across all templates, scanning in
    /// id order so the answer is stable. Used by analytics to source
    /// recommendation guidance.
    pub fn find_dimension(&self, name: &str) -> Option<DimensionSpec> {
        self.all()
            .iter()
            .find_map(|t| t.dimension(name).cloned())
    }
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_template(id: &str, weights: &[f64]) -> EvaluationTemplate {
        EvaluationTemplate {
            id: id.to_string(),
            content_type: "custom".to_string(),
            audiences: vec!["beginner".to_string()],
            dimensions: weights
                .iter()
                .enumerate()
                .map(|(i, w)| DimensionSpec {
                    name: format!("dim{}", i),
                    weight: *w,
                    criteria: vec!["criterion".to_string()],
                    guidance: String::new(),
                    good_example: None,
                    bad_example: None,
                })
                .collect(),
            prompts: PromptFragments {
                system_role: "You are a reviewer.".to_string(),
                evaluation_instruction: "Evaluate the content.".to_string(),
                scoring_instruction: "Score each dimension 0-10.".to_string(),
            },
            meta: TemplateMeta {
                version: "1.0".to_string(),
                author: "test".to_string(),
                tags: vec![],
                updated_at: Utc::now(),
            },
        }
    }

    #[test]
    fn builtin_weights_sum_to_one() {
        for template in builtin_templates() {
            template.validate().unwrap();
        }
    }

    #[test]
    fn builtins_include_general_fallback() {
        let store = TemplateStore::with_builtins();
        assert!(store.get(GENERAL_TEMPLATE_ID).is_ok());
    }

    #[test]
    fn recommend_prefers_exact_audience_match() {
        let store = TemplateStore::with_builtins();
        let hit = store.recommend("definition", "beginner").unwrap();
        assert_eq!(hit.content_type, "definition");
        assert!(hit.audiences.iter().any(|a| a == "beginner"));
    }

    #[test]
    fn recommend_falls_back_to_content_type_then_none() {
        let store = TemplateStore::with_builtins();
        let hit = store.recommend("tutorial", "nonexistent-audience").unwrap();
        assert_eq!(hit.content_type, "tutorial");
        assert!(store.recommend("unknown-type", "x").is_none());
    }

    #[test]
    fn create_custom_rejects_bad_weight_sum() {
        let store = TemplateStore::with_builtins();
        let err = store
            .create_custom(custom_template("broken", &[0.5, 0.4]))
            .unwrap_err();
        assert_eq!(err.kind, crate::errors::EvalErrorKind::Validation);
    }

    #[test]
    fn create_custom_accepts_sum_within_tolerance() {
        let store = TemplateStore::with_builtins();
        store
            .create_custom(custom_template("close-enough", &[0.5, 0.4999]))
            .unwrap();
        assert!(store.get("close-enough").is_ok());
    }

    #[test]
    fn create_custom_rejects_duplicate_id() {
        let store = TemplateStore::with_builtins();
        store
            .create_custom(custom_template("mine", &[0.6, 0.4]))
            .unwrap();
        let err = store
            .create_custom(custom_template("mine", &[0.6, 0.4]))
            .unwrap_err();
        assert!(err.message.contains("already exists"));
    }

    #[test]
    fn delete_is_idempotent() {
        let store = TemplateStore::with_builtins();
        store
            .create_custom(custom_template("mine", &[1.0]))
            .unwrap();
        assert!(store.delete("mine"));
        assert!(!store.delete("mine"));
        assert!(!store.delete("never-existed"));
    }
}
