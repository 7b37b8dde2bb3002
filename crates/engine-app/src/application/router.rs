//! Action router for consolidated tools.
//!
//! A consolidated tool accepts an `action` discriminator plus action-specific
//! payload. Before the discriminated union parses, this layer normalises the
//! caller's action string: exact canonical match, then exact alias match,
//! then fuzzy match by normalised edit distance. Below the similarity
//! threshold the router never guesses; it returns a guiding error listing
//! the catalogue and the near misses.

use serde_json::Value;

use super::error::{ActionSuggestion, ToolError};

/// Similarity at or above this dispatches transparently.
const FUZZY_THRESHOLD: f64 = 0.6;

/// One action of a consolidated tool.
pub struct ActionSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
}

impl ActionSpec {
    pub const fn new(
        name: &'static str,
        aliases: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            name,
            aliases,
            description,
        }
    }
}

/// Resolves action strings for one consolidated tool.
pub struct ActionRouter {
    tool: &'static str,
    actions: Vec<ActionSpec>,
}

impl ActionRouter {
    pub fn new(tool: &'static str, actions: Vec<ActionSpec>) -> Self {
        Self { tool, actions }
    }

    pub fn action_names(&self) -> Vec<&'static str> {
        self.actions.iter().map(|spec| spec.name).collect()
    }

    /// Normalise the `action` field of a raw input in place, so the
    /// discriminated union parses against the canonical tag.
    pub fn normalize(&self, mut args: Value) -> Result<Value, ToolError> {
        let supplied = args
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::validation("missing 'action' field"))?
            .trim()
            .to_lowercase();

        let canonical = self.resolve(&supplied)?;
        if canonical != supplied {
            tracing::debug!(
                tool = %self.tool,
                supplied = %supplied,
                resolved = %canonical,
                "Resolved action alias"
            );
        }
        args["action"] = Value::String(canonical);
        Ok(args)
    }

    /// Resolve an action string to its canonical name.
    pub fn resolve(&self, supplied: &str) -> Result<String, ToolError> {
        // Canonical name
        if let Some(spec) = self.actions.iter().find(|spec| spec.name == supplied) {
            return Ok(spec.name.to_string());
        }
        // Exact alias
        if let Some(spec) = self
            .actions
            .iter()
            .find(|spec| spec.aliases.contains(&supplied))
        {
            return Ok(spec.name.to_string());
        }
        // Fuzzy match across actions and aliases
        let mut best: Option<(&ActionSpec, f64)> = None;
        let mut suggestions: Vec<ActionSuggestion> = Vec::new();
        for spec in &self.actions {
            let candidates = std::iter::once(spec.name).chain(spec.aliases.iter().copied());
            let score = candidates
                .map(|candidate| similarity(supplied, candidate))
                .fold(0.0_f64, f64::max);
            if score > 0.3 {
                suggestions.push(ActionSuggestion {
                    value: spec.name.to_string(),
                    similarity: (score * 100.0).round() / 100.0,
                });
            }
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((spec, score));
            }
        }

        if let Some((spec, score)) = best {
            if score >= FUZZY_THRESHOLD {
                return Ok(spec.name.to_string());
            }
        }

        suggestions.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        suggestions.truncate(3);
        Err(ToolError::UnknownAction {
            tool: self.tool.to_string(),
            action: supplied.to_string(),
            available_actions: self
                .actions
                .iter()
                .map(|spec| spec.name.to_string())
                .collect(),
            suggestions,
        })
    }
}

/// Normalised edit-distance similarity in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(a, b) as f64) / (longest as f64)
}

/// Plain Levenshtein distance, two-row dynamic programming. Small enough
/// that pulling in a crate for it buys nothing.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn theft_router() -> ActionRouter {
        ActionRouter::new(
            "theft_manage",
            vec![
                ActionSpec::new("steal", &["take", "pilfer"], "Record a theft"),
                ActionSpec::new("sell", &["fence", "sell_item"], "Sell to a fence"),
                ActionSpec::new("check", &["lookup"], "Check an item"),
            ],
        )
    }

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_canonical_and_alias_resolution() {
        let router = theft_router();
        assert_eq!(router.resolve("sell").unwrap(), "sell");
        assert_eq!(router.resolve("fence").unwrap(), "sell");
    }

    #[test]
    fn test_fuzzy_resolution_above_threshold() {
        let router = theft_router();
        // "sel" vs "sell": distance 1 over length 4 => 0.75
        assert_eq!(router.resolve("sel").unwrap(), "sell");
    }

    #[test]
    fn test_unknown_action_guides_instead_of_guessing() {
        let router = theft_router();
        let err = router.resolve("xyz").unwrap_err();
        match err {
            ToolError::UnknownAction {
                available_actions, ..
            } => {
                assert!(available_actions.contains(&"steal".to_string()));
            }
            other => panic!("wrong error: {other:?}"),
        }
    }

    #[test]
    fn test_normalize_rewrites_action_field() {
        let router = theft_router();
        let normalized = router
            .normalize(json!({"action": "fence", "itemId": "x"}))
            .unwrap();
        assert_eq!(normalized["action"], "sell");
        assert_eq!(normalized["itemId"], "x");
    }

    #[test]
    fn test_missing_action_is_validation_error() {
        let router = theft_router();
        let err = router.normalize(json!({"itemId": "x"})).unwrap_err();
        assert!(matches!(err, ToolError::Validation { .. }));
    }
}
