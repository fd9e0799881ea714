//! Recipes and their ordered steps.
//!
//! Steps are owned by the recipe data layer. This module only validates and
//! orders them so that a cooking session can snapshot a stable sequence.

mod step;

pub use step::Step;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Recipe {
    /// Build a recipe, ordering steps by `order_index`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateOrderIndex`] when two steps share
    /// an `order_index`.
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: name.into(),
            steps: sort_steps(steps)?,
        })
    }

    /// Parse a recipe from TOML and validate its steps.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: Recipe = toml::from_str(content)?;
        Ok(Self::new(raw.name, raw.steps)?)
    }

    /// Load a recipe file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_secs).sum()
    }

    pub fn timed_step_count(&self) -> usize {
        self.steps.iter().filter(|s| s.has_timer()).count()
    }
}

/// Sort steps by `order_index`, rejecting duplicates.
///
/// Gaps in the numbering are allowed; callers address steps by their
/// position in the returned vector.
pub fn sort_steps(mut steps: Vec<Step>) -> Result<Vec<Step>, ValidationError> {
    let mut seen = HashSet::with_capacity(steps.len());
    for step in &steps {
        if !seen.insert(step.order_index) {
            return Err(ValidationError::DuplicateOrderIndex {
                order_index: step.order_index,
            });
        }
    }
    steps.sort_by_key(|s| s.order_index);
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASTA: &str = r#"
name = "Weeknight pasta"

[[steps]]
order_index = 1
instruction = "Cook the pasta"
duration_secs = 540

[[steps]]
order_index = 0
instruction = "Boil salted water"

[[steps]]
order_index = 2
instruction = "Toss with sauce"
illustration = "toss.png"
"#;

    #[test]
    fn from_toml_sorts_by_order_index() {
        let recipe = Recipe::from_toml_str(PASTA).unwrap();
        let order: Vec<u32> = recipe.steps.iter().map(|s| s.order_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(recipe.steps[0].instruction, "Boil salted water");
        assert_eq!(recipe.steps[2].illustration.as_deref(), Some("toss.png"));
    }

    #[test]
    fn duplicate_order_index_is_rejected() {
        let err = Recipe::new(
            "dup",
            vec![Step::new(0, "a", 0), Step::new(1, "b", 0), Step::new(1, "c", 0)],
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateOrderIndex { order_index: 1 });
    }

    #[test]
    fn gaps_in_order_index_are_tolerated() {
        let recipe = Recipe::new("gaps", vec![Step::new(10, "b", 0), Step::new(3, "a", 0)]).unwrap();
        assert_eq!(recipe.steps[0].instruction, "a");
        assert_eq!(recipe.steps[1].instruction, "b");
    }

    #[test]
    fn totals() {
        let recipe = Recipe::from_toml_str(PASTA).unwrap();
        assert_eq!(recipe.total_duration_secs(), 540);
        assert_eq!(recipe.timed_step_count(), 1);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(Recipe::from_toml_str("name = ").is_err());
    }

    #[test]
    fn load_reads_recipe_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pasta.toml");
        std::fs::write(&path, PASTA).unwrap();

        let recipe = Recipe::load(&path).unwrap();
        assert_eq!(recipe.name, "Weeknight pasta");
        assert_eq!(recipe.steps.len(), 3);

        let missing = Recipe::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, crate::error::CoreError::Io(_)));
    }
}
