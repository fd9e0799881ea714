use serde::{Deserialize, Serialize};

/// One instruction unit of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Position of the step within the recipe. Unique per recipe.
    pub order_index: u32,
    pub instruction: String,
    /// Countdown length in seconds. `0` means the step has no timer.
    #[serde(default)]
    pub duration_secs: u64,
    /// Opaque illustration reference (asset name or URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illustration: Option<String>,
}

impl Step {
    pub fn new(order_index: u32, instruction: impl Into<String>, duration_secs: u64) -> Self {
        Self {
            order_index,
            instruction: instruction.into(),
            duration_secs,
            illustration: None,
        }
    }

    pub fn with_illustration(mut self, illustration: impl Into<String>) -> Self {
        self.illustration = Some(illustration.into());
        self
    }

    /// Whether a countdown applies to this step.
    pub fn has_timer(&self) -> bool {
        self.duration_secs > 0
    }

    /// Duration in whole minutes, rounded up.
    pub fn duration_min(&self) -> u64 {
        self.duration_secs.div_ceil(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_has_no_timer() {
        assert!(!Step::new(0, "Chop onions", 0).has_timer());
        assert!(Step::new(1, "Simmer", 600).has_timer());
    }

    #[test]
    fn duration_min_rounds_up() {
        assert_eq!(Step::new(0, "a", 0).duration_min(), 0);
        assert_eq!(Step::new(0, "a", 60).duration_min(), 1);
        assert_eq!(Step::new(0, "a", 61).duration_min(), 2);
    }

    #[test]
    fn illustration_is_optional_in_toml() {
        let step: Step = toml::from_str("order_index = 2\ninstruction = \"Rest\"").unwrap();
        assert_eq!(step.duration_secs, 0);
        assert!(step.illustration.is_none());
    }
}
