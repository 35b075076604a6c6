//! Search and pulldown configuration presets.

use serde::{Deserialize, Serialize};
use wedge_core::MoveKey;

/// When the connectivity closure phase runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClosureMode {
    Off,
    /// Only on fields holding level blocks.
    Auto,
    On,
}

/// Moves a tutorial level accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialRestriction {
    pub required: MoveKey,
    #[serde(default)]
    pub suggested: Vec<MoveKey>,
}

impl TutorialRestriction {
    pub fn allows(&self, key: MoveKey) -> bool {
        self.required == key || self.suggested.contains(&key)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Sweep, drop and tuck like a player would.
    pub human_like: bool,
    /// Breadth-first flood over every step.
    pub exhaustive: bool,
    pub closure: ClosureMode,
    /// Merge moves that have the same footprint in another rotation.
    pub dedup_rotations: bool,
    pub restriction: Option<TutorialRestriction>,
}

impl SearchConfig {
    pub fn standard() -> Self {
        Self {
            human_like: true,
            exhaustive: true,
            closure: ClosureMode::Auto,
            dedup_rotations: true,
            restriction: None,
        }
    }

    /// Flood only, every rotation kept apart. Matches brute force exactly.
    pub fn exhaustive_only() -> Self {
        Self {
            human_like: false,
            exhaustive: true,
            closure: ClosureMode::Off,
            dedup_rotations: false,
            restriction: None,
        }
    }

    pub fn tutorial(restriction: TutorialRestriction) -> Self {
        Self {
            restriction: Some(restriction),
            ..Self::standard()
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PulldownConfig {
    /// Alternate left-to-right and right-to-left passes.
    pub bidirectional: bool,
    /// Clusters already resting on the floor do not bounce.
    pub suppress_bounce: bool,
    /// Upper bound on pass rounds.
    pub max_passes: usize,
}

impl PulldownConfig {
    pub fn standard() -> Self {
        Self {
            bidirectional: true,
            suppress_bounce: true,
            max_passes: 64,
        }
    }

    pub fn single_pass() -> Self {
        Self {
            bidirectional: false,
            suppress_bounce: true,
            max_passes: 1,
        }
    }
}

impl Default for PulldownConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wedge_core::{Position, Rotation};

    #[test]
    fn test_default_is_standard() {
        assert_eq!(SearchConfig::default(), SearchConfig::standard());
        assert_eq!(PulldownConfig::default(), PulldownConfig::standard());
    }

    #[test]
    fn test_tutorial_keeps_phases() {
        let key = MoveKey::new(Position::new(1, 0), Rotation::North);
        let config = SearchConfig::tutorial(TutorialRestriction {
            required: key,
            suggested: vec![],
        });
        assert!(config.human_like && config.exhaustive);
        assert!(config.restriction.as_ref().unwrap().allows(key));
    }

    #[test]
    fn test_restriction_deserializes_without_suggestions() {
        let json = r#"{"required":{"x":2,"y":0,"rotation":"East"}}"#;
        let r: TutorialRestriction = serde_json::from_str(json).unwrap();
        assert_eq!(r.required.rotation, Rotation::East);
        assert!(r.suggested.is_empty());
    }
}
