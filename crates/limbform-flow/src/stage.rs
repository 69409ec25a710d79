use serde::{Deserialize, Serialize};

/// Position in the linear design flow.
///
/// Stages only move forward: a failed step leaves the stage where it was, and
/// re-running an earlier step never moves it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStage {
    Selecting,
    Describing,
    ModelGenerating,
    Viewing,
}

impl FlowStage {
    /// Index for a three-step progress indicator (0, 1, 2).
    ///
    /// Viewing shares the last step with model generation.
    #[must_use]
    pub fn progress_index(self) -> u8 {
        match self {
            Self::Selecting => 0,
            Self::Describing => 1,
            Self::ModelGenerating | Self::Viewing => 2,
        }
    }

    /// Progress indicator caption
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Selecting => "Choose preferences",
            Self::Describing => "Review description",
            Self::ModelGenerating | Self::Viewing => "3D model",
        }
    }
}

impl std::fmt::Display for FlowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_index() {
        assert_eq!(FlowStage::Selecting.progress_index(), 0);
        assert_eq!(FlowStage::Describing.progress_index(), 1);
        assert_eq!(FlowStage::ModelGenerating.progress_index(), 2);
        assert_eq!(FlowStage::Viewing.progress_index(), 2);
    }

    #[test]
    fn test_stages_are_ordered() {
        assert!(FlowStage::Selecting < FlowStage::Describing);
        assert!(FlowStage::ModelGenerating < FlowStage::Viewing);
        assert_eq!(
            FlowStage::Viewing.max(FlowStage::Describing),
            FlowStage::Viewing
        );
    }
}
