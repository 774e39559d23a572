//! Council pipeline entities: stages and the run state machine

use serde::{Deserialize, Serialize};

/// Stage of a council run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Every participant answers the question
    Initial,
    /// Participants rank each other's anonymized answers
    Review,
    /// The aggregator synthesizes one final answer
    Synthesis,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Initial => "initial",
            Stage::Review => "review",
            Stage::Synthesis => "synthesis",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Stage::Initial => "Stage 1: Initial Responses",
            Stage::Review => "Stage 2: Peer Review",
            Stage::Synthesis => "Stage 3: Final Synthesis",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// State of a single pipeline run
///
/// ```text
/// Idle → Stage1Running → AllFailed
///                      → Stage2Running → Stage3Running → Done
///                                                      → Stage3Failed
/// ```
///
/// `AllFailed`, `Done` and `Stage3Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    #[default]
    Idle,
    Stage1Running,
    AllFailed,
    Stage2Running,
    Stage3Running,
    Done,
    Stage3Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::AllFailed | PipelineState::Done | PipelineState::Stage3Failed
        )
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Stage1Running)
                | (Stage1Running, AllFailed)
                | (Stage1Running, Stage2Running)
                | (Stage2Running, Stage3Running)
                | (Stage3Running, Done)
                | (Stage3Running, Stage3Failed)
        )
    }

    /// Decide where Stage 1 leads, given how many answers are usable
    pub fn after_initial(usable_count: usize) -> PipelineState {
        if usable_count == 0 {
            PipelineState::AllFailed
        } else {
            PipelineState::Stage2Running
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Stage1Running => "stage1_running",
            PipelineState::AllFailed => "all_failed",
            PipelineState::Stage2Running => "stage2_running",
            PipelineState::Stage3Running => "stage3_running",
            PipelineState::Done => "done",
            PipelineState::Stage3Failed => "stage3_failed",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        assert!(PipelineState::Idle.can_transition_to(PipelineState::Stage1Running));
        assert!(PipelineState::Stage1Running.can_transition_to(PipelineState::AllFailed));
        assert!(PipelineState::Stage2Running.can_transition_to(PipelineState::Stage3Running));
        assert!(PipelineState::Stage3Running.can_transition_to(PipelineState::Stage3Failed));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!PipelineState::Idle.can_transition_to(PipelineState::Done));
        assert!(!PipelineState::AllFailed.can_transition_to(PipelineState::Stage2Running));
        assert!(!PipelineState::Stage1Running.can_transition_to(PipelineState::Stage3Running));
        assert!(!PipelineState::Done.can_transition_to(PipelineState::Idle));
    }

    #[test]
    fn test_terminal_states() {
        assert!(PipelineState::AllFailed.is_terminal());
        assert!(PipelineState::Done.is_terminal());
        assert!(PipelineState::Stage3Failed.is_terminal());
        assert!(!PipelineState::Stage2Running.is_terminal());
    }

    #[test]
    fn test_after_initial() {
        assert_eq!(PipelineState::after_initial(0), PipelineState::AllFailed);
        assert_eq!(PipelineState::after_initial(1), PipelineState::Stage2Running);
        assert_eq!(PipelineState::after_initial(3), PipelineState::Stage2Running);
    }

    #[test]
    fn test_stage_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Stage::Review).unwrap(), "\"review\"");
    }
}
