/// Orchestrator phase definitions
///
/// This module defines the phases a crawl passes through and which moves
/// between them are legal.
use std::fmt;

/// Represents the current phase of the crawl orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// No run in progress
    Idle,

    /// Run started, between chunks
    Running,

    /// A chunk is being fetched and extracted by the worker pool
    Fetching,

    /// A finished chunk's records are being appended (and maybe committed)
    Writing,

    /// Final commit done, run closed
    Done,
}

impl CrawlPhase {
    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// `Idle -> Running -> (Fetching -> Writing -> Running)* -> Done`.
    /// A finished run may start over from `Done`.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Fetching)
                | (Self::Fetching, Self::Writing)
                | (Self::Writing, Self::Running)
                | (Self::Running, Self::Done)
                | (Self::Done, Self::Running)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Fetching => "fetching",
            Self::Writing => "writing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            CrawlPhase::Idle,
            CrawlPhase::Running,
            CrawlPhase::Fetching,
            CrawlPhase::Writing,
            CrawlPhase::Running,
            CrawlPhase::Done,
        ];
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!CrawlPhase::Idle.can_transition_to(CrawlPhase::Fetching));
        assert!(!CrawlPhase::Fetching.can_transition_to(CrawlPhase::Done));
        assert!(!CrawlPhase::Writing.can_transition_to(CrawlPhase::Fetching));
        assert!(!CrawlPhase::Done.can_transition_to(CrawlPhase::Writing));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CrawlPhase::Fetching), "fetching");
    }
}
