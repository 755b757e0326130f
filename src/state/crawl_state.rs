/// Crawl job state definitions
///
/// A job moves `Initializing -> Running -> Terminating(reason)`. A job can
/// also go straight from `Initializing` to `Terminating` when it is cancelled
/// before its first iteration.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a crawl job stopped
///
/// All of these are normal terminations; a job that fails outright never
/// reaches `Terminating` and is reported as an error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// `max_pages` pages were crawled
    PageBudgetReached,

    /// The job's wall-clock budget ran out
    TimeBudgetReached,

    /// No URLs were left to visit
    FrontierExhausted,

    /// The batch-level ceiling expired while the job was running
    Cancelled,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PageBudgetReached => "page_budget_reached",
            Self::TimeBudgetReached => "time_budget_reached",
            Self::FrontierExhausted => "frontier_exhausted",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a single-site crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// Browser and frontier are being set up
    Initializing,

    /// The crawl loop is processing the frontier
    Running,

    /// The loop has stopped; the summary is being written
    Terminating(TerminationReason),
}

impl CrawlState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true once the job has stopped crawling
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminating(_))
    }

    pub fn termination_reason(&self) -> Option<TerminationReason> {
        match self {
            Self::Terminating(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: &CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Initializing, Self::Running)
                | (Self::Initializing, Self::Terminating(_))
                | (Self::Running, Self::Terminating(_))
        )
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::Running => write!(f, "running"),
            Self::Terminating(reason) => write!(f, "terminating ({})", reason),
        }
    }
}
