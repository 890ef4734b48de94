//! Pacing between sub-issue link mutations
//!
//! GitHub rejects bursts of `addSubIssue` calls, so the converter pauses after
//! every successful link. The pause is a policy object so tests can swap it out.

use std::time::Duration;

/// Pause inserted after every successful link
pub const LINK_DELAY: Duration = Duration::from_secs(5);

/// Policy consulted after each successful sub-issue link
pub trait Pacer {
    fn pause(&mut self) -> impl Future<Output = ()>;
}

/// Sleep for a fixed duration after each link
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(LINK_DELAY)
    }
}

impl Pacer for FixedDelay {
    fn pause(&mut self) -> impl Future<Output = ()> {
        tokio::time::sleep(self.delay)
    }
}
