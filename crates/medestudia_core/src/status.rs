//! Health of the AI service as seen by a caller.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use strum::{AsRefStr, Display, EnumString};

/// Availability level, degraded one step per failed call.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AiStatus {
    /// Last call succeeded
    #[default]
    Online,
    /// One recent failure
    Limited,
    /// Repeated failures
    Offline,
}

impl AiStatus {
    /// Transition after a call: success resets, failure steps down one level.
    pub fn next(self, success: bool) -> Self {
        match (self, success) {
            (_, true) => AiStatus::Online,
            (AiStatus::Online, false) => AiStatus::Limited,
            (AiStatus::Limited | AiStatus::Offline, false) => AiStatus::Offline,
        }
    }
}

/// Owns an [`AiStatus`] and applies transitions to it.
///
/// Passed by reference to whatever performs calls; there is no process-wide
/// instance.
///
/// # Examples
///
/// ```
/// use medestudia_core::{AiStatus, StatusTracker};
///
/// let tracker = StatusTracker::default();
/// tracker.record(false);
/// assert_eq!(tracker.current(), AiStatus::Limited);
/// tracker.record(true);
/// assert_eq!(tracker.current(), AiStatus::Online);
/// ```
#[derive(Debug, Default)]
pub struct StatusTracker {
    status: Mutex<AiStatus>,
}

impl StatusTracker {
    /// Starts from a previously persisted status.
    pub fn new(initial: AiStatus) -> Self {
        Self {
            status: Mutex::new(initial),
        }
    }

    /// Current status.
    pub fn current(&self) -> AiStatus {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Applies the outcome of one call and returns the new status.
    pub fn record(&self, success: bool) -> AiStatus {
        let mut guard = self.status.lock().unwrap_or_else(|e| e.into_inner());
        let previous = *guard;
        let next = previous.next(success);
        if next != previous {
            tracing::debug!(from = %previous, to = %next, "AI status changed");
        }
        *guard = next;
        next
    }

    /// Forces the status back to online.
    pub fn reset(&self) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = AiStatus::Online;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_degrades_one_step() {
        assert_eq!(AiStatus::Online.next(false), AiStatus::Limited);
        assert_eq!(AiStatus::Limited.next(false), AiStatus::Offline);
        assert_eq!(AiStatus::Offline.next(false), AiStatus::Offline);
    }

    #[test]
    fn test_success_always_resets() {
        for status in [AiStatus::Online, AiStatus::Limited, AiStatus::Offline] {
            assert_eq!(status.next(true), AiStatus::Online);
        }
    }

    #[test]
    fn test_tracker_reset() {
        let tracker = StatusTracker::new(AiStatus::Offline);
        tracker.reset();
        assert_eq!(tracker.current(), AiStatus::Online);
        assert_eq!("limited".parse::<AiStatus>().unwrap(), AiStatus::Limited);
    }
}
