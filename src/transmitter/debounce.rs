//! Trigger debouncing

use std::time::Duration;
use tokio::time::Instant;

/// Suppresses repeated trigger detections from one physical press.
///
/// The cool-down starts when a trigger arms and restarts when the pass it
/// armed completes, so a held button waits `min_rearm` after the last frame
/// however long the replay took.
#[derive(Debug, Clone)]
pub struct Debouncer {
    min_rearm: Duration,
    cooldown_start: Option<Instant>,
}

impl Debouncer {
    pub fn new(min_rearm: Duration) -> Self {
        Self { min_rearm, cooldown_start: None }
    }

    pub fn min_rearm(&self) -> Duration {
        self.min_rearm
    }

    /// Instant the current cool-down is measured from
    pub fn cooldown_start(&self) -> Option<Instant> {
        self.cooldown_start
    }

    /// Whether a trigger at `now` would arm
    pub fn is_armed(&self, now: Instant) -> bool {
        match self.cooldown_start {
            None => true,
            Some(start) => now.saturating_duration_since(start) >= self.min_rearm,
        }
    }

    /// Arm on a trigger at `now`, recording it; `false` while cooling down.
    pub fn try_arm(&mut self, now: Instant) -> bool {
        if !self.is_armed(now) {
            return false;
        }
        self.cooldown_start = Some(now);
        true
    }

    /// Restart the cool-down at the end of a pass.
    ///
    /// Keeps the later of the recorded instant and `now`.
    pub fn complete(&mut self, now: Instant) {
        self.cooldown_start = Some(self.cooldown_start.map_or(now, |start| start.max(now)));
    }

    /// Time left until the trigger re-arms
    pub fn remaining(&self, now: Instant) -> Duration {
        self.cooldown_start
            .map(|start| (start + self.min_rearm).saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_trigger_always_arms() {
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        assert!(debouncer.try_arm(Instant::now()));
    }

    #[test]
    fn rearm_waits_for_minimum_interval() {
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        let start = Instant::now();

        assert!(debouncer.try_arm(start));
        assert!(!debouncer.try_arm(start + Duration::from_millis(10)));
        assert!(!debouncer.try_arm(start + Duration::from_millis(1999)));
        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(1500)),
            Duration::from_millis(500)
        );

        assert!(debouncer.try_arm(start + Duration::from_secs(2)));
        assert_eq!(debouncer.cooldown_start(), Some(start + Duration::from_secs(2)));
    }

    #[test]
    fn rejected_triggers_do_not_extend_cooldown() {
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        let start = Instant::now();

        debouncer.try_arm(start);
        debouncer.try_arm(start + Duration::from_secs(1));
        assert!(debouncer.is_armed(start + Duration::from_secs(2)));
    }

    #[test]
    fn cooldown_restarts_when_a_long_pass_completes() {
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        let start = Instant::now();
        let finished = start + Duration::from_secs(5);

        debouncer.try_arm(start);
        debouncer.complete(finished);

        assert!(!debouncer.is_armed(finished));
        assert!(!debouncer.is_armed(finished + Duration::from_millis(1999)));
        assert!(debouncer.is_armed(finished + Duration::from_secs(2)));
    }

    #[test]
    fn completion_never_moves_the_cooldown_back() {
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        let start = Instant::now();

        debouncer.try_arm(start + Duration::from_secs(1));
        debouncer.complete(start);
        assert_eq!(debouncer.cooldown_start(), Some(start + Duration::from_secs(1)));
    }
}
