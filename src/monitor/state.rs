// Per-target memory between ticks

use crate::config::Target;
use crate::fingerprint::Digest;
use std::time::SystemTime;

/// What the watcher last settled on for one target
///
/// Both fields start out unset and are only filled in once the BMC was seen
/// presenting the staged certificate (or a push of it succeeded).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetState {
    last_fingerprint: Option<Digest>,
    last_mod_time: Option<SystemTime>,
}

impl TargetState {
    pub fn last_fingerprint(&self) -> Option<Digest> {
        self.last_fingerprint
    }

    pub fn last_mod_time(&self) -> Option<SystemTime> {
        self.last_mod_time
    }

    /// Same modification time as the last settled check
    pub fn is_unchanged(&self, mod_time: SystemTime) -> bool {
        self.last_mod_time == Some(mod_time)
    }

    /// Same content as the last settled check
    pub fn matches(&self, digest: &Digest) -> bool {
        self.last_fingerprint.as_ref() == Some(digest)
    }

    /// File was rewritten with identical content
    pub(crate) fn touch(&mut self, mod_time: SystemTime) {
        self.last_mod_time = Some(mod_time);
    }

    /// BMC confirmed to present `digest`
    pub(crate) fn settle(&mut self, digest: Digest, mod_time: SystemTime) {
        self.last_fingerprint = Some(digest);
        self.last_mod_time = Some(mod_time);
    }
}

/// A configured target together with its state
#[derive(Debug)]
pub(crate) struct TrackedTarget {
    pub(crate) target: Target,
    pub(crate) state: TargetState,
}

impl TrackedTarget {
    pub(crate) fn new(target: Target) -> Self {
        Self {
            target,
            state: TargetState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_state_is_unset() {
        let state = TargetState::default();
        assert!(state.last_fingerprint().is_none());
        assert!(state.last_mod_time().is_none());
        assert!(!state.is_unchanged(SystemTime::UNIX_EPOCH));
    }

    #[test]
    fn test_unset_never_matches_zero_digest() {
        let state = TargetState::default();
        assert!(!state.matches(&Digest::from([0u8; 32])));
    }

    #[test]
    fn test_touch_keeps_fingerprint() {
        let digest = Digest::of(b"cert");
        let first = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        let second = first + Duration::from_secs(60);

        let mut state = TargetState::default();
        state.settle(digest, first);
        state.touch(second);

        assert!(state.matches(&digest));
        assert!(state.is_unchanged(second));
        assert!(!state.is_unchanged(first));
    }
}
