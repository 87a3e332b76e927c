//! Episode lifecycle: a two-state machine driven by button edges.

use crate::types::{Metadata, RecorderCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

/// Button-driven episode switch. Metadata is snapshotted through the
/// injected provider at the moment an episode starts, never later.
pub struct RecordingSwitch {
    state: RecordingState,
    metadata: Box<dyn Fn() -> Metadata + Send>,
}

impl RecordingSwitch {
    pub fn new(metadata: Box<dyn Fn() -> Metadata + Send>) -> RecordingSwitch {
        RecordingSwitch {
            state: RecordingState::Idle,
            metadata,
        }
    }

    /// Switch with no metadata provider: episodes start with an empty map.
    pub fn bare() -> RecordingSwitch {
        RecordingSwitch::new(Box::new(Metadata::new))
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    /// Flip the episode state, returning the recorder command to emit.
    pub fn toggle(&mut self) -> RecorderCommand {
        match self.state {
            RecordingState::Idle => {
                self.state = RecordingState::Recording;
                log::info!("Episode started");
                RecorderCommand::StartEpisode((self.metadata)())
            }
            RecordingState::Recording => {
                self.state = RecordingState::Idle;
                log::info!("Episode stopped");
                RecorderCommand::StopEpisode
            }
        }
    }

    /// Discard the episode in flight. Unconditional: the state is forced to
    /// Idle and no StopEpisode will ever follow for the aborted episode.
    /// Returns `None` when nothing was recording.
    pub fn abort(&mut self) -> Option<RecorderCommand> {
        if self.state != RecordingState::Recording {
            return None;
        }
        self.state = RecordingState::Idle;
        log::info!("Episode aborted");
        Some(RecorderCommand::Abort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged_switch() -> RecordingSwitch {
        RecordingSwitch::new(Box::new(|| {
            let mut meta = Metadata::new();
            meta.insert("task".into(), "stack_cubes".into());
            meta
        }))
    }

    #[test]
    fn test_toggle_cycles_start_stop() {
        let mut switch = tagged_switch();
        assert_eq!(switch.state(), RecordingState::Idle);

        match switch.toggle() {
            RecorderCommand::StartEpisode(meta) => {
                assert_eq!(meta.get("task").and_then(|v| v.as_str()), Some("stack_cubes"));
            }
            other => panic!("expected StartEpisode, got {other:?}"),
        }
        assert!(switch.is_recording());

        assert_eq!(switch.toggle(), RecorderCommand::StopEpisode);
        assert_eq!(switch.state(), RecordingState::Idle);
    }

    #[test]
    fn test_abort_discards_without_stop() {
        let mut switch = tagged_switch();
        switch.toggle();
        assert!(switch.is_recording());

        assert_eq!(switch.abort(), Some(RecorderCommand::Abort));
        assert_eq!(switch.state(), RecordingState::Idle);

        // Nothing in flight: abort is a no-op and a fresh toggle starts anew.
        assert_eq!(switch.abort(), None);
        assert!(matches!(switch.toggle(), RecorderCommand::StartEpisode(_)));
    }

    #[test]
    fn test_metadata_snapshot_per_episode() {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::sync::Arc;

        let counter = Arc::new(AtomicU64::new(0));
        let c = counter.clone();
        let mut switch = RecordingSwitch::new(Box::new(move || {
            let mut meta = Metadata::new();
            meta.insert("take".into(), c.fetch_add(1, Ordering::Relaxed).into());
            meta
        }));

        let first = switch.toggle();
        switch.toggle();
        let second = switch.toggle();
        match (first, second) {
            (RecorderCommand::StartEpisode(a), RecorderCommand::StartEpisode(b)) => {
                assert_eq!(a.get("take").and_then(|v| v.as_u64()), Some(0));
                assert_eq!(b.get("take").and_then(|v| v.as_u64()), Some(1));
            }
            other => panic!("expected two StartEpisode commands, got {other:?}"),
        }
    }
}
