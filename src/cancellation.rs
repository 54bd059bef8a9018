use anyhow::{Result, anyhow};
use readaloud_core::UtteranceId;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Shared between the device handle and the audio worker: names the one
/// utterance the worker may still synthesize or play. Zero means none.
#[derive(Clone, Debug, Default)]
pub struct UtteranceGate {
    active: Arc<AtomicU64>,
}

impl UtteranceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, id: UtteranceId) {
        self.active.store(id.0, Ordering::Release);
    }

    pub fn close(&self) {
        self.active.store(0, Ordering::Release);
    }

    pub fn is_open_for(&self, id: UtteranceId) -> bool {
        id.0 != 0 && self.active.load(Ordering::Acquire) == id.0
    }

    pub fn check_open(&self, id: UtteranceId, stage: &'static str) -> Result<()> {
        if !self.is_open_for(id) {
            return Err(anyhow!("utterance {id} cancelled at stage={stage}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_utterance_closes_older_one() {
        let gate = UtteranceGate::new();
        gate.open(UtteranceId(1));
        assert!(gate.is_open_for(UtteranceId(1)));

        gate.open(UtteranceId(2));
        assert!(!gate.is_open_for(UtteranceId(1)));
        assert!(gate.check_open(UtteranceId(1), "synthesis").is_err());
        assert!(gate.check_open(UtteranceId(2), "synthesis").is_ok());
    }

    #[test]
    fn close_cancels_everything() {
        let gate = UtteranceGate::new();
        gate.open(UtteranceId(3));
        gate.close();
        assert!(!gate.is_open_for(UtteranceId(3)));
        assert!(!gate.is_open_for(UtteranceId(0)));
    }
}
