//! The speech synthesis device the engine drives.
//!
//! The device is process-wide and plays one utterance at a time. It reports
//! progress back through [`DeviceEvent`]s, which the host delivers to the
//! engine on the same event queue as user commands.

use crate::voices::VoiceDescriptor;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use ts_rs::TS;

/// Identifies one submitted utterance so late callbacks can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, TS)]
#[ts(export)]
pub struct UtteranceId(pub u64);

/// Ids are unique per process so a page never mistakes a callback meant for
/// the page it replaced.
static NEXT_UTTERANCE: AtomicU64 = AtomicU64::new(1);

impl UtteranceId {
    pub fn next() -> Self {
        Self(NEXT_UTTERANCE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// One unit of text handed to the device, with the parameters captured at
/// construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    /// `None` means the platform default voice.
    pub voice: Option<String>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Callbacks fired by the device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    Started(UtteranceId),
    /// Finished on its own; cancelled utterances never report this for the
    /// in-flight id.
    Ended(UtteranceId),
    Failed { id: UtteranceId, reason: String },
    /// The platform voice list changed.
    VoicesChanged,
}

pub trait SynthesisDevice {
    /// Queue an utterance. Returning an error is treated like a `Failed`
    /// callback for that utterance.
    fn speak(&mut self, utterance: Utterance) -> Result<()>;

    fn pause(&mut self);

    fn resume(&mut self);

    /// Drop the current utterance. Must be safe to call when idle.
    fn cancel(&mut self);

    /// Snapshot of the voices the platform reports right now; may be empty
    /// until the platform finishes loading them.
    fn voices(&self) -> Vec<VoiceDescriptor>;
}

impl<T: SynthesisDevice + ?Sized> SynthesisDevice for Box<T> {
    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        (**self).speak(utterance)
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn resume(&mut self) {
        (**self).resume()
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }

    fn voices(&self) -> Vec<VoiceDescriptor> {
        (**self).voices()
    }
}
