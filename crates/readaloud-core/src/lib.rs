//! Read-aloud playback core for a chapter reader.
//!
//! Splits a chapter into sentences, drives a speech synthesis device one
//! sentence at a time, and hands chapter continuity back to the host through
//! [`Effect`]s. Platform pieces (the device, preference storage, timers and
//! navigation) stay behind traits or effects so hosts can plug in their own.

pub mod bridge;
pub mod config;
pub mod control;
pub mod device;
pub mod effects;
mod engine;
pub mod prefs;
pub mod segmenter;
pub mod voices;

pub use bridge::{ChapterContext, NavigationRequest, autoplay_requested, next_chapter_request};
pub use config::{AppConfig, LogLevel, load_config, parse_config, serialize_config};
pub use control::{Command, PlaybackSnapshot, ReadAloud, export_ts_bindings};
pub use device::{DeviceEvent, SynthesisDevice, Utterance, UtteranceId};
pub use effects::{Effect, Timer};
pub use engine::{
    EngineTiming, MAX_PITCH, MAX_RATE, MAX_VOLUME, MIN_PITCH, MIN_RATE, MIN_VOLUME,
    PlaybackParams, PlaybackStatus, TransitionReason,
};
pub use prefs::{MemoryPreferences, PreferenceStore, TomlPreferences};
pub use segmenter::{ContentKind, segment};
pub use voices::{RefreshPolicy, VoiceCatalog, VoiceDescriptor, VoicePolicy, language_matches};
