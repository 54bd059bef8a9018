//! Sentence-by-sentence playback state machine.
//!
//! The engine owns the playback position and is the only code that talks to
//! the synthesis device. Commands and device callbacks arrive one at a time
//! from the host's event queue; every handler returns the [`Effect`]s the
//! host has to run (timers, navigation).

mod callbacks;
mod commands;

use crate::bridge::ChapterContext;
use crate::config::AppConfig;
use crate::device::{SynthesisDevice, Utterance, UtteranceId};
use crate::effects::{Effect, Timer};
use crate::prefs::{
    AUTO_NEXT_KEY, PITCH_KEY, PreferenceStore, RATE_KEY, VOICE_ID_KEY, VOICE_LANGUAGE_KEY,
    VOLUME_KEY,
};
use crate::voices::{RefreshPolicy, VoiceCatalog, VoicePolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use ts_rs::TS;

pub const MIN_RATE: f32 = 0.5;
pub const MAX_RATE: f32 = 2.0;
pub const MIN_PITCH: f32 = 0.5;
pub const MAX_PITCH: f32 = 2.0;
pub const MIN_VOLUME: f32 = 0.0;
pub const MAX_VOLUME: f32 = 1.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Applied to the next utterance built; never to one already submitted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct PlaybackParams {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for PlaybackParams {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

impl PlaybackParams {
    pub fn clamped(self) -> Self {
        Self {
            rate: clamp_or(self.rate, MIN_RATE, MAX_RATE, 1.0),
            pitch: clamp_or(self.pitch, MIN_PITCH, MAX_PITCH, 1.0),
            volume: clamp_or(self.volume, MIN_VOLUME, MAX_VOLUME, 1.0),
        }
    }
}

pub(crate) fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Why the position last moved. Read once by the auto-resume guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionReason {
    /// The user skipped with next/previous.
    Manual,
    /// The previous utterance finished on its own.
    Natural,
    /// A chapter opened with the autoplay signal.
    ChapterLoadAutoplay,
}

/// Delays the engine asks the host to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineTiming {
    pub auto_resume_delay: Duration,
    pub chapter_autoplay_delay: Duration,
    pub voice_refresh: RefreshPolicy,
}

impl EngineTiming {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            auto_resume_delay: config.auto_resume_delay(),
            chapter_autoplay_delay: config.chapter_autoplay_delay(),
            voice_refresh: RefreshPolicy {
                retry_after: config.voice_refresh_after(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InFlight {
    pub(crate) id: UtteranceId,
    pub(crate) started: bool,
}

pub(crate) struct PlaybackEngine<D: SynthesisDevice, P: PreferenceStore> {
    pub(crate) device: D,
    pub(crate) prefs: P,
    pub(crate) timing: EngineTiming,
    pub(crate) catalog: VoiceCatalog,
    pub(crate) chapter: ChapterContext,
    pub(crate) sentences: Vec<String>,
    pub(crate) position: Option<usize>,
    pub(crate) status: PlaybackStatus,
    pub(crate) in_flight: Option<InFlight>,
    pub(crate) params: PlaybackParams,
    pub(crate) auto_advance: bool,
    pub(crate) intent: Option<TransitionReason>,
    pub(crate) pending_resume: Option<u64>,
    pub(crate) pending_autoplay: Option<u64>,
    next_generation: u64,
}

impl<D: SynthesisDevice, P: PreferenceStore> PlaybackEngine<D, P> {
    pub(crate) fn new(device: D, prefs: P, config: &AppConfig) -> Self {
        let params = PlaybackParams {
            rate: prefs.get_f32(RATE_KEY).unwrap_or(config.tts_rate),
            pitch: prefs.get_f32(PITCH_KEY).unwrap_or(config.tts_pitch),
            volume: prefs.get_f32(VOLUME_KEY).unwrap_or(config.tts_volume),
        }
        .clamped();
        let auto_advance = prefs.get_bool(AUTO_NEXT_KEY).unwrap_or(config.auto_next);

        let mut policy = VoicePolicy::from_config(config);
        if let Some(language) = prefs.get(VOICE_LANGUAGE_KEY).filter(|l| !l.trim().is_empty()) {
            policy.target_language = language;
        }
        let selected = prefs.get(VOICE_ID_KEY).or_else(|| config.voice.clone());
        info!(
            rate = params.rate,
            pitch = params.pitch,
            volume = params.volume,
            auto_advance,
            language = %policy.target_language,
            voice = selected.as_deref().unwrap_or("<auto>"),
            "Initializing playback engine"
        );

        Self {
            device,
            prefs,
            timing: EngineTiming::from_config(config),
            catalog: VoiceCatalog::new(policy, selected),
            chapter: ChapterContext::default(),
            sentences: Vec::new(),
            position: None,
            status: PlaybackStatus::Idle,
            in_flight: None,
            params,
            auto_advance,
            intent: None,
            pending_resume: None,
            pending_autoplay: None,
            next_generation: 0,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub(crate) fn last_index(&self) -> Option<usize> {
        self.sentences.len().checked_sub(1)
    }

    /// Back to the start of the current sequence.
    pub(crate) fn reset_position(&mut self) {
        self.position = if self.is_empty() { None } else { Some(0) };
    }

    pub(crate) fn next_generation(&mut self) -> u64 {
        self.next_generation = self.next_generation.wrapping_add(1);
        self.next_generation
    }

    /// Move the cursor and run the auto-resume guard once for this change.
    pub(crate) fn change_position(&mut self, target: usize, reason: TransitionReason) -> Vec<Effect> {
        let clamped = target.min(self.last_index().unwrap_or(0));
        debug!(from = ?self.position, to = clamped, ?reason, "Position changed");
        self.position = Some(clamped);
        self.intent = Some(reason);
        self.auto_resume_guard()
    }

    /// Re-trigger playback after a position change that invalidated the
    /// submitted utterance. Natural progression and chapter autoplay start
    /// their own utterance and are excluded here.
    fn auto_resume_guard(&mut self) -> Vec<Effect> {
        let reason = self.intent.take();
        let wants_resume = self.status == PlaybackStatus::Playing
            && reason == Some(TransitionReason::Manual)
            && self.pending_autoplay.is_none();
        if !wants_resume {
            return Vec::new();
        }
        let generation = self.next_generation();
        self.pending_resume = Some(generation);
        debug!(
            generation,
            delay_ms = self.timing.auto_resume_delay.as_millis() as u64,
            "Scheduling auto-resume for new position"
        );
        vec![Effect::Schedule {
            after: self.timing.auto_resume_delay,
            timer: Timer::AutoResume { generation },
        }]
    }

    /// Cancel whatever the device is doing and forget the in-flight utterance.
    pub(crate) fn cancel_in_flight(&mut self) {
        self.device.cancel();
        if let Some(in_flight) = self.in_flight.take() {
            debug!(id = %in_flight.id, "Cancelled in-flight utterance");
        }
    }

    /// Build and submit the utterance for the current position.
    pub(crate) fn speak_current(&mut self) {
        let Some(last) = self.last_index() else {
            return;
        };
        let position = self.position.unwrap_or(0).min(last);
        self.position = Some(position);
        self.pending_resume = None;

        // The device is shared; never leave an older utterance queued.
        self.cancel_in_flight();

        let id = UtteranceId::next();
        let utterance = Utterance {
            id,
            text: self.sentences[position].clone(),
            voice: self.catalog.resolve(),
            rate: self.params.rate,
            pitch: self.params.pitch,
            volume: self.params.volume,
        };
        debug!(
            %id,
            position,
            chars = utterance.text.len(),
            voice = utterance.voice.as_deref().unwrap_or("<platform default>"),
            "Submitting utterance"
        );
        match self.device.speak(utterance) {
            Ok(()) => {
                self.in_flight = Some(InFlight { id, started: false });
            }
            Err(err) => {
                warn!(%id, position, "Synthesis device rejected utterance: {err:#}");
                self.in_flight = None;
                self.status = PlaybackStatus::Idle;
            }
        }
    }

    pub(crate) fn refresh_voices(&mut self) -> Vec<Effect> {
        let listed = self.device.voices();
        if self.catalog.refresh(listed) {
            vec![Effect::VoicesChanged {
                count: self.catalog.all().len(),
            }]
        } else {
            Vec::new()
        }
    }

    pub(crate) fn persist_f32(&mut self, key: &str, value: f32) {
        self.prefs.set(key, &value.to_string());
    }

    pub(crate) fn persist_voice(&mut self) {
        match self.catalog.selected().map(str::to_string) {
            Some(id) => self.prefs.set(VOICE_ID_KEY, &id),
            None => self.prefs.remove(VOICE_ID_KEY),
        }
    }

    pub(crate) fn persist_auto_advance(&mut self) {
        let value = if self.auto_advance { "true" } else { "false" };
        self.prefs.set(AUTO_NEXT_KEY, value);
    }

    /// Mandatory teardown: nothing may keep speaking once the page is gone.
    pub(crate) fn shutdown(&mut self) {
        self.cancel_in_flight();
        self.status = PlaybackStatus::Idle;
        self.pending_resume = None;
        self.pending_autoplay = None;
        self.intent = None;
    }
}

impl<D: SynthesisDevice, P: PreferenceStore> Drop for PlaybackEngine<D, P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
