use super::{
    MAX_PITCH, MAX_RATE, MAX_VOLUME, MIN_PITCH, MIN_RATE, MIN_VOLUME, PlaybackEngine,
    PlaybackStatus, TransitionReason, clamp_or,
};
use crate::device::SynthesisDevice;
use crate::effects::Effect;
use crate::prefs::{PITCH_KEY, PreferenceStore, RATE_KEY, VOLUME_KEY};
use tracing::{debug, info};

impl<D: SynthesisDevice, P: PreferenceStore> PlaybackEngine<D, P> {
    pub(crate) fn handle_play(&mut self) -> Vec<Effect> {
        if self.is_empty() {
            debug!("Play ignored; nothing speakable in this chapter");
            return Vec::new();
        }

        match (self.status, self.in_flight) {
            (PlaybackStatus::Paused, Some(in_flight)) => {
                info!(id = %in_flight.id, position = ?self.position, "Resuming playback");
                self.device.resume();
                self.status = PlaybackStatus::Playing;
            }
            (_, Some(in_flight)) => {
                debug!(
                    id = %in_flight.id,
                    started = in_flight.started,
                    "Play ignored; an utterance is already in flight"
                );
            }
            (status, None) => {
                info!(?status, position = ?self.position, "Starting playback");
                // Seeking while paused dropped the utterance; the fresh one
                // is confirmed by its start callback like any other.
                if status == PlaybackStatus::Paused {
                    self.status = PlaybackStatus::Idle;
                }
                self.speak_current();
            }
        }
        Vec::new()
    }

    pub(crate) fn handle_pause(&mut self) -> Vec<Effect> {
        if self.status != PlaybackStatus::Playing {
            debug!(status = ?self.status, "Pause ignored; playback not confirmed");
            return Vec::new();
        }
        info!(position = ?self.position, "Pausing playback");
        self.device.pause();
        self.status = PlaybackStatus::Paused;
        self.pending_resume = None;
        Vec::new()
    }

    pub(crate) fn handle_toggle_play_pause(&mut self) -> Vec<Effect> {
        if self.status == PlaybackStatus::Playing {
            self.handle_pause()
        } else {
            self.handle_play()
        }
    }

    pub(crate) fn handle_stop(&mut self) -> Vec<Effect> {
        info!(status = ?self.status, "Stopping playback");
        self.cancel_in_flight();
        self.status = PlaybackStatus::Idle;
        self.pending_resume = None;
        self.pending_autoplay = None;
        self.intent = None;
        self.reset_position();
        Vec::new()
    }

    pub(crate) fn handle_seek(&mut self, forward: bool) -> Vec<Effect> {
        let Some(last) = self.last_index() else {
            debug!("Seek ignored; nothing speakable in this chapter");
            return Vec::new();
        };
        let current = self.position.unwrap_or(0);
        let target = if forward {
            (current + 1).min(last)
        } else {
            current.saturating_sub(1)
        };
        if target == current {
            debug!(current, forward, "Seek ignored at sequence bound");
            return Vec::new();
        }

        let awaiting_start = self.status == PlaybackStatus::Idle
            && self.in_flight.is_some_and(|in_flight| !in_flight.started);
        if self.in_flight.is_some() {
            self.cancel_in_flight();
        }
        info!(from = current, to = target, status = ?self.status, "Seeking sentence");
        let effects = self.change_position(target, TransitionReason::Manual);
        if awaiting_start {
            // The play press has not been confirmed yet; carry it over.
            debug!(position = target, "Resubmitting pending play at new position");
            self.speak_current();
        }
        effects
    }

    pub(crate) fn handle_set_voice(&mut self, voice_id: Option<String>) -> Vec<Effect> {
        let voice_id = voice_id.filter(|id| !id.trim().is_empty());
        info!(voice = voice_id.as_deref().unwrap_or("<auto>"), "Selected voice");
        self.catalog.select(voice_id);
        self.persist_voice();
        Vec::new()
    }

    pub(crate) fn handle_set_rate(&mut self, rate: f32) -> Vec<Effect> {
        self.params.rate = clamp_or(rate, MIN_RATE, MAX_RATE, self.params.rate);
        info!(rate = self.params.rate, "Adjusted speech rate");
        self.persist_f32(RATE_KEY, self.params.rate);
        Vec::new()
    }

    pub(crate) fn handle_set_pitch(&mut self, pitch: f32) -> Vec<Effect> {
        self.params.pitch = clamp_or(pitch, MIN_PITCH, MAX_PITCH, self.params.pitch);
        info!(pitch = self.params.pitch, "Adjusted speech pitch");
        self.persist_f32(PITCH_KEY, self.params.pitch);
        Vec::new()
    }

    pub(crate) fn handle_set_volume(&mut self, volume: f32) -> Vec<Effect> {
        self.params.volume = clamp_or(volume, MIN_VOLUME, MAX_VOLUME, self.params.volume);
        info!(volume = self.params.volume, "Adjusted speech volume");
        self.persist_f32(VOLUME_KEY, self.params.volume);
        Vec::new()
    }

    pub(crate) fn handle_toggle_auto_next(&mut self) -> Vec<Effect> {
        self.auto_advance = !self.auto_advance;
        info!(enabled = self.auto_advance, "Toggled auto-advance");
        self.persist_auto_advance();
        Vec::new()
    }
}
