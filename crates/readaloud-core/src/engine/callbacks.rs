use super::{PlaybackEngine, PlaybackStatus, TransitionReason};
use crate::device::{DeviceEvent, SynthesisDevice, UtteranceId};
use crate::effects::{Effect, Timer};
use crate::prefs::PreferenceStore;
use tracing::{debug, info, warn};

impl<D: SynthesisDevice, P: PreferenceStore> PlaybackEngine<D, P> {
    pub(crate) fn handle_device_event(&mut self, event: DeviceEvent) -> Vec<Effect> {
        match event {
            DeviceEvent::Started(id) => self.on_started(id),
            DeviceEvent::Ended(id) => self.on_ended(id),
            DeviceEvent::Failed { id, reason } => self.on_failed(id, &reason),
            DeviceEvent::VoicesChanged => self.refresh_voices(),
        }
    }

    pub(crate) fn handle_timer(&mut self, timer: Timer) -> Vec<Effect> {
        match timer {
            Timer::AutoResume { generation } => self.on_auto_resume(generation),
            Timer::ChapterAutoplay { generation } => self.on_chapter_autoplay(generation),
            Timer::VoiceRefresh { attempt } => self.on_voice_refresh(attempt),
        }
    }

    /// Callbacks for anything but the in-flight utterance are leftovers from
    /// a cancel (the platform reports those as interruptions) and are dropped.
    fn is_current(&self, id: UtteranceId, callback: &'static str) -> bool {
        let current = self.in_flight.map(|in_flight| in_flight.id);
        if current == Some(id) {
            return true;
        }
        debug!(%id, ?current, callback, "Ignoring stale device callback");
        false
    }

    fn on_started(&mut self, id: UtteranceId) -> Vec<Effect> {
        if !self.is_current(id, "started") {
            return Vec::new();
        }
        if let Some(in_flight) = self.in_flight.as_mut() {
            in_flight.started = true;
        }
        match self.status {
            PlaybackStatus::Playing => debug!(%id, "Start confirmed; already playing"),
            // Paused between submission and start; the device holds it paused.
            PlaybackStatus::Paused => debug!(%id, "Start reported while paused"),
            PlaybackStatus::Idle => {
                info!(%id, position = ?self.position, "Playback started");
                self.status = PlaybackStatus::Playing;
            }
        }
        Vec::new()
    }

    fn on_ended(&mut self, id: UtteranceId) -> Vec<Effect> {
        if !self.is_current(id, "ended") {
            return Vec::new();
        }
        self.in_flight = None;

        let current = self.position.unwrap_or(0);
        let next = current + 1;
        if next < self.sentences.len() {
            // The guard consumes the Natural marker and schedules nothing;
            // continuation happens right here.
            let effects = self.change_position(next, TransitionReason::Natural);
            if self.status == PlaybackStatus::Paused {
                // Finished just as the pause landed; play() submits the new
                // sentence.
                debug!(position = next, "Utterance ended while paused; holding");
                return effects;
            }
            if self.status == PlaybackStatus::Idle {
                self.status = PlaybackStatus::Playing;
            }
            self.speak_current();
            return effects;
        }

        debug!(last = current, "Reached end of chapter");
        self.intent = Some(TransitionReason::Natural);
        self.finish_chapter()
    }

    fn on_failed(&mut self, id: UtteranceId, reason: &str) -> Vec<Effect> {
        if !self.is_current(id, "failed") {
            return Vec::new();
        }
        warn!(
            %id,
            position = ?self.position,
            reason,
            "Synthesis failed; playback stopped at current sentence"
        );
        self.in_flight = None;
        self.status = PlaybackStatus::Idle;
        self.pending_resume = None;
        Vec::new()
    }

    fn on_auto_resume(&mut self, generation: u64) -> Vec<Effect> {
        if self.pending_resume != Some(generation) {
            debug!(generation, pending = ?self.pending_resume, "Ignoring superseded auto-resume");
            return Vec::new();
        }
        self.pending_resume = None;
        if self.status != PlaybackStatus::Playing || self.in_flight.is_some() {
            debug!(
                status = ?self.status,
                in_flight = self.in_flight.is_some(),
                "Auto-resume no longer applies"
            );
            return Vec::new();
        }
        info!(position = ?self.position, "Resuming playback at new position");
        self.speak_current();
        Vec::new()
    }

    fn on_voice_refresh(&mut self, attempt: usize) -> Vec<Effect> {
        debug!(attempt, "Re-querying platform voices");
        let mut effects = self.refresh_voices();
        effects.extend(self.schedule_voice_refresh(attempt + 1));
        effects
    }

    pub(crate) fn schedule_voice_refresh(&self, attempt: usize) -> Vec<Effect> {
        match self.timing.voice_refresh.delay_for(attempt) {
            Some(after) => vec![Effect::Schedule {
                after,
                timer: Timer::VoiceRefresh { attempt },
            }],
            None => Vec::new(),
        }
    }

    /// Initial voice query plus the re-query schedule.
    pub(crate) fn start(&mut self) -> Vec<Effect> {
        let mut effects = self.refresh_voices();
        effects.extend(self.schedule_voice_refresh(0));
        effects
    }
}
