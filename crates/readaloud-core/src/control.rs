//! Public command surface bound by UI layers.
//!
//! `ReadAloud` is one chapter page's playback instance. Every method returns
//! the effects the host must run; nothing here returns an error. The UI reads
//! state back through the accessors or [`ReadAloud::snapshot`].

use crate::bridge::ChapterContext;
use crate::config::AppConfig;
use crate::device::{DeviceEvent, SynthesisDevice};
use crate::effects::{Effect, Timer};
use crate::engine::{PlaybackEngine, PlaybackParams, PlaybackStatus};
use crate::prefs::PreferenceStore;
use crate::voices::VoiceDescriptor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "command", rename_all = "snake_case")]
#[ts(export)]
pub enum Command {
    Play,
    Pause,
    TogglePlayPause,
    Stop,
    Next,
    Previous,
    SetVoice { voice_id: Option<String> },
    SetRate { rate: f32 },
    SetPitch { pitch: f32 },
    SetVolume { volume: f32 },
    ToggleAutoNext,
}

impl Command {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Play => "tts_play",
            Self::Pause => "tts_pause",
            Self::TogglePlayPause => "tts_toggle_play_pause",
            Self::Stop => "tts_stop",
            Self::Next => "tts_next",
            Self::Previous => "tts_previous",
            Self::SetVoice { .. } => "tts_set_voice",
            Self::SetRate { .. } => "tts_set_rate",
            Self::SetPitch { .. } => "tts_set_pitch",
            Self::SetVolume { .. } => "tts_set_volume",
            Self::ToggleAutoNext => "tts_toggle_auto_next",
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct PlaybackSnapshot {
    pub chapter_id: String,
    pub previous_chapter_id: Option<String>,
    pub next_chapter_id: Option<String>,
    pub status: PlaybackStatus,
    pub position: Option<usize>,
    pub sentence_count: usize,
    pub current_sentence: Option<String>,
    pub awaiting_start: bool,
    pub can_seek_prev: bool,
    pub can_seek_next: bool,
    pub progress_pct: f64,
    pub params: PlaybackParams,
    pub auto_advance: bool,
    pub voices: Vec<VoiceDescriptor>,
    pub selected_voice: Option<String>,
}

pub struct ReadAloud<D: SynthesisDevice, P: PreferenceStore> {
    engine: PlaybackEngine<D, P>,
}

impl<D: SynthesisDevice, P: PreferenceStore> ReadAloud<D, P> {
    pub fn new(device: D, prefs: P, config: &AppConfig) -> Self {
        Self {
            engine: PlaybackEngine::new(device, prefs, config),
        }
    }

    /// Query the voice list now and schedule the follow-up re-queries.
    pub fn start(&mut self) -> Vec<Effect> {
        self.engine.start()
    }

    pub fn load_chapter(&mut self, context: ChapterContext, content: &str) -> Vec<Effect> {
        self.engine.load_chapter(context, content)
    }

    pub fn apply_command(&mut self, command: Command) -> Vec<Effect> {
        debug!(action = command.action(), "Applying playback command");
        match command {
            Command::Play => self.engine.handle_play(),
            Command::Pause => self.engine.handle_pause(),
            Command::TogglePlayPause => self.engine.handle_toggle_play_pause(),
            Command::Stop => self.engine.handle_stop(),
            Command::Next => self.engine.handle_seek(true),
            Command::Previous => self.engine.handle_seek(false),
            Command::SetVoice { voice_id } => self.engine.handle_set_voice(voice_id),
            Command::SetRate { rate } => self.engine.handle_set_rate(rate),
            Command::SetPitch { pitch } => self.engine.handle_set_pitch(pitch),
            Command::SetVolume { volume } => self.engine.handle_set_volume(volume),
            Command::ToggleAutoNext => self.engine.handle_toggle_auto_next(),
        }
    }

    pub fn play(&mut self) -> Vec<Effect> {
        self.apply_command(Command::Play)
    }

    pub fn pause(&mut self) -> Vec<Effect> {
        self.apply_command(Command::Pause)
    }

    pub fn toggle_play_pause(&mut self) -> Vec<Effect> {
        self.apply_command(Command::TogglePlayPause)
    }

    pub fn stop(&mut self) -> Vec<Effect> {
        self.apply_command(Command::Stop)
    }

    pub fn next(&mut self) -> Vec<Effect> {
        self.apply_command(Command::Next)
    }

    pub fn previous(&mut self) -> Vec<Effect> {
        self.apply_command(Command::Previous)
    }

    pub fn set_voice(&mut self, voice_id: Option<String>) -> Vec<Effect> {
        self.apply_command(Command::SetVoice { voice_id })
    }

    pub fn set_rate(&mut self, rate: f32) -> Vec<Effect> {
        self.apply_command(Command::SetRate { rate })
    }

    pub fn set_pitch(&mut self, pitch: f32) -> Vec<Effect> {
        self.apply_command(Command::SetPitch { pitch })
    }

    pub fn set_volume(&mut self, volume: f32) -> Vec<Effect> {
        self.apply_command(Command::SetVolume { volume })
    }

    pub fn toggle_auto_next(&mut self) -> Vec<Effect> {
        self.apply_command(Command::ToggleAutoNext)
    }

    pub fn on_device_event(&mut self, event: DeviceEvent) -> Vec<Effect> {
        self.engine.handle_device_event(event)
    }

    pub fn on_timer(&mut self, timer: Timer) -> Vec<Effect> {
        self.engine.handle_timer(timer)
    }

    /// Cancel the device before the page goes away. Also runs on drop.
    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }

    pub fn status(&self) -> PlaybackStatus {
        self.engine.status
    }

    pub fn position(&self) -> Option<usize> {
        self.engine.position
    }

    pub fn sentence_count(&self) -> usize {
        self.engine.sentences.len()
    }

    pub fn sentences(&self) -> &[String] {
        &self.engine.sentences
    }

    pub fn current_sentence(&self) -> Option<&str> {
        self.engine
            .position
            .and_then(|idx| self.engine.sentences.get(idx))
            .map(String::as_str)
    }

    /// An utterance was submitted and the device has not confirmed its start.
    pub fn is_awaiting_start(&self) -> bool {
        self.engine
            .in_flight
            .is_some_and(|in_flight| !in_flight.started)
    }

    pub fn params(&self) -> PlaybackParams {
        self.engine.params
    }

    pub fn rate(&self) -> f32 {
        self.engine.params.rate
    }

    pub fn pitch(&self) -> f32 {
        self.engine.params.pitch
    }

    pub fn volume(&self) -> f32 {
        self.engine.params.volume
    }

    pub fn auto_advance(&self) -> bool {
        self.engine.auto_advance
    }

    /// Ranked voices for the voice picker.
    pub fn voices(&self) -> Vec<VoiceDescriptor> {
        self.engine.catalog.list()
    }

    pub fn selected_voice(&self) -> Option<&str> {
        self.engine.catalog.selected()
    }

    /// Bumped whenever the platform voice list changes.
    pub fn voice_revision(&self) -> u64 {
        self.engine.catalog.revision()
    }

    pub fn chapter(&self) -> &ChapterContext {
        &self.engine.chapter
    }

    pub fn device(&self) -> &D {
        &self.engine.device
    }

    pub fn preferences(&self) -> &P {
        &self.engine.prefs
    }

    #[cfg(test)]
    pub(crate) fn device_mut(&mut self) -> &mut D {
        &mut self.engine.device
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let count = self.sentence_count();
        let position = self.position();
        let progress_pct = match position {
            Some(idx) if count > 0 => (idx as f64 / count as f64) * 100.0,
            _ => 0.0,
        };
        PlaybackSnapshot {
            chapter_id: self.engine.chapter.chapter_id.clone(),
            previous_chapter_id: self.engine.chapter.previous_chapter_id.clone(),
            next_chapter_id: self.engine.chapter.next_chapter_id.clone(),
            status: self.status(),
            position,
            sentence_count: count,
            current_sentence: self.current_sentence().map(str::to_string),
            awaiting_start: self.is_awaiting_start(),
            can_seek_prev: position.is_some_and(|idx| idx > 0),
            can_seek_next: position.is_some_and(|idx| idx + 1 < count),
            progress_pct,
            params: self.params(),
            auto_advance: self.auto_advance(),
            voices: self.voices(),
            selected_voice: self.selected_voice().map(str::to_string),
        }
    }
}

fn export_single_type<T: TS + 'static>(out_dir: &Path) -> Result<(), String> {
    T::export_all_to(out_dir).map_err(|err| err.to_string())
}

/// Write TypeScript declarations for the UI-facing types into `out_dir`.
pub fn export_ts_bindings(out_dir: &Path) -> Result<(), String> {
    fs::create_dir_all(out_dir)
        .map_err(|err| format!("Failed to create {}: {err}", out_dir.display()))?;

    for entry in fs::read_dir(out_dir)
        .map_err(|err| format!("Failed to list {}: {err}", out_dir.display()))?
    {
        let entry = entry.map_err(|err| format!("Failed to read entry: {err}"))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("ts") {
            fs::remove_file(&path)
                .map_err(|err| format!("Failed to remove {}: {err}", path.display()))?;
        }
    }

    export_single_type::<Command>(out_dir)?;
    export_single_type::<PlaybackSnapshot>(out_dir)?;
    export_single_type::<PlaybackStatus>(out_dir)?;
    export_single_type::<PlaybackParams>(out_dir)?;
    export_single_type::<VoiceDescriptor>(out_dir)?;
    export_single_type::<ChapterContext>(out_dir)?;
    export_single_type::<crate::bridge::NavigationRequest>(out_dir)?;
    export_single_type::<crate::segmenter::ContentKind>(out_dir)?;

    let index_content = r#"export type { Command } from "./Command";
export type { PlaybackSnapshot } from "./PlaybackSnapshot";
export type { PlaybackStatus } from "./PlaybackStatus";
export type { PlaybackParams } from "./PlaybackParams";
export type { VoiceDescriptor } from "./VoiceDescriptor";
export type { ChapterContext } from "./ChapterContext";
export type { NavigationRequest } from "./NavigationRequest";
export type { ContentKind } from "./ContentKind";
"#;
    fs::write(out_dir.join("index.ts"), index_content)
        .map_err(|err| format!("Failed to write index.ts: {err}"))?;
    Ok(())
}

#[cfg(test)]
mod tests;
