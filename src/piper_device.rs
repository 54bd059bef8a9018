//! Speech synthesis device backed by Piper voices and a rodio sink.
//!
//! Each utterance is synthesized to a WAV file under the cache directory
//! (keyed by voice, text, rate and pitch) and played on its own sink. A
//! single worker thread owns the audio output and reports progress as
//! [`DeviceEvent`]s through the supplied callback.

use crate::cancellation::UtteranceGate;
use anyhow::{Context, Result, anyhow};
use piper_rs::from_config_path;
use piper_rs::synth::{AudioOutputConfig, PiperSpeechSynthesizer};
use readaloud_core::{
    AppConfig, DeviceEvent, MAX_PITCH, MAX_RATE, MIN_PITCH, MIN_RATE, SynthesisDevice, Utterance,
    UtteranceId, VoiceDescriptor,
};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::env;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(40);

pub type EventSink = Box<dyn Fn(DeviceEvent) + Send>;

enum WorkerCommand {
    Speak(Utterance),
    Pause,
    Resume,
    Cancel,
}

/// A Piper voice found on disk.
#[derive(Debug, Clone)]
struct PiperVoice {
    descriptor: VoiceDescriptor,
    model_path: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct PiperVoiceConfig {
    #[serde(default)]
    language: Option<PiperLanguage>,
    #[serde(default)]
    dataset: Option<String>,
    #[serde(default)]
    audio: Option<PiperAudio>,
}

#[derive(Debug, Default, Deserialize)]
struct PiperLanguage {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PiperAudio {
    #[serde(default)]
    quality: Option<String>,
}

/// Cheap handle to the shared device; every chapter page gets a clone.
#[derive(Clone)]
pub struct PiperDevice {
    commands: mpsc::Sender<WorkerCommand>,
    gate: UtteranceGate,
    voices: Arc<Vec<PiperVoice>>,
}

impl PiperDevice {
    pub fn spawn(config: &AppConfig, on_event: EventSink) -> Result<Self> {
        let espeak_path = sanitize_espeak_root(PathBuf::from(&config.espeak_path));
        if env::var_os("PIPER_ESPEAKNG_DATA_DIRECTORY").is_none() {
            // Safe because we set a deterministic value before the worker starts.
            unsafe {
                env::set_var("PIPER_ESPEAKNG_DATA_DIRECTORY", &espeak_path);
            }
        }

        let voices = Arc::new(scan_voices(Path::new(&config.voices_dir)));
        let cache_root = Path::new(&config.cache_dir).join("tts");
        info!(
            voices_dir = %config.voices_dir,
            espeak_root = %espeak_path.display(),
            cache = %cache_root.display(),
            voices = voices.len(),
            "Initializing Piper speech device"
        );

        let (commands, inbox) = mpsc::channel();
        let gate = UtteranceGate::new();
        let worker_gate = gate.clone();
        let worker_voices = Arc::clone(&voices);
        thread::Builder::new()
            .name("piper-audio".to_string())
            .spawn(move || {
                AudioWorker {
                    inbox,
                    gate: worker_gate,
                    voices: worker_voices,
                    cache_root,
                    on_event,
                    synthesizers: HashMap::new(),
                    current: None,
                }
                .run()
            })
            .context("Spawning audio worker thread")?;

        Ok(Self {
            commands,
            gate,
            voices,
        })
    }

    fn send(&self, command: WorkerCommand) {
        if self.commands.send(command).is_err() {
            warn!("Audio worker is gone; dropping device command");
        }
    }
}

impl SynthesisDevice for PiperDevice {
    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        self.gate.open(utterance.id);
        self.commands
            .send(WorkerCommand::Speak(utterance))
            .map_err(|_| anyhow!("audio worker stopped"))
    }

    fn pause(&mut self) {
        self.send(WorkerCommand::Pause);
    }

    fn resume(&mut self) {
        self.send(WorkerCommand::Resume);
    }

    fn cancel(&mut self) {
        self.gate.close();
        self.send(WorkerCommand::Cancel);
    }

    fn voices(&self) -> Vec<VoiceDescriptor> {
        self.voices
            .iter()
            .map(|voice| voice.descriptor.clone())
            .collect()
    }
}

struct Playing {
    id: UtteranceId,
    sink: Sink,
}

struct AudioWorker {
    inbox: mpsc::Receiver<WorkerCommand>,
    gate: UtteranceGate,
    voices: Arc<Vec<PiperVoice>>,
    cache_root: PathBuf,
    on_event: EventSink,
    synthesizers: HashMap<PathBuf, PiperSpeechSynthesizer>,
    current: Option<Playing>,
}

impl AudioWorker {
    fn run(mut self) {
        // The output stream must stay on the thread that opened it.
        let output = match OutputStream::try_default() {
            Ok(output) => Some(output),
            Err(err) => {
                warn!("Failed to open audio output; speech will fail: {err}");
                None
            }
        };
        let handle = output.as_ref().map(|(_, handle)| handle.clone());

        loop {
            match self.inbox.recv_timeout(POLL_INTERVAL) {
                Ok(WorkerCommand::Speak(utterance)) => self.speak(utterance, handle.as_ref()),
                Ok(WorkerCommand::Pause) => {
                    if let Some(playing) = &self.current {
                        debug!(id = %playing.id, "Pausing audio");
                        playing.sink.pause();
                    }
                }
                Ok(WorkerCommand::Resume) => {
                    if let Some(playing) = &self.current {
                        debug!(id = %playing.id, "Resuming audio");
                        playing.sink.play();
                    }
                }
                Ok(WorkerCommand::Cancel) => self.stop_current(),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    self.stop_current();
                    debug!("Device handles dropped; audio worker exiting");
                    break;
                }
            }
            self.poll_finished();
        }
    }

    fn emit(&self, event: DeviceEvent) {
        (self.on_event)(event);
    }

    fn stop_current(&mut self) {
        if let Some(playing) = self.current.take() {
            debug!(id = %playing.id, "Stopping audio");
            playing.sink.stop();
            self.emit(DeviceEvent::Failed {
                id: playing.id,
                reason: "interrupted".to_string(),
            });
        }
    }

    fn poll_finished(&mut self) {
        let finished = self
            .current
            .as_ref()
            .is_some_and(|playing| !playing.sink.is_paused() && playing.sink.empty());
        if !finished {
            return;
        }
        if let Some(playing) = self.current.take() {
            debug!(id = %playing.id, "Utterance finished");
            self.emit(DeviceEvent::Ended(playing.id));
        }
    }

    fn speak(&mut self, utterance: Utterance, handle: Option<&OutputStreamHandle>) {
        let id = utterance.id;
        self.stop_current();
        match self.start(utterance, handle) {
            Ok(sink) => {
                self.current = Some(Playing { id, sink });
                self.emit(DeviceEvent::Started(id));
            }
            Err(err) => {
                let reason = if self.gate.is_open_for(id) {
                    warn!(%id, "Speech synthesis failed: {err:#}");
                    "synthesis-failed".to_string()
                } else {
                    debug!(%id, "Utterance cancelled before playback: {err:#}");
                    "interrupted".to_string()
                };
                self.emit(DeviceEvent::Failed { id, reason });
            }
        }
    }

    fn start(&mut self, utterance: Utterance, handle: Option<&OutputStreamHandle>) -> Result<Sink> {
        self.gate.check_open(utterance.id, "queued")?;
        let handle = handle.ok_or_else(|| anyhow!("audio output unavailable"))?;
        let voice = self.voice_for(utterance.voice.as_deref())?;
        let path = cache_path(
            &self.cache_root,
            &voice.model_path,
            &utterance.text,
            utterance.rate,
            utterance.pitch,
        );

        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Creating TTS cache directory")?;
            }
            let piper = self.synthesizer(&voice.model_path)?;
            synth_with_piper(piper, &path, &utterance)?;
        } else {
            debug!(path = %path.display(), "Using cached utterance audio");
        }
        self.gate.check_open(utterance.id, "synthesized")?;

        let reader = BufReader::new(
            File::open(&path).with_context(|| format!("Opening {}", path.display()))?,
        );
        let source = Decoder::new(reader).context("Decoding synthesized audio")?;
        let sink = Sink::try_new(handle).context("Creating sink")?;
        sink.set_volume(utterance.volume);
        sink.append(source);
        sink.play();
        Ok(sink)
    }

    /// Requested voice, or the first installed one as the platform default.
    fn voice_for(&self, requested: Option<&str>) -> Result<PiperVoice> {
        let found = requested
            .and_then(|id| self.voices.iter().find(|voice| voice.descriptor.id == id))
            .or_else(|| self.voices.first());
        found
            .cloned()
            .ok_or_else(|| anyhow!("no Piper voices installed"))
    }

    fn synthesizer(&mut self, model_path: &Path) -> Result<&PiperSpeechSynthesizer> {
        if !self.synthesizers.contains_key(model_path) {
            let config_path = resolve_piper_config(model_path);
            info!(model = %model_path.display(), "Loading Piper voice");
            let model = from_config_path(&config_path).context("Loading Piper model")?;
            let piper = PiperSpeechSynthesizer::new(model).context("Preparing Piper synthesizer")?;
            self.synthesizers.insert(model_path.to_path_buf(), piper);
        }
        self.synthesizers
            .get(model_path)
            .ok_or_else(|| anyhow!("Piper synthesizer missing for {}", model_path.display()))
    }
}

fn synth_with_piper(piper: &PiperSpeechSynthesizer, path: &Path, utterance: &Utterance) -> Result<()> {
    debug!(
        id = %utterance.id,
        path = %path.display(),
        rate = utterance.rate,
        pitch = utterance.pitch,
        chars = utterance.text.len(),
        "Synthesizing utterance with Piper"
    );
    let neutral = (utterance.rate - 1.0).abs() <= f32::EPSILON
        && (utterance.pitch - 1.0).abs() <= f32::EPSILON;
    let output_config = if neutral {
        None
    } else {
        Some(AudioOutputConfig {
            rate: Some(to_percent(utterance.rate, MIN_RATE, MAX_RATE)),
            volume: None,
            pitch: Some(to_percent(utterance.pitch, MIN_PITCH, MAX_PITCH)),
            appended_silence_ms: None,
        })
    };
    piper
        .synthesize_to_file(path, utterance.text.clone(), output_config)
        .context("Synthesizing audio")?;
    Ok(())
}

/// Map a parameter range onto Piper's 0-100 percentage scale.
fn to_percent(value: f32, min: f32, max: f32) -> u8 {
    let clamped = value.clamp(min, max);
    let percent = ((clamped - min) / (max - min)) * 100.0;
    percent.round().clamp(0.0, 100.0) as u8
}

fn cache_path(base: &Path, model_path: &Path, text: &str, rate: f32, pitch: f32) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(model_path.as_os_str().to_string_lossy().as_bytes());
    hasher.update(text.as_bytes());
    hasher.update(rate.to_le_bytes());
    hasher.update(pitch.to_le_bytes());
    let hash = format!("{:x}", hasher.finalize());
    base.join(format!("utt-{hash}.wav"))
}

fn resolve_piper_config(model_path: &Path) -> PathBuf {
    if model_path.extension().is_some_and(|ext| ext == "onnx") {
        return model_path.with_extension("onnx.json");
    }
    model_path.to_path_buf()
}

/// Piper expects the directory that contains `espeak-ng-data`, not the data
/// directory itself.
fn sanitize_espeak_root(path: PathBuf) -> PathBuf {
    if path.file_name().is_some_and(|name| name == "espeak-ng-data") {
        if let Some(parent) = path.parent() {
            return parent.to_path_buf();
        }
    }
    path
}

/// Every `*.onnx` model in `dir` that ships its `.onnx.json` config.
fn scan_voices(dir: &Path) -> Vec<PiperVoice> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), "Failed to list Piper voices: {err}");
            return Vec::new();
        }
    };
    let mut models: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "onnx"))
        .collect();
    models.sort();

    models
        .into_iter()
        .filter_map(|model_path| match describe_voice(&model_path) {
            Ok(descriptor) => Some(PiperVoice {
                descriptor,
                model_path,
            }),
            Err(err) => {
                warn!(model = %model_path.display(), "Skipping Piper voice: {err:#}");
                None
            }
        })
        .collect()
}

fn describe_voice(model_path: &Path) -> Result<VoiceDescriptor> {
    let config_path = resolve_piper_config(model_path);
    let data = fs::read_to_string(&config_path)
        .with_context(|| format!("Reading {}", config_path.display()))?;
    let config: PiperVoiceConfig = serde_json::from_str(&data)
        .with_context(|| format!("Parsing {}", config_path.display()))?;
    Ok(voice_descriptor(model_path, config))
}

fn voice_descriptor(model_path: &Path, config: PiperVoiceConfig) -> VoiceDescriptor {
    let id = model_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let language = config
        .language
        .and_then(|language| language.code)
        .unwrap_or_else(|| id.split('-').next().unwrap_or_default().to_string());
    let dataset = config.dataset.unwrap_or_else(|| id.clone());
    let display_name = match config.audio.and_then(|audio| audio.quality) {
        Some(quality) => format!("{dataset} ({quality})"),
        None => dataset,
    };
    VoiceDescriptor::new(id, display_name, language, true)
}
