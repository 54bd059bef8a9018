use super::defaults;
use super::models::{AppConfig, LogLevel};
use serde::Deserialize;

/// On-disk shape of `config.toml`: one table per concern.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    tts: TtsConfig,
    #[serde(default)]
    voices: VoicesConfig,
    #[serde(default)]
    timing: TimingConfig,
    #[serde(default)]
    piper: PiperConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    keys: KeysConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            tts_rate: tables.tts.rate,
            tts_pitch: tables.tts.pitch,
            tts_volume: tables.tts.volume,
            auto_next: tables.tts.auto_next,
            target_language: tables.tts.target_language,
            voice: tables.tts.voice,
            fallback_languages: tables.voices.fallback_languages,
            quality_markers: tables.voices.quality_markers,
            max_voice_candidates: tables.voices.max_candidates,
            voice_refresh_after_ms: tables.voices.refresh_after_ms,
            auto_resume_delay_ms: tables.timing.auto_resume_delay_ms,
            chapter_autoplay_delay_ms: tables.timing.chapter_autoplay_delay_ms,
            voices_dir: tables.piper.voices_dir,
            espeak_path: tables.piper.espeak_path,
            cache_dir: tables.piper.cache_dir,
            log_level: tables.logging.log_level,
            key_toggle_play_pause: tables.keys.toggle_play_pause,
            key_stop: tables.keys.stop,
            key_next_sentence: tables.keys.next_sentence,
            key_prev_sentence: tables.keys.prev_sentence,
            key_toggle_auto_next: tables.keys.toggle_auto_next,
            key_safe_quit: tables.keys.safe_quit,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            tts: TtsConfig {
                rate: config.tts_rate,
                pitch: config.tts_pitch,
                volume: config.tts_volume,
                auto_next: config.auto_next,
                target_language: config.target_language.clone(),
                voice: config.voice.clone(),
            },
            voices: VoicesConfig {
                fallback_languages: config.fallback_languages.clone(),
                quality_markers: config.quality_markers.clone(),
                max_candidates: config.max_voice_candidates,
                refresh_after_ms: config.voice_refresh_after_ms.clone(),
            },
            timing: TimingConfig {
                auto_resume_delay_ms: config.auto_resume_delay_ms,
                chapter_autoplay_delay_ms: config.chapter_autoplay_delay_ms,
            },
            piper: PiperConfig {
                voices_dir: config.voices_dir.clone(),
                espeak_path: config.espeak_path.clone(),
                cache_dir: config.cache_dir.clone(),
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
            keys: KeysConfig {
                toggle_play_pause: config.key_toggle_play_pause.clone(),
                stop: config.key_stop.clone(),
                next_sentence: config.key_next_sentence.clone(),
                prev_sentence: config.key_prev_sentence.clone(),
                toggle_auto_next: config.key_toggle_auto_next.clone(),
                safe_quit: config.key_safe_quit.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct TtsConfig {
    #[serde(default = "defaults::default_tts_rate")]
    rate: f32,
    #[serde(default = "defaults::default_tts_pitch")]
    pitch: f32,
    #[serde(default = "defaults::default_tts_volume")]
    volume: f32,
    #[serde(default = "defaults::default_auto_next")]
    auto_next: bool,
    #[serde(default = "defaults::default_target_language")]
    target_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    voice: Option<String>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        TtsConfig {
            rate: defaults::default_tts_rate(),
            pitch: defaults::default_tts_pitch(),
            volume: defaults::default_tts_volume(),
            auto_next: defaults::default_auto_next(),
            target_language: defaults::default_target_language(),
            voice: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct VoicesConfig {
    #[serde(default = "defaults::default_fallback_languages")]
    fallback_languages: Vec<String>,
    #[serde(default = "defaults::default_quality_markers")]
    quality_markers: Vec<String>,
    #[serde(default = "defaults::default_max_voice_candidates")]
    max_candidates: usize,
    #[serde(default = "defaults::default_voice_refresh_after_ms")]
    refresh_after_ms: Vec<u64>,
}

impl Default for VoicesConfig {
    fn default() -> Self {
        VoicesConfig {
            fallback_languages: defaults::default_fallback_languages(),
            quality_markers: defaults::default_quality_markers(),
            max_candidates: defaults::default_max_voice_candidates(),
            refresh_after_ms: defaults::default_voice_refresh_after_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct TimingConfig {
    #[serde(default = "defaults::default_auto_resume_delay_ms")]
    auto_resume_delay_ms: u64,
    #[serde(default = "defaults::default_chapter_autoplay_delay_ms")]
    chapter_autoplay_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            auto_resume_delay_ms: defaults::default_auto_resume_delay_ms(),
            chapter_autoplay_delay_ms: defaults::default_chapter_autoplay_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct PiperConfig {
    #[serde(default = "defaults::default_voices_dir")]
    voices_dir: String,
    #[serde(default = "defaults::default_espeak_path")]
    espeak_path: String,
    #[serde(default = "defaults::default_cache_dir")]
    cache_dir: String,
}

impl Default for PiperConfig {
    fn default() -> Self {
        PiperConfig {
            voices_dir: defaults::default_voices_dir(),
            espeak_path: defaults::default_espeak_path(),
            cache_dir: defaults::default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct KeysConfig {
    #[serde(default = "defaults::default_key_toggle_play_pause")]
    toggle_play_pause: String,
    #[serde(default = "defaults::default_key_stop")]
    stop: String,
    #[serde(default = "defaults::default_key_next_sentence")]
    next_sentence: String,
    #[serde(default = "defaults::default_key_prev_sentence")]
    prev_sentence: String,
    #[serde(default = "defaults::default_key_toggle_auto_next")]
    toggle_auto_next: String,
    #[serde(default = "defaults::default_key_safe_quit")]
    safe_quit: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        KeysConfig {
            toggle_play_pause: defaults::default_key_toggle_play_pause(),
            stop: defaults::default_key_stop(),
            next_sentence: defaults::default_key_next_sentence(),
            prev_sentence: defaults::default_key_prev_sentence(),
            toggle_auto_next: defaults::default_key_toggle_auto_next(),
            safe_quit: defaults::default_key_safe_quit(),
        }
    }
}
