use serde::Deserialize;
use std::time::Duration;

/// High-level runtime configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_tts_rate")]
    pub tts_rate: f32,
    #[serde(default = "crate::config::defaults::default_tts_pitch")]
    pub tts_pitch: f32,
    #[serde(default = "crate::config::defaults::default_tts_volume")]
    pub tts_volume: f32,
    #[serde(default = "crate::config::defaults::default_auto_next")]
    pub auto_next: bool,
    #[serde(default = "crate::config::defaults::default_target_language")]
    pub target_language: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default = "crate::config::defaults::default_fallback_languages")]
    pub fallback_languages: Vec<String>,
    #[serde(default = "crate::config::defaults::default_quality_markers")]
    pub quality_markers: Vec<String>,
    #[serde(default = "crate::config::defaults::default_max_voice_candidates")]
    pub max_voice_candidates: usize,
    #[serde(default = "crate::config::defaults::default_voice_refresh_after_ms")]
    pub voice_refresh_after_ms: Vec<u64>,
    #[serde(default = "crate::config::defaults::default_auto_resume_delay_ms")]
    pub auto_resume_delay_ms: u64,
    #[serde(default = "crate::config::defaults::default_chapter_autoplay_delay_ms")]
    pub chapter_autoplay_delay_ms: u64,
    #[serde(default = "crate::config::defaults::default_voices_dir")]
    pub voices_dir: String,
    #[serde(default = "crate::config::defaults::default_espeak_path")]
    pub espeak_path: String,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_key_toggle_play_pause")]
    pub key_toggle_play_pause: String,
    #[serde(default = "crate::config::defaults::default_key_stop")]
    pub key_stop: String,
    #[serde(default = "crate::config::defaults::default_key_next_sentence")]
    pub key_next_sentence: String,
    #[serde(default = "crate::config::defaults::default_key_prev_sentence")]
    pub key_prev_sentence: String,
    #[serde(default = "crate::config::defaults::default_key_toggle_auto_next")]
    pub key_toggle_auto_next: String,
    #[serde(default = "crate::config::defaults::default_key_safe_quit")]
    pub key_safe_quit: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            tts_rate: crate::config::defaults::default_tts_rate(),
            tts_pitch: crate::config::defaults::default_tts_pitch(),
            tts_volume: crate::config::defaults::default_tts_volume(),
            auto_next: crate::config::defaults::default_auto_next(),
            target_language: crate::config::defaults::default_target_language(),
            voice: None,
            fallback_languages: crate::config::defaults::default_fallback_languages(),
            quality_markers: crate::config::defaults::default_quality_markers(),
            max_voice_candidates: crate::config::defaults::default_max_voice_candidates(),
            voice_refresh_after_ms: crate::config::defaults::default_voice_refresh_after_ms(),
            auto_resume_delay_ms: crate::config::defaults::default_auto_resume_delay_ms(),
            chapter_autoplay_delay_ms: crate::config::defaults::default_chapter_autoplay_delay_ms(),
            voices_dir: crate::config::defaults::default_voices_dir(),
            espeak_path: crate::config::defaults::default_espeak_path(),
            cache_dir: crate::config::defaults::default_cache_dir(),
            log_level: crate::config::defaults::default_log_level(),
            key_toggle_play_pause: crate::config::defaults::default_key_toggle_play_pause(),
            key_stop: crate::config::defaults::default_key_stop(),
            key_next_sentence: crate::config::defaults::default_key_next_sentence(),
            key_prev_sentence: crate::config::defaults::default_key_prev_sentence(),
            key_toggle_auto_next: crate::config::defaults::default_key_toggle_auto_next(),
            key_safe_quit: crate::config::defaults::default_key_safe_quit(),
        }
    }
}

impl AppConfig {
    pub fn auto_resume_delay(&self) -> Duration {
        Duration::from_millis(self.auto_resume_delay_ms)
    }

    /// Never zero: a just-initialised device drops immediate `speak` calls.
    pub fn chapter_autoplay_delay(&self) -> Duration {
        Duration::from_millis(self.chapter_autoplay_delay_ms.max(1))
    }

    pub fn voice_refresh_after(&self) -> Vec<Duration> {
        self.voice_refresh_after_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
