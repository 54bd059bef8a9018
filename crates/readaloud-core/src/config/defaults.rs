pub(crate) fn default_tts_rate() -> f32 {
    1.0
}

pub(crate) fn default_tts_pitch() -> f32 {
    1.0
}

pub(crate) fn default_tts_volume() -> f32 {
    1.0
}

pub(crate) fn default_auto_next() -> bool {
    true
}

pub(crate) fn default_target_language() -> String {
    "vi".to_string()
}

pub(crate) fn default_fallback_languages() -> Vec<String> {
    vec!["en".to_string(), "zh".to_string()]
}

pub(crate) fn default_quality_markers() -> Vec<String> {
    vec![
        "neural".to_string(),
        "premium".to_string(),
        "natural".to_string(),
    ]
}

pub(crate) fn default_max_voice_candidates() -> usize {
    10
}

pub(crate) fn default_voice_refresh_after_ms() -> Vec<u64> {
    vec![100, 1000]
}

pub(crate) fn default_auto_resume_delay_ms() -> u64 {
    100
}

pub(crate) fn default_chapter_autoplay_delay_ms() -> u64 {
    300
}

pub(crate) fn default_voices_dir() -> String {
    "/usr/share/piper-voices".to_string()
}

pub(crate) fn default_espeak_path() -> String {
    "/usr/share".to_string()
}

pub(crate) fn default_cache_dir() -> String {
    ".cache".to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}

pub(crate) fn default_key_toggle_play_pause() -> String {
    "space".to_string()
}

pub(crate) fn default_key_stop() -> String {
    "x".to_string()
}

pub(crate) fn default_key_next_sentence() -> String {
    "f".to_string()
}

pub(crate) fn default_key_prev_sentence() -> String {
    "s".to_string()
}

pub(crate) fn default_key_toggle_auto_next() -> String {
    "a".to_string()
}

pub(crate) fn default_key_safe_quit() -> String {
    "q".to_string()
}
