//! Voice catalog: ranks the platform's voices for the story's language.
//!
//! The platform may report zero voices on the first query and fill its list
//! later, so the catalog is refreshed on a fixed retry schedule and whenever
//! the device signals a change.

use crate::config::AppConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VoiceDescriptor {
    pub id: String,
    pub display_name: String,
    pub language_tag: String,
    pub is_local: bool,
}

impl VoiceDescriptor {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        language_tag: impl Into<String>,
        is_local: bool,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            language_tag: language_tag.into(),
            is_local,
        }
    }
}

/// Delays after start-up at which the voice list is queried again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub retry_after: Vec<Duration>,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            retry_after: vec![Duration::from_millis(100), Duration::from_millis(1000)],
        }
    }
}

impl RefreshPolicy {
    /// Delay before refresh `attempt`, if the schedule has one.
    pub fn delay_for(&self, attempt: usize) -> Option<Duration> {
        self.retry_after.get(attempt).copied()
    }
}

/// Selection policy knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePolicy {
    pub target_language: String,
    pub fallback_languages: Vec<String>,
    pub quality_markers: Vec<String>,
    pub max_candidates: usize,
}

impl Default for VoicePolicy {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl VoicePolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            target_language: config.target_language.clone(),
            fallback_languages: config.fallback_languages.clone(),
            quality_markers: config.quality_markers.clone(),
            max_candidates: config.max_voice_candidates.max(1),
        }
    }

    /// Voices worth offering, best first.
    pub fn candidates<'a>(&self, voices: &'a [VoiceDescriptor]) -> Vec<&'a VoiceDescriptor> {
        let native: Vec<_> = voices
            .iter()
            .filter(|voice| language_matches(&voice.language_tag, &self.target_language))
            .collect();
        if !native.is_empty() {
            return native;
        }

        let passable: Vec<_> = voices
            .iter()
            .filter(|voice| {
                voice.is_local
                    || self
                        .fallback_languages
                        .iter()
                        .any(|lang| language_matches(&voice.language_tag, lang))
                    || self.has_quality_marker(&voice.display_name)
            })
            .take(self.max_candidates)
            .collect();
        if !passable.is_empty() {
            return passable;
        }

        voices.iter().take(self.max_candidates).collect()
    }

    pub fn pick_default(&self, voices: &[VoiceDescriptor]) -> Option<VoiceDescriptor> {
        self.candidates(voices).first().map(|voice| (*voice).clone())
    }

    fn has_quality_marker(&self, display_name: &str) -> bool {
        let name = display_name.to_lowercase();
        self.quality_markers
            .iter()
            .any(|marker| name.contains(&marker.to_lowercase()))
    }
}

/// Case-insensitive BCP-47-ish match on the primary language subtag; accepts
/// `vi`, `vi-VN` and `vi_VN` for a `vi` or `vi-VN` target.
pub fn language_matches(tag: &str, target: &str) -> bool {
    let tag_primary = primary_subtag(tag);
    !tag_primary.is_empty() && tag_primary == primary_subtag(target)
}

fn primary_subtag(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// The current voice snapshot plus the user's selection.
#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    policy: VoicePolicy,
    voices: Vec<VoiceDescriptor>,
    selected: Option<String>,
    revision: u64,
}

impl VoiceCatalog {
    pub fn new(policy: VoicePolicy, selected: Option<String>) -> Self {
        Self {
            policy,
            voices: Vec::new(),
            selected,
            revision: 0,
        }
    }

    pub fn all(&self) -> &[VoiceDescriptor] {
        &self.voices
    }

    /// Ranked voices for display.
    pub fn list(&self) -> Vec<VoiceDescriptor> {
        self.policy
            .candidates(&self.voices)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Bumped every time the snapshot changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn select(&mut self, voice_id: Option<String>) {
        self.selected = voice_id;
    }

    /// Replace the snapshot. Returns `true` when the list changed, which is the
    /// catalog's change notification.
    pub fn refresh(&mut self, listed: Vec<VoiceDescriptor>) -> bool {
        if listed == self.voices {
            debug!(count = listed.len(), "Voice list unchanged");
            return false;
        }
        self.voices = listed;
        self.revision = self.revision.wrapping_add(1);

        let keep = self
            .selected
            .as_deref()
            .is_some_and(|id| self.voices.iter().any(|voice| voice.id == id));
        if !keep {
            let picked = self.policy.pick_default(&self.voices).map(|voice| voice.id);
            if picked.is_some() || self.selected.is_some() {
                info!(
                    previous = self.selected.as_deref().unwrap_or("<none>"),
                    picked = picked.as_deref().unwrap_or("<platform default>"),
                    "Re-applied voice selection policy"
                );
            }
            // An empty platform list keeps the stored choice for later.
            if picked.is_some() {
                self.selected = picked;
            }
        }
        info!(
            count = self.voices.len(),
            selected = self.selected.as_deref().unwrap_or("<none>"),
            revision = self.revision,
            "Voice catalog refreshed"
        );
        true
    }

    /// Voice id to put on an utterance; `None` falls back to the platform default.
    pub fn resolve(&self) -> Option<String> {
        let selected = self.selected.as_deref()?;
        self.voices
            .iter()
            .find(|voice| voice.id == selected)
            .map(|voice| voice.id.clone())
    }
}
