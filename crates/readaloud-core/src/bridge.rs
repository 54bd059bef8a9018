//! Chapter continuity: what happens when the last sentence of a chapter
//! finishes, and how a freshly opened chapter picks playback back up.

use crate::device::SynthesisDevice;
use crate::effects::{Effect, Timer};
use crate::engine::{PlaybackEngine, PlaybackStatus, TransitionReason};
use crate::prefs::PreferenceStore;
use crate::segmenter::{ContentKind, segment};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

pub const AUTOPLAY_QUERY_KEY: &str = "autoplay";

/// What the story-data provider knows about the chapter on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChapterContext {
    pub chapter_id: String,
    pub previous_chapter_id: Option<String>,
    pub next_chapter_id: Option<String>,
    pub kind: ContentKind,
    /// Set when the page was opened by auto-advance and should start speaking.
    pub autoplay: bool,
}

impl ChapterContext {
    pub fn new(chapter_id: impl Into<String>) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            ..Self::default()
        }
    }

    pub fn with_previous(mut self, chapter_id: Option<String>) -> Self {
        self.previous_chapter_id = chapter_id;
        self
    }

    pub fn with_next(mut self, chapter_id: Option<String>) -> Self {
        self.next_chapter_id = chapter_id;
        self
    }

    pub fn with_kind(mut self, kind: ContentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }
}

/// Request handed to the navigation collaborator at the end of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NavigationRequest {
    pub target_chapter_id: String,
    pub autoplay: bool,
}

impl NavigationRequest {
    /// Relative URL for hosts that navigate by route, e.g. `chapter/42?autoplay=true`.
    pub fn to_query(&self) -> String {
        if self.autoplay {
            format!("chapter/{}?{AUTOPLAY_QUERY_KEY}=true", self.target_chapter_id)
        } else {
            format!("chapter/{}", self.target_chapter_id)
        }
    }
}

/// Read the autoplay flag from a URL query string (`a=1&autoplay=true`).
pub fn autoplay_requested(query: &str) -> bool {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, value)| key == AUTOPLAY_QUERY_KEY && value.eq_ignore_ascii_case("true"))
}

/// End-of-chapter decision: navigate only with auto-advance on and somewhere
/// to go.
pub fn next_chapter_request(
    auto_advance: bool,
    next_chapter_id: Option<&str>,
) -> Option<NavigationRequest> {
    if !auto_advance {
        return None;
    }
    next_chapter_id
        .filter(|id| !id.trim().is_empty())
        .map(|id| NavigationRequest {
            target_chapter_id: id.to_string(),
            autoplay: true,
        })
}

impl<D: SynthesisDevice, P: PreferenceStore> PlaybackEngine<D, P> {
    /// Replace the sentence sequence with a newly loaded chapter.
    pub(crate) fn load_chapter(&mut self, context: ChapterContext, content: &str) -> Vec<Effect> {
        self.cancel_in_flight();
        self.status = PlaybackStatus::Idle;
        self.pending_resume = None;
        self.pending_autoplay = None;
        self.intent = None;
        self.sentences = segment(content, context.kind);
        self.reset_position();
        self.chapter = context;
        info!(
            chapter = %self.chapter.chapter_id,
            kind = ?self.chapter.kind,
            sentences = self.sentences.len(),
            next = self.chapter.next_chapter_id.as_deref().unwrap_or("<none>"),
            autoplay = self.chapter.autoplay,
            "Loaded chapter"
        );

        if !self.chapter.autoplay {
            return Vec::new();
        }
        if self.is_empty() {
            debug!(chapter = %self.chapter.chapter_id, "Autoplay requested but nothing to speak");
            return Vec::new();
        }

        self.chapter.autoplay = false;
        let generation = self.next_generation();
        self.pending_autoplay = Some(generation);
        vec![
            Effect::ConsumeAutoplaySignal {
                chapter_id: self.chapter.chapter_id.clone(),
            },
            Effect::Schedule {
                after: self.timing.chapter_autoplay_delay,
                timer: Timer::ChapterAutoplay { generation },
            },
        ]
    }

    pub(crate) fn on_chapter_autoplay(&mut self, generation: u64) -> Vec<Effect> {
        if self.pending_autoplay != Some(generation) {
            debug!(generation, pending = ?self.pending_autoplay, "Ignoring superseded chapter autoplay");
            return Vec::new();
        }
        self.pending_autoplay = None;
        if self.is_empty() {
            return Vec::new();
        }
        info!(chapter = %self.chapter.chapter_id, "Autoplaying newly loaded chapter");
        let mut effects = self.change_position(0, TransitionReason::ChapterLoadAutoplay);
        effects.extend(self.handle_play());
        effects
    }

    /// The last sentence finished naturally.
    pub(crate) fn finish_chapter(&mut self) -> Vec<Effect> {
        self.intent = None;
        self.in_flight = None;
        self.status = PlaybackStatus::Idle;
        self.reset_position();

        match next_chapter_request(self.auto_advance, self.chapter.next_chapter_id.as_deref()) {
            Some(request) => {
                info!(
                    from = %self.chapter.chapter_id,
                    to = %request.target_chapter_id,
                    "Chapter finished; advancing"
                );
                vec![Effect::Navigate(request)]
            }
            None => {
                info!(
                    chapter = %self.chapter.chapter_id,
                    auto_advance = self.auto_advance,
                    "Chapter finished; stopping"
                );
                Vec::new()
            }
        }
    }
}
