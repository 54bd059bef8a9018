use crate::bridge::NavigationRequest;
use std::time::Duration;

/// Work the host must perform outside the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Deliver `timer` back through `ReadAloud::on_timer` after `after`.
    Schedule { after: Duration, timer: Timer },
    /// Fire-and-forget: the destination owns its own engine.
    Navigate(NavigationRequest),
    /// The incoming autoplay flag was honoured; strip it so a reload does not
    /// start playback again.
    ConsumeAutoplaySignal { chapter_id: String },
    VoicesChanged { count: usize },
}

/// Deferred engine events. Generations let the engine ignore timers that were
/// superseded by a later command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    AutoResume { generation: u64 },
    ChapterAutoplay { generation: u64 },
    VoiceRefresh { attempt: usize },
}
