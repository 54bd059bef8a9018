use super::*;
use crate::bridge::NavigationRequest;
use crate::device::UtteranceId;
use crate::device::fake::{DeviceCall, FakeDevice};
use crate::prefs::{AUTO_NEXT_KEY, MemoryPreferences, RATE_KEY, VOICE_ID_KEY, VOICE_LANGUAGE_KEY};
use crate::segmenter::ContentKind;
use std::time::Duration;

type TestPlayer = ReadAloud<FakeDevice, MemoryPreferences>;

fn build_player(prefs: MemoryPreferences, voices: Vec<VoiceDescriptor>) -> TestPlayer {
    ReadAloud::new(
        FakeDevice::with_voices(voices),
        prefs,
        &AppConfig::default(),
    )
}

fn player() -> TestPlayer {
    build_player(MemoryPreferences::new(), Vec::new())
}

fn chapter(sentences: &[&str], next: Option<&str>) -> (ChapterContext, String) {
    let context = ChapterContext::new("1")
        .with_previous(None)
        .with_next(next.map(str::to_string));
    (context, sentences.join("\n"))
}

fn load(player: &mut TestPlayer, sentences: &[&str], next: Option<&str>) -> Vec<Effect> {
    let (context, text) = chapter(sentences, next);
    player.load_chapter(context, &text)
}

fn last_id(player: &TestPlayer) -> UtteranceId {
    player
        .device()
        .last_spoken()
        .expect("an utterance was submitted")
        .id
}

fn last_text(player: &TestPlayer) -> String {
    player
        .device()
        .last_spoken()
        .expect("an utterance was submitted")
        .text
        .clone()
}

fn confirm_start(player: &mut TestPlayer) -> Vec<Effect> {
    let id = last_id(player);
    player.on_device_event(DeviceEvent::Started(id))
}

fn finish_current(player: &mut TestPlayer) -> Vec<Effect> {
    let id = last_id(player);
    player.on_device_event(DeviceEvent::Ended(id))
}

fn spoken_count(player: &TestPlayer) -> usize {
    player.device().spoken().len()
}

fn scheduled_timer(effects: &[Effect]) -> Option<(Duration, Timer)> {
    effects.iter().find_map(|effect| match effect {
        Effect::Schedule { after, timer } => Some((*after, *timer)),
        _ => None,
    })
}

fn voice(id: &str, name: &str, lang: &str) -> VoiceDescriptor {
    VoiceDescriptor::new(id, name, lang, false)
}

/// Play from idle and confirm the device start.
fn start_playing(player: &mut TestPlayer) {
    player.play();
    confirm_start(player);
    assert_eq!(player.status(), PlaybackStatus::Playing);
}

#[test]
fn play_waits_for_device_start() {
    let mut player = player();
    load(&mut player, &["A.", "B.", "C."], None);

    let effects = player.play();

    assert!(effects.is_empty());
    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert!(player.is_awaiting_start());
    assert_eq!(player.position(), Some(0));
    assert_eq!(last_text(&player), "A.");

    confirm_start(&mut player);
    assert_eq!(player.status(), PlaybackStatus::Playing);
    assert!(!player.is_awaiting_start());

    // A duplicate start callback changes nothing.
    confirm_start(&mut player);
    assert_eq!(player.status(), PlaybackStatus::Playing);
    assert_eq!(spoken_count(&player), 1);
}

#[test]
fn repeated_play_never_submits_twice() {
    let mut player = player();
    load(&mut player, &["A.", "B."], None);

    player.play();
    player.play();
    assert_eq!(spoken_count(&player), 1);

    confirm_start(&mut player);
    player.play();
    assert_eq!(spoken_count(&player), 1);
}

#[test]
fn empty_chapters_make_every_command_a_no_op() {
    let mut player = player();
    let context = ChapterContext::new("7").with_kind(ContentKind::ImageSequence);
    player.load_chapter(context, "page-1.jpg\npage-2.jpg");

    assert_eq!(player.sentence_count(), 0);
    assert_eq!(player.position(), None);
    for effects in [player.play(), player.next(), player.previous(), player.pause()] {
        assert!(effects.is_empty());
    }
    assert_eq!(spoken_count(&player), 0);
    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(player.position(), None);
}

#[test]
fn chapter_plays_through_and_requests_next_chapter() {
    let mut player = player();
    load(&mut player, &["One.", "Two.", "Three."], Some("42"));
    assert!(player.auto_advance());

    start_playing(&mut player);

    let effects = finish_current(&mut player);
    assert!(effects.is_empty(), "natural progression schedules nothing");
    assert_eq!(player.position(), Some(1));
    assert_eq!(last_text(&player), "Two.");
    assert_eq!(spoken_count(&player), 2);
    confirm_start(&mut player);

    let effects = finish_current(&mut player);
    assert!(effects.is_empty());
    assert_eq!(player.position(), Some(2));
    assert_eq!(last_text(&player), "Three.");
    assert_eq!(spoken_count(&player), 3);
    confirm_start(&mut player);

    let effects = finish_current(&mut player);
    assert_eq!(
        effects,
        vec![Effect::Navigate(NavigationRequest {
            target_chapter_id: "42".to_string(),
            autoplay: true,
        })]
    );
    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(player.position(), Some(0));
    assert_eq!(spoken_count(&player), 3);
}

#[test]
fn chapter_end_without_auto_advance_just_stops() {
    let mut player = player();
    load(&mut player, &["One.", "Two.", "Three."], Some("42"));
    player.toggle_auto_next();
    assert!(!player.auto_advance());

    start_playing(&mut player);
    finish_current(&mut player);
    confirm_start(&mut player);
    finish_current(&mut player);
    confirm_start(&mut player);
    let effects = finish_current(&mut player);

    assert!(effects.is_empty());
    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(player.position(), Some(0));
}

#[test]
fn chapter_end_without_next_chapter_just_stops() {
    let mut player = player();
    load(&mut player, &["Only."], None);

    start_playing(&mut player);
    let effects = finish_current(&mut player);

    assert!(effects.is_empty());
    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(player.position(), Some(0));
}

#[test]
fn late_voice_list_picks_target_language_voice() {
    let mut player = player();
    load(&mut player, &["Xin chào."], None);

    let effects = player.start();
    assert_eq!(
        effects,
        vec![Effect::Schedule {
            after: Duration::from_millis(100),
            timer: Timer::VoiceRefresh { attempt: 0 },
        }]
    );
    assert!(player.voices().is_empty());
    assert_eq!(player.selected_voice(), None);

    player.device_mut().voices = vec![
        voice("alex", "Alex", "en-US"),
        voice("samantha", "Samantha", "en-US"),
        voice("thomas", "Thomas", "fr-FR"),
        voice("linh", "Linh", "vi-VN"),
        voice("anna", "Anna", "de-DE"),
    ];
    let effects = player.on_timer(Timer::VoiceRefresh { attempt: 0 });
    assert_eq!(
        effects,
        vec![
            Effect::VoicesChanged { count: 5 },
            Effect::Schedule {
                after: Duration::from_millis(1000),
                timer: Timer::VoiceRefresh { attempt: 1 },
            },
        ]
    );
    assert_eq!(player.selected_voice(), Some("linh"));
    assert_eq!(player.voice_revision(), 1);

    player.play();
    assert_eq!(
        player.device().last_spoken().and_then(|u| u.voice.as_deref()),
        Some("linh")
    );

    let effects = player.on_timer(Timer::VoiceRefresh { attempt: 1 });
    assert!(effects.is_empty(), "unchanged list and no further retries");
    assert_eq!(player.voice_revision(), 1);
}

#[test]
fn voices_changed_signal_refreshes_catalog() {
    let mut player = player();
    player.device_mut().voices = vec![voice("nam", "Nam", "vi_VN")];

    let effects = player.on_device_event(DeviceEvent::VoicesChanged);

    assert_eq!(effects, vec![Effect::VoicesChanged { count: 1 }]);
    assert_eq!(player.selected_voice(), Some("nam"));
}

#[test]
fn pause_before_start_is_ignored() {
    let mut player = player();
    load(&mut player, &["A.", "B."], None);

    player.play();
    player.pause();

    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(player.device().count(&DeviceCall::Pause), 0);

    confirm_start(&mut player);
    assert_eq!(player.status(), PlaybackStatus::Playing);

    player.pause();
    assert_eq!(player.status(), PlaybackStatus::Paused);
    assert_eq!(player.device().count(&DeviceCall::Pause), 1);
    assert_eq!(player.position(), Some(0));
}

#[test]
fn resume_continues_the_paused_utterance() {
    let mut player = player();
    load(&mut player, &["A.", "B."], None);
    start_playing(&mut player);
    player.pause();

    player.play();

    assert_eq!(player.status(), PlaybackStatus::Playing);
    assert_eq!(player.device().count(&DeviceCall::Resume), 1);
    assert_eq!(spoken_count(&player), 1);
}

#[test]
fn utterance_ending_as_pause_lands_holds_next_sentence() {
    let mut player = player();
    load(&mut player, &["A.", "B.", "C."], None);
    start_playing(&mut player);
    player.pause();

    let effects = finish_current(&mut player);

    assert!(effects.is_empty());
    assert_eq!(player.status(), PlaybackStatus::Paused);
    assert_eq!(player.position(), Some(1));
    assert_eq!(spoken_count(&player), 1, "nothing speaks while paused");

    player.play();
    assert_eq!(spoken_count(&player), 2);
    assert_eq!(last_text(&player), "B.");
    assert_eq!(player.device().count(&DeviceCall::Resume), 0);

    confirm_start(&mut player);
    assert_eq!(player.status(), PlaybackStatus::Playing);
    player.pause();
    assert_eq!(player.status(), PlaybackStatus::Paused);
    assert_eq!(player.device().count(&DeviceCall::Pause), 2);
}

#[test]
fn toggle_play_pause_flips_between_states() {
    let mut player = player();
    load(&mut player, &["A.", "B."], None);

    player.toggle_play_pause();
    confirm_start(&mut player);
    assert_eq!(player.status(), PlaybackStatus::Playing);

    player.toggle_play_pause();
    assert_eq!(player.status(), PlaybackStatus::Paused);

    player.toggle_play_pause();
    assert_eq!(player.status(), PlaybackStatus::Playing);
}

#[test]
fn manual_next_while_playing_resumes_at_new_position() {
    let mut player = player();
    load(&mut player, &["A.", "B.", "C."], None);
    start_playing(&mut player);
    let first = last_id(&player);

    let effects = player.next();

    assert_eq!(player.device().calls.last(), Some(&DeviceCall::Cancel));
    assert_eq!(player.position(), Some(1));
    let (after, timer) = scheduled_timer(&effects).expect("auto-resume scheduled");
    assert_eq!(after, Duration::from_millis(100));
    assert!(matches!(timer, Timer::AutoResume { .. }));
    assert_eq!(spoken_count(&player), 1, "next does not speak by itself");

    // The cancelled utterance reports its interruption late.
    player.on_device_event(DeviceEvent::Failed {
        id: first,
        reason: "interrupted".to_string(),
    });
    assert_eq!(player.position(), Some(1));

    player.on_timer(timer);
    assert_eq!(spoken_count(&player), 2);
    assert_eq!(last_text(&player), "B.");

    confirm_start(&mut player);
    assert_eq!(player.status(), PlaybackStatus::Playing);
}

#[test]
fn previous_while_playing_resumes_at_new_position() {
    let mut player = player();
    load(&mut player, &["A.", "B.", "C."], None);
    start_playing(&mut player);
    finish_current(&mut player);
    confirm_start(&mut player);

    let effects = player.previous();
    let (_, timer) = scheduled_timer(&effects).expect("auto-resume scheduled");
    player.on_timer(timer);

    assert_eq!(player.position(), Some(0));
    assert_eq!(last_text(&player), "A.");
}

#[test]
fn only_latest_auto_resume_fires() {
    let mut player = player();
    load(&mut player, &["A.", "B.", "C."], None);
    start_playing(&mut player);

    let (_, first) = scheduled_timer(&player.next()).expect("first resume");
    let (_, second) = scheduled_timer(&player.next()).expect("second resume");
    assert_ne!(first, second);

    player.on_timer(first);
    assert_eq!(spoken_count(&player), 1);

    player.on_timer(second);
    assert_eq!(spoken_count(&player), 2);
    assert_eq!(last_text(&player), "C.");

    player.on_timer(second);
    assert_eq!(spoken_count(&player), 2);
}

#[test]
fn pause_during_resume_gap_holds_position() {
    let mut player = player();
    load(&mut player, &["A.", "B.", "C."], None);
    start_playing(&mut player);
    let (_, timer) = scheduled_timer(&player.next()).expect("resume scheduled");

    player.pause();
    player.on_timer(timer);

    assert_eq!(player.status(), PlaybackStatus::Paused);
    assert_eq!(spoken_count(&player), 1);

    player.play();
    assert_eq!(spoken_count(&player), 2);
    assert_eq!(last_text(&player), "B.");
}

#[test]
fn seeking_while_paused_stays_paused() {
    let mut player = player();
    load(&mut player, &["A.", "B.", "C."], None);
    start_playing(&mut player);
    player.pause();

    let effects = player.next();

    assert!(effects.is_empty());
    assert_eq!(player.status(), PlaybackStatus::Paused);
    assert_eq!(player.position(), Some(1));
    assert_eq!(player.device().calls.last(), Some(&DeviceCall::Cancel));

    player.play();
    assert_eq!(player.device().count(&DeviceCall::Resume), 0);
    assert_eq!(last_text(&player), "B.");
}

#[test]
fn seeking_while_idle_only_moves_the_cursor() {
    let mut player = player();
    load(&mut player, &["A.", "B."], None);

    let effects = player.next();

    assert!(effects.is_empty());
    assert_eq!(player.position(), Some(1));
    assert_eq!(spoken_count(&player), 0);
}

#[test]
fn seeking_before_start_keeps_the_play_request() {
    let mut player = player();
    load(&mut player, &["A.", "B.", "C."], None);
    player.play();
    let pending = last_id(&player);

    let effects = player.next();

    assert!(effects.is_empty());
    assert_eq!(player.position(), Some(1));
    assert_eq!(spoken_count(&player), 2);
    assert_eq!(last_text(&player), "B.");
    assert!(player.is_awaiting_start());

    player.on_device_event(DeviceEvent::Started(pending));
    assert_eq!(player.status(), PlaybackStatus::Idle, "cancelled start is stale");

    confirm_start(&mut player);
    assert_eq!(player.status(), PlaybackStatus::Playing);
}

#[test]
fn seeking_never_leaves_bounds() {
    let mut player = player();
    load(&mut player, &["A.", "B.", "C.", "D."], None);
    let pattern = [true, true, true, true, true, false, true, false, false, false, false, false];

    for (step, forward) in pattern.iter().cycle().take(60).enumerate() {
        if *forward {
            player.next();
        } else {
            player.previous();
        }
        let position = player.position().expect("non-empty sequence has a position");
        assert!(position < 4, "step {step} left bounds at {position}");
    }

    player.previous();
    player.previous();
    player.previous();
    player.previous();
    assert_eq!(player.position(), Some(0));
    player.previous();
    assert_eq!(player.position(), Some(0), "no wraparound at the start");

    for _ in 0..10 {
        player.next();
    }
    assert_eq!(player.position(), Some(3), "no wraparound at the end");
}

#[test]
fn seek_at_bound_keeps_playing_utterance() {
    let mut player = player();
    load(&mut player, &["A.", "B."], None);
    start_playing(&mut player);
    let cancels = player.device().count(&DeviceCall::Cancel);

    let effects = player.previous();

    assert!(effects.is_empty());
    assert_eq!(player.device().count(&DeviceCall::Cancel), cancels);
    assert_eq!(player.status(), PlaybackStatus::Playing);
}

#[test]
fn stop_is_idempotent() {
    let mut player = player();
    load(&mut player, &["A.", "B.", "C."], None);
    start_playing(&mut player);
    finish_current(&mut player);

    player.stop();
    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(player.position(), Some(0));

    player.stop();
    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(player.position(), Some(0));
    assert_eq!(player.device().calls.last(), Some(&DeviceCall::Cancel));
}

#[test]
fn stop_on_fresh_player_still_cancels_device() {
    let mut player = player();
    player.stop();
    assert_eq!(player.device().calls, vec![DeviceCall::Cancel]);
    assert_eq!(player.position(), None);
}

#[test]
fn stop_invalidates_pending_auto_resume() {
    let mut player = player();
    load(&mut player, &["A.", "B."], None);
    start_playing(&mut player);
    let (_, timer) = scheduled_timer(&player.next()).expect("resume scheduled");

    player.stop();
    player.on_timer(timer);

    assert_eq!(spoken_count(&player), 1);
    assert_eq!(player.status(), PlaybackStatus::Idle);
}

#[test]
fn device_failure_stops_and_keeps_position() {
    let mut player = player();
    load(&mut player, &["A.", "B.", "C."], None);
    start_playing(&mut player);
    finish_current(&mut player);
    let failed = last_id(&player);

    let effects = player.on_device_event(DeviceEvent::Failed {
        id: failed,
        reason: "synthesis-failed".to_string(),
    });

    assert!(effects.is_empty());
    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(player.position(), Some(1));
    assert_eq!(spoken_count(&player), 2, "no automatic retry");

    player.play();
    assert_eq!(last_text(&player), "B.");
}

#[test]
fn rejected_submission_leaves_engine_idle() {
    let mut player = player();
    load(&mut player, &["A."], None);
    player.device_mut().fail_speak = true;

    player.play();

    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert!(!player.is_awaiting_start());
    assert_eq!(player.position(), Some(0));
}

#[test]
fn callbacks_after_stop_are_ignored() {
    let mut player = player();
    load(&mut player, &["A.", "B."], None);
    start_playing(&mut player);
    let id = last_id(&player);
    player.stop();

    player.on_device_event(DeviceEvent::Ended(id));
    player.on_device_event(DeviceEvent::Started(id));

    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(player.position(), Some(0));
    assert_eq!(spoken_count(&player), 1);
}

#[test]
fn parameters_round_trip_through_playback_cycles() {
    let mut player = player();
    load(&mut player, &["A.", "B."], None);

    player.set_rate(1.25);
    player.set_pitch(0.75);
    player.set_volume(0.4);
    start_playing(&mut player);
    player.pause();
    player.play();
    player.stop();

    assert_eq!(player.rate(), 1.25);
    assert_eq!(player.pitch(), 0.75);
    assert_eq!(player.volume(), 0.4);
    assert_eq!(player.preferences().get_f32(RATE_KEY), Some(1.25));
}

#[test]
fn parameters_are_clamped() {
    let mut player = player();
    player.set_rate(5.0);
    player.set_pitch(0.0);
    player.set_volume(1.5);
    assert_eq!(player.params(), PlaybackParams {
        rate: 2.0,
        pitch: 0.5,
        volume: 1.0,
    });
}

#[test]
fn parameters_apply_to_next_utterance_only() {
    let mut player = player();
    load(&mut player, &["A.", "B."], None);
    start_playing(&mut player);

    player.set_rate(1.5);
    assert_eq!(player.device().last_spoken().map(|u| u.rate), Some(1.0));

    finish_current(&mut player);
    assert_eq!(player.device().last_spoken().map(|u| u.rate), Some(1.5));
}

#[test]
fn unknown_voice_falls_back_to_platform_default() {
    let mut player = build_player(MemoryPreferences::new(), vec![voice("linh", "Linh", "vi-VN")]);
    player.start();
    load(&mut player, &["A."], None);

    player.set_voice(Some("ghost".to_string()));
    player.play();

    assert_eq!(player.selected_voice(), Some("ghost"));
    assert_eq!(player.device().last_spoken().and_then(|u| u.voice.clone()), None);
    assert_eq!(player.preferences().get(VOICE_ID_KEY).as_deref(), Some("ghost"));
}

#[test]
fn preferences_seed_a_new_page_instance() {
    let prefs = MemoryPreferences::new()
        .with(AUTO_NEXT_KEY, "false")
        .with(RATE_KEY, "1.5")
        .with(VOICE_LANGUAGE_KEY, "en");
    let mut player = build_player(
        prefs,
        vec![voice("linh", "Linh", "vi-VN"), voice("alex", "Alex", "en-US")],
    );
    player.start();

    assert!(!player.auto_advance());
    assert_eq!(player.rate(), 1.5);
    assert_eq!(player.selected_voice(), Some("alex"));

    player.toggle_auto_next();
    assert_eq!(player.preferences().get(AUTO_NEXT_KEY).as_deref(), Some("true"));
}

#[test]
fn autoplay_chapter_starts_after_delay() {
    let mut player = player();
    let context = ChapterContext::new("2")
        .with_previous(Some("1".to_string()))
        .with_autoplay(true);

    let effects = player.load_chapter(context, "Mở đầu.\nTiếp theo.");

    assert_eq!(effects.len(), 2);
    assert_eq!(
        effects[0],
        Effect::ConsumeAutoplaySignal {
            chapter_id: "2".to_string()
        }
    );
    let (after, timer) = scheduled_timer(&effects).expect("autoplay scheduled");
    assert_eq!(after, Duration::from_millis(300));
    assert!(!player.chapter().autoplay, "signal consumed once");
    assert_eq!(spoken_count(&player), 0);

    let effects = player.on_timer(timer);
    assert!(effects.is_empty(), "autoplay does not also schedule auto-resume");
    assert_eq!(player.position(), Some(0));
    assert_eq!(last_text(&player), "Mở đầu.");
    assert_eq!(spoken_count(&player), 1);

    confirm_start(&mut player);
    assert_eq!(player.status(), PlaybackStatus::Playing);

    player.on_timer(timer);
    assert_eq!(spoken_count(&player), 1);
}

#[test]
fn autoplay_on_image_chapter_does_nothing() {
    let mut player = player();
    let context = ChapterContext::new("3")
        .with_kind(ContentKind::ImageSequence)
        .with_autoplay(true);

    let effects = player.load_chapter(context, "img");

    assert!(effects.is_empty());
    assert_eq!(spoken_count(&player), 0);
}

#[test]
fn stop_cancels_pending_chapter_autoplay() {
    let mut player = player();
    let context = ChapterContext::new("2").with_autoplay(true);
    let effects = player.load_chapter(context, "A.\nB.");
    let (_, timer) = scheduled_timer(&effects).expect("autoplay scheduled");

    player.stop();
    player.on_timer(timer);

    assert_eq!(spoken_count(&player), 0);
    assert_eq!(player.status(), PlaybackStatus::Idle);
}

#[test]
fn loading_a_chapter_cancels_current_speech() {
    let mut player = player();
    load(&mut player, &["A.", "B."], None);
    start_playing(&mut player);
    let old = last_id(&player);

    load(&mut player, &["X.", "Y.", "Z."], None);
    player.on_device_event(DeviceEvent::Ended(old));

    assert_eq!(player.status(), PlaybackStatus::Idle);
    assert_eq!(player.position(), Some(0));
    assert_eq!(player.sentence_count(), 3);
    assert_eq!(spoken_count(&player), 1);
}

#[test]
fn shutdown_cancels_device() {
    let mut player = player();
    load(&mut player, &["A."], None);
    start_playing(&mut player);

    player.shutdown();

    assert_eq!(player.device().calls.last(), Some(&DeviceCall::Cancel));
    assert_eq!(player.status(), PlaybackStatus::Idle);
}

#[test]
fn snapshot_reflects_engine_state() {
    let mut player = player();
    load(&mut player, &["A.", "B.", "C.", "D."], Some("9"));
    start_playing(&mut player);
    finish_current(&mut player);

    let snapshot = player.snapshot();

    assert_eq!(snapshot.chapter_id, "1");
    assert_eq!(snapshot.next_chapter_id.as_deref(), Some("9"));
    assert_eq!(snapshot.status, PlaybackStatus::Playing);
    assert_eq!(snapshot.position, Some(1));
    assert_eq!(snapshot.current_sentence.as_deref(), Some("B."));
    assert!(snapshot.awaiting_start);
    assert!(snapshot.can_seek_prev);
    assert!(snapshot.can_seek_next);
    assert!((snapshot.progress_pct - 25.0).abs() < f64::EPSILON);

    let json = serde_json::to_value(&snapshot).expect("snapshot serializes");
    assert_eq!(json["status"], "playing");
}

#[test]
fn commands_deserialize_from_ui_payloads() {
    let rate: Command =
        serde_json::from_str(r#"{"command":"set_rate","rate":1.5}"#).expect("set_rate");
    assert_eq!(rate, Command::SetRate { rate: 1.5 });
    assert_eq!(rate.action(), "tts_set_rate");

    let next: Command = serde_json::from_str(r#"{"command":"next"}"#).expect("next");
    assert_eq!(next, Command::Next);

    let mut player = player();
    load(&mut player, &["A.", "B."], None);
    player.apply_command(next);
    assert_eq!(player.position(), Some(1));
}
