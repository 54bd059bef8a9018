//! Terminal host: one event queue for device callbacks, timers, keyboard
//! input and Ctrl+C, feeding a single read-aloud page at a time.

use crate::piper_device::PiperDevice;
use crate::shortcuts::{InputAction, KeyBindings, parse_input};
use crate::story::Story;
use anyhow::{Context, Result};
use readaloud_core::{
    AppConfig, DeviceEvent, Effect, NavigationRequest, PlaybackStatus, ReadAloud, Timer,
    TomlPreferences,
};
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use tracing::{debug, info, warn};

type Page = ReadAloud<PiperDevice, TomlPreferences>;

pub enum AppEvent {
    Device(DeviceEvent),
    /// Timers are tagged with the page that asked for them; a page's
    /// generations mean nothing to its successor.
    Timer { page: u64, timer: Timer },
    Input(String),
    Quit,
}

pub struct Runtime {
    config: AppConfig,
    story: Story,
    keys: KeyBindings,
    device: PiperDevice,
    events: mpsc::Sender<AppEvent>,
    inbox: mpsc::Receiver<AppEvent>,
    page: Option<Page>,
    page_seq: u64,
    last_status: Option<(PlaybackStatus, Option<usize>)>,
}

impl Runtime {
    pub fn new(config: AppConfig, story: Story) -> Result<Self> {
        let (events, inbox) = mpsc::channel();
        let device_events = events.clone();
        let device = PiperDevice::spawn(
            &config,
            Box::new(move |event| {
                let _ = device_events.send(AppEvent::Device(event));
            }),
        )?;
        Ok(Self {
            keys: KeyBindings::from_config(&config),
            config,
            story,
            device,
            events,
            inbox,
            page: None,
            page_seq: 0,
            last_status: None,
        })
    }

    pub fn run(mut self, start_chapter: &str, autoplay: bool) -> Result<()> {
        self.install_quit_handler();
        self.spawn_input_reader();
        println!("{}", self.story.title);
        println!("{}", self.keys.help());
        self.open_chapter(start_chapter, autoplay)?;

        while let Ok(event) = self.inbox.recv() {
            let effects = match event {
                AppEvent::Device(event) => self.with_page(|page| page.on_device_event(event)),
                AppEvent::Timer { page, timer } => {
                    if page != self.page_seq {
                        debug!(page, current = self.page_seq, ?timer, "Dropping timer for closed page");
                        continue;
                    }
                    self.with_page(|page| page.on_timer(timer))
                }
                AppEvent::Input(line) => match parse_input(&line, &self.keys) {
                    Some(InputAction::Command(command)) => {
                        self.with_page(|page| page.apply_command(command))
                    }
                    Some(InputAction::ShowStatus) => {
                        self.print_status(true);
                        Vec::new()
                    }
                    Some(InputAction::ListVoices) => {
                        self.print_voices();
                        Vec::new()
                    }
                    Some(InputAction::Help) => {
                        println!("{}", self.keys.help());
                        Vec::new()
                    }
                    Some(InputAction::Quit) => break,
                    None => {
                        println!("Unknown input {line:?}; type `help`");
                        Vec::new()
                    }
                },
                AppEvent::Quit => break,
            };
            self.run_effects(effects)?;
            self.print_status(false);
        }

        info!("Shutting down reader");
        self.close_page();
        Ok(())
    }

    fn with_page(&mut self, f: impl FnOnce(&mut Page) -> Vec<Effect>) -> Vec<Effect> {
        match self.page.as_mut() {
            Some(page) => f(page),
            None => Vec::new(),
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::Schedule { after, timer } => self.schedule(after, timer),
                Effect::Navigate(request) => self.navigate(request)?,
                Effect::ConsumeAutoplaySignal { chapter_id } => {
                    debug!(chapter = %chapter_id, "Autoplay signal consumed");
                }
                Effect::VoicesChanged { count } => {
                    info!(count, "Voice list changed");
                }
            }
        }
        Ok(())
    }

    fn schedule(&self, after: std::time::Duration, timer: Timer) {
        let events = self.events.clone();
        let page = self.page_seq;
        thread::spawn(move || {
            thread::sleep(after);
            let _ = events.send(AppEvent::Timer { page, timer });
        });
    }

    fn navigate(&mut self, request: NavigationRequest) -> Result<()> {
        info!(route = %request.to_query(), "Navigating to next chapter");
        self.open_chapter(&request.target_chapter_id, request.autoplay)
    }

    fn close_page(&mut self) {
        if let Some(mut page) = self.page.take() {
            page.shutdown();
        }
    }

    /// Tear down the current page and open `chapter_id` with a fresh engine.
    fn open_chapter(&mut self, chapter_id: &str, autoplay: bool) -> Result<()> {
        self.close_page();
        let (context, content) = self
            .story
            .context_for(chapter_id, autoplay)
            .context("Opening chapter")?;
        let title = self
            .story
            .chapter(chapter_id)
            .map(|chapter| chapter.title.clone())
            .unwrap_or_default();

        self.page_seq += 1;
        self.last_status = None;
        let prefs = TomlPreferences::open(Path::new(&self.config.cache_dir));
        let mut page = ReadAloud::new(self.device.clone(), prefs, &self.config);
        let mut effects = page.start();
        effects.extend(page.load_chapter(context, content));
        println!(
            "\n== Chapter {chapter_id}: {title} ({} sentences) ==",
            page.sentence_count()
        );
        self.page = Some(page);
        self.run_effects(effects)
    }

    fn print_status(&mut self, force: bool) {
        let Some(page) = self.page.as_ref() else {
            return;
        };
        let status = (page.status(), page.position());
        if !force && self.last_status == Some(status) {
            return;
        }
        self.last_status = Some(status);
        let snapshot = page.snapshot();
        let label = match snapshot.status {
            PlaybackStatus::Idle => "idle",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
        };
        let position = snapshot
            .position
            .map(|idx| format!("{}/{}", idx + 1, snapshot.sentence_count))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "[{label} {position} rate={:.2} pitch={:.2} volume={:.2} auto-next={}] {}",
            snapshot.params.rate,
            snapshot.params.pitch,
            snapshot.params.volume,
            if snapshot.auto_advance { "on" } else { "off" },
            snapshot.current_sentence.unwrap_or_default()
        );
    }

    fn print_voices(&self) {
        let Some(page) = self.page.as_ref() else {
            return;
        };
        let selected = page.selected_voice();
        let voices = page.voices();
        if voices.is_empty() {
            println!("No voices installed in {}", self.config.voices_dir);
            return;
        }
        println!("Voices (list revision {}):", page.voice_revision());
        for voice in voices {
            let marker = if selected == Some(voice.id.as_str()) { "*" } else { " " };
            println!(
                "{marker} {} [{}] {}",
                voice.id, voice.language_tag, voice.display_name
            );
        }
    }

    fn spawn_input_reader(&self) {
        let events = self.events.clone();
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if events.send(AppEvent::Input(line)).is_err() {
                    return;
                }
            }
            let _ = events.send(AppEvent::Quit);
        });
    }

    fn install_quit_handler(&self) {
        let events = self.events.clone();
        if let Err(err) = ctrlc::set_handler(move || {
            info!("Received Ctrl+C; stopping speech");
            let _ = events.send(AppEvent::Quit);
        }) {
            warn!("Failed to install Ctrl+C signal handler: {err}");
        }
    }
}
