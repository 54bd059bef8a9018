//! Maps terminal input lines onto playback commands.
//!
//! Single-key shortcuts come from the config (`key_*`), and a few spelled-out
//! commands take an argument (`rate 1.25`, `voice vi_VN-vais1000-medium`).

use readaloud_core::{AppConfig, Command};

#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    Command(Command),
    ShowStatus,
    ListVoices,
    Help,
    Quit,
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    toggle_play_pause: String,
    stop: String,
    next_sentence: String,
    prev_sentence: String,
    toggle_auto_next: String,
    safe_quit: String,
}

impl KeyBindings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            toggle_play_pause: normalize_shortcut_token(&config.key_toggle_play_pause, "space"),
            stop: normalize_shortcut_token(&config.key_stop, "x"),
            next_sentence: normalize_shortcut_token(&config.key_next_sentence, "f"),
            prev_sentence: normalize_shortcut_token(&config.key_prev_sentence, "s"),
            toggle_auto_next: normalize_shortcut_token(&config.key_toggle_auto_next, "a"),
            safe_quit: normalize_shortcut_token(&config.key_safe_quit, "q"),
        }
    }

    pub fn help(&self) -> String {
        format!(
            "[{}] play/pause  [{}] stop  [{}] next  [{}] previous  [{}] auto-next  [{}] quit\n\
             rate <0.5-2.0>  pitch <0.5-2.0>  volume <0-1>  voice <id|auto>  voices  status",
            self.toggle_play_pause,
            self.stop,
            self.next_sentence,
            self.prev_sentence,
            self.toggle_auto_next,
            self.safe_quit,
        )
    }

    fn shortcut_for(&self, pressed: &str) -> Option<InputAction> {
        let action = if pressed == self.toggle_play_pause {
            InputAction::Command(Command::TogglePlayPause)
        } else if pressed == self.safe_quit {
            InputAction::Quit
        } else if pressed == self.stop {
            InputAction::Command(Command::Stop)
        } else if pressed == self.next_sentence {
            InputAction::Command(Command::Next)
        } else if pressed == self.prev_sentence {
            InputAction::Command(Command::Previous)
        } else if pressed == self.toggle_auto_next {
            InputAction::Command(Command::ToggleAutoNext)
        } else {
            return None;
        };
        Some(action)
    }
}

/// An empty line (just Enter) counts as `space`.
pub fn parse_input(line: &str, keys: &KeyBindings) -> Option<InputAction> {
    let pressed = normalize_shortcut_token(line, "space");
    if let Some(action) = keys.shortcut_for(&pressed) {
        return Some(action);
    }

    let mut parts = pressed.split_whitespace();
    let word = parts.next()?;
    let arg = parts.next();
    let number = || arg.and_then(|raw| raw.parse::<f32>().ok());
    let action = match word {
        "play" => InputAction::Command(Command::Play),
        "pause" => InputAction::Command(Command::Pause),
        "stop" => InputAction::Command(Command::Stop),
        "next" => InputAction::Command(Command::Next),
        "prev" | "previous" => InputAction::Command(Command::Previous),
        "auto" => InputAction::Command(Command::ToggleAutoNext),
        "rate" => InputAction::Command(Command::SetRate { rate: number()? }),
        "pitch" => InputAction::Command(Command::SetPitch { pitch: number()? }),
        "volume" => InputAction::Command(Command::SetVolume { volume: number()? }),
        "voice" => {
            // Voice ids are case-sensitive; take the argument from the raw line.
            let raw_arg = line.split_whitespace().nth(1)?;
            let voice_id = (!raw_arg.eq_ignore_ascii_case("auto")).then(|| raw_arg.to_string());
            InputAction::Command(Command::SetVoice { voice_id })
        }
        "voices" => InputAction::ListVoices,
        "status" => InputAction::ShowStatus,
        "help" | "?" => InputAction::Help,
        "quit" | "exit" => InputAction::Quit,
        _ => return None,
    };
    Some(action)
}

fn normalize_shortcut_token(raw: &str, fallback: &str) -> String {
    let normalized = raw.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        fallback.to_string()
    } else {
        normalized.replace("spacebar", "space")
    }
}
