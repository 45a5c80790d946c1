//! User configuration — runtime transport, selector choice, picker keys.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/vrs-launcher/config.toml` (default
//! `~/.config/vrs-launcher/config.toml`).  `VRS_LAUNCHER_CONFIG` overrides
//! the location.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::codec::ServiceAddr;

/// Upper bound for `call_timeout_ms`.
const MAX_CALL_TIMEOUT_MS: u64 = 600_000;

// ───────────────────────────────────────── actions ───────────

/// Configurable actions in the builtin picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    First,
    Last,
    Accept,
    Cancel,
    ClearQuery,
    ToggleCase,
}

impl Action {
    pub const ALL: &[Action] = &[
        Action::MoveUp,
        Action::MoveDown,
        Action::First,
        Action::Last,
        Action::Accept,
        Action::Cancel,
        Action::ClearQuery,
        Action::ToggleCase,
    ];

    fn config_key(self) -> &'static str {
        match self {
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::First => "first",
            Action::Last => "last",
            Action::Accept => "accept",
            Action::Cancel => "cancel",
            Action::ClearQuery => "clear_query",
            Action::ToggleCase => "toggle_case",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding — key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT modifiers
    /// are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// User-friendly display string (e.g. `"Ctrl+k"`, `"↑"`, `"Enter"`).
    pub fn display(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            s.push_str("Shift+");
        }
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::Backspace => "Bksp".into(),
            KeyCode::Delete => "Del".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        });
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"Alt+Up"`, `"q"`, `"Enter"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.last()?;

        for &part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" | "bksp" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            s if s.starts_with('f') && s.len() > 1 => {
                let n: u8 = s[1..].parse().ok()?;
                KeyCode::F(n)
            }
            // Keep the original case for single characters.
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

/// Which interactive selector to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorKind {
    /// The ratatui picker compiled into this binary.
    Builtin,
    /// An external program reading candidates on stdin.
    Command(String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Call-transport client used to reach the runtime.
    pub transport: String,
    /// Arguments placed before the request text.
    pub transport_args: Vec<String>,
    /// Per-call timeout; 0 disables it.
    pub call_timeout_ms: u64,
    /// Process id of the launcher service.
    pub launcher_pid: u64,
    pub selector: SelectorKind,
    pub selector_args: Vec<String>,
    /// Builtin picker keybindings.
    pub bindings: HashMap<Action, Vec<KeyBind>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            transport: "vrsctl".into(),
            transport_args: Vec::new(),
            call_timeout_ms: 0,
            launcher_pid: 0,
            selector: SelectorKind::Command("fzf".into()),
            selector_args: Self::default_selector_args(),
            bindings: Self::default_bindings(),
        }
    }
}

impl AppConfig {
    /// Sorting off, exact matching, ties broken by input order.
    pub fn default_selector_args() -> Vec<String> {
        ["--no-sort", "--exact", "--tiebreak=index"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let ctrl = KeyModifiers::CONTROL;
        let mut m = HashMap::new();

        m.insert(
            MoveUp,
            vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), ctrl), KeyBind::new(Char('p'), ctrl)],
        );
        m.insert(
            MoveDown,
            vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), ctrl), KeyBind::new(Char('n'), ctrl)],
        );
        m.insert(First, vec![KeyBind::new(Home, n)]);
        m.insert(Last, vec![KeyBind::new(End, n)]);
        m.insert(Accept, vec![KeyBind::new(Enter, n)]);
        m.insert(Cancel, vec![KeyBind::new(Esc, n)]);
        m.insert(ClearQuery, vec![KeyBind::new(Char('u'), ctrl)]);
        m.insert(ToggleCase, vec![KeyBind::new(Char('c'), KeyModifiers::ALT)]);

        m
    }

    /// Find the action that matches a key event.  When several bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Short display of the first binding only (for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: move | {}: run | {}: cancel | {}: clear",
            self.short_binding(Action::MoveUp),
            self.short_binding(Action::MoveDown),
            self.short_binding(Action::Accept),
            self.short_binding(Action::Cancel),
            self.short_binding(Action::ClearQuery),
        )
    }

    pub fn launcher_service(&self) -> ServiceAddr {
        ServiceAddr::Pid(self.launcher_pid)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        (self.call_timeout_ms > 0).then(|| Duration::from_millis(self.call_timeout_ms))
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::debug!("loaded config from {}", path.display());
                Self::parse_config(&contents)
            }
            Err(e) => {
                tracing::warn!("ignoring unreadable config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "transport" => {
                    let program = unquote(value);
                    if !program.is_empty() {
                        config.transport = program.to_string();
                    }
                    continue;
                }
                "transport_args" => {
                    config.transport_args = split_list(value);
                    continue;
                }
                "call_timeout_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.call_timeout_ms = v.min(MAX_CALL_TIMEOUT_MS);
                    }
                    continue;
                }
                "launcher_pid" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.launcher_pid = v;
                    }
                    continue;
                }
                "selector" => {
                    config.selector = match unquote(value) {
                        "" => continue,
                        "builtin" => SelectorKind::Builtin,
                        program => SelectorKind::Command(program.to_string()),
                    };
                    continue;
                }
                "selector_args" => {
                    config.selector_args = split_list(value);
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                tracing::debug!("unknown config key `{key}`");
                continue;
            };

            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(unquote(part.trim())))
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }
}

fn unquote(s: &str) -> &str {
    s.trim_matches('"')
}

/// Comma-separated list; an empty value yields an empty list.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|part| unquote(part.trim()).to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Return the config file path.
fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("VRS_LAUNCHER_CONFIG") {
        return PathBuf::from(path);
    }
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join(env!("CARGO_PKG_NAME")).join("config.toml")
}
