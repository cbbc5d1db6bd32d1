//! User configuration: keybindings, display settings and their persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/rdf-tree/config.toml` (default `~/.config/rdf-tree/config.toml`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the tree view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    Expand,
    Collapse,
    JumpSiblingUp,
    JumpSiblingDown,
    ExpandAll,
    CollapseAll,
    Reroot,
    RerootBack,
    OpenColumns,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used when writing the config file).
    pub const ALL: &[Action] = &[
        Action::MoveUp,
        Action::MoveDown,
        Action::Expand,
        Action::Collapse,
        Action::JumpSiblingUp,
        Action::JumpSiblingDown,
        Action::ExpandAll,
        Action::CollapseAll,
        Action::Reroot,
        Action::RerootBack,
        Action::OpenColumns,
        Action::Quit,
    ];

    fn config_key(self) -> &'static str {
        match self {
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::Expand => "expand",
            Action::Collapse => "collapse",
            Action::JumpSiblingUp => "jump_sibling_up",
            Action::JumpSiblingDown => "jump_sibling_down",
            Action::ExpandAll => "expand_all",
            Action::CollapseAll => "collapse_all",
            Action::Reroot => "reroot",
            Action::RerootBack => "reroot_back",
            Action::OpenColumns => "open_columns",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT are compared; SHIFT is already folded into the
    /// character for letter keys.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// Short label for the status bar (e.g. `"Alt+↑"`, `"c"`).
    pub fn display(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            other => key_name(other),
        });
        s
    }

    fn to_config_string(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            other => key_name(other),
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
                _ => return None,
            }
        }

        // Single characters keep their case: `e` and `E` are different keys.
        if key_part.chars().count() == 1 {
            let c = key_part.chars().next()?;
            return Some(KeyBind::new(KeyCode::Char(c), modifiers));
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            s if s.starts_with('f') => KeyCode::F(s[1..].parse().ok()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

fn modifier_prefix(modifiers: KeyModifiers) -> String {
    let mut s = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        s.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        s.push_str("Alt+");
    }
    s
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Up => "Up".into(),
        KeyCode::Down => "Down".into(),
        KeyCode::Left => "Left".into(),
        KeyCode::Right => "Right".into(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::Backspace => "Backspace".into(),
        KeyCode::Delete => "Delete".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PageUp".into(),
        KeyCode::PageDown => "PageDown".into(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Joins multiple values in one cell.
    pub separator: String,
    /// Give the root node a row of its own.
    pub show_root: bool,
    /// Depth used by the expand-all action.
    pub expand_depth: usize,
    /// Double-click detection window for mouse row activation.
    pub double_click_ms: u64,
    /// Namespace prefixes used to shorten IRIs in cells.
    pub prefixes: Vec<(String, String)>,
    /// Predicate IRIs whose columns start hidden.
    pub hidden_columns: Vec<String>,
    /// Predicate IRIs in the order their columns were last arranged.
    pub column_order: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            separator: ", ".into(),
            show_root: true,
            expand_depth: 3,
            double_click_ms: 250,
            prefixes: Vec::new(),
            hidden_columns: Vec::new(),
            column_order: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let alt = KeyModifiers::ALT;
        let mut m = HashMap::new();

        m.insert(MoveUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(MoveDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Expand, vec![KeyBind::new(Right, n), KeyBind::new(Char('l'), n)]);
        m.insert(Collapse, vec![KeyBind::new(Left, n), KeyBind::new(Char('h'), n)]);
        m.insert(JumpSiblingUp, vec![KeyBind::new(Up, alt)]);
        m.insert(JumpSiblingDown, vec![KeyBind::new(Down, alt)]);
        m.insert(ExpandAll, vec![KeyBind::new(Char('e'), n)]);
        m.insert(CollapseAll, vec![KeyBind::new(Char('E'), n)]);
        m.insert(Reroot, vec![KeyBind::new(Char('r'), n)]);
        m.insert(RerootBack, vec![KeyBind::new(Backspace, n), KeyBind::new(Char('R'), n)]);
        m.insert(OpenColumns, vec![KeyBind::new(Char('c'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

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

    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}: navigate | {}: expand | {}/{}: all | {}: re-root | {}: columns | {}: quit",
            self.short_binding(Action::MoveUp),
            self.short_binding(Action::Expand),
            self.short_binding(Action::ExpandAll),
            self.short_binding(Action::CollapseAll),
            self.short_binding(Action::Reroot),
            self.short_binding(Action::OpenColumns),
            self.short_binding(Action::Quit),
        )
    }

    pub fn set_column_hidden(&mut self, predicate: &str, hidden: bool) {
        self.hidden_columns.retain(|p| p != predicate);
        if hidden {
            self.hidden_columns.push(predicate.to_string());
        }
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "using default config");
                Self::default()
            }
        }
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialise())?;
        Ok(())
    }

    fn parse(s: &str) -> Self {
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

            if let Some(prefix) = key.strip_prefix("prefix.") {
                config
                    .prefixes
                    .push((prefix.to_string(), value.trim_matches('"').to_string()));
                continue;
            }

            match key {
                "separator" => {
                    config.separator = value.trim_matches('"').to_string();
                    continue;
                }
                "show_root" => {
                    config.show_root = value == "true";
                    continue;
                }
                "expand_depth" => {
                    if let Ok(v) = value.parse::<usize>() {
                        config.expand_depth = v.clamp(1, 64);
                    }
                    continue;
                }
                "double_click_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.double_click_ms = v.clamp(100, 2000);
                    }
                    continue;
                }
                "hidden_columns" => {
                    config.hidden_columns = parse_list(value);
                    continue;
                }
                "column_order" => {
                    config.column_order = parse_list(value);
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                tracing::warn!(key, "unknown config key");
                continue;
            };

            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# rdf-tree configuration".to_string(),
            String::new(),
            "# Display".to_string(),
            format!("separator = \"{}\"", self.separator),
            format!("show_root = {}", self.show_root),
            format!("expand_depth = {}", self.expand_depth),
            format!("double_click_ms = {}", self.double_click_ms),
            format!("hidden_columns = {}", self.hidden_columns.join(", ")),
            format!("column_order = {}", self.column_order.join(", ")),
            String::new(),
            "# Namespace prefixes: prefix.<name> = <namespace IRI>".to_string(),
        ];
        for (prefix, namespace) in &self.prefixes {
            lines.push(format!("prefix.{prefix} = {namespace}"));
        }
        lines.extend([
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+ (prefix)".to_string(),
            String::new(),
        ]);

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|p| p.trim().trim_matches('"').to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Return the config file path (`$XDG_CONFIG_HOME/rdf-tree/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("rdf-tree").join("config.toml")
}
