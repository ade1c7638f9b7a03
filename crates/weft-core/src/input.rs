//! Decoded input events, key patterns, and the router.
//!
//! The router accepts vim-style key pattern registrations (`"q"`,
//! `"<Tab>"`, `"<C-d>"`) and delivers decoded key events to the
//! matching handlers, reporting back whether anything handled the key.

use crate::error::{Result, WeftError};

/// A decoded terminal event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// Text was pasted (bracketed paste mode).
    Paste(String),
}

/// A keyboard event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code.
    pub code: KeyCode,
    /// Active modifiers.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event.
    pub fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// Create a plain key event with no modifiers.
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }
}

/// A key code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KeyCode {
    /// A character key.
    Char(char),
    /// Enter / Return.
    Enter,
    /// Tab.
    Tab,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Escape.
    Escape,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Function key (F1-F12).
    F(u8),
}

/// Keyboard modifier flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self(0);
    /// Shift modifier.
    pub const SHIFT: Self = Self(1);
    /// Ctrl modifier.
    pub const CTRL: Self = Self(2);
    /// Alt/Option modifier.
    pub const ALT: Self = Self(4);

    /// Check if this modifier set contains the given modifier.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0 && other.0 != 0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A parsed key pattern, matched against decoded key events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPattern {
    /// The key code to match.
    pub code: KeyCode,
    /// The exact modifier set to match.
    pub modifiers: Modifiers,
}

impl KeyPattern {
    /// Parse a pattern spec: a bare character (`"q"`), a named key
    /// (`"<Tab>"`, `"<Esc>"`), or a modified key (`"<C-d>"`,
    /// `"<S-Tab>"`, `"<C-A-x>"`).
    pub fn parse(spec: &str) -> Result<Self> {
        if !spec.starts_with('<') {
            let mut chars = spec.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Self {
                    code: KeyCode::Char(c),
                    modifiers: Modifiers::NONE,
                }),
                _ => Err(WeftError::KeyPattern(format!(
                    "expected a single character or <...> spec, got {spec:?}"
                ))),
            };
        }
        let inner = spec
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .ok_or_else(|| WeftError::KeyPattern(format!("unterminated pattern {spec:?}")))?;
        if inner.is_empty() {
            return Err(WeftError::KeyPattern("empty pattern <>".into()));
        }

        let parts: Vec<&str> = inner.split('-').collect();
        let (mod_parts, key_part) = match parts.split_last() {
            Some((key, mods)) => (mods, *key),
            None => {
                return Err(WeftError::KeyPattern(format!("empty pattern {spec:?}")));
            }
        };

        let mut modifiers = Modifiers::NONE;
        for m in mod_parts {
            modifiers = modifiers
                | match *m {
                    "C" | "c" => Modifiers::CTRL,
                    "S" | "s" => Modifiers::SHIFT,
                    "A" | "a" | "M" | "m" => Modifiers::ALT,
                    other => {
                        return Err(WeftError::KeyPattern(format!(
                            "unknown modifier {other:?} in {spec:?}"
                        )));
                    }
                };
        }

        let code = parse_key_name(key_part, spec)?;
        Ok(Self { code, modifiers })
    }

    /// Returns true if the event matches this pattern exactly.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.code == event.code && self.modifiers == event.modifiers
    }
}

fn parse_key_name(name: &str, spec: &str) -> Result<KeyCode> {
    let code = match name.to_ascii_lowercase().as_str() {
        "cr" | "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "bs" | "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "esc" | "escape" => KeyCode::Escape,
        "space" => KeyCode::Char(' '),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        _ => {
            let mut chars = name.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                KeyCode::Char(c)
            } else if let Some(n) = name
                .strip_prefix(['f', 'F'])
                .and_then(|d| d.parse::<u8>().ok())
                .filter(|n| (1..=12).contains(n))
            {
                KeyCode::F(n)
            } else {
                return Err(WeftError::KeyPattern(format!(
                    "unknown key {name:?} in {spec:?}"
                )));
            }
        }
    };
    Ok(code)
}

type Handler = Box<dyn FnMut(&KeyEvent)>;

struct Route {
    pattern: KeyPattern,
    handler: Handler,
}

/// Dispatches decoded key events to pattern-bound handlers.
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Bind a handler to a key pattern spec.
    pub fn bind(
        &mut self,
        spec: &str,
        handler: impl FnMut(&KeyEvent) + 'static,
    ) -> Result<()> {
        let pattern = KeyPattern::parse(spec)?;
        self.routes.push(Route {
            pattern,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Deliver an event to every matching handler. Returns true if at
    /// least one handler matched.
    pub fn dispatch(&mut self, event: &KeyEvent) -> bool {
        let mut handled = false;
        for route in &mut self.routes {
            if route.pattern.matches(event) {
                (route.handler)(event);
                handled = true;
            }
        }
        handled
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Event {
    /// Convert a crossterm event to a decoded event. Returns `None` for
    /// events the engine does not route (key releases, focus changes,
    /// mouse input).
    pub fn from_crossterm(ct: crossterm::event::Event) -> Option<Event> {
        match ct {
            crossterm::event::Event::Key(key) => {
                if key.kind == crossterm::event::KeyEventKind::Release {
                    return None;
                }
                Some(Event::Key(KeyEvent {
                    code: convert_code(key.code)?,
                    modifiers: convert_modifiers(key.modifiers),
                }))
            }
            crossterm::event::Event::Resize(w, h) => Some(Event::Resize(w, h)),
            crossterm::event::Event::Paste(text) => Some(Event::Paste(text)),
            _ => None,
        }
    }
}

fn convert_code(ct: crossterm::event::KeyCode) -> Option<KeyCode> {
    use crossterm::event::KeyCode as Ct;
    Some(match ct {
        Ct::Char(c) => KeyCode::Char(c),
        Ct::Enter => KeyCode::Enter,
        Ct::Tab | Ct::BackTab => KeyCode::Tab,
        Ct::Backspace => KeyCode::Backspace,
        Ct::Delete => KeyCode::Delete,
        Ct::Esc => KeyCode::Escape,
        Ct::Up => KeyCode::Up,
        Ct::Down => KeyCode::Down,
        Ct::Left => KeyCode::Left,
        Ct::Right => KeyCode::Right,
        Ct::Home => KeyCode::Home,
        Ct::End => KeyCode::End,
        Ct::PageUp => KeyCode::PageUp,
        Ct::PageDown => KeyCode::PageDown,
        Ct::F(n) => KeyCode::F(n),
        _ => return None,
    })
}

fn convert_modifiers(ct: crossterm::event::KeyModifiers) -> Modifiers {
    let mut m = Modifiers::NONE;
    if ct.contains(crossterm::event::KeyModifiers::SHIFT) {
        m = m | Modifiers::SHIFT;
    }
    if ct.contains(crossterm::event::KeyModifiers::CONTROL) {
        m = m | Modifiers::CTRL;
    }
    if ct.contains(crossterm::event::KeyModifiers::ALT) {
        m = m | Modifiers::ALT;
    }
    m
}
