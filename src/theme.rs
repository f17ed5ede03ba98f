use ratatui::style::{Color, Modifier, Style};

/// Binary theme preference, persisted as the literal strings "light"/"dark".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Theme> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn flipped(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Durable slot for the theme preference. Loading never fails; a slot that
/// cannot read or write behaves as if nothing was stored.
pub trait ThemeStorage {
    fn load(&self) -> Option<Theme>;
    fn store(&self, theme: Theme);
}

/// Fallback for environments without a usable config directory.
pub struct NoStorage;

impl ThemeStorage for NoStorage {
    fn load(&self) -> Option<Theme> {
        None
    }

    fn store(&self, _theme: Theme) {}
}

/// Single source of truth for the active theme. Every change, including the
/// initial resolution, is written back to storage.
pub struct ThemeStore {
    current: Theme,
    storage: Box<dyn ThemeStorage>,
}

impl ThemeStore {
    pub fn new(storage: Box<dyn ThemeStorage>) -> Self {
        let current = storage.load().unwrap_or_default();
        storage.store(current);
        Self { current, storage }
    }

    pub fn get(&self) -> Theme {
        self.current
    }

    /// Flip light<->dark, persist, and return the new value.
    pub fn toggle(&mut self) -> Theme {
        self.current = self.current.flipped();
        self.storage.store(self.current);
        self.current
    }

    pub fn palette(&self) -> Palette {
        Palette::for_theme(self.current)
    }
}

/// Concrete widget styles for the active theme, so no widget picks colors
/// on its own.
pub struct Palette {
    pub background: Color,
    pub title: Style,
    pub hint: Style,
    pub border: Style,
    pub user_prefix: Style,
    pub agent_prefix: Style,
    pub message_text: Style,
    pub placeholder: Style,
    pub typing: Style,
    pub input_text: Style,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self::light(),
            Theme::Dark => Self::dark(),
        }
    }

    fn light() -> Self {
        Palette {
            background: Color::White,
            title: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            hint: Style::default().fg(Color::Gray),
            border: Style::default().fg(Color::DarkGray),
            user_prefix: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            agent_prefix: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            message_text: Style::default().fg(Color::Black),
            placeholder: Style::default().fg(Color::Gray),
            typing: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            input_text: Style::default().fg(Color::Black),
        }
    }

    fn dark() -> Self {
        Palette {
            background: Color::Black,
            title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            hint: Style::default().fg(Color::DarkGray),
            border: Style::default().fg(Color::DarkGray),
            user_prefix: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            agent_prefix: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            message_text: Style::default().fg(Color::White),
            placeholder: Style::default().fg(Color::DarkGray),
            typing: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            input_text: Style::default().fg(Color::White),
        }
    }
}
