/// Keys the controls react to. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    ArrowDown,
    ArrowUp,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Escape,
    Tab,
    Other,
}

impl Key {
    /// Map a `KeyboardEvent.key` string.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Enter" => Key::Enter,
            " " | "Spacebar" => Key::Space,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "Home" => Key::Home,
            "End" => Key::End,
            "Escape" | "Esc" => Key::Escape,
            "Tab" => Key::Tab,
            _ => Key::Other,
        }
    }

    /// Whether the DOM default action should be suppressed when the control handled the key.
    pub fn is_navigation(self) -> bool {
        !matches!(self, Key::Tab | Key::Other)
    }
}
