use std::collections::VecDeque;

/// Maximum number of notices kept for the status bar.
const MAX_NOTICES: usize = 20;

/// Input modes for the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Navigation: cycling plugins, quitting.
    Normal,
    /// Command line (`:next`, `:select`, `:send`, `:quit`).
    Command,
}

/// Connection status for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionDisplay {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// A short message shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// UI state that is not part of the display core.
#[derive(Debug)]
pub struct AppState {
    pub input_mode: InputMode,
    pub connection: ConnectionDisplay,
    pub notices: VecDeque<Notice>,
    /// Host the display talks to, as shown in the status bar.
    pub host: String,
    /// Whether the UI needs a redraw.
    pub dirty: bool,
}

impl AppState {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            input_mode: InputMode::Normal,
            connection: ConnectionDisplay::Connecting,
            notices: VecDeque::new(),
            host: host.into(),
            dirty: true,
        }
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            level,
            text: text.into(),
        });
        self.dirty = true;
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_are_bounded() {
        let mut state = AppState::new("localhost:3012");
        for n in 0..(MAX_NOTICES + 5) {
            state.notify(NoticeLevel::Info, format!("n{n}"));
        }
        assert_eq!(state.notices.len(), MAX_NOTICES);
        assert_eq!(
            state.last_notice().map(|n| n.text.as_str()),
            Some(format!("n{}", MAX_NOTICES + 4).as_str())
        );
    }
}
