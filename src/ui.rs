//! Visible state of one extraction or probe cycle.
//!
//! State only changes through [`reduce`]; a [`Surface`] renders it. The
//! terminal surface is what the CLI uses, tests substitute a recorder.

use std::io::Write;

/// Shown when the backend reports success without a URL.
pub const NO_URL_PLACEHOLDER: &str = "(no url returned)";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UiState {
    pub loading: bool,
    pub result_visible: bool,
    pub displayed_text: String,
    pub preview_src: String,
    pub preview_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiIntent {
    /// A cycle starts: show loading, hide and clear the previous result.
    Begin,
    Extracted { video_url: Option<String> },
    ProbeText(String),
    /// Every cycle ends here, whatever happened in between.
    Finish,
}

pub fn reduce(state: UiState, intent: UiIntent) -> UiState {
    match intent {
        UiIntent::Begin => UiState {
            loading: true,
            ..UiState::default()
        },
        UiIntent::Extracted { video_url } => {
            let preview_visible = video_url.is_some();
            let preview_src = video_url.clone().unwrap_or_default();
            UiState {
                displayed_text: video_url.unwrap_or_else(|| NO_URL_PLACEHOLDER.to_string()),
                preview_src,
                preview_visible,
                result_visible: true,
                ..state
            }
        }
        UiIntent::ProbeText(text) => UiState {
            displayed_text: text,
            result_visible: true,
            ..state
        },
        UiIntent::Finish => UiState {
            loading: false,
            ..state
        },
    }
}

// ── Notifications ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

pub trait Surface {
    fn render(&mut self, state: &UiState);
    fn notify(&mut self, notification: &Notification);
}

/// Holds the current state and pushes every change to its surface.
pub struct Session<S: Surface> {
    state: UiState,
    surface: S,
}

impl<S: Surface> Session<S> {
    pub fn new(surface: S) -> Self {
        Self {
            state: UiState::default(),
            surface,
        }
    }

    pub fn apply(&mut self, intent: UiIntent) {
        self.state = reduce(std::mem::take(&mut self.state), intent);
        self.surface.render(&self.state);
    }

    pub fn notify(&mut self, notification: Notification) {
        match notification.level {
            Level::Info => tracing::debug!(kind = "info", "{}", notification.message),
            Level::Error => tracing::debug!(kind = "error", "{}", notification.message),
        }
        self.surface.notify(&notification);
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

/// Prints the result to stdout and notifications to stderr.
pub struct TerminalSurface<W: Write, E: Write> {
    out: W,
    err: E,
    was_loading: bool,
    printed: bool,
}

impl TerminalSurface<std::io::Stdout, std::io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdout(), std::io::stderr())
    }
}

impl<W: Write, E: Write> TerminalSurface<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self {
            out,
            err,
            was_loading: false,
            printed: false,
        }
    }

    pub fn into_parts(self) -> (W, E) {
        (self.out, self.err)
    }
}

impl<W: Write, E: Write> Surface for TerminalSurface<W, E> {
    fn render(&mut self, state: &UiState) {
        if state.loading && !self.was_loading {
            let _ = writeln!(self.err, "working...");
        }
        // A result is printed once, after loading clears.
        if !state.result_visible {
            self.printed = false;
        } else if !state.loading && !self.printed {
            let _ = writeln!(self.out, "{}", state.displayed_text);
            if state.preview_visible {
                let _ = writeln!(self.out, "preview: {}", state.preview_src);
            }
            self.printed = true;
        }
        self.was_loading = state.loading;
        let _ = self.out.flush();
    }

    fn notify(&mut self, notification: &Notification) {
        let prefix = match notification.level {
            Level::Info => "",
            Level::Error => "Error: ",
        };
        let _ = writeln!(self.err, "{}{}", prefix, notification.message);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    /// Keeps every rendered state and notification.
    #[derive(Default)]
    pub struct RecordingSurface {
        pub states: Vec<UiState>,
        pub notifications: Vec<Notification>,
    }

    impl Surface for RecordingSurface {
        fn render(&mut self, state: &UiState) {
            self.states.push(state.clone());
        }

        fn notify(&mut self, notification: &Notification) {
            self.notifications.push(notification.clone());
        }
    }
}
