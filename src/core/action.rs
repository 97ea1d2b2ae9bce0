//! Actions returned by command handlers and exporters

/// Outcome of a user-triggered operation, applied by the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action needed
    None,

    /// Copy text to the system clipboard
    Copy { label: &'static str, text: String },

    /// Show notification in status bar
    Notify(String, NotifyLevel),

    /// Request quit
    Quit,
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}

impl Action {
    pub fn info(message: impl Into<String>) -> Self {
        Action::Notify(message.into(), NotifyLevel::Info)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Action::Notify(message.into(), NotifyLevel::Warn)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Action::Notify(message.into(), NotifyLevel::Error)
    }
}
