use std::time::{Duration, Instant};

use crate::config::Config;
use crate::core::{Action, Command, NotifyLevel};
use crate::domain::{Certificate, FilterEngine, FilterKind, Selection, ViewMode};
use crate::infrastructure::{Connection, FailedToken};
use crate::ui::format;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Live search; every keystroke re-filters
    Search,
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct PendingChord {
    pub key: char,
    pub since: Instant,
}

pub struct App {
    pub engine: FilterEngine,
    pub config: Config,
    pub endpoint: String,
    pub connection: Option<Connection>,
    pub selected: usize,
    pub input_mode: InputMode,
    pub command: CommandBar,
    pub detail_open: bool,
    pub help_open: bool,
    pub loading: bool,
    /// Tokens dropped from the most recent load
    pub failed: Vec<FailedToken>,
    pub status: Option<StatusMessage>,
    pub pending_chord: Option<PendingChord>,
    pub should_quit: bool,
    /// Newest reload handed out; older `Loaded` batches are stale
    reload_seq: u64,
    pending_reload: Option<u64>,
}

impl App {
    pub fn new(config: Config, endpoint: impl Into<String>) -> Self {
        Self {
            engine: FilterEngine::new(),
            config,
            endpoint: endpoint.into(),
            connection: None,
            selected: 0,
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            detail_open: false,
            help_open: false,
            loading: false,
            failed: Vec::new(),
            status: None,
            pending_chord: None,
            should_quit: false,
            reload_seq: 0,
            pending_reload: None,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        self.clear_expired_chord();
        if let Some(status) = self.status.as_ref() {
            let ttl = match status.level {
                StatusLevel::Error => Duration::from_secs(10),
                StatusLevel::Info | StatusLevel::Warn => Duration::from_secs(3),
            };
            if status.since.elapsed() > ttl {
                self.status = None;
            }
        }
    }

    /// Viewer identity of the live connection, lowercase hex
    pub fn viewer(&self) -> Option<&str> {
        self.connection
            .as_ref()
            .and_then(|connection| connection.viewer.as_deref())
    }

    pub fn contract(&self) -> Option<&str> {
        self.config.contract()
    }

    // ---- background data ----

    /// Queue a reload for the worker; returns its sequence number
    pub fn request_reload(&mut self) -> u64 {
        self.reload_seq += 1;
        self.pending_reload = Some(self.reload_seq);
        self.loading = true;
        self.set_status("Loading certificates...", StatusLevel::Info);
        self.reload_seq
    }

    pub fn take_reload_request(&mut self) -> Option<u64> {
        self.pending_reload.take()
    }

    pub fn latest_reload(&self) -> u64 {
        self.reload_seq
    }

    pub fn apply_connected(&mut self, connection: Connection) {
        tracing::info!(
            endpoint = %connection.endpoint,
            chain_id = connection.chain_id,
            viewer = connection.viewer.as_deref().unwrap_or("-"),
            "connected"
        );
        self.endpoint = connection.endpoint.clone();
        self.connection = Some(connection);
    }

    /// Install a loaded batch unless a newer reload has been requested since
    pub fn apply_loaded(&mut self, seq: u64, certificates: Vec<Certificate>, failed: Vec<FailedToken>) {
        if seq < self.reload_seq {
            tracing::debug!(seq, latest = self.reload_seq, "discarding stale load");
            return;
        }

        let count = certificates.len();
        self.engine.load(certificates);
        self.selected = 0;
        self.detail_open = false;
        self.loading = false;

        if failed.is_empty() {
            self.set_status(format!("Loaded {count} certificates"), StatusLevel::Info);
        } else {
            self.set_status(
                format!("Loaded {count} certificates ({} failed, see log)", failed.len()),
                StatusLevel::Warn,
            );
        }
        self.failed = failed;
    }

    pub fn apply_error(&mut self, seq: Option<u64>, message: String) {
        if seq.is_some_and(|seq| seq < self.reload_seq) {
            return;
        }
        if seq.is_some() {
            self.loading = false;
        }
        self.set_status(message, StatusLevel::Error);
    }

    // ---- selection ----

    pub fn selected_certificate(&self) -> Option<&Certificate> {
        self.engine.visible_at(self.selected)
    }

    pub fn clamp_selection(&mut self) {
        let len = self.engine.visible_len();
        if len == 0 {
            self.selected = 0;
            self.detail_open = false;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn move_selection_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        let len = self.engine.visible_len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn go_to_top(&mut self) {
        self.selected = 0;
    }

    pub fn go_to_bottom(&mut self) {
        self.selected = self.engine.visible_len().saturating_sub(1);
    }

    pub fn page_up(&mut self, amount: usize) {
        self.selected = self.selected.saturating_sub(amount);
    }

    pub fn page_down(&mut self, amount: usize) {
        let len = self.engine.visible_len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + amount).min(len - 1);
    }

    // ---- filters ----

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.engine.set_view_mode(mode);
        self.clamp_selection();
        if mode == ViewMode::Mine && self.viewer().is_none() {
            self.set_status("No viewer address; nothing is owned", StatusLevel::Warn);
        }
    }

    pub fn set_filter_text(&mut self, kind: FilterKind, raw: &str) {
        self.set_filter(kind, Selection::from_choice(raw));
    }

    /// Apply a selector value exactly as given
    pub fn set_filter(&mut self, kind: FilterKind, selection: Selection<String>) {
        let message = match selection.value() {
            Some(value) => format!("{}: {}", kind.label(), value),
            None => format!("{}: all", kind.label()),
        };
        self.engine.set_filter(kind, selection);
        self.clamp_selection();
        self.set_status(message, StatusLevel::Info);
    }

    /// Step a selector through `Any` and then each option in order
    pub fn cycle_filter(&mut self, kind: FilterKind) {
        let choices = self.engine.options().choices(kind);
        let next = match self.engine.state().selection(kind).value() {
            None => choices.first().cloned(),
            Some(current) => match choices.iter().position(|choice| choice == current) {
                Some(idx) => choices.get(idx + 1).cloned(),
                None => choices.first().cloned(),
            },
        };
        let selection = match next {
            Some(choice) => Selection::Only(choice),
            None => Selection::Any,
        };
        self.set_filter(kind, selection);
    }

    pub fn remove_filter(&mut self, kind: FilterKind) {
        self.engine.remove_filter(kind);
        self.clamp_selection();
        self.set_status(format!("Removed {} filter", kind.label()), StatusLevel::Info);
    }

    pub fn reset_filters(&mut self) {
        self.engine.reset_filters();
        self.clamp_selection();
        self.set_status("Filters reset", StatusLevel::Info);
    }

    // ---- search input ----

    pub fn enter_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.command.input = self.engine.state().search.clone();
    }

    pub fn push_search_char(&mut self, ch: char) {
        self.command.input.push(ch);
        self.sync_search();
    }

    pub fn pop_search_char(&mut self) {
        self.command.input.pop();
        self.sync_search();
    }

    /// Enter: keep the search and return to the list
    pub fn commit_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    /// Esc: drop the search entirely
    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
        self.sync_search();
    }

    fn sync_search(&mut self) {
        self.engine.set_search_text(self.command.input.as_str());
        self.clamp_selection();
    }

    // ---- command line ----

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn apply_command(&mut self) {
        let input = self.command.input.trim().to_string();
        if input.is_empty() {
            self.exit_command();
            return;
        }

        let cmd = crate::core::parse_command(&input);
        self.exit_command();
        let action = self.execute_command(&cmd);
        self.apply_action(action);
        self.command.last = Some(input);
    }

    pub fn execute_command(&mut self, cmd: &Command) -> Action {
        match cmd {
            Command::Program(value) => {
                self.set_filter_text(FilterKind::Program, value);
                Action::None
            }
            Command::Grade(value) => {
                self.set_filter_text(FilterKind::Grade, value);
                Action::None
            }
            Command::Year(value) => {
                self.set_filter_text(FilterKind::Year, value);
                Action::None
            }
            Command::Search(text) => {
                self.engine.set_search_text(text.as_str());
                self.clamp_selection();
                Action::info(format!("Search: {text}"))
            }
            Command::ClearSearch => {
                self.engine.set_search_text("");
                self.clamp_selection();
                Action::info("Search cleared")
            }
            Command::Reset => {
                self.reset_filters();
                Action::None
            }
            Command::Remove(kind) => {
                self.remove_filter(*kind);
                Action::None
            }
            Command::All => {
                self.set_view_mode(ViewMode::All);
                Action::None
            }
            Command::Mine => {
                self.set_view_mode(ViewMode::Mine);
                Action::None
            }
            Command::Reload => {
                self.request_reload();
                Action::None
            }
            Command::Export(format) => crate::modules::export::export_visible(&self.engine, *format),
            Command::Open(token_id) => self.open_token(*token_id),
            Command::Help => {
                self.help_open = true;
                Action::None
            }
            Command::Quit => Action::Quit,
            Command::Unknown(s) => Action::warn(format!("Unknown command: {s}")),
        }
    }

    /// Apply an action returned by a command or module
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Copy { label, text } => self.copy_to_clipboard(label, text),
            Action::Notify(msg, level) => {
                let level = match level {
                    NotifyLevel::Info => StatusLevel::Info,
                    NotifyLevel::Warn => StatusLevel::Warn,
                    NotifyLevel::Error => StatusLevel::Error,
                };
                self.set_status(msg, level);
            }
            Action::Quit => self.should_quit = true,
        }
    }

    // ---- details ----

    pub fn open_detail(&mut self) {
        if self.selected_certificate().is_some() {
            self.detail_open = true;
        }
    }

    pub fn open_token(&mut self, token_id: u64) -> Action {
        if let Some(position) = self.engine.visible_position(token_id) {
            self.selected = position;
            self.detail_open = true;
            return Action::None;
        }
        if self.engine.find(token_id).is_some() {
            Action::warn(format!("Certificate #{token_id} is hidden by the active filters"))
        } else {
            Action::error(format!("No certificate #{token_id}"))
        }
    }

    /// Esc in normal mode: close the topmost overlay
    pub fn close_overlay(&mut self) {
        if self.help_open {
            self.help_open = false;
        } else {
            self.detail_open = false;
        }
    }

    /// NFT viewer link for a certificate, when a contract is configured
    pub fn certificate_link(&self, certificate: &Certificate) -> Option<String> {
        self.contract().map(|contract| {
            format::certificate_link(
                self.config.nft_view_base_url(),
                contract,
                certificate.token_id,
            )
        })
    }

    /// Explorer page for the configured contract
    pub fn contract_link(&self) -> Option<String> {
        self.contract()
            .map(|contract| format::contract_link(self.config.explorer_base_url(), contract))
    }

    pub fn copy_owner(&self) -> Action {
        match self.selected_certificate() {
            Some(cert) => Action::Copy {
                label: "owner",
                text: cert.owner.clone(),
            },
            None => Action::warn("Nothing to copy"),
        }
    }

    pub fn copy_token_uri(&self) -> Action {
        match self.selected_certificate() {
            Some(cert) if !cert.token_uri.is_empty() => Action::Copy {
                label: "token URI",
                text: cert.token_uri.clone(),
            },
            Some(_) => Action::warn("Certificate has no token URI"),
            None => Action::warn("Nothing to copy"),
        }
    }

    fn copy_to_clipboard(&mut self, label: &str, text: String) {
        use arboard::Clipboard;

        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.clone())) {
            Ok(()) => self.set_status(format!("Copied {label}: {text}"), StatusLevel::Info),
            Err(err) => {
                tracing::warn!(error = %err, "clipboard unavailable");
                self.set_status("Clipboard not available", StatusLevel::Error);
            }
        }
    }

    // ---- chords ----

    pub fn set_chord(&mut self, key: char) {
        self.pending_chord = Some(PendingChord {
            key,
            since: Instant::now(),
        });
    }

    pub fn consume_chord(&mut self, key: char) -> bool {
        let Some(chord) = self.pending_chord.as_ref() else {
            return false;
        };
        if chord.key != key {
            return false;
        }
        if chord.since.elapsed() > Duration::from_millis(800) {
            self.pending_chord = None;
            return false;
        }
        self.pending_chord = None;
        true
    }

    pub fn clear_chord(&mut self) {
        self.pending_chord = None;
    }

    fn clear_expired_chord(&mut self) {
        let Some(chord) = self.pending_chord.as_ref() else {
            return;
        };
        if chord.since.elapsed() > Duration::from_millis(800) {
            self.pending_chord = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWER: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const OTHER: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn cert(token_id: u64, name: &str, program: &str, grade: &str, year: u64, mine: bool) -> Certificate {
        Certificate {
            token_id,
            name: name.into(),
            program: program.into(),
            grade: grade.into(),
            year,
            issued_at: 1_700_000_000,
            owner: if mine { VIEWER } else { OTHER }.into(),
            token_uri: format!("ipfs://cert/{token_id}"),
            is_owner: mine,
        }
    }

    fn loaded_app() -> App {
        let mut app = App::new(Config::default(), "http://localhost:8545");
        app.apply_connected(Connection {
            endpoint: "http://localhost:8545".into(),
            chain_id: 97,
            viewer: Some(VIEWER.into()),
        });
        let seq = app.request_reload();
        app.apply_loaded(
            seq,
            vec![
                cert(1, "Alice", "CS", "A", 2023, true),
                cert(2, "Bob", "Math", "B", 2022, false),
                cert(3, "Carol", "CS", "A+", 2023, false),
            ],
            Vec::new(),
        );
        app
    }

    #[test]
    fn test_stale_load_is_ignored() {
        let mut app = App::new(Config::default(), "local");
        let first = app.request_reload();
        let second = app.request_reload();
        assert_eq!(app.take_reload_request(), Some(second));

        app.apply_loaded(second, vec![cert(7, "New", "CS", "A", 2024, false)], Vec::new());
        app.apply_loaded(first, vec![cert(1, "Old", "CS", "A", 2020, false)], Vec::new());

        assert_eq!(app.engine.stats().total, 1);
        assert_eq!(app.engine.certificates()[0].token_id, 7);
        assert!(!app.loading);
    }

    #[test]
    fn test_stale_error_is_ignored() {
        let mut app = App::new(Config::default(), "local");
        let first = app.request_reload();
        app.request_reload();
        app.apply_error(Some(first), "boom".into());
        assert!(app.loading);
        assert_eq!(
            app.status_text(),
            Some(("Loading certificates...", StatusLevel::Info))
        );
    }

    #[test]
    fn test_failed_tokens_warn() {
        let mut app = App::new(Config::default(), "local");
        let seq = app.request_reload();
        app.apply_loaded(
            seq,
            vec![cert(1, "Alice", "CS", "A", 2023, false)],
            vec![FailedToken {
                token_id: "2".into(),
                error: "reverted".into(),
            }],
        );
        let (text, level) = app.status_text().unwrap();
        assert_eq!(level, StatusLevel::Warn);
        assert!(text.contains("1 failed"));
        assert_eq!(app.failed.len(), 1);
    }

    #[test]
    fn test_selection_clamped_after_filter() {
        let mut app = loaded_app();
        app.go_to_bottom();
        assert_eq!(app.selected, 2);

        app.set_filter_text(FilterKind::Program, "Math");
        assert_eq!(app.engine.visible_len(), 1);
        assert_eq!(app.selected, 0);
        assert_eq!(app.selected_certificate().unwrap().token_id, 2);

        app.set_filter_text(FilterKind::Program, "Physics");
        assert_eq!(app.engine.visible_len(), 0);
        assert!(app.selected_certificate().is_none());
    }

    #[test]
    fn test_cycle_filter_wraps_to_any() {
        let mut app = loaded_app();
        app.cycle_filter(FilterKind::Year);
        assert_eq!(app.engine.state().year, Selection::only("2023"));
        app.cycle_filter(FilterKind::Year);
        assert_eq!(app.engine.state().year, Selection::only("2022"));
        app.cycle_filter(FilterKind::Year);
        assert!(app.engine.state().year.is_any());
    }

    #[test]
    fn test_cycle_filter_keeps_option_text_verbatim() {
        let mut app = App::new(Config::default(), "local");
        let seq = app.request_reload();
        app.apply_loaded(
            seq,
            vec![
                cert(1, "Alice", " CS", "A", 2023, false),
                cert(2, "Bob", "All", "B", 2022, false),
                cert(3, "Carol", "Math", "A", 2023, false),
            ],
            Vec::new(),
        );

        let mut seen = Vec::new();
        for _ in 0..4 {
            app.cycle_filter(FilterKind::Program);
            seen.push((
                app.engine.state().program.clone(),
                app.engine.output().visible_ids(),
            ));
        }
        assert_eq!(
            seen,
            vec![
                (Selection::only(" CS"), vec![1]),
                (Selection::only("All"), vec![2]),
                (Selection::only("Math"), vec![3]),
                (Selection::Any, vec![1, 2, 3]),
            ]
        );
    }

    #[test]
    fn test_live_search_and_cancel() {
        let mut app = loaded_app();
        app.enter_search();
        for ch in "car".chars() {
            app.push_search_char(ch);
        }
        assert_eq!(app.engine.visible_len(), 1);
        app.commit_search();
        assert_eq!(app.engine.state().search, "car");
        assert_eq!(app.input_mode, InputMode::Normal);

        app.enter_search();
        assert_eq!(app.command.input, "car");
        app.pop_search_char();
        assert_eq!(app.engine.state().search, "ca");
        app.cancel_search();
        assert_eq!(app.engine.state().search, "");
        assert_eq!(app.engine.visible_len(), 3);
    }

    #[test]
    fn test_commands_drive_engine() {
        let mut app = loaded_app();
        app.command.input = "grade A+".into();
        app.apply_command();
        assert_eq!(app.engine.visible_len(), 1);

        app.command.input = "mine".into();
        app.apply_command();
        assert_eq!(app.engine.visible_len(), 0);

        app.command.input = "reset".into();
        app.apply_command();
        assert_eq!(app.engine.state().view_mode, ViewMode::Mine);
        assert_eq!(app.engine.visible_len(), 1);

        app.command.input = "bogus".into();
        app.apply_command();
        assert_eq!(
            app.status_text(),
            Some(("Unknown command: bogus", StatusLevel::Warn))
        );
    }

    #[test]
    fn test_open_token() {
        let mut app = loaded_app();
        assert_eq!(app.open_token(3), Action::None);
        assert!(app.detail_open);
        assert_eq!(app.selected, 2);

        app.close_overlay();
        app.set_filter_text(FilterKind::Program, "Math");
        assert!(matches!(
            app.open_token(1),
            Action::Notify(_, NotifyLevel::Warn)
        ));
        assert!(matches!(
            app.open_token(42),
            Action::Notify(_, NotifyLevel::Error)
        ));
    }

    #[test]
    fn test_copy_actions() {
        let mut app = loaded_app();
        assert_eq!(
            app.copy_owner(),
            Action::Copy {
                label: "owner",
                text: VIEWER.into()
            }
        );
        app.move_selection_down();
        assert_eq!(
            app.copy_token_uri(),
            Action::Copy {
                label: "token URI",
                text: "ipfs://cert/2".into()
            }
        );
    }

    #[test]
    fn test_certificate_link_needs_contract() {
        let mut app = loaded_app();
        let first = app.engine.certificates()[0].clone();
        assert_eq!(app.certificate_link(&first), None);

        app.config.contract = Some("0x1111111111111111111111111111111111111111".into());
        assert_eq!(
            app.certificate_link(&first).as_deref(),
            Some("https://testnet.bscscan.com/nft/0x1111111111111111111111111111111111111111/1")
        );
    }

    #[test]
    fn test_mine_without_viewer_warns() {
        let mut app = App::new(Config::default(), "local");
        app.set_view_mode(ViewMode::Mine);
        assert_eq!(app.status_text().map(|(_, level)| level), Some(StatusLevel::Warn));
    }
}
