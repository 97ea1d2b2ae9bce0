use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use certdeck::app::{App, InputMode, StatusLevel};
use certdeck::config::{self, Config};
use certdeck::core::ExportFormat;
use certdeck::domain::{FilterKind, ViewMode};
use certdeck::infrastructure::{
    ProviderConfig, RuntimeBridge, RuntimeCommand, RuntimeEvent, WorkerConfig,
};
use certdeck::{logging, ui};

#[derive(Debug, Parser)]
#[command(
    name = "certdeck",
    version,
    about = "CertDeck: browse and filter graduation certificate NFTs from the terminal"
)]
struct Args {
    /// JSON-RPC endpoint (http(s):// or ws(s)://)
    #[arg(long)]
    rpc: Option<String>,

    /// Certificate contract address
    #[arg(long)]
    contract: Option<String>,

    /// Address treated as the connected wallet
    #[arg(long)]
    viewer: Option<String>,

    /// Expected chain id
    #[arg(long)]
    chain_id: Option<u64>,
}

impl Args {
    fn apply_to(self, config: &mut Config) {
        if self.rpc.is_some() {
            config.rpc = self.rpc;
        }
        if self.contract.is_some() {
            config.contract = self.contract;
        }
        if self.viewer.is_some() {
            config.viewer = self.viewer;
        }
        if self.chain_id.is_some() {
            config.chain_id = self.chain_id;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let logging_enabled = logging::init(config::log_path().as_deref());

    let (mut config, config_error) = match config::load_strict() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };
    args.apply_to(&mut config);

    let endpoint = ProviderConfig::from_endpoint(config.rpc());
    tracing::info!(
        endpoint = %endpoint.display(),
        contract = config.contract().unwrap_or("-"),
        chain_id = config.chain_id(),
        "starting"
    );

    let runtime = RuntimeBridge::new(WorkerConfig {
        endpoint: endpoint.clone(),
        contract: config.contract().map(str::to_string),
        chain_id: config.chain_id(),
        viewer: config.viewer(),
    })?;

    let mut app = App::new(config, endpoint.display());
    app.request_reload();
    if let Some(err) = config_error {
        tracing::warn!(error = %err, "config ignored");
        app.set_status(format!("Config ignored: {err}"), StatusLevel::Warn);
    } else if !logging_enabled {
        app.set_status("Logging disabled: cannot open log file", StatusLevel::Warn);
    }

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "exited with error");
        eprintln!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => handle_key(&mut app, key),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::Connected(connection) => app.apply_connected(connection),
            RuntimeEvent::Loaded {
                seq,
                certificates,
                failed,
            } => app.apply_loaded(seq, certificates, failed),
            RuntimeEvent::Error { seq, message } => app.apply_error(seq, message),
        }
    }

    if let Some(seq) = app.take_reload_request() {
        if let Err(err) = runtime.send(RuntimeCommand::Reload { seq }) {
            app.apply_error(Some(seq), format!("{err:#}"));
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Search => handle_search_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    if key.code != KeyCode::Char('g') {
        app.clear_chord();
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true
        }
        (KeyCode::Char('u'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            app.page_up(page_amount());
        }
        (KeyCode::Char('d'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            app.page_down(page_amount());
        }
        (KeyCode::Char('q'), _) => app.should_quit = true,
        (KeyCode::Char('?'), _) => app.help_open = true,
        (KeyCode::Char('/'), _) => app.enter_search(),
        (KeyCode::Char(':'), _) => app.enter_command(),
        (KeyCode::Char('a'), _) => app.set_view_mode(ViewMode::All),
        (KeyCode::Char('m'), _) => app.set_view_mode(ViewMode::Mine),
        (KeyCode::Char('x'), _) => app.reset_filters(),
        (KeyCode::Char('p'), _) => app.cycle_filter(FilterKind::Program),
        (KeyCode::Char('g'), _) => {
            if app.consume_chord('g') {
                app.go_to_top();
            } else {
                app.set_chord('g');
            }
        }
        (KeyCode::Char('t'), _) => app.cycle_filter(FilterKind::Grade),
        (KeyCode::Char('y'), _) => app.cycle_filter(FilterKind::Year),
        (KeyCode::Char('G'), _) => app.go_to_bottom(),
        (KeyCode::Char('c'), _) => {
            let action = app.copy_owner();
            app.apply_action(action);
        }
        (KeyCode::Char('u'), _) => {
            let action = app.copy_token_uri();
            app.apply_action(action);
        }
        (KeyCode::Char('r'), _) => {
            app.request_reload();
        }
        (KeyCode::Char('e'), _) => export(app, ExportFormat::Csv),
        (KeyCode::Char('E'), _) => export(app, ExportFormat::Json),
        (KeyCode::Enter, _) => app.open_detail(),
        (KeyCode::Esc, _) => app.close_overlay(),
        (KeyCode::Up | KeyCode::Char('k'), _) => app.move_selection_up(),
        (KeyCode::Down | KeyCode::Char('j'), _) => app.move_selection_down(),
        (KeyCode::Home, _) => app.go_to_top(),
        (KeyCode::End, _) => app.go_to_bottom(),
        _ => {}
    }
}

fn handle_search_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_search(),
        KeyCode::Enter => app.commit_search(),
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.push_search_char(ch);
        }
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.help_open || app.detail_open || app.input_mode != InputMode::Normal {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => app.move_selection_up(),
        MouseEventKind::ScrollDown => app.move_selection_down(),
        _ => {}
    }
}

fn export(app: &mut App, format: ExportFormat) {
    let action = certdeck::modules::export::export_visible(&app.engine, format);
    app.apply_action(action);
}

fn terminal_rect() -> Option<Rect> {
    let (width, height) = crossterm::terminal::size().ok()?;
    Some(Rect {
        x: 0,
        y: 0,
        width,
        height,
    })
}

/// Half the visible list height
fn page_amount() -> usize {
    let Some(size) = terminal_rect() else {
        return 5;
    };
    (ui::layout::list_rows(size) / 2).max(1)
}
