use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap,
};
use ratatui::Frame;

pub mod format;
pub mod layout;

use crate::app::{App, InputMode, StatusLevel};
use crate::domain::{Certificate, FilterKind, Selection, ViewMode};

use self::format::{format_issued_date, grade_color, short_address};

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    draw_stats_bar(f, areas.stats, app);
    draw_filter_bar(f, areas.filters, app);
    draw_list_panel(f, areas.list, app);
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.detail_open {
        if let Some(cert) = app.selected_certificate() {
            draw_detail_popup(f, areas.size, app, cert);
        }
    }
    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn label(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let network = match app.connection.as_ref() {
        Some(connection) => format!("{} ({})", app.config.network_name(), connection.chain_id),
        None => "disconnected".to_string(),
    };
    let viewer = app
        .viewer()
        .map(short_address)
        .unwrap_or_else(|| "--".to_string());

    let title = Line::from(vec![
        Span::styled(
            "CertDeck",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        label("RPC"),
        Span::raw(format!(" {} ", app.endpoint)),
        label("Network"),
        Span::raw(format!(" {} ", network)),
        label("Viewer"),
        Span::raw(format!(" {}", viewer)),
    ]);

    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let contract = app
        .contract()
        .map(short_address)
        .unwrap_or_else(|| "not set".to_string());
    let state = if app.loading {
        Span::styled("loading", Style::default().fg(Color::LightYellow))
    } else if app.connection.is_some() {
        Span::styled("ready", Style::default().fg(Color::LightGreen))
    } else {
        Span::styled("offline", Style::default().fg(Color::LightRed))
    };
    let right = Paragraph::new(Line::from(vec![
        label("Contract"),
        Span::raw(format!(" {}  ", contract)),
        state,
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Right);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_stats_bar(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.engine.stats();
    let summary = app.engine.summary();

    let mut spans = vec![
        label("Total "),
        Span::styled(
            stats.total.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        label("Programs "),
        Span::styled(
            stats.programs.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        label("Mine "),
        Span::styled(
            stats.owned.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        label("Showing "),
        Span::styled(
            app.engine.visible_len().to_string(),
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if summary.any_active {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            " FILTERED ",
            Style::default().fg(Color::Black).bg(Color::LightYellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Stats"));
    f.render_widget(paragraph, area);
}

fn draw_filter_bar(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("Filters");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(0)])
        .split(rows[0]);

    let state = app.engine.state();
    let modes = [ViewMode::All, ViewMode::Mine];
    let selected = modes
        .iter()
        .position(|mode| *mode == state.view_mode)
        .unwrap_or(0);
    let titles: Vec<Line> = modes
        .iter()
        .map(|mode| {
            let key = match mode {
                ViewMode::All => "a:",
                ViewMode::Mine => "m:",
            };
            Line::from(vec![label(key), Span::raw(mode.title())])
        })
        .collect();
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");
    f.render_widget(tabs, top[0]);

    let search = if app.input_mode == InputMode::Search {
        Line::from(vec![
            Span::styled("/", Style::default().fg(Color::Yellow)),
            Span::raw(app.command.input.as_str()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ])
    } else if state.search.is_empty() {
        Line::from(vec![label("Search "), label("(press /)")])
    } else {
        Line::from(vec![
            label("Search "),
            Span::styled(
                format!("\"{}\"", state.search),
                Style::default().fg(Color::LightYellow),
            ),
        ])
    };
    f.render_widget(Paragraph::new(search), top[1]);

    let options = app.engine.options();
    for (row, kind) in FilterKind::ALL.iter().enumerate() {
        let line = selector_line(*kind, &options.choices(*kind), state.selection(*kind));
        f.render_widget(Paragraph::new(line), rows[row + 1]);
    }

    let chips = &app.engine.summary().chips;
    let mut spans = Vec::new();
    if chips.is_empty() {
        spans.push(label("No selectors  (p program, t grade, y year)"));
    } else {
        for chip in chips {
            spans.push(Span::styled(
                format!(" {} ✕ ", chip.label()),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ));
            spans.push(Span::raw(" "));
        }
        spans.push(label(" x reset  :rm <kind>"));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), rows[4]);
}

/// One selector row: the cycle key, the current value in brackets, then every choice
fn selector_line(kind: FilterKind, choices: &[String], selection: &Selection<String>) -> Line<'static> {
    let key = match kind {
        FilterKind::Program => "p ",
        FilterKind::Grade => "t ",
        FilterKind::Year => "y ",
    };
    let current = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled(key, Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}: ", kind.label())),
    ];
    match selection.value() {
        None => spans.push(Span::styled("[Any]", current)),
        Some(value) => {
            spans.push(Span::raw("Any"));
            // typed values outside the option set still show what is applied
            if !choices.contains(value) {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(format!("[{}]", value), current));
            }
        }
    }
    for (idx, choice) in choices.iter().enumerate() {
        spans.push(Span::raw(if idx == 0 { " " } else { " · " }));
        if selection.value() == Some(choice) {
            spans.push(Span::styled(format!("[{}]", choice), current));
        } else {
            spans.push(Span::raw(choice.clone()));
        }
    }
    Line::from(spans)
}

fn draw_list_panel(f: &mut Frame, area: Rect, app: &App) {
    let title = format!(
        "{} ({})",
        app.engine.state().view_mode.title(),
        app.engine.visible_len()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Cyan));

    if app.engine.visible_len() == 0 {
        let message = if app.loading && app.engine.stats().total == 0 {
            "Loading certificates..."
        } else if app.engine.stats().total == 0 {
            "No certificates found"
        } else {
            "No certificates match"
        };
        let mut lines = vec![Line::from(""), Line::from(message)];
        if app.engine.summary().any_active {
            lines.push(Line::from(label("Press x to reset filters")));
        }
        let paragraph = Paragraph::new(Text::from(lines))
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .engine
        .visible()
        .map(|cert| ListItem::new(certificate_row(app, cert)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut state = ListState::default();
    state.select(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn certificate_row<'a>(app: &App, cert: &'a Certificate) -> Line<'a> {
    let mut grade_style = Style::default().add_modifier(Modifier::BOLD);
    if let Some(color) = grade_color(&app.config, &cert.grade) {
        grade_style = grade_style.fg(color);
    }

    let mut spans = vec![
        Span::styled(
            format!("#{:<6}", cert.token_id),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(format!("{:<24} ", truncate(&cert.name, 24))),
        Span::raw(format!("{:<22} ", truncate(&cert.program, 22))),
        Span::styled(format!("{:<4}", cert.grade), grade_style),
        Span::raw(format!("{:<6}", cert.year)),
    ];
    if cert.is_owner {
        spans.push(Span::styled(
            " MINE ",
            Style::default().fg(Color::Black).bg(Color::LightGreen),
        ));
    }
    Line::from(spans)
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn draw_detail_popup(f: &mut Frame, area: Rect, app: &App, cert: &Certificate) {
    let popup_area = centered_rect(70, 60, area);
    f.render_widget(Clear, popup_area);

    let mut grade_style = Style::default().add_modifier(Modifier::BOLD);
    if let Some(color) = grade_color(&app.config, &cert.grade) {
        grade_style = grade_style.fg(color);
    }
    let uri = if cert.token_uri.is_empty() {
        "--"
    } else {
        cert.token_uri.as_str()
    };
    let link = app
        .certificate_link(cert)
        .unwrap_or_else(|| "--".to_string());
    let contract = app.contract_link().unwrap_or_else(|| "--".to_string());

    let mut owner = vec![label("Owner      "), Span::raw(short_address(&cert.owner))];
    if cert.is_owner {
        owner.push(Span::styled(
            "  (you)",
            Style::default().fg(Color::LightGreen),
        ));
    }

    let lines = vec![
        Line::from(Span::styled(
            cert.name.as_str(),
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![label("Program    "), Span::raw(cert.program.as_str())]),
        Line::from(vec![
            label("Grade      "),
            Span::styled(cert.grade.as_str(), grade_style),
        ]),
        Line::from(vec![label("Year       "), Span::raw(cert.year.to_string())]),
        Line::from(vec![
            label("Issued     "),
            Span::raw(format_issued_date(cert.issued_at)),
        ]),
        Line::from(vec![label("Token ID   "), Span::raw(format!("#{}", cert.token_id))]),
        Line::from(""),
        Line::from(owner),
        Line::from(vec![label("           "), Span::raw(cert.owner.as_str())]),
        Line::from(vec![label("Token URI  "), Span::raw(uri)]),
        Line::from(vec![label("View       "), Span::raw(link)]),
        Line::from(vec![label("Contract   "), Span::raw(contract)]),
        Line::from(""),
        Line::from(label("c copy owner  u copy URI  Esc close")),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(format!("Certificate #{}", cert.token_id))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        label("Selected "),
        Span::raw(match app.selected_certificate() {
            Some(cert) => format!("#{}  ", cert.token_id),
            None => "--  ".to_string(),
        }),
        label("View "),
        Span::raw(format!("{}  ", app.engine.state().view_mode.title())),
    ];
    if !app.failed.is_empty() {
        spans.push(label("Failed "));
        spans.push(Span::styled(
            app.failed.len().to_string(),
            Style::default().fg(Color::LightYellow),
        ));
        spans.push(Span::raw("  "));
    }
    if let Some(last) = app.command.last.as_ref() {
        spans.push(label("Last "));
        spans.push(Span::raw(format!(":{last}")));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);

    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("program", "Filter by program (all clears)"),
        ("grade", "Filter by grade (all clears)"),
        ("year", "Filter by year (all clears)"),
        ("search", "Search graduate names"),
        ("clear", "Clear search"),
        ("reset", "Reset search and selectors"),
        ("rm", "Remove a selector: rm program|grade|year"),
        ("all", "Show all certificates"),
        ("mine", "Show my certificates"),
        ("reload", "Reload from the contract"),
        ("export", "Export visible: export csv|json"),
        ("open", "Open certificate by id"),
        ("help", "Show help"),
        ("quit", "Quit"),
    ];

    let cmd = input.split_whitespace().next().unwrap_or("");
    for (name, desc) in commands {
        if name.starts_with(cmd) {
            return Some(desc);
        }
    }
    None
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint_text = command_hint(&app.command.input).unwrap_or("Enter=run Esc=cancel");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(app.command.input.as_str()),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Search => Line::from(vec![
            Span::styled("/ ", Style::default().fg(Color::Yellow)),
            Span::raw(app.command.input.as_str()),
            Span::styled(
                "  (live, Enter=keep Esc=clear)",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text, Style::default().fg(color)),
                ])
            } else {
                action_hints()
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn action_hints() -> Line<'static> {
    let hints = [
        ("/", "Search"),
        ("a/m", "All/Mine"),
        ("p t y", "Program/Grade/Year"),
        ("x", "Reset"),
        ("Enter", "Details"),
        ("r", "Reload"),
        ("e/E", "Export"),
        (":", "Command"),
        ("?", "Help"),
        ("q", "Quit"),
    ];
    let spans: Vec<Span<'static>> = hints
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(*key, Style::default().fg(Color::LightCyan)),
                Span::raw(format!(" {desc}  ")),
            ]
        })
        .collect();
    Line::from(spans)
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(72, 70, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Navigation"),
        Line::from("  j / k      Move selection (vim)"),
        Line::from("  gg / G     Top / bottom (vim)"),
        Line::from("  Ctrl-u/d   Half page up/down (vim)"),
        Line::from("  Enter      Open certificate details"),
        Line::from("  Esc        Close popup"),
        Line::from(""),
        Line::from("Filters"),
        Line::from("  /          Search names (live; Enter keeps, Esc clears)"),
        Line::from("  a / m      All certificates / My certificates"),
        Line::from("  p          Cycle program selector"),
        Line::from("  t          Cycle grade selector"),
        Line::from("  y          Cycle year selector"),
        Line::from("  x          Reset search and selectors"),
        Line::from(""),
        Line::from("Actions"),
        Line::from("  c / u      Copy owner / token URI"),
        Line::from("  r          Reload from contract"),
        Line::from("  e / E      Export visible as CSV / JSON"),
        Line::from("  :          Command line"),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from("Commands"),
        Line::from("  :program <name>|all  :grade <g>|all  :year <y>|all"),
        Line::from("  :search <text>  :clear  :reset  :rm program|grade|year"),
        Line::from("  :all  :mine  :reload  :export csv|json  :open <id>"),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
