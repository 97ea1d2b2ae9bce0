//! App-level flows without the terminal: reload bookkeeping, commands,
//! selection, and export of the visible list.

use certdeck::app::{App, InputMode, StatusLevel};
use certdeck::config::Config;
use certdeck::core::{Action, ExportFormat, NotifyLevel};
use certdeck::domain::{Certificate, FilterKind, ViewMode};
use certdeck::infrastructure::{Connection, FailedToken};
use certdeck::modules::export;

const VIEWER: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

fn cert(token_id: u64, name: &str, program: &str, grade: &str, year: u64, owner: &str) -> Certificate {
    Certificate {
        token_id,
        name: name.to_string(),
        program: program.to_string(),
        grade: grade.to_string(),
        year,
        issued_at: 1_704_067_200,
        owner: owner.to_string(),
        token_uri: String::new(),
        is_owner: owner == VIEWER,
    }
}

fn batch() -> Vec<Certificate> {
    vec![
        cert(1, "Alice Smith", "Computer Science", "A+", 2023, VIEWER),
        cert(2, "Bob Jones", "Physics", "B", 2022, "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"),
        cert(5, "Carol White", "Computer Science", "A", 2022, "0xcccccccccccccccccccccccccccccccccccccccc"),
        cert(9, "Dan Gray", "Physics", "C", 2021, VIEWER),
    ]
}

fn connected_app() -> App {
    let mut app = App::new(Config::default(), "http://localhost:8545");
    app.apply_connected(Connection {
        endpoint: "http://localhost:8545".to_string(),
        chain_id: 97,
        viewer: Some(VIEWER.to_string()),
    });
    app
}

fn run(app: &mut App, command: &str) {
    app.enter_command();
    for ch in command.chars() {
        app.command.input.push(ch);
    }
    app.apply_command();
}

#[test]
fn reload_round_trip_installs_latest_batch() {
    let mut app = connected_app();

    let first = app.request_reload();
    assert_eq!(app.take_reload_request(), Some(first));
    assert_eq!(app.take_reload_request(), None);
    assert!(app.loading);

    run(&mut app, "reload");
    let second = app.latest_reload();
    assert!(second > first);

    app.apply_loaded(second, batch(), Vec::new());
    app.apply_loaded(first, Vec::new(), Vec::new());

    assert!(!app.loading);
    assert_eq!(app.engine.stats().total, 4);
    assert_eq!(app.engine.stats().owned, 2);
    assert_eq!(
        app.status_text(),
        Some(("Loaded 4 certificates", StatusLevel::Info))
    );
}

#[test]
fn reload_resets_filters_and_selection() {
    let mut app = connected_app();
    let seq = app.request_reload();
    app.apply_loaded(seq, batch(), Vec::new());

    run(&mut app, "mine");
    run(&mut app, "program Physics");
    assert_eq!(app.engine.output().visible_ids(), vec![9]);

    let seq = app.request_reload();
    app.apply_loaded(
        seq,
        batch(),
        vec![FailedToken {
            token_id: "3".to_string(),
            error: "execution reverted".to_string(),
        }],
    );

    assert_eq!(app.engine.state().view_mode, ViewMode::All);
    assert!(!app.engine.summary().any_active);
    assert_eq!(app.selected, 0);
    assert_eq!(app.status_text().map(|(_, level)| level), Some(StatusLevel::Warn));
}

#[test]
fn commands_and_cycling_compose() {
    let mut app = connected_app();
    let seq = app.request_reload();
    app.apply_loaded(seq, batch(), Vec::new());

    app.cycle_filter(FilterKind::Program);
    assert_eq!(app.engine.output().visible_ids(), vec![1, 5]);

    run(&mut app, "year 2022");
    assert_eq!(app.engine.output().visible_ids(), vec![5]);
    let chips: Vec<String> = app.engine.summary().chips.iter().map(|c| c.label()).collect();
    assert_eq!(chips, vec!["Program: Computer Science", "Year: 2022"]);

    run(&mut app, "rm year");
    assert_eq!(app.engine.output().visible_ids(), vec![1, 5]);

    run(&mut app, "program all");
    run(&mut app, "search an");
    assert_eq!(app.engine.output().visible_ids(), vec![9]);

    run(&mut app, "clear");
    assert_eq!(app.engine.visible_len(), 4);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.command.last.as_deref(), Some("clear"));
}

#[test]
fn open_command_selects_and_shows_details() {
    let mut app = connected_app();
    let seq = app.request_reload();
    app.apply_loaded(seq, batch(), Vec::new());

    run(&mut app, "open #5");
    assert!(app.detail_open);
    assert_eq!(app.selected_certificate().map(|c| c.token_id), Some(5));

    app.close_overlay();
    assert!(!app.detail_open);

    run(&mut app, "open 404");
    assert_eq!(app.status_text().map(|(_, level)| level), Some(StatusLevel::Error));
}

#[test]
fn quit_command_sets_flag() {
    let mut app = connected_app();
    run(&mut app, "quit");
    assert!(app.should_quit);
}

#[test]
fn export_writes_only_visible_certificates() {
    let mut app = connected_app();
    let seq = app.request_reload();
    app.apply_loaded(seq, batch(), Vec::new());
    app.set_view_mode(ViewMode::Mine);

    let dir = std::env::temp_dir().join(format!("certdeck-flow-export-{}", std::process::id()));
    let visible: Vec<&Certificate> = app.engine.visible().collect();
    let action = export::export_to(&dir, &visible, ExportFormat::Csv);

    let files: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .flatten()
        .map(|entry| entry.path())
        .collect();
    assert_eq!(files.len(), 1);
    let content = std::fs::read_to_string(&files[0]).unwrap();
    let _ = std::fs::remove_dir_all(&dir);

    assert!(matches!(action, Action::Notify(_, NotifyLevel::Info)));
    assert_eq!(content.lines().count(), 3);
    assert!(content.contains("Alice Smith"));
    assert!(content.contains("Dan Gray"));
    assert!(!content.contains("Bob Jones"));
}

#[test]
fn empty_search_result_clamps_selection() {
    let mut app = connected_app();
    let seq = app.request_reload();
    app.apply_loaded(seq, batch(), Vec::new());
    app.go_to_bottom();
    app.open_detail();
    assert!(app.detail_open);

    app.enter_search();
    for ch in "nobody".chars() {
        app.push_search_char(ch);
    }
    assert_eq!(app.engine.visible_len(), 0);
    assert!(app.selected_certificate().is_none());
    assert!(!app.detail_open);

    app.cancel_search();
    assert_eq!(app.engine.visible_len(), 4);
    assert_eq!(app.selected_certificate().map(|c| c.token_id), Some(1));
}
