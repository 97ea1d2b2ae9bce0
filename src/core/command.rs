//! Command parser for the : command system

use crate::domain::FilterKind;

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Selector commands; the value is selector text ("all" clears)
    Program(String),
    Grade(String),
    Year(String),

    // Search
    Search(String),
    ClearSearch,

    // Filter housekeeping
    Reset,
    Remove(FilterKind),

    // View mode
    All,
    Mine,

    // Data
    Reload,
    Export(ExportFormat),
    Open(u64),

    Help,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    match cmd.to_lowercase().as_str() {
        // Selectors
        "program" | "prog" => match args {
            Some(value) => Command::Program(value),
            None => Command::Unknown(input.to_string()),
        },
        "grade" => match args {
            Some(value) => Command::Grade(value),
            None => Command::Unknown(input.to_string()),
        },
        "year" => match args {
            Some(value) => Command::Year(value),
            None => Command::Unknown(input.to_string()),
        },

        // Search
        "search" | "s" | "find" => match args {
            Some(text) => Command::Search(text),
            None => Command::ClearSearch,
        },
        "clear" => Command::ClearSearch,

        // Filters
        "reset" => Command::Reset,
        "rm" | "remove" => match args.as_deref().and_then(FilterKind::parse) {
            Some(kind) => Command::Remove(kind),
            None => Command::Unknown(input.to_string()),
        },

        // View mode
        "all" => Command::All,
        "mine" | "my" => Command::Mine,

        // Data
        "reload" | "refresh" => Command::Reload,
        "export" => match args.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("csv") => Command::Export(ExportFormat::Csv),
            Some("json") => Command::Export(ExportFormat::Json),
            Some(_) => Command::Unknown(input.to_string()),
        },
        "open" | "show" => {
            let id = args
                .as_deref()
                .map(|s| s.trim_start_matches('#'))
                .and_then(|s| s.parse().ok());
            match id {
                Some(id) => Command::Open(id),
                None => Command::Unknown(input.to_string()),
            }
        }

        "help" | "h" => Command::Help,
        "quit" | "q" => Command::Quit,

        _ => Command::Unknown(input.to_string()),
    }
}
