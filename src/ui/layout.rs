use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy)]
pub struct UiAreas {
    pub size: Rect,
    pub header: Rect,
    pub stats: Rect,
    pub filters: Rect,
    pub list: Rect,
    pub status_line: Rect,
    pub command_line: Rect,
}

pub fn areas(size: Rect) -> UiAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(size);

    let footer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(vertical[4]);

    UiAreas {
        size,
        header: vertical[0],
        stats: vertical[1],
        filters: vertical[2],
        list: vertical[3],
        status_line: footer_chunks[0],
        command_line: footer_chunks[1],
    }
}

/// Number of list rows that fit inside the bordered list panel
pub fn list_rows(size: Rect) -> usize {
    areas(size).list.height.saturating_sub(2) as usize
}
