//! Terminal UI rendering with ratatui

use crate::engine::EngineState;
use crate::settings::Settings;
use crate::tetromino::{PieceKind, Rotation};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Width of the stats panel beside the board
const STATS_WIDTH: u16 = 20;
/// Width of the upcoming-pieces panel: four cells plus borders
const UPCOMING_WIDTH: u16 = 12;
/// Title and controls lines above the board
const HEADER_HEIGHT: u16 = 3;

/// A drawable cell: locked or active piece kind, or empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCell {
    Empty,
    Locked(PieceKind),
    Active(PieceKind),
}

/// Copy the grid and overlay the active piece's visible cells
pub fn compose_grid(state: &EngineState<'_>) -> Vec<Vec<DisplayCell>> {
    let mut grid: Vec<Vec<DisplayCell>> = state
        .board
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| cell.kind().map_or(DisplayCell::Empty, DisplayCell::Locked))
                .collect()
        })
        .collect();

    if let Some(piece) = state.active_piece {
        for (x, y) in piece.cells() {
            if x < 0 || y < 0 {
                continue;
            }
            if let Some(cell) = grid.get_mut(y as usize).and_then(|row| row.get_mut(x as usize)) {
                *cell = DisplayCell::Active(piece.kind);
            }
        }
    }
    grid
}

/// Terminal columns or rows for a board dimension, saturating on huge boards
fn span_len(cells: usize, per_cell: u16) -> u16 {
    u16::try_from(cells)
        .unwrap_or(u16::MAX)
        .saturating_mul(per_cell)
        .saturating_add(2)
}

/// Render the whole game screen
pub fn render_game(
    frame: &mut Frame,
    state: &EngineState<'_>,
    upcoming: &[PieceKind],
    settings: &Settings,
    auto_drop: bool,
) {
    let area = frame.area();
    let board_width = span_len(state.board.width(), 2);
    let board_height = span_len(state.board.height(), 1);
    let game_area = center_rect(
        area,
        board_width
            .saturating_add(STATS_WIDTH)
            .saturating_add(UPCOMING_WIDTH),
        board_height.saturating_add(HEADER_HEIGHT),
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(board_height)])
        .split(game_area);

    render_header(frame, rows[0], settings);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(board_width),
            Constraint::Length(STATS_WIDTH),
            Constraint::Length(UPCOMING_WIDTH),
        ])
        .split(rows[1]);

    render_board(frame, columns[0], state, settings);
    render_stats(frame, columns[1], state, auto_drop);
    render_upcoming(frame, columns[2], upcoming, settings);

    if state.game_over {
        render_overlay(
            frame,
            area,
            "GAME OVER",
            &format!("Final Score: {}", state.score.points),
        );
    }
}

fn render_header(frame: &mut Frame, area: Rect, settings: &Settings) {
    let keys = &settings.keys;
    let controls = format!(
        "[{}] Left | [{}] Right | [{}] Auto Drop | [{}] Rotate | [{}] Hard Drop",
        keys.move_left.join("/"),
        keys.move_right.join("/"),
        keys.auto_drop.join("/"),
        keys.rotate.join("/"),
        keys.hard_drop.join("/"),
    );
    let lines = vec![
        Line::styled("GRIDTRIS", Style::default().fg(Color::Cyan).bold()),
        Line::styled(controls, Style::default().fg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_board(frame: &mut Frame, area: Rect, state: &EngineState<'_>, settings: &Settings) {
    let (block_char, empty_char) = settings.visual.block_chars();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = compose_grid(state)
        .into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .map(|cell| match cell {
                    DisplayCell::Empty => Span::styled(empty_char, Style::default().fg(Color::DarkGray)),
                    DisplayCell::Locked(kind) => Span::styled(block_char, Style::default().fg(kind.color())),
                    DisplayCell::Active(kind) => {
                        Span::styled(block_char, Style::default().fg(kind.color()).bold())
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_stats(frame: &mut Frame, area: Rect, state: &EngineState<'_>, auto_drop: bool) {
    let block = Block::default()
        .title(" Stats ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::styled("Score", label),
        Line::styled(state.score.points.to_string(), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled("Lines", label),
        Line::raw(state.score.lines.to_string()),
        Line::raw(""),
        Line::styled("Auto drop", label),
        Line::raw(if auto_drop { "on" } else { "off" }),
    ];
    if let Some(piece) = state.active_piece {
        lines.push(Line::raw(""));
        lines.push(Line::styled("Piece", label));
        lines.push(Line::styled(
            piece.kind.letter().to_string(),
            Style::default().fg(piece.kind.color()).bold(),
        ));
    }
    if let Some(name) = state.score.last_clear {
        lines.push(Line::raw(""));
        lines.push(Line::styled(name, Style::default().fg(Color::Green)));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_upcoming(frame: &mut Frame, area: Rect, upcoming: &[PieceKind], settings: &Settings) {
    let (block_char, _) = settings.visual.block_chars();

    let block = Block::default()
        .title(" Upcoming ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    for kind in upcoming {
        let shape = kind.shape(Rotation::North);
        let style = Style::default().fg(kind.color());
        for row in 0..shape.rows() {
            let spans: Vec<Span> = (0..shape.cols())
                .map(|col| {
                    if shape.get(row, col) {
                        Span::styled(block_char, style)
                    } else {
                        Span::raw("  ")
                    }
                })
                .collect();
            lines.push(Line::from(spans));
        }
        lines.push(Line::raw(""));
    }

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let overlay_area = center_rect(area, 30, 5);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let text = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::Red).bold()),
        Line::raw(subtitle.to_string()),
    ];
    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, overlay_area);
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
