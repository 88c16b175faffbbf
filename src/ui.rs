//! Terminal UI rendering with ratatui
//!
//! Pure presentation: every widget is derived from the game state passed
//! in, nothing here feeds back into the game.

use crate::board::{Cell, GRID_HEIGHT, GRID_WIDTH};
use crate::game::{Game, GameState};
use crate::settings::Settings;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Total width needed: board(22) + score panel(16)
const GAME_WIDTH: u16 = 38;
/// Board height plus borders
const GAME_HEIGHT: u16 = GRID_HEIGHT as u16 + 2;

/// Render the entire game UI
pub fn render_game(frame: &mut Frame, game: &Game, settings: &Settings) {
    let area = frame.area();

    // Center the game area
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    // Main layout: board | score panel
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(GRID_WIDTH as u16 * 2 + 2), // Board (cells are 2 chars wide)
            Constraint::Length(16),                        // Score panel
        ])
        .split(game_area);

    render_board(frame, main_layout[0], game, settings);
    render_score_panel(frame, main_layout[1], game);

    if game.state == GameState::GameOver {
        render_overlay(
            frame,
            area,
            "GAME OVER",
            &format!("Score: {}", game.score),
            "r: restart  q: quit",
        );
    }
}

/// Render the game grid with locked cells and the falling piece
fn render_board(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings) {
    let (block_char, empty_char) = settings.visual.block_chars();

    let block = Block::default()
        .title(" BLOCKFALL ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // The falling piece is only drawn while the game runs; after game
    // over the grid alone is shown under the overlay.
    let piece_cells: Vec<(i32, i32)> = if game.state == GameState::Running {
        game.piece.cells().collect()
    } else {
        Vec::new()
    };

    let mut lines: Vec<Line> = Vec::new();
    for y in 0..GRID_HEIGHT as i32 {
        let mut spans = Vec::new();
        for x in 0..GRID_WIDTH as i32 {
            let (text, style) = if piece_cells.contains(&(x, y)) {
                (block_char, Style::default().fg(game.piece.color))
            } else {
                match game.board.get(x, y) {
                    Some(Cell::Filled(color)) => (block_char, Style::default().fg(color)),
                    _ => (empty_char, Style::default()),
                }
            };
            spans.push(Span::styled(text, style));
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render the score panel
fn render_score_panel(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled("SCORE", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", game.score),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::raw(""),
        Line::from(Span::styled("KEYS", Style::default().fg(Color::Gray))),
        Line::from(Span::styled("← → move", Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled("↑ rotate", Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled("↓ drop", Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled("q quit", Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render a centered popup overlay
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, line: &str, subtitle: &str) {
    let popup_width = 26u16;
    let popup_height = 7u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(line.to_string(), Style::default().fg(Color::White)),
        Line::raw(""),
        Line::styled(subtitle.to_string(), Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Center a rect within another rect
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_rect_centers() {
        let outer = Rect::new(0, 0, 100, 40);
        let rect = center_rect(outer, 38, 22);
        assert_eq!(rect, Rect::new(31, 9, 38, 22));
    }

    #[test]
    fn test_center_rect_clamps_to_small_areas() {
        let outer = Rect::new(0, 0, 20, 10);
        let rect = center_rect(outer, 38, 22);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.height, 10);
        assert_eq!((rect.x, rect.y), (0, 0));
    }
}
