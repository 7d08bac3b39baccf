//! One board cell: players, an 8x8 board drawn from the FEN, and the
//! result banner once the game is over.

use boardwall_core::{BoardId, GameResult, Pairing, Position, Profile};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use shakmaty::{Color, File, Piece, Rank, Role, Square, fen::Fen};

use crate::theme;

/// Piece placement indexed `[rank][file]`, rank 8 first.
pub type Squares = [[Option<Piece>; 8]; 8];

/// Parse the placement out of `position`. `None` for a FEN shakmaty rejects.
pub fn squares(position: &Position) -> Option<Squares> {
    let setup = Fen::from_ascii(position.as_fen().as_bytes())
        .ok()?
        .into_setup();

    let mut grid: Squares = [[None; 8]; 8];
    for (row, rank) in Rank::ALL.iter().rev().enumerate() {
        for (col, file) in File::ALL.iter().enumerate() {
            grid[row][col] = setup.board.piece_at(Square::from_coords(*file, *rank));
        }
    }
    Some(grid)
}

/// Filled glyph for a piece role. Color comes from the style.
pub fn glyph(role: Role) -> char {
    match role {
        Role::King => '♚',
        Role::Queen => '♛',
        Role::Rook => '♜',
        Role::Bishop => '♝',
        Role::Knight => '♞',
        Role::Pawn => '♟',
    }
}

/// Everything the screen knows about one board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardCell {
    pub board_id: BoardId,
    pub pairing: Option<Pairing>,
    pub position: Position,
    pub result: Option<GameResult>,
}

impl BoardCell {
    pub fn new(board_id: BoardId, pairing: Option<Pairing>, position: Position) -> Self {
        Self {
            board_id,
            pairing,
            position,
            result: None,
        }
    }
}

pub struct BoardView<'a> {
    cell: &'a BoardCell,
    selected: bool,
}

impl<'a> BoardView<'a> {
    pub fn new(cell: &'a BoardCell) -> Self {
        Self {
            cell,
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    fn block(&self) -> Block<'a> {
        let border_style = if self.selected {
            theme::border_focused()
        } else if self.cell.result.is_some() {
            theme::border_finished()
        } else {
            theme::border_default()
        };

        let mut block = Block::default()
            .title(format!(" Board {} ", self.cell.board_id))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);

        if let Some(result) = self.cell.result {
            block = block.title_bottom(
                Line::from(Span::styled(format!(" {result} "), theme::result_banner()))
                    .alignment(Alignment::Center),
            );
        }
        block
    }
}

fn player_line(profile: Option<&Profile>, white: bool) -> Line<'static> {
    let marker = Span::styled(
        if white { "○ " } else { "● " },
        Style::default().fg(theme::DIM_WHITE),
    );
    match profile {
        Some(p) => Line::from(vec![
            marker,
            Span::styled(p.name.clone(), theme::player_name()),
            Span::styled(format!(" ({})", p.elo), theme::player_elo()),
        ]),
        None => Line::from(vec![marker, Span::styled("waiting", theme::player_elo())]),
    }
}

impl Widget for BoardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block();
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height < 3 || inner.width < 8 {
            return;
        }

        let pairing = self.cell.pairing.as_ref();
        let top = Rect::new(inner.x, inner.y, inner.width, 1);
        let bottom = Rect::new(inner.x, inner.bottom() - 1, inner.width, 1);
        let board_area = Rect::new(inner.x, inner.y + 1, inner.width, inner.height - 2);

        Paragraph::new(player_line(pairing.map(|p| &p.black), false)).render(top, buf);
        Paragraph::new(player_line(pairing.map(|p| &p.white), true)).render(bottom, buf);

        match squares(&self.cell.position) {
            Some(grid) if board_area.height >= 8 && board_area.width >= 8 => {
                render_grid(&grid, board_area, buf);
            }
            Some(_) => {
                Paragraph::new(self.cell.position.placement().to_string())
                    .style(theme::key_hint())
                    .render(board_area, buf);
            }
            None => {
                Paragraph::new("unreadable position")
                    .style(Style::default().fg(theme::ERROR_RED))
                    .render(board_area, buf);
            }
        }
    }
}

/// Draw the 8x8 grid centered in `area`. Squares are twice as wide as they
/// are tall so they look square in a terminal.
fn render_grid(grid: &Squares, area: Rect, buf: &mut Buffer) {
    let square_h = (area.height / 8).max(1);
    let square_w = (square_h * 2).min(area.width / 8).max(1);
    let x0 = area.x + (area.width - square_w * 8) / 2;
    let y0 = area.y + (area.height - square_h * 8) / 2;

    for (row, rank) in grid.iter().enumerate() {
        for (col, piece) in rank.iter().enumerate() {
            let (row, col) = (u16::try_from(row).unwrap_or(0), u16::try_from(col).unwrap_or(0));
            let light = (row + col) % 2 == 0;
            let rect = Rect::new(x0 + col * square_w, y0 + row * square_h, square_w, square_h);
            buf.set_style(rect, theme::square(light));

            if let Some(piece) = piece {
                let x = rect.x + (square_w - 1) / 2;
                let y = rect.y + (square_h - 1) / 2;
                buf[(x, y)]
                    .set_char(glyph(piece.role))
                    .set_fg(theme::piece(piece.color == Color::White));
            }
        }
    }
}
