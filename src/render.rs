//! Text rendering of a board for chat messages and terminals.
//!
//! The top row is drawn first, under a one-indexed column header.

use crate::game::{Board, Cell, WinningLine};

/// Symbols used to draw a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardStyle {
    pub empty: &'static str,
    pub player_one: &'static str,
    pub player_two: &'static str,
    /// Replaces a piece that is part of the winning line.
    pub highlight: &'static str,
    pub separator: &'static str,
}

impl BoardStyle {
    /// For chat clients that render emoji.
    pub const EMOJI: BoardStyle = BoardStyle {
        empty: "\u{26ab}",
        player_one: "\u{1f534}",
        player_two: "\u{1f535}",
        highlight: "\u{2b50}",
        separator: "",
    };

    pub const ASCII: BoardStyle = BoardStyle {
        empty: ".",
        player_one: "X",
        player_two: "O",
        highlight: "#",
        separator: " ",
    };

    fn symbol(&self, cell: Cell) -> &'static str {
        match cell {
            Cell::Empty => self.empty,
            Cell::PlayerOne => self.player_one,
            Cell::PlayerTwo => self.player_two,
        }
    }

    fn column_label(&self, number: usize) -> String {
        if *self == BoardStyle::EMOJI && (1..=9).contains(&number) {
            // keycap digit
            format!("{number}\u{fe0f}\u{20e3}")
        } else {
            number.to_string()
        }
    }
}

pub fn board_to_text(board: &Board, style: &BoardStyle) -> String {
    render(board, style, None)
}

/// Same as [`board_to_text`], marking the cells of `line`.
pub fn board_to_text_with_line(board: &Board, style: &BoardStyle, line: &WinningLine) -> String {
    render(board, style, Some(line))
}

fn render(board: &Board, style: &BoardStyle, line: Option<&WinningLine>) -> String {
    let mut lines = Vec::with_capacity(board.rows() + 1);

    let header: Vec<String> = (1..=board.columns())
        .map(|n| style.column_label(n))
        .collect();
    lines.push(header.join(style.separator));

    for row in (0..board.rows()).rev() {
        let cells: Vec<&str> = (0..board.columns())
            .map(|column| {
                if line.is_some_and(|l| l.contains(column, row)) {
                    style.highlight
                } else {
                    style.symbol(board.get(column, row))
                }
            })
            .collect();
        lines.push(cells.join(style.separator));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_empty_board() {
        let board = Board::new(2, 3);
        assert_eq!(board_to_text(&board, &BoardStyle::ASCII), "1 2 3\n. . .\n. . .");
    }

    #[test]
    fn test_bottom_row_is_drawn_last() {
        let mut board = Board::new(2, 3);
        board.drop_piece(0, Cell::PlayerOne).unwrap();
        board.drop_piece(0, Cell::PlayerTwo).unwrap();
        board.drop_piece(2, Cell::PlayerOne).unwrap();
        assert_eq!(
            board_to_text(&board, &BoardStyle::ASCII),
            "1 2 3\nO . .\nX . X"
        );
    }

    #[test]
    fn test_winning_line_highlighted() {
        let mut board = Board::new(1, 5);
        for column in 0..4 {
            board.drop_piece(column, Cell::PlayerTwo).unwrap();
        }
        let line = board.winning_line().unwrap();
        assert_eq!(
            board_to_text_with_line(&board, &BoardStyle::ASCII, &line),
            "1 2 3 4 5\n# # # # ."
        );
    }

    #[test]
    fn test_emoji_header_uses_keycaps() {
        let board = Board::new(1, 2);
        let text = board_to_text(&board, &BoardStyle::EMOJI);
        let header = text.lines().next().unwrap();
        assert_eq!(header, "1\u{fe0f}\u{20e3}2\u{fe0f}\u{20e3}");
    }
}
