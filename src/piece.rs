//! Active falling piece logic

use crate::board::{Board, GRID_WIDTH};
use ratatui::style::Color;

/// The active falling piece
///
/// The shape is an owned row-major boolean matrix and (x, y) anchors its
/// top-left corner in grid coordinates. Rotation replaces the matrix
/// wholesale, so row and column counts swap for non-square shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub shape: Vec<Vec<bool>>,
    pub x: i32,
    pub y: i32,
    pub color: Color,
}

impl Piece {
    /// Create a piece at an explicit position
    pub fn new(shape: Vec<Vec<bool>>, x: i32, y: i32, color: Color) -> Self {
        Self { shape, x, y, color }
    }

    /// Create a piece centered horizontally on the spawn row
    pub fn at_spawn(shape: Vec<Vec<bool>>, color: Color) -> Self {
        let width = shape.first().map_or(0, |row| row.len()) as i32;
        let x = GRID_WIDTH as i32 / 2 - width / 2;
        Self::new(shape, x, 0, color)
    }

    /// Width of the shape matrix in columns
    pub fn width(&self) -> usize {
        self.shape.first().map_or(0, |row| row.len())
    }

    /// Height of the shape matrix in rows
    pub fn height(&self) -> usize {
        self.shape.len()
    }

    /// Grid coordinates of every occupied cell
    ///
    /// Derived from shape and anchor on each call, so the iterator can be
    /// restarted freely; collision checking and rendering both consume it.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.iter().enumerate().flat_map(move |(row, cols)| {
            cols.iter().enumerate().filter_map(move |(col, &filled)| {
                filled.then_some((self.x + col as i32, self.y + row as i32))
            })
        })
    }

    /// Replace the shape with its 90-degree clockwise rotation
    /// (transpose, then reverse each row). The anchor is untouched;
    /// callers re-validate the placement.
    pub fn rotate(&mut self) {
        let rows = self.height();
        let cols = self.width();
        let mut rotated = vec![vec![false; rows]; cols];
        for (r, row) in self.shape.iter().enumerate() {
            for (c, &filled) in row.iter().enumerate() {
                if filled {
                    rotated[c][rows - 1 - r] = true;
                }
            }
        }
        self.shape = rotated;
    }

    /// Try to move left, returns true if successful
    pub fn move_left(&mut self, board: &Board) -> bool {
        self.x -= 1;
        if board.is_valid_placement(self) {
            true
        } else {
            self.x += 1;
            false
        }
    }

    /// Try to move right, returns true if successful
    pub fn move_right(&mut self, board: &Board) -> bool {
        self.x += 1;
        if board.is_valid_placement(self) {
            true
        } else {
            self.x -= 1;
            false
        }
    }

    /// Try to move down one row, returns true if successful
    pub fn move_down(&mut self, board: &Board) -> bool {
        self.y += 1;
        if board.is_valid_placement(self) {
            true
        } else {
            self.y -= 1;
            false
        }
    }

    /// Try to rotate clockwise, nudging one column left then one column
    /// right of the original anchor when the rotated shape does not fit.
    /// Either the rotation lands (possibly shifted) or shape and anchor
    /// are restored exactly; it never partially applies.
    pub fn try_rotate(&mut self, board: &Board) -> bool {
        let prior_shape = self.shape.clone();
        let prior_x = self.x;

        self.rotate();
        if board.is_valid_placement(self) {
            return true;
        }
        self.x -= 1;
        if board.is_valid_placement(self) {
            return true;
        }
        self.x += 2;
        if board.is_valid_placement(self) {
            return true;
        }

        self.shape = prior_shape;
        self.x = prior_x;
        false
    }

    /// Drop to the lowest valid row and return the distance travelled
    pub fn hard_drop(&mut self, board: &Board) -> i32 {
        let mut distance = 0;
        while self.move_down(board) {
            distance += 1;
        }
        distance
    }
}
