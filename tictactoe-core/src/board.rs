use std::fmt::Display;

pub const BOARD_SIZE: usize = 3;
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;
/// Length of the one-hot encoding fed to the approximator (3 values per cell).
pub const ENCODED_LEN: usize = CELL_COUNT * 3;

/// All eight winning lines: 3 rows, 3 columns, 2 diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cell {
    Empty,
    Player,
    Ai,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_player(self) -> bool {
        matches!(self, Cell::Player)
    }

    pub fn is_ai(self) -> bool {
        matches!(self, Cell::Ai)
    }

    pub fn name(self) -> &'static str {
        match self {
            Cell::Empty => "empty",
            Cell::Player => "player",
            Cell::Ai => "ai",
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Player => 'O',
            Cell::Ai => 'X',
        }
    }

    /// One-hot triple in `[empty, player, ai]` order.
    pub fn one_hot(self) -> [f32; 3] {
        match self {
            Cell::Empty => [1.0, 0.0, 0.0],
            Cell::Player => [0.0, 1.0, 0.0],
            Cell::Ai => [0.0, 0.0, 1.0],
        }
    }
}

/// The two sides that can own a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    Ai,
    Player,
}

impl Side {
    pub fn name(self) -> &'static str {
        match self {
            Side::Ai => "ai",
            Side::Player => "player",
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Side::Ai => Side::Player,
            Side::Player => Side::Ai,
        }
    }
}

impl From<Side> for Cell {
    fn from(side: Side) -> Self {
        match side {
            Side::Ai => Cell::Ai,
            Side::Player => Cell::Player,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    pub fn from_cells(cells: [Cell; CELL_COUNT]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    pub fn legal_moves(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| if cell.is_empty() { Some(index) } else { None })
            .collect()
    }

    pub fn get_cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Panics if `index` is out of range; callers validate indices first.
    pub fn set_cell(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }

    pub fn mark_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// Returns true if `side` holds any of the eight winning lines.
    pub fn has_line(&self, side: Side) -> bool {
        let cell = Cell::from(side);
        LINES
            .iter()
            .any(|line| line.iter().all(|&index| self.cells[index] == cell))
    }

    pub fn winner(&self) -> Option<Side> {
        if self.has_line(Side::Ai) {
            Some(Side::Ai)
        } else if self.has_line(Side::Player) {
            Some(Side::Player)
        } else {
            None
        }
    }

    /// Flattens the board into the 27-value one-hot encoding, row-major.
    pub fn encode(&self) -> [f32; ENCODED_LEN] {
        let mut encoded = [0f32; ENCODED_LEN];

        for (index, cell) in self.cells.iter().enumerate() {
            encoded[index * 3..(index + 1) * 3].copy_from_slice(&cell.one_hot());
        }

        encoded
    }
}

impl Display for Board {
    /// Renders the board with column letters and row numbers:
    ///
    ///   A B C
    /// 1 X . .
    /// 2 . O .
    /// 3 . . .
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut result = String::with_capacity((BOARD_SIZE + 1) * (BOARD_SIZE + 1) * 2);

        result.push_str("  ");
        for x in 0..BOARD_SIZE {
            result.push((b'A' + x as u8) as char);
            result.push(' ');
        }
        result.push('\n');

        for y in 0..BOARD_SIZE {
            result.push_str(&format!("{} ", y + 1));

            for x in 0..BOARD_SIZE {
                result.push(self.cells[y * BOARD_SIZE + x].symbol());
                result.push(' ');
            }
            if y < BOARD_SIZE - 1 {
                result.push('\n');
            }
        }

        write!(f, "{}", result)
    }
}
