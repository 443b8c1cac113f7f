use rand::Rng;
use std::fmt;
use std::str::FromStr;

use crate::config::validate_four_probability;
use crate::error::{EngineError, Result};

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All directions in action-index order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Action index used by the environment: 0=Up, 1=Down, 2=Left, 3=Right.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Move::Up => 0,
            Move::Down => 1,
            Move::Left => 2,
            Move::Right => 3,
        }
    }
}

impl TryFrom<usize> for Move {
    type Error = EngineError;

    fn try_from(action: usize) -> Result<Self> {
        Move::ALL.get(action).copied().ok_or_else(|| {
            EngineError::InvalidArgument(format!("action {action} is not one of 0..4"))
        })
    }
}

impl FromStr for Move {
    type Err = EngineError;

    /// Accepts `U`/`D`/`L`/`R` or the full word, in any case.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "u" | "up" => Ok(Move::Up),
            "d" | "down" => Ok(Move::Down),
            "l" | "left" => Ok(Move::Left),
            "r" | "right" => Ok(Move::Right),
            other => Err(EngineError::InvalidArgument(format!(
                "unknown direction {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "UP",
            Move::Down => "DOWN",
            Move::Left => "LEFT",
            Move::Right => "RIGHT",
        };
        f.write_str(name)
    }
}

pub type Tile = u64;
pub type Score = u64;

/// Largest tile a board accepts from callers.
///
/// Merges conserve the tile sum and spawns add at most 4, so with inputs
/// capped here no tile or score total can get near `u64::MAX` on any board
/// that fits in memory.
pub const MAX_TILE: Tile = 1 << 32;

fn check_tile(value: Tile) -> Result<()> {
    if value != 0 && !value.is_power_of_two() {
        return Err(EngineError::InvalidArgument(format!(
            "tile {value} is not a power of two"
        )));
    }
    if value > MAX_TILE {
        return Err(EngineError::InvalidArgument(format!(
            "tile {value} is above the {MAX_TILE} cap"
        )));
    }
    Ok(())
}

/// Result of collapsing a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineMerge {
    pub changed: bool,
    /// Sum of the tiles produced by merges in this line.
    pub score: Score,
}

/// Result of shifting a whole board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    pub changed: bool,
    pub score: Score,
}

/// Where a random tile landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub row: usize,
    pub col: usize,
    pub value: Tile,
}

/// Collapse `line` toward index 0 in place.
///
/// Two cursors walk the line: `read` scans the input and `write` marks the
/// next output slot. A nonzero tile merges with the next nonzero tile when
/// they are equal; the doubled tile is written once and both inputs are
/// consumed, so a merged tile never merges again in the same pass. Merges
/// resolve from index 0 outward, which makes the pair closest to the merge
/// edge win ties.
///
/// A pair whose doubled value would not fit in a `Tile` is left unmerged.
///
/// ```
/// use gym_2048::engine::merge_line;
/// let mut line = [2, 2, 4, 4];
/// let merged = merge_line(&mut line);
/// assert_eq!(line, [4, 8, 0, 0]);
/// assert!(merged.changed);
/// assert_eq!(merged.score, 12);
/// ```
pub fn merge_line(line: &mut [Tile]) -> LineMerge {
    let len = line.len();
    let mut read = 0;
    let mut write = 0;
    let mut out = LineMerge::default();

    while read < len {
        let current = line[read];
        if current == 0 {
            read += 1;
            continue;
        }
        let mut next = read + 1;
        while next < len && line[next] == 0 {
            next += 1;
        }
        let doubled = current.checked_mul(2).filter(|_| next < len && line[next] == current);
        let value = if let Some(doubled) = doubled {
            read = next + 1;
            out.score = out.score.saturating_add(doubled);
            doubled
        } else {
            read = next;
            current
        };
        // every slot is written at most once, so line[write] still holds its input value
        out.changed |= line[write] != value;
        line[write] = value;
        write += 1;
    }

    for cell in &mut line[write..] {
        out.changed |= *cell != 0;
        *cell = 0;
    }
    out
}

/// Square 2048 board stored row-major.
///
/// Cells hold 0 (empty) or a power of two. The side length is fixed at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<Tile>,
}

impl Board {
    /// An all-zero `size`x`size` board.
    pub fn empty(size: usize) -> Self {
        Board {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Build a board from rows, checking it is square and every tile is 0 or a power of two.
    ///
    /// ```
    /// use gym_2048::engine::Board;
    /// let b = Board::from_rows(&[vec![2, 0], vec![0, 4]]).unwrap();
    /// assert_eq!(b.cells(), &[2, 0, 0, 4]);
    /// assert!(Board::from_rows(&[vec![3, 0], vec![0, 0]]).is_err());
    /// ```
    pub fn from_rows(rows: &[Vec<Tile>]) -> Result<Self> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(EngineError::InvalidArgument(format!(
                    "row {r} has {} cells, expected {size}",
                    row.len()
                )));
            }
            cells.extend_from_slice(row);
        }
        Self::from_cells(size, cells)
    }

    /// Build a board from `size * size` row-major cells.
    pub fn from_cells(size: usize, cells: Vec<Tile>) -> Result<Self> {
        if cells.len() != size * size {
            return Err(EngineError::InvalidArgument(format!(
                "{} cells do not fill a {size}x{size} board",
                cells.len()
            )));
        }
        for &v in &cells {
            check_tile(v)?;
        }
        Ok(Board { size, cells })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major view of every cell.
    #[inline]
    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }

    pub fn rows(&self) -> Vec<Vec<Tile>> {
        self.cells.chunks(self.size.max(1)).map(<[Tile]>::to_vec).collect()
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.size || col >= self.size {
            return Err(EngineError::IndexOutOfRange {
                row,
                col,
                size: self.size,
            });
        }
        Ok(row * self.size + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Tile> {
        Ok(self.cells[self.offset(row, col)?])
    }

    pub fn set(&mut self, row: usize, col: usize, value: Tile) -> Result<()> {
        check_tile(value)?;
        let idx = self.offset(row, col)?;
        self.cells[idx] = value;
        Ok(())
    }

    /// Zero every cell.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Cell offset of position `pos` along line `line` when merging toward `dir`.
    ///
    /// Position 0 is always the merge edge.
    #[inline]
    fn line_offset(&self, dir: Move, line: usize, pos: usize) -> usize {
        let n = self.size;
        match dir {
            Move::Left => line * n + pos,
            Move::Right => line * n + (n - 1 - pos),
            Move::Up => pos * n + line,
            Move::Down => (n - 1 - pos) * n + line,
        }
    }

    /// Slide and merge every row or column toward `dir`. No random insert.
    ///
    /// All lines are processed even after one reports a change.
    ///
    /// ```
    /// use gym_2048::engine::{Board, Move};
    /// let mut b = Board::from_rows(&[vec![2, 2], vec![0, 4]]).unwrap();
    /// let outcome = b.shift(Move::Left);
    /// assert!(outcome.changed);
    /// assert_eq!(b.rows(), vec![vec![4, 0], vec![4, 0]]);
    /// ```
    pub fn shift(&mut self, dir: Move) -> MoveOutcome {
        let mut line = vec![0; self.size];
        let mut outcome = MoveOutcome::default();
        for l in 0..self.size {
            for (pos, slot) in line.iter_mut().enumerate() {
                *slot = self.cells[self.line_offset(dir, l, pos)];
            }
            let merged = merge_line(&mut line);
            outcome.changed |= merged.changed;
            outcome.score = outcome.score.saturating_add(merged.score);
            for (pos, &value) in line.iter().enumerate() {
                let idx = self.line_offset(dir, l, pos);
                self.cells[idx] = value;
            }
        }
        outcome
    }

    /// Like `shift` but leaves `self` untouched.
    pub fn shifted(&self, dir: Move) -> (Board, MoveOutcome) {
        let mut next = self.clone();
        let outcome = next.shift(dir);
        (next, outcome)
    }

    /// `(row, col)` of every empty cell, row-major.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 0)
            .map(|(i, _)| (i / self.size, i % self.size))
            .collect()
    }

    /// Count the number of zero tiles.
    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    /// Highest tile value on the board, 0 when empty.
    pub fn highest_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all tiles.
    pub fn tile_sum(&self) -> Tile {
        self.cells.iter().sum()
    }

    /// Place a 4 (with probability `four_probability`) or a 2 on a uniformly chosen empty cell.
    ///
    /// Deterministic example using a seeded RNG:
    /// ```
    /// use gym_2048::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let mut b = Board::empty(4);
    /// b.spawn_random_tile(&mut rng, 0.5).unwrap();
    /// b.spawn_random_tile(&mut rng, 0.5).unwrap();
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn spawn_random_tile<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        four_probability: f64,
    ) -> Result<Spawn> {
        validate_four_probability(four_probability)?;
        let empty = self.empty_cells();
        if empty.is_empty() {
            return Err(EngineError::BoardFull);
        }
        let (row, col) = empty[rng.gen_range(0..empty.len())];
        let value = generate_random_tile(rng, four_probability);
        self.set(row, col, value)?;
        Ok(Spawn { row, col, value })
    }

    /// True when the board is full and no two neighbours are equal.
    ///
    /// Only right and lower neighbours are compared; equality is symmetric
    /// so every adjacent pair is still tested once.
    pub fn is_locked(&self) -> bool {
        let n = self.size;
        for row in 0..n {
            for col in 0..n {
                let v = self.cells[row * n + col];
                if v == 0 {
                    return false;
                }
                if col + 1 < n && self.cells[row * n + col + 1] == v {
                    return false;
                }
                if row + 1 < n && self.cells[(row + 1) * n + col] == v {
                    return false;
                }
            }
        }
        true
    }
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R, four_probability: f64) -> Tile {
    if rng.gen_bool(four_probability) {
        4
    } else {
        2
    }
}

fn format_val(val: Tile, width: usize) -> String {
    match val {
        0 => " ".repeat(width),
        x => format!("{x:^width$}"),
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.highest_tile().max(1).to_string().len() + 2;
        let rule = "-".repeat((width + 1) * self.size.max(1) - 1);
        for (r, row) in self.cells.chunks(self.size.max(1)).enumerate() {
            if r > 0 {
                writeln!(f, "{rule}")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| format_val(v, width)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}
