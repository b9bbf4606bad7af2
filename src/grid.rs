//! Grid model: dots, palette, id allocation and the rows x cols matrix.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Palette colours. The active palette is a prefix of [`DotColor::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl DotColor {
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Purple,
        Self::Orange,
    ];

    /// Smallest and largest palette sizes a game can be played with.
    pub const MIN_PALETTE: usize = 3;
    pub const MAX_PALETTE: usize = Self::ALL.len();
    pub const DEFAULT_PALETTE: usize = 5;

    /// First `n` colours, clamped to the supported range.
    pub fn palette(n: usize) -> &'static [Self] {
        let all: &'static [Self; 6] = &Self::ALL;
        &all[..n.clamp(Self::MIN_PALETTE, Self::MAX_PALETTE)]
    }

    /// Index into theme colour tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single game piece. Position is implied by its slot in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dot {
    pub id: u64,
    pub color: DotColor,
}

/// Grid coordinate. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Orthogonal neighbours only; diagonals are not adjacent.
    pub fn is_adjacent(self, other: Self) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Source of colours for new dots.
pub trait ColorSource {
    /// Pick one colour out of a non-empty palette.
    fn pick(&mut self, palette: &[DotColor]) -> DotColor;
}

/// Uniform random colours backed by a seedable RNG.
#[derive(Debug, Clone)]
pub struct RandomColors {
    rng: StdRng,
}

impl RandomColors {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ColorSource for RandomColors {
    fn pick(&mut self, palette: &[DotColor]) -> DotColor {
        palette[self.rng.gen_range(0..palette.len())]
    }
}

/// Creates dots: fresh ids from a monotonically increasing counter and
/// colours from the injected source.
pub struct DotFactory {
    next_id: u64,
    palette: &'static [DotColor],
    colors: Box<dyn ColorSource>,
}

impl fmt::Debug for DotFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DotFactory")
            .field("next_id", &self.next_id)
            .field("palette", &self.palette)
            .finish_non_exhaustive()
    }
}

impl DotFactory {
    pub fn new(palette_size: usize, colors: Box<dyn ColorSource>) -> Self {
        Self {
            next_id: 0,
            palette: DotColor::palette(palette_size),
            colors,
        }
    }

    pub fn palette(&self) -> &'static [DotColor] {
        self.palette
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn generate_color(&mut self) -> DotColor {
        self.colors.pick(self.palette)
    }

    pub fn spawn(&mut self) -> Dot {
        Dot {
            id: self.next_id(),
            color: self.generate_color(),
        }
    }
}

/// rows x cols matrix of dots. Cells are empty only between a clear and the refill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// cells[row][col]; cells[0] is the top row.
    cells: Vec<Vec<Option<Dot>>>,
}

impl Grid {
    /// Fully populated grid; no adjacency constraint on the initial fill.
    pub fn new(rows: usize, cols: usize, factory: &mut DotFactory) -> Self {
        let cells = (0..rows)
            .map(|_| (0..cols).map(|_| Some(factory.spawn())).collect())
            .collect();
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    #[cfg(test)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Option<Dot> {
        self.cells.get(pos.row).and_then(|r| r.get(pos.col)).copied().flatten()
    }

    pub fn color_at(&self, pos: Pos) -> Option<DotColor> {
        self.get(pos).map(|d| d.color)
    }

    /// Remove and return the dot at `pos`, leaving the cell empty.
    pub fn take(&mut self, pos: Pos) -> Option<Dot> {
        self.cells
            .get_mut(pos.row)
            .and_then(|r| r.get_mut(pos.col))
            .and_then(Option::take)
    }

    pub fn set(&mut self, pos: Pos, dot: Option<Dot>) {
        if let Some(cell) = self.cells.get_mut(pos.row).and_then(|r| r.get_mut(pos.col)) {
            *cell = dot;
        }
    }

    /// Rows of cells, top to bottom.
    #[cfg(test)]
    pub fn cells(&self) -> &[Vec<Option<Dot>>] {
        &self.cells
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    /// Every coordinate holding a dot of `color`, in row-major order.
    pub fn positions_of(&self, color: DotColor) -> Vec<Pos> {
        self.iter()
            .filter(|(_, dot)| dot.color == color)
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Live dots with their coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Pos, Dot)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, r)| {
            r.iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.map(|dot| (Pos::new(row, col), dot)))
        })
    }

    /// Build a grid from explicit colours, assigning ids from `factory`.
    #[cfg(test)]
    pub fn from_colors(colors: &[&[DotColor]], factory: &mut DotFactory) -> Self {
        let cells: Vec<Vec<Option<Dot>>> = colors
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&color| {
                        Some(Dot {
                            id: factory.next_id(),
                            color,
                        })
                    })
                    .collect()
            })
            .collect();
        Self {
            rows: cells.len(),
            cols: cells.first().map_or(0, Vec::len),
            cells,
        }
    }
}
