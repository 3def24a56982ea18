use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Index;

use ndarray::Array2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::*;

/// Shortest run of equal kinds that counts as a match.
pub const MIN_RUN: usize = 3;

/// Smallest board side on which a run can exist.
pub const MIN_BOARD_SIZE: Coord = MIN_RUN as Coord;

/// Positions implicated in one match-detection pass, each recorded once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSet(BTreeSet<Coord2>);

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.0.contains(&coords)
    }

    pub fn insert(&mut self, coords: Coord2) -> bool {
        self.0.insert(coords)
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.0.iter().copied()
    }

    /// Points awarded for clearing this set.
    pub fn points(&self) -> u32 {
        u32::try_from(self.len())
            .unwrap_or(u32::MAX)
            .saturating_mul(POINTS_PER_CELL)
    }
}

impl FromIterator<Coord2> for MatchSet {
    fn from_iter<I: IntoIterator<Item = Coord2>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Coord2> for MatchSet {
    fn extend<I: IntoIterator<Item = Coord2>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = Coord2;
    type IntoIter = core::iter::Copied<alloc::collections::btree_set::Iter<'a, Coord2>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

/// Square grid of optional pieces. Empty cells only exist between a removal and its refill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoardRepr")]
pub struct Board {
    cells: Array2<Option<Piece>>,
    next_id: u32,
}

/// Unchecked wire form of [`Board`].
#[derive(Deserialize)]
struct BoardRepr {
    cells: Array2<Option<Piece>>,
    next_id: u32,
}

impl TryFrom<BoardRepr> for Board {
    type Error = GameError;

    fn try_from(repr: BoardRepr) -> Result<Self> {
        let (rows, cols) = repr.cells.dim();
        let size = Coord::try_from(rows).map_err(|_| GameError::InvalidBoardShape)?;
        if rows != cols || size < MIN_BOARD_SIZE {
            return Err(GameError::InvalidBoardShape);
        }
        // ids minted after loading must not collide with stored ones
        let next_id = repr
            .cells
            .iter()
            .flatten()
            .map(|piece| piece.id.0.wrapping_add(1))
            .fold(repr.next_id, u32::max);
        Ok(Self {
            cells: repr.cells,
            next_id,
        })
    }
}

impl Board {
    /// All-empty board, the starting point for generation.
    pub fn empty(size: Coord) -> Result<Self> {
        if size < MIN_BOARD_SIZE {
            return Err(GameError::InvalidBoardShape);
        }
        Ok(Self {
            cells: Array2::from_elem((size, size).to_nd_index(), None),
            next_id: 0,
        })
    }

    /// Board holding exactly the given kinds, ids minted in row-major order.
    pub fn from_kinds(kinds: &Array2<PieceKind>) -> Result<Self> {
        let (rows, cols) = kinds.dim();
        if rows != cols {
            return Err(GameError::InvalidBoardShape);
        }
        let size = Coord::try_from(rows).map_err(|_| GameError::InvalidBoardShape)?;
        let mut board = Self::empty(size)?;
        for coords in board.positions() {
            let piece = board.spawn(kinds[coords.to_nd_index()]);
            board.cells[coords.to_nd_index()] = Some(piece);
        }
        Ok(board)
    }

    /// Parses one string per row using [`PieceKind::symbol`] letters, `.` for an empty cell.
    pub fn parse(rows: &[&str]) -> Result<Self> {
        let size = Coord::try_from(rows.len()).map_err(|_| GameError::InvalidBoardShape)?;
        let mut board = Self::empty(size)?;
        for (row, line) in rows.iter().enumerate() {
            let symbols: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if symbols.len() != rows.len() {
                return Err(GameError::InvalidBoardShape);
            }
            for (col, symbol) in symbols.into_iter().enumerate() {
                let cell = match symbol {
                    '.' => None,
                    _ => {
                        let kind =
                            PieceKind::from_symbol(symbol).ok_or(GameError::InvalidBoardShape)?;
                        Some(board.spawn(kind))
                    }
                };
                board.cells[[row, col]] = cell;
            }
        }
        Ok(board)
    }

    pub fn size(&self) -> Coord {
        // construction guarantees a square board that fits in `Coord`
        self.cells.dim().0 as Coord
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.size(), self.size())
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size && coords.1 < size {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// Piece at `coords`, `None` for an empty or out-of-bounds cell.
    pub fn piece_at(&self, coords: Coord2) -> Option<Piece> {
        self.validate_coords(coords).ok().and_then(|coords| self[coords])
    }

    pub fn kind_at(&self, coords: Coord2) -> Option<PieceKind> {
        self.piece_at(coords).map(|piece| piece.kind)
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Coord2> + use<> {
        let size = self.size();
        (0..size).flat_map(move |row| (0..size).map(move |col| (row, col)))
    }

    /// Orthogonal neighbors of `coords` that lie on the board.
    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    pub fn empty_count(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|cell| cell.is_none())
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// No empty cells and no matches.
    pub fn is_settled(&self) -> bool {
        self.is_full() && self.find_matches().is_empty()
    }

    pub fn count_kind(&self, kind: PieceKind) -> CellCount {
        self.cells
            .iter()
            .flatten()
            .filter(|piece| piece.kind == kind)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX)
    }

    /// Collects every horizontal and vertical run of at least [`MIN_RUN`] equal kinds.
    pub fn find_matches(&self) -> MatchSet {
        let size = self.size();
        let mut matches = MatchSet::new();
        for line in 0..size {
            self.collect_runs(&mut matches, (0..size).map(|col| (line, col)));
            self.collect_runs(&mut matches, (0..size).map(|row| (row, line)));
        }
        matches
    }

    pub fn has_matches(&self) -> bool {
        !self.find_matches().is_empty()
    }

    fn collect_runs(&self, matches: &mut MatchSet, line: impl Iterator<Item = Coord2>) {
        let mut run: Vec<Coord2> = Vec::with_capacity(self.size().into());
        let mut run_kind = None;

        for coords in line {
            let kind = self[coords].map(|piece| piece.kind);
            if kind.is_some() && kind == run_kind {
                run.push(coords);
                continue;
            }
            if run.len() >= MIN_RUN {
                matches.extend(run.iter().copied());
            }
            run.clear();
            run_kind = kind;
            if kind.is_some() {
                run.push(coords);
            }
        }

        if run.len() >= MIN_RUN {
            matches.extend(run);
        }
    }

    /// Exchanges two adjacent cells without checking the resulting board.
    pub fn swap(&mut self, a: Coord2, b: Coord2) -> Result<()> {
        let a = self.validate_coords(a)?;
        let b = self.validate_coords(b)?;
        if !is_adjacent(a, b) {
            return Err(GameError::InvalidSwap);
        }
        self.cells.swap(a.to_nd_index(), b.to_nd_index());
        Ok(())
    }

    /// Clears `cells`, drops the survivors of each column and refills the top with
    /// fresh random pieces. Returns how many occupied cells were cleared.
    ///
    /// Does not look for new matches, that is the caller's loop.
    pub fn remove_and_collapse<R: Rng + ?Sized>(
        &mut self,
        cells: &MatchSet,
        rng: &mut R,
    ) -> CellCount {
        let mut cleared: CellCount = 0;
        for coords in cells {
            if self.validate_coords(coords).is_err() {
                log::warn!("Ignoring out of bounds removal at {:?}", coords);
                continue;
            }
            if self.cells[coords.to_nd_index()].take().is_some() {
                cleared += 1;
            }
        }
        log::trace!("Cleared {} cells", cleared);

        self.collapse(rng);
        cleared
    }

    /// Gravity and refill for every column.
    pub(crate) fn collapse<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let size = usize::from(self.size());
        let mut survivors: Vec<Piece> = Vec::with_capacity(size);

        for col in 0..size {
            survivors.clear();
            survivors.extend((0..size).rev().filter_map(|row| self.cells[[row, col]]));

            let mut falling = survivors.iter().copied();
            for row in (0..size).rev() {
                let cell = match falling.next() {
                    Some(piece) => piece,
                    None => self.spawn(PieceKind::random(rng)),
                };
                self.cells[[row, col]] = Some(cell);
            }
        }
    }

    /// Redistributes the occupied cells' pieces uniformly at random over the same cells.
    pub fn shuffle_pieces<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let occupied: Vec<Coord2> = self
            .positions()
            .filter(|&coords| self[coords].is_some())
            .collect();
        let mut pieces: Vec<Piece> = occupied.iter().filter_map(|&coords| self[coords]).collect();
        pieces.shuffle(rng);

        for (coords, piece) in occupied.into_iter().zip(pieces) {
            self.cells[coords.to_nd_index()] = Some(piece);
        }
    }

    pub(crate) fn place(&mut self, coords: Coord2, kind: PieceKind) {
        let piece = self.spawn(kind);
        self.cells[coords.to_nd_index()] = Some(piece);
    }

    fn spawn(&mut self, kind: PieceKind) -> Piece {
        let id = PieceId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        Piece { id, kind }
    }
}

impl Index<Coord2> for Board {
    type Output = Option<Piece>;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.cells[(row as usize, col as usize)]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.size();
        for row in 0..size {
            for col in 0..size {
                let symbol = self[(row, col)].map_or('.', |piece| piece.kind.symbol());
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
