use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Side of the square region cleared by a bomb.
pub const BOMB_SPAN: Coord = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BoosterKind {
    Bomb,
    Shuffle,
    Lightning,
    Target,
}

impl BoosterKind {
    pub const ALL: [BoosterKind; 4] = [
        BoosterKind::Bomb,
        BoosterKind::Shuffle,
        BoosterKind::Lightning,
        BoosterKind::Target,
    ];
}

/// Per-player booster charges. Only ever decremented by the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterInventory {
    pub bomb: u16,
    pub shuffle: u16,
    pub lightning: u16,
    pub target: u16,
}

impl BoosterInventory {
    pub const fn empty() -> Self {
        Self {
            bomb: 0,
            shuffle: 0,
            lightning: 0,
            target: 0,
        }
    }

    pub const fn count(&self, kind: BoosterKind) -> u16 {
        match kind {
            BoosterKind::Bomb => self.bomb,
            BoosterKind::Shuffle => self.shuffle,
            BoosterKind::Lightning => self.lightning,
            BoosterKind::Target => self.target,
        }
    }

    pub const fn is_available(&self, kind: BoosterKind) -> bool {
        self.count(kind) > 0
    }

    /// Takes one charge, returns `false` and changes nothing when none are left.
    pub fn try_consume(&mut self, kind: BoosterKind) -> bool {
        let slot = self.slot_mut(kind);
        match slot.checked_sub(1) {
            Some(left) => {
                *slot = left;
                true
            }
            None => false,
        }
    }

    /// Adds charges on behalf of an external collaborator (shop, rewards).
    pub fn grant(&mut self, kind: BoosterKind, amount: u16) {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(amount);
    }

    fn slot_mut(&mut self, kind: BoosterKind) -> &mut u16 {
        match kind {
            BoosterKind::Bomb => &mut self.bomb,
            BoosterKind::Shuffle => &mut self.shuffle,
            BoosterKind::Lightning => &mut self.lightning,
            BoosterKind::Target => &mut self.target,
        }
    }
}

impl Default for BoosterInventory {
    fn default() -> Self {
        Self {
            bomb: 3,
            shuffle: 3,
            lightning: 2,
            target: 2,
        }
    }
}

/// What a booster did to the board before the follow-up cascade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoosterEffect {
    pub kind: BoosterKind,
    /// Cells the booster removed, empty for a shuffle.
    pub cells: MatchSet,
    pub cleared: CellCount,
    /// Kind picked by a lightning strike.
    pub struck: Option<PieceKind>,
}

impl BoosterEffect {
    pub fn points(&self) -> u32 {
        u32::from(self.cleared) * POINTS_PER_CELL
    }
}

/// Applies `kind` to the board, including the removal and refill of any cleared cells.
///
/// `selection` anchors bomb and target; both fall back to the board center.
pub fn resolve_booster<R: Rng + ?Sized>(
    kind: BoosterKind,
    board: &mut Board,
    selection: Option<Coord2>,
    rng: &mut R,
) -> BoosterEffect {
    let mut struck = None;
    let cells = match kind {
        BoosterKind::Bomb => bomb_region(board, selection),
        BoosterKind::Shuffle => {
            board.shuffle_pieces(rng);
            MatchSet::new()
        }
        BoosterKind::Lightning => {
            let chosen = PieceKind::random(rng);
            struck = Some(chosen);
            board
                .positions()
                .filter(|&coords| board.kind_at(coords) == Some(chosen))
                .collect()
        }
        BoosterKind::Target => {
            let coords = anchor(board, selection);
            [coords].into_iter().collect()
        }
    };

    let cleared = if cells.is_empty() {
        0
    } else {
        board.remove_and_collapse(&cells, rng)
    };
    log::debug!("{:?} booster cleared {} cells", kind, cleared);

    BoosterEffect {
        kind,
        cells,
        cleared,
        struck,
    }
}

fn anchor(board: &Board, selection: Option<Coord2>) -> Coord2 {
    let center = board.size() / 2;
    selection
        .and_then(|coords| board.validate_coords(coords).ok())
        .unwrap_or((center, center))
}

/// Square block around the anchor, shifted inward to stay on the board.
fn bomb_region(board: &Board, selection: Option<Coord2>) -> MatchSet {
    let (row, col) = anchor(board, selection);
    let last_start = board.size().saturating_sub(BOMB_SPAN);
    let top = row.saturating_sub(BOMB_SPAN / 2).min(last_start);
    let left = col.saturating_sub(BOMB_SPAN / 2).min(last_start);

    (top..top + BOMB_SPAN)
        .flat_map(|r| (left..left + BOMB_SPAN).map(move |c| (r, c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn settled() -> Board {
        Board::parse(&[
            "GCPKTSGC", //
            "CPKTSGCP", //
            "PKTSGCPK", //
            "KTSGCPKT", //
            "TSGCPKTS", //
            "SGCPKTSG", //
            "GCPKTSGC", //
            "CPKTSGCP", //
        ])
        .unwrap()
    }

    #[test]
    fn consume_stops_at_zero() {
        let mut inventory = BoosterInventory {
            target: 1,
            ..BoosterInventory::empty()
        };

        assert!(inventory.try_consume(BoosterKind::Target));
        assert!(!inventory.try_consume(BoosterKind::Target));
        assert_eq!(inventory.count(BoosterKind::Target), 0);

        inventory.grant(BoosterKind::Target, 2);
        assert!(inventory.is_available(BoosterKind::Target));
    }

    #[test]
    fn bomb_without_selection_clears_center_block() {
        let mut board = settled();
        let mut rng = SmallRng::seed_from_u64(1);

        let effect = resolve_booster(BoosterKind::Bomb, &mut board, None, &mut rng);

        assert_eq!(effect.cleared, 9);
        assert_eq!(effect.points(), 90);
        assert!(effect.cells.contains((3, 3)));
        assert!(effect.cells.contains((5, 5)));
        assert!(board.is_full());
    }

    #[test]
    fn bomb_at_corner_stays_on_board() {
        let board = settled();

        let region = bomb_region(&board, Some((0, 7)));

        assert_eq!(region.len(), 9);
        assert!(region.contains((0, 5)));
        assert!(region.contains((2, 7)));
    }

    #[test]
    fn target_falls_back_to_center() {
        let mut board = settled();
        let mut rng = SmallRng::seed_from_u64(2);

        let effect = resolve_booster(BoosterKind::Target, &mut board, None, &mut rng);

        assert_eq!(effect.cells.iter().collect::<alloc::vec::Vec<_>>(), [(4, 4)]);
        assert_eq!(effect.cleared, 1);
    }

    #[test]
    fn target_uses_selection() {
        let mut board = settled();
        let above = board[(1, 2)];
        let mut rng = SmallRng::seed_from_u64(3);

        let effect = resolve_booster(BoosterKind::Target, &mut board, Some((2, 2)), &mut rng);

        assert!(effect.cells.contains((2, 2)));
        assert_eq!(board[(2, 2)], above);
    }

    #[test]
    fn lightning_removes_every_cell_of_the_struck_kind() {
        let mut board = settled();
        let mut rng = SmallRng::seed_from_u64(4);
        let before = board.clone();

        let effect = resolve_booster(BoosterKind::Lightning, &mut board, None, &mut rng);

        let kind = effect.struck.unwrap();
        assert_eq!(effect.cleared, before.count_kind(kind));
        assert!(
            effect
                .cells
                .iter()
                .all(|coords| before.kind_at(coords) == Some(kind))
        );
    }

    #[test]
    fn lightning_on_absent_kind_leaves_board_unchanged() {
        // a board made of two kinds only, so most strikes miss
        let original = Board::parse(&[
            "GGCC", //
            "CCGG", //
            "GGCC", //
            "CCGG", //
        ])
        .unwrap();

        for seed in 0..32 {
            let mut board = original.clone();
            let mut rng = SmallRng::seed_from_u64(seed);
            let effect = resolve_booster(BoosterKind::Lightning, &mut board, None, &mut rng);

            if matches!(effect.struck, Some(PieceKind::Gem | PieceKind::Crown)) {
                continue;
            }
            assert_eq!(effect.cleared, 0);
            assert_eq!(board, original);
        }
    }

    #[test]
    fn shuffle_keeps_every_piece() {
        let mut board = settled();
        let before: alloc::vec::Vec<_> = PieceKind::ALL
            .iter()
            .map(|&kind| board.count_kind(kind))
            .collect();
        let mut rng = SmallRng::seed_from_u64(5);

        let effect = resolve_booster(BoosterKind::Shuffle, &mut board, None, &mut rng);

        let after: alloc::vec::Vec<_> = PieceKind::ALL
            .iter()
            .map(|&kind| board.count_kind(kind))
            .collect();
        assert_eq!(before, after);
        assert_eq!(effect.cleared, 0);
        assert!(effect.cells.is_empty());
    }
}
