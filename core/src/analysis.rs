use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

/// A swap that would produce at least one match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalMove {
    pub from: Coord2,
    pub to: Coord2,
    /// Size of the first match pass the swap would trigger.
    pub matched: CellCount,
}

/// Every matching swap on the board, each unordered pair listed once in row-major order.
pub fn legal_moves(board: &Board) -> Vec<LegalMove> {
    let mut moves = Vec::new();
    let mut scratch = board.clone();

    for from in board.positions() {
        for to in board.iter_neighbors(from).filter(|&to| to > from) {
            if board[from].map(|p| p.kind) == board[to].map(|p| p.kind) {
                continue;
            }
            if scratch.swap(from, to).is_err() {
                continue;
            }
            let matches = scratch.find_matches();
            // undo before inspecting the next pair
            let undone = scratch.swap(from, to);
            debug_assert!(undone.is_ok());
            if !matches.is_empty() {
                moves.push(LegalMove {
                    from,
                    to,
                    matched: matches.len().try_into().unwrap_or(CellCount::MAX),
                });
            }
        }
    }
    moves
}

/// Whether any swap on the board can match. A settled board without one is dead.
pub fn has_legal_move(board: &Board) -> bool {
    !legal_moves(board).is_empty()
}

/// The legal move with the biggest immediate match, earliest in row-major order on ties.
pub fn best_move(board: &Board) -> Option<LegalMove> {
    legal_moves(board)
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.matched > best.matched {
                candidate
            } else {
                best
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_single_swap_completing_a_row() {
        let board = Board::parse(&[
            "GGCK", //
            "PTGS", //
            "KSPT", //
            "TPKS", //
        ])
        .unwrap();

        let moves = legal_moves(&board);

        assert!(moves.contains(&LegalMove {
            from: (0, 2),
            to: (1, 2),
            matched: 3,
        }));
        assert!(moves.iter().all(|m| is_adjacent(m.from, m.to)));
    }

    #[test]
    fn dead_board_has_no_moves() {
        let board = Board::parse(&[
            "GCPK", //
            "TSGC", //
            "PKTS", //
            "GCPK", //
        ])
        .unwrap();

        assert!(!has_legal_move(&board));
        assert_eq!(best_move(&board), None);
    }

    #[test]
    fn best_move_prefers_larger_match() {
        let board = Board::parse(&[
            "GGCGG", //
            "PTGSK", //
            "KSPTC", //
            "TPKSP", //
            "SKTPK", //
        ])
        .unwrap();

        let best = best_move(&board).unwrap();

        assert_eq!((best.from, best.to), ((0, 2), (1, 2)));
        assert_eq!(best.matched, 5);
    }

    #[test]
    fn analysis_leaves_board_untouched() {
        let board = Board::parse(&[
            "GGCK", //
            "PTGS", //
            "KSPT", //
            "TPKS", //
        ])
        .unwrap();
        let copy = board.clone();

        let _ = legal_moves(&board);

        assert_eq!(board, copy);
    }
}
