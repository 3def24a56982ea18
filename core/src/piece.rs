use rand::Rng;
use serde::{Deserialize, Serialize};

/// Closed set of piece kinds. Matching compares kinds only.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Gem,
    Crown,
    Potion,
    Key,
    Treasure,
    Shield,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Gem,
        PieceKind::Crown,
        PieceKind::Potion,
        PieceKind::Key,
        PieceKind::Treasure,
        PieceKind::Shield,
    ];

    /// Uniformly random kind.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Uniformly random kind that is not in `excluded`, or `None` if every kind is excluded.
    pub fn random_except<R: Rng + ?Sized>(rng: &mut R, excluded: &[PieceKind]) -> Option<Self> {
        let allowed = Self::ALL.iter().filter(|kind| !excluded.contains(kind)).count();
        if allowed == 0 {
            return None;
        }
        let pick = rng.random_range(0..allowed);
        Self::ALL
            .iter()
            .copied()
            .filter(|kind| !excluded.contains(kind))
            .nth(pick)
    }

    /// Single letter used by text renderings of a board.
    pub const fn symbol(self) -> char {
        match self {
            Self::Gem => 'G',
            Self::Crown => 'C',
            Self::Potion => 'P',
            Self::Key => 'K',
            Self::Treasure => 'T',
            Self::Shield => 'S',
        }
    }

    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'G' => Some(Self::Gem),
            'C' => Some(Self::Crown),
            'P' => Some(Self::Potion),
            'K' => Some(Self::Key),
            'T' => Some(Self::Treasure),
            'S' => Some(Self::Shield),
            _ => None,
        }
    }
}

/// Opaque identity of a piece, stable while the piece stays on the board.
///
/// Only useful as an animation key for a presentation layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn matches(&self, other: &Piece) -> bool {
        self.kind as u8 == other.kind as u8
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn symbols_round_trip_for_every_kind() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_symbol(kind.symbol()), Some(kind));
        }
        assert_eq!(PieceKind::from_symbol('x'), None);
    }

    #[test]
    fn random_except_never_returns_excluded_kind() {
        let mut rng = SmallRng::seed_from_u64(7);
        let excluded = [PieceKind::Gem, PieceKind::Crown, PieceKind::Key];

        for _ in 0..200 {
            let kind = PieceKind::random_except(&mut rng, &excluded).unwrap();
            assert!(!excluded.contains(&kind));
        }
        assert_eq!(PieceKind::random_except(&mut rng, &PieceKind::ALL), None);
    }

    #[test]
    fn matching_ignores_ids() {
        let a = Piece {
            id: PieceId(1),
            kind: PieceKind::Potion,
        };
        let b = Piece {
            id: PieceId(2),
            kind: PieceKind::Potion,
        };

        assert!(a.matches(&b));
        assert_ne!(a, b);
    }
}
