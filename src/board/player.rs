//! Players, seats, and region ownership.

use std::fmt;

/// One of the two seats at the table. Seat one moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    /// Returns the opposing seat.
    pub const fn other(self) -> Seat {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }

    /// Returns the 1-based seat number used on the wire.
    pub const fn number(self) -> u8 {
        match self {
            Seat::One => 1,
            Seat::Two => 2,
        }
    }

    /// Parses a 1-based seat number.
    pub fn from_number(n: u8) -> Option<Seat> {
        match n {
            1 => Some(Seat::One),
            2 => Some(Seat::Two),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self.number() as usize - 1
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Who holds a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Owner {
    #[default]
    Neutral,
    Player(Seat),
}

impl Owner {
    /// Wire code used by the map update stream: 0 neutral, otherwise the seat number.
    pub const fn code(self) -> u8 {
        match self {
            Owner::Neutral => 0,
            Owner::Player(seat) => seat.number(),
        }
    }

    /// Parses a map update owner code.
    pub fn from_code(code: u8) -> Option<Owner> {
        match code {
            0 => Some(Owner::Neutral),
            n => Seat::from_number(n).map(Owner::Player),
        }
    }

    pub fn seat(self) -> Option<Seat> {
        match self {
            Owner::Neutral => None,
            Owner::Player(seat) => Some(seat),
        }
    }
}

/// A participant in a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Identifier carried by every move this player submits.
    pub id: String,
    pub name: String,
    /// Armies this player may place during the current round.
    pub armies_per_turn: u32,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            armies_per_turn: 0,
        }
    }

    /// Default player for a seat: id `player1`/`player2`.
    pub fn for_seat(seat: Seat) -> Self {
        Player::new(format!("player{}", seat), format!("Player {}", seat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seats_alternate() {
        assert_eq!(Seat::One.other(), Seat::Two);
        assert_eq!(Seat::Two.other().other(), Seat::Two);
        assert_eq!(Seat::Two.index(), 1);
    }

    #[test]
    fn owner_codes() {
        assert_eq!(Owner::Neutral.code(), 0);
        assert_eq!(Owner::Player(Seat::Two).code(), 2);
        assert_eq!(Owner::from_code(1), Some(Owner::Player(Seat::One)));
        assert_eq!(Owner::from_code(0), Some(Owner::Neutral));
        assert_eq!(Owner::from_code(3), None);
    }

    #[test]
    fn default_player_ids() {
        let p = Player::for_seat(Seat::One);
        assert_eq!(p.id, "player1");
        assert_eq!(p.name, "Player 1");
        assert_eq!(p.armies_per_turn, 0);
    }
}
