use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Side;

/// Connector ids on the four sides of a tile. [`Socket::NONE`] marks a side with no connector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Socket {
    pub up: i32,
    pub down: i32,
    pub left: i32,
    pub right: i32,
}

impl Default for Socket {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Socket {
    pub const NONE: i32 = -1;

    pub const EMPTY: Socket = Socket {
        up: Self::NONE,
        down: Self::NONE,
        left: Self::NONE,
        right: Self::NONE,
    };

    pub const fn new(up: i32, down: i32, left: i32, right: i32) -> Self {
        Self {
            up,
            down,
            left,
            right,
        }
    }

    pub fn get(&self, side: Side) -> i32 {
        match side {
            Side::Up => self.up,
            Side::Down => self.down,
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub fn is_connector(&self, side: Side) -> bool {
        self.get(side) != Self::NONE
    }

    /// One clockwise quarter turn: the left connector ends up on top.
    pub fn rotated_clockwise(&self) -> Self {
        Self {
            up: self.left,
            left: self.down,
            down: self.right,
            right: self.up,
        }
    }

    pub fn rotated(&self, quarter_turns: u8) -> Self {
        (0..quarter_turns % 4).fold(*self, |socket, _| socket.rotated_clockwise())
    }
}

impl Display for Socket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "up: {}, down: {}, left: {}, right: {}",
            self.up, self.down, self.left, self.right
        )
    }
}
