//! Feature encoding of the raw game state
//!
//! The encoded state is the only key the value table ever sees. It is built
//! from relative quantities (danger around the head, food direction, heading)
//! so that what is learned in one corner of the board applies everywhere.

use super::action::Heading;
use super::state::{GameState, Position};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of binary features in an encoded state
pub const STATE_BITS: usize = 16;

/// Offsets probed for danger, in bit order:
/// Up, Right, Down, Left, UpRight, DownRight, DownLeft, UpLeft
pub const DANGER_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// Fixed-order 16-bit feature vector
///
/// - bits 0..8: danger in the eight [`DANGER_OFFSETS`]
/// - bits 8..12: food left of, right of, above, below the head
/// - bits 12..16: one-hot heading in [`Heading::ALL`] order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EncodedState([u8; STATE_BITS]);

impl EncodedState {
    /// Wrap raw bits, rejecting anything other than 0 or 1
    pub fn from_bits(bits: [u8; STATE_BITS]) -> Result<Self, KeyError> {
        if let Some(&bad) = bits.iter().find(|&&b| b > 1) {
            return Err(KeyError::NonBinary(bad));
        }
        Ok(Self(bits))
    }

    /// The raw feature bits
    pub fn bits(&self) -> &[u8; STATE_BITS] {
        &self.0
    }

    pub fn danger(&self) -> &[u8] {
        &self.0[0..8]
    }

    pub fn food_direction(&self) -> &[u8] {
        &self.0[8..12]
    }

    pub fn heading_one_hot(&self) -> &[u8] {
        &self.0[12..16]
    }

    /// Canonical key: the 16 bits as a string of `0`/`1` characters
    pub fn to_key(&self) -> String {
        self.0.iter().map(|&b| if b == 1 { '1' } else { '0' }).collect()
    }
}

impl fmt::Display for EncodedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key())
    }
}

/// A string that is not a valid state key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("state key must have {expected} characters, got {found}")]
    Length { expected: usize, found: usize },
    #[error("state key may only contain '0' and '1', found {0:?}")]
    BadChar(char),
    #[error("state bit must be 0 or 1, got {0}")]
    NonBinary(u8),
}

impl FromStr for EncodedState {
    type Err = KeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let found = key.chars().count();
        if found != STATE_BITS {
            return Err(KeyError::Length {
                expected: STATE_BITS,
                found,
            });
        }

        let mut bits = [0u8; STATE_BITS];
        for (bit, c) in bits.iter_mut().zip(key.chars()) {
            *bit = match c {
                '0' => 0,
                '1' => 1,
                other => return Err(KeyError::BadChar(other)),
            };
        }
        Ok(Self(bits))
    }
}

/// Encode the current game state
///
/// Pure function of snake, heading and food; valid before and after a
/// terminal step.
pub fn encode_state(state: &GameState) -> EncodedState {
    let snake = &state.snake;
    let head = snake.head();
    let food = state.food;
    debug_assert!(
        !snake.occupies(food),
        "food at {:?} lies inside the snake body",
        food
    );

    let mut bits = [0u8; STATE_BITS];

    for (bit, &(dx, dy)) in bits[0..8].iter_mut().zip(DANGER_OFFSETS.iter()) {
        *bit = is_danger(state, head.moved_by(dx, dy)) as u8;
    }

    bits[8] = (food.x < head.x) as u8;
    bits[9] = (food.x > head.x) as u8;
    bits[10] = (food.y < head.y) as u8;
    bits[11] = (food.y > head.y) as u8;

    bits[12 + heading_bit(snake.heading)] = 1;

    EncodedState(bits)
}

fn heading_bit(heading: Heading) -> usize {
    heading.index()
}

/// A probed cell is dangerous when it is off the grid or covered by the body.
/// The tail cell does not count.
fn is_danger(state: &GameState, pos: Position) -> bool {
    !state.is_in_bounds(pos) || state.snake.occupies_excluding_tail(pos)
}
