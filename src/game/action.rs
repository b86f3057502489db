use super::error::GameError;

/// Heading of the snake in world coordinates.
///
/// The discriminants fix the cyclic order Up → Right → Down → Left → Up used
/// by relative turns and by the one-hot heading bits of the encoded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Heading {
    /// All headings in cyclic order
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

    /// Position of this heading in the cyclic order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Heading after a quarter turn counter-clockwise
    pub fn turned_left(self) -> Self {
        Self::ALL[(self.index() + 3) % 4]
    }

    /// Heading after a quarter turn clockwise
    pub fn turned_right(self) -> Self {
        Self::ALL[(self.index() + 1) % 4]
    }

    /// Returns the delta (dx, dy) for moving in this heading
    pub fn delta(self) -> (i32, i32) {
        match self {
            Heading::Up => (0, -1),
            Heading::Right => (1, 0),
            Heading::Down => (0, 1),
            Heading::Left => (-1, 0),
        }
    }
}

/// Relative steering command accepted by the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Continue in the current heading
    Keep = 0,
    /// Rotate the heading one step counter-clockwise
    TurnLeft = 1,
    /// Rotate the heading one step clockwise
    TurnRight = 2,
}

/// Size of the action space shared by the game and the learner
pub const NUM_ACTIONS: usize = 3;

impl Action {
    /// All actions in value-table column order
    pub const ALL: [Action; NUM_ACTIONS] = [Action::Keep, Action::TurnLeft, Action::TurnRight];

    /// Column of this action in a value-table row
    pub fn index(self) -> usize {
        self as usize
    }

    /// Heading that results from applying this action to `heading`
    pub fn apply(self, heading: Heading) -> Heading {
        match self {
            Action::Keep => heading,
            Action::TurnLeft => heading.turned_left(),
            Action::TurnRight => heading.turned_right(),
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = GameError;

    fn try_from(idx: usize) -> Result<Self, Self::Error> {
        Action::ALL
            .get(idx)
            .copied()
            .ok_or(GameError::InvalidAction(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_are_cyclic() {
        assert_eq!(Heading::Up.turned_left(), Heading::Left);
        assert_eq!(Heading::Left.turned_right(), Heading::Up);
        assert_eq!(Heading::Right.turned_right(), Heading::Down);

        for heading in Heading::ALL {
            assert_eq!(heading.turned_left().turned_right(), heading);
            let mut h = heading;
            for _ in 0..4 {
                h = h.turned_right();
            }
            assert_eq!(h, heading);
        }
    }

    #[test]
    fn test_heading_delta() {
        assert_eq!(Heading::Up.delta(), (0, -1));
        assert_eq!(Heading::Right.delta(), (1, 0));
        assert_eq!(Heading::Down.delta(), (0, 1));
        assert_eq!(Heading::Left.delta(), (-1, 0));
    }

    #[test]
    fn test_action_apply() {
        assert_eq!(Action::Keep.apply(Heading::Down), Heading::Down);
        assert_eq!(Action::TurnLeft.apply(Heading::Up), Heading::Left);
        assert_eq!(Action::TurnRight.apply(Heading::Left), Heading::Up);
    }

    #[test]
    fn test_action_from_index() {
        assert_eq!(Action::try_from(0).unwrap(), Action::Keep);
        assert_eq!(Action::try_from(1).unwrap(), Action::TurnLeft);
        assert_eq!(Action::try_from(2).unwrap(), Action::TurnRight);
        assert!(matches!(
            Action::try_from(3),
            Err(GameError::InvalidAction(3))
        ));
    }
}
