use super::action::Heading;
use std::collections::HashSet;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position one cell along a heading
    pub fn moved_toward(&self, heading: Heading) -> Self {
        let (dx, dy) = heading.delta();
        self.moved_by(dx, dy)
    }

    /// Check if the position lies on a square grid of side `grid_size`
    pub fn is_within(&self, grid_size: usize) -> bool {
        let size = grid_size as i32;
        self.x >= 0 && self.x < size && self.y >= 0 && self.y < size
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current heading
    pub heading: Heading,
}

impl Snake {
    /// Create a snake whose body trails behind `head`, opposite to `heading`
    pub fn new(head: Position, heading: Heading, length: usize) -> Self {
        let mut body = vec![head];

        let (dx, dy) = heading.delta();
        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(-dx, -dy));
        }

        Self { body, heading }
    }

    /// Create a snake from explicit segments, head first
    pub fn from_segments(body: Vec<Position>, heading: Heading) -> Self {
        assert!(!body.is_empty(), "a snake needs at least one segment");
        Self { body, heading }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Check if any segment, tail included, occupies `pos`
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Check if any segment except the tail occupies `pos`
    ///
    /// The tail vacates its cell on the next non-eating move.
    pub fn occupies_excluding_tail(&self, pos: Position) -> bool {
        self.body[..self.body.len() - 1].contains(&pos)
    }

    /// Insert a new head in front of the body
    pub fn push_head(&mut self, pos: Position) {
        self.body.insert(0, pos);
    }

    /// Remove the tail segment
    pub fn pop_tail(&mut self) {
        if self.body.len() > 1 {
            self.body.pop();
        }
    }

    /// Number of distinct cells covered by the body
    pub fn distinct_cells(&self) -> usize {
        self.body.iter().collect::<HashSet<_>>().len()
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Raw game state: the snake, the food and the counters
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    pub grid_size: usize,
    pub score: u32,
    pub steps: u32,
}

impl GameState {
    /// Create a new game state with zeroed counters
    pub fn new(snake: Snake, food: Position, grid_size: usize) -> Self {
        Self {
            snake,
            food,
            grid_size,
            score: 0,
            steps: 0,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.is_within(self.grid_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_toward(Heading::Up), Position::new(5, 4));
        assert_eq!(pos.moved_toward(Heading::Left), Position::new(4, 5));
    }

    #[test]
    fn test_bounds_checking() {
        assert!(Position::new(0, 0).is_within(20));
        assert!(Position::new(19, 19).is_within(20));
        assert!(!Position::new(-1, 0).is_within(20));
        assert!(!Position::new(20, 0).is_within(20));
        assert!(!Position::new(0, 20).is_within(20));
        assert!(!Position::new(3, -1).is_within(20));
    }

    #[test]
    fn test_snake_creation() {
        let snake = Snake::new(Position::new(10, 10), Heading::Up, 3);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(10, 10));
        assert_eq!(snake.body[1], Position::new(10, 11));
        assert_eq!(snake.tail(), Position::new(10, 12));
    }

    #[test]
    fn test_occupancy_excluding_tail() {
        let snake = Snake::new(Position::new(5, 5), Heading::Right, 3);
        assert!(snake.occupies(Position::new(3, 5)));
        assert!(!snake.occupies_excluding_tail(Position::new(3, 5)));
        assert!(snake.occupies_excluding_tail(Position::new(4, 5)));
        assert!(snake.occupies_excluding_tail(Position::new(5, 5)));
    }

    #[test]
    fn test_push_and_pop() {
        let mut snake = Snake::new(Position::new(5, 5), Heading::Right, 3);
        snake.push_head(Position::new(6, 5));
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), Position::new(6, 5));

        snake.pop_tail();
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.tail(), Position::new(4, 5));
    }

    #[test]
    fn test_distinct_cells() {
        let snake = Snake::from_segments(
            vec![Position::new(1, 1), Position::new(1, 2), Position::new(1, 1)],
            Heading::Up,
        );
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.distinct_cells(), 2);
    }
}
