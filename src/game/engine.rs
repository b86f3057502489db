use super::{
    action::{Action, Heading},
    config::GameConfig,
    encoder::{encode_state, EncodedState},
    error::GameError,
    state::{GameState, Position, Snake},
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
    /// Whether the anti-looping penalty was applied
    pub loop_penalized: bool,
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Reward for this step
    pub reward: f64,
    /// Whether the game has terminated
    pub terminated: bool,
    /// Score after the step
    pub score: u32,
    /// Additional information about the step
    pub info: StepInfo,
}

/// The snake game: owns the grid world and its random source
///
/// The random source only drives food placement, so two games built from the
/// same seed replay identically under the same action sequence.
pub struct SnakeGame<R: Rng = ChaCha8Rng> {
    config: GameConfig,
    state: GameState,
    rng: R,
}

impl SnakeGame<ChaCha8Rng> {
    /// Create a game with a seeded ChaCha generator
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, GameError> {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> SnakeGame<R> {
    /// Create a game with the given configuration and random source
    ///
    /// Fails if the configuration is invalid. The returned game is already
    /// reset.
    pub fn new(config: GameConfig, rng: R) -> Result<Self, GameError> {
        config.validate()?;

        let snake = Self::initial_snake(&config);
        let grid_size = config.grid_size;
        let mut game = Self {
            config,
            // Placeholder food, replaced by reset() below
            state: GameState::new(snake, Position::new(0, 0), grid_size),
            rng,
        };
        game.reset()?;
        Ok(game)
    }

    fn initial_snake(config: &GameConfig) -> Snake {
        let center = (config.grid_size / 2) as i32;
        Snake::new(
            Position::new(center, center),
            Heading::Up,
            config.initial_snake_length,
        )
    }

    /// Reset the game to its initial state and return the encoded state
    ///
    /// The snake is a vertical body below the centre cell heading up.
    pub fn reset(&mut self) -> Result<EncodedState, GameError> {
        let snake = Self::initial_snake(&self.config);
        let food = Self::spawn_food(&mut self.rng, &self.config, &snake)?;
        self.state = GameState::new(snake, food, self.config.grid_size);
        Ok(self.encode_state())
    }

    /// Encode the current state; has no side effects
    pub fn encode_state(&self) -> EncodedState {
        encode_state(&self.state)
    }

    /// Advance the game by one tick
    ///
    /// A terminal step leaves body, food, score and step counter untouched;
    /// call [`reset`](Self::reset) to continue. If no food cell can be found
    /// after eating, the error is returned with the state as it was before
    /// the call.
    pub fn step(&mut self, action: Action) -> Result<StepResult, GameError> {
        let previous_heading = self.state.snake.heading;
        let snake = &mut self.state.snake;
        snake.heading = action.apply(snake.heading);
        let new_head = snake.head().moved_toward(snake.heading);

        // Collision is checked against the pre-move body, tail included
        if let Some(collision_type) = self.check_collision(new_head) {
            return Ok(StepResult {
                reward: self.config.death_penalty,
                terminated: true,
                score: self.state.score,
                info: StepInfo {
                    ate_food: false,
                    collision_type: Some(collision_type),
                    loop_penalized: false,
                },
            });
        }

        self.state.snake.push_head(new_head);

        let ate_food = new_head == self.state.food;
        let mut reward = if ate_food {
            match Self::spawn_food(&mut self.rng, &self.config, &self.state.snake) {
                Ok(food) => self.state.food = food,
                Err(e) => {
                    self.state.snake.body.remove(0);
                    self.state.snake.heading = previous_heading;
                    return Err(e);
                }
            }
            self.state.score += 1;
            self.config.food_reward
        } else {
            self.state.snake.pop_tail();
            self.config.step_penalty
        };

        let loop_penalized = self.state.steps > self.config.loop_penalty_after_steps
            && self.state.snake.distinct_cells() < self.config.loop_min_distinct_cells;
        if loop_penalized {
            reward -= self.config.loop_penalty;
        }

        self.state.steps += 1;

        Ok(StepResult {
            reward,
            terminated: false,
            score: self.state.score,
            info: StepInfo {
                ate_food,
                collision_type: None,
                loop_penalized,
            },
        })
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, pos: Position) -> Option<CollisionType> {
        if !self.state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        if self.state.snake.occupies(pos) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Rejection-sample a food cell in the inset sub-grid that avoids `snake`
    fn spawn_food(rng: &mut R, config: &GameConfig, snake: &Snake) -> Result<Position, GameError> {
        let low = config.food_inset as i32;
        let high = (config.grid_size - config.food_inset) as i32;

        for _ in 0..config.max_food_attempts {
            let pos = Position::new(rng.gen_range(low..high), rng.gen_range(low..high));

            if !snake.occupies(pos) {
                return Ok(pos);
            }
        }

        Err(GameError::FoodPlacementExhausted {
            attempts: config.max_food_attempts,
        })
    }

    /// Current score (food eaten this episode)
    pub fn score(&self) -> u32 {
        self.state.score
    }

    /// Non-terminal steps taken this episode
    pub fn steps(&self) -> u32 {
        self.state.steps
    }

    pub fn snake(&self) -> &Snake {
        &self.state.snake
    }

    pub fn food(&self) -> Position {
        self.state.food
    }

    pub fn heading(&self) -> Heading {
        self.state.snake.heading
    }

    pub fn grid_size(&self) -> usize {
        self.config.grid_size
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read-only view of the raw state (for rendering and debugging)
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Replace the raw state to set up a specific position
    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: GameState) {
        debug_assert_eq!(state.grid_size, self.config.grid_size);
        self.state = state;
    }
}
