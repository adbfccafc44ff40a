use super::MAX_LEVEL;

/// Game state.
#[derive(Debug)]
pub struct GameState {
    /// The level currently being played, starting at 1.
    pub level: usize,
}

impl Default for GameState {
    fn default() -> Self {
        GameState { level: 1 }
    }
}

impl GameState {
    /// Move on to the next level. Returns false if there are no levels left.
    pub fn advance(&mut self) -> bool {
        if self.level < MAX_LEVEL {
            self.level += 1;
            true
        } else {
            false
        }
    }
}
