pub const MAX_TREE_DEPTH: usize = 50;

#[derive(Debug, Clone)]
pub struct Config {
    /// Deepest level an item may be pushed down to. The root is level 1;
    /// items that would go deeper stay in the quadrant at this level.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: MAX_TREE_DEPTH,
        }
    }
}
