mod api;
mod config;
mod node;
mod quadrant;
mod query;

pub use api::PriorityQuadTree;
pub use config::{Config, MAX_TREE_DEPTH};
pub use node::Node;
pub use query::{Items, Iter, QueryStats};
