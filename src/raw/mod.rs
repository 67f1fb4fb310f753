mod node;
mod raw_tree;
mod walker;

pub(crate) use node::Node;
pub(crate) use raw_tree::{Duplicates, RawTree};
pub(crate) use walker::Walker;
