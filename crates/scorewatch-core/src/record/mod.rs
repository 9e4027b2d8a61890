mod link_set;
mod types;

pub use link_set::LinkSet;
pub use types::*;
