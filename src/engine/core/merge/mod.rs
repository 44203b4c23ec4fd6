pub mod snapshot;
pub mod state;
pub mod two_way;

pub use state::{MergeOptions, MergeSpec};

#[cfg(test)]
mod two_way_test;
