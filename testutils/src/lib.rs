mod constants;
mod fixtures;

pub use constants::*;
pub use fixtures::*;
