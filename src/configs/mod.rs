pub mod base;
pub mod player;
pub mod sources;

pub use base::*;
pub use player::*;
pub use sources::*;
