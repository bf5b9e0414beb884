pub mod path;
pub mod start;
pub mod store;

pub use path::resolve_position_path;
pub use start::{resolve_start_positions, StartPosition};
pub use store::{PositionError, PositionStore};
