pub mod board;
pub mod config;
pub mod display;
pub mod tags;
pub mod task;

pub use board::*;
pub use config::*;
pub use display::*;
pub use tags::*;
pub use task::*;
