pub mod config_io;
pub mod lock;
pub mod snapshot_io;
pub mod state;
pub mod store;
