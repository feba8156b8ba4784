//! Process-level helpers shared by the binary and the library

pub mod shutdown;

pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
