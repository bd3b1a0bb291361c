//! Item registry boundary
//!
//! The engine only talks to the registry through [`ItemRegistry`]. The
//! in-memory implementation backs the simulation binary and the tests.

mod memory;
mod traits;

pub use memory::{MemoryRegistry, SentCommand};
pub use traits::ItemRegistry;
