//! Command execution infrastructure
//!
//! This module handles:
//! - The per-command-type descriptor contract
//! - Resolving an intent to its descriptor
//! - Running the per-device lifecycle across a batch of devices
//! - Classifying failures into semantic error codes

mod descriptor;
mod error;
mod executor;
pub mod handlers;

pub use descriptor::{format_number, CommandDescriptor};
pub use error::{classify, ExecutionError};
pub use executor::CommandExecutor;
pub use handlers::find_descriptor;
