pub mod agents;
pub mod compiler;
pub mod config;
pub mod error;
pub mod gate;
pub mod io;
pub mod paths;
pub mod rules;
pub mod search;
pub mod state;
pub mod task;
pub mod types;
pub mod workflow;

pub use error::{ForgeError, Result};
