pub mod artifact;
pub mod check;
pub mod compile;
pub mod config;
pub mod gate;
pub mod init;
pub mod rules;
pub mod state;
pub mod task;
pub mod workflow;
