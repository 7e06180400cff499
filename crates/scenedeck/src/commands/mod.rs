pub mod completion;
pub mod config;
pub mod steps;
pub mod sync;
