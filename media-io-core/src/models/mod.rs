pub mod config;
pub mod error;
pub mod format;
pub mod sample_buffer;
pub mod state;
