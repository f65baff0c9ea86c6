//! External tool substrate for plateflow.
//!
//! Everything that leaves the process lives here: tool discovery, command
//! execution with a bounded timeout, the isolated-environment launcher used
//! for header extraction and still conversion, and the ffmpeg helper that
//! encodes numbered still sequences into movies.

mod command;
mod encode;
mod error;
mod launcher;
mod tools;

pub use command::{ToolCommand, ToolOutput};
pub use encode::SequenceEncoder;
pub use error::{Error, Result};
pub use launcher::EnvLauncher;
pub use tools::{probe_tool, resolve_tool, ToolProbe};
