//! gdlui Core Library
//!
//! This crate provides the core functionality for gdlui, a front-end for
//! the gallery-dl downloader. It includes:
//!
//! - The option model covering every user-configurable run parameter
//! - A builder for gallery-dl's `--filter` expression DSL
//! - Deterministic command-line assembly
//! - Subprocess execution with line-streamed output
//! - Resolution and on-demand download of the gallery-dl executable

pub mod command;
pub mod filter;
pub mod options;
pub mod runner;
pub mod tool;

// Re-exports for convenience
pub use command::{assemble, CommandLine};
pub use filter::{build_fragment, FilterError, FilterExpression, FilterKind};
pub use options::OptionSet;
pub use runner::{event_channel, RunEvent, RunEventReceiver, RunEventSender};
pub use tool::{FetchProgress, Resolution, ResolvedTool, ToolManager};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
