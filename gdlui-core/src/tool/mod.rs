//! Locating, fetching, and installing the gallery-dl executable.
//!
//! # Architecture
//!
//! - `types`: platform detection, artifact kinds, resolution states
//! - `paths`: the app-owned install directory
//! - `release`: the pinned release and its per-platform assets
//! - `resolver`: probe install dir and search path for an existing binary
//! - `downloader`: streaming HTTPS download with progress reporting
//! - `manager`: high-level resolve → fetch → install coordination
//!
//! # Example
//!
//! ```ignore
//! use gdlui_core::tool::ToolManager;
//!
//! let mut manager = ToolManager::new();
//! if manager.command().is_none() {
//!     manager.fetch(|progress| {
//!         if let Some(percent) = progress.percent {
//!             println!("Download progress: {:.1}%", percent);
//!         }
//!     }).await?;
//! }
//! println!("gallery-dl is ready: {}", manager.verify().await?);
//! ```

pub mod downloader;
pub mod manager;
pub mod paths;
pub mod release;
pub mod resolver;
pub mod types;

pub use downloader::{download_file, FetchProgress};
pub use manager::ToolManager;
pub use release::{asset_for, ReleaseAsset, RELEASE_BASE_URL, TOOL_VERSION};
pub use resolver::{resolve, CANDIDATE_NAMES};
pub use types::{ArtifactKind, Platform, Resolution, ResolvedTool, ToolSource};
