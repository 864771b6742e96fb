//! Base India Circle - project and founder directory core
//!
//! Resolves what the directory shows: a static project dataset, overlaid
//! with hand-authored content files, aggregated into founder profiles.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use circle_directory::{Config, Directory, ProjectFilter};
//!
//! let directory = Directory::from_config(&Config::from_env()?)?;
//!
//! let payments = directory.projects(&ProjectFilter::new().category("Payments"));
//! let profile = directory.founder("arjunbuilds")?;
//! let similar = directory.similar_founders("arjunbuilds")?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! data/projects.json        content/{projects,founders}/*.mdx
//!         │                               │
//!         │                    OverrideCache (read-through)
//!         ▼                               ▼
//! ┌──────────────────────────────────────────────┐
//! │  resolver → founder → matcher / filter / geo │
//! └──────────────────────┬───────────────────────┘
//!                        ▼
//!           Directory (composition root)
//! ```
//!
//! Submissions for new projects arrive through [`intake`] and are stored by
//! [`db`] for review.

pub mod config;
pub mod content;
pub mod data;
pub mod db;
pub mod directory;
pub mod edit_ids;
pub mod error;
pub mod filter;
pub mod founder;
pub mod geo;
pub mod intake;
pub mod matcher;
pub mod resolver;
pub mod types;

// Composition root
pub use config::Config;
pub use directory::Directory;

// Records
pub use data::Dataset;
pub use error::{DirectoryError, DirectoryResult, EntityKind};
pub use types::*;

// Content overrides
pub use content::{ContentSource, FsContentSource, MemoryContentSource, OverrideCache};

// Queries
pub use filter::ProjectFilter;
pub use geo::MapMarker;
pub use matcher::{MatchWeights, Scored};

// Intake
pub use db::init_db;
pub use intake::{ProjectSubmission, Reply, SubmissionFlow, SubmissionStatus};
