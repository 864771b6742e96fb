//! Static dataset of listed projects
//!
//! The dataset is authored at build time (scraped from Devfolio, then hand
//! edited) and embedded into the binary. A JSON file with the same shape can
//! replace it at startup.

use crate::error::{DirectoryError, DirectoryResult};
use crate::types::Project;
use serde::Serialize;
use std::path::Path;

const EMBEDDED_PROJECTS: &str = include_str!("../data/projects.json");

/// Category chips shown on the directory, `All` first
pub const CATEGORIES: &[&str] = &[
    "All",
    "AI",
    "Consumer",
    "DeFi",
    "Gaming",
    "Infra",
    "Mini-apps",
    "NFT",
    "DAO",
    "Identity",
    "Social",
    "Payments",
];

pub const ALL_CATEGORIES: &str = "All";

/// Batch selector values, `All Batches` first
pub const BATCHES: &[&str] = &[
    "All Batches",
    "Base Batch India",
    "Based India",
    "Builder Track 002",
    "Build Onchain FBI",
    "Onchain AI BLR",
    "ClawdKitchen",
    "Independent",
];

pub const ALL_BATCHES: &str = "All Batches";

/// Sub-filters offered under each category, matched against project tags
pub fn category_sub_filters(category: &str) -> &'static [&'static str] {
    match category {
        "AI" => &[
            "chatbot", "agents", "discovery", "personalization", "automation", "compute",
            "support", "multi-agent",
        ],
        "Consumer" => &[
            "creator", "payments", "video", "content", "rewards", "marketplace", "music",
            "gaming", "messaging", "social",
        ],
        "DeFi" => &[
            "DEX", "AMM", "yield", "staking", "savings", "portfolio", "treasury", "multisig",
            "lending", "insurance", "onramp", "trading", "farming", "dashboard", "automation",
        ],
        "Gaming" => &[
            "play-to-earn", "NFT", "lottery", "raffle", "casual", "betting", "quests",
            "gamification", "dungeon-crawler",
        ],
        "Infra" => &[
            "oracle", "bridge", "L2", "analytics", "gas", "relay", "dev-tools", "security",
            "audit",
        ],
        "Mini-apps" => &["marketplace", "payments", "social", "gaming"],
        "NFT" => &["art", "gallery", "no-code", "deployer", "collab", "3D"],
        "DAO" => &["governance", "voting", "treasury", "multisig", "sybil"],
        "Identity" => &["credentials", "KYC", "soulbound", "attestations", "naming", "ZK"],
        "Social" => &[
            "creator", "tipping", "messaging", "token-gated", "community", "social-tokens",
        ],
        "Payments" => &[
            "stablecoin", "onramp", "merchant", "micropayments", "payroll", "streaming",
            "freelance", "USDC",
        ],
        _ => &[],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub name: &'static str,
    pub sub_filters: &'static [&'static str],
}

/// Everything the directory offers to filter by
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Taxonomy {
    pub categories: Vec<Category>,
    pub batches: &'static [&'static str],
}

pub fn taxonomy() -> Taxonomy {
    Taxonomy {
        categories: CATEGORIES
            .iter()
            .map(|&name| Category {
                name,
                sub_filters: category_sub_filters(name),
            })
            .collect(),
        batches: BATCHES,
    }
}

/// In-memory list of projects, dataset order preserved
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    projects: Vec<Project>,
}

impl Dataset {
    /// Dataset compiled into the binary
    pub fn embedded() -> DirectoryResult<Self> {
        Self::from_json_str(EMBEDDED_PROJECTS)
    }

    pub fn from_json_str(json: &str) -> DirectoryResult<Self> {
        let projects: Vec<Project> = serde_json::from_str(json)?;
        Self::new(projects)
    }

    pub fn from_path(path: &Path) -> DirectoryResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Build from records, rejecting projects with no founder to join on
    pub fn new(projects: Vec<Project>) -> DirectoryResult<Self> {
        if let Some(orphan) = projects.iter().find(|p| p.founders.is_empty()) {
            return Err(DirectoryError::InvalidRecord {
                id: orphan.id.clone(),
                reason: "no founder handle".to_string(),
            });
        }
        Ok(Self { projects })
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Resolve by slug first, then by id
    pub fn project(&self, slug_or_id: &str) -> Option<&Project> {
        self.projects
            .iter()
            .find(|p| p.slug.as_deref() == Some(slug_or_id))
            .or_else(|| self.projects.iter().find(|p| p.id == slug_or_id))
    }
}
