//! The directory: dataset + override cache, wired once per process
//!
//! Every page-level question goes through here and gets back either a
//! fully populated record or an explicit not-found.

use crate::config::Config;
use crate::content::{FsContentSource, OverrideCache};
use crate::data::Dataset;
use crate::error::DirectoryResult;
use crate::filter::{search_founders, ProjectFilter};
use crate::founder::{self, DISPLAY_TAG_LIMIT};
use crate::geo::{place_markers, MapMarker};
use crate::matcher::{similar, MatchWeights, Scored};
use crate::resolver::{resolve_all, resolve_project};
use crate::types::{FounderCard, FounderProfile, Project, ResolvedProject};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

pub struct Directory {
    dataset: Dataset,
    overrides: OverrideCache,
    weights: MatchWeights,
    tag_limit: usize,
}

impl Directory {
    /// Wire from injected parts, default weights and tag limit
    pub fn new(dataset: Dataset, overrides: OverrideCache) -> Self {
        Self {
            dataset,
            overrides,
            weights: MatchWeights::default(),
            tag_limit: DISPLAY_TAG_LIMIT,
        }
    }

    /// Load the dataset and point the cache at the content directory
    pub fn from_config(config: &Config) -> Result<Self> {
        let dataset = match &config.dataset {
            Some(path) => Dataset::from_path(path)
                .with_context(|| format!("Failed to load dataset from {:?}", path))?,
            None => Dataset::embedded().context("Embedded dataset is invalid")?,
        };
        let source = FsContentSource::new(&config.content_dir);
        info!(
            projects = dataset.len(),
            content = %config.content_dir.display(),
            "directory loaded"
        );
        Ok(Self::new(dataset, OverrideCache::new(Arc::new(source))))
    }

    pub fn with_weights(mut self, weights: MatchWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_tag_limit(mut self, limit: usize) -> Self {
        self.tag_limit = limit;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn overrides(&self) -> &OverrideCache {
        &self.overrides
    }

    /// Effective project by slug or id
    pub fn project(&self, key: &str) -> DirectoryResult<ResolvedProject> {
        resolve_project(&self.dataset, &self.overrides, key.trim())
    }

    /// Effective projects passing `filter`, dataset order
    pub fn projects(&self, filter: &ProjectFilter) -> Vec<ResolvedProject> {
        resolve_all(&self.dataset, &self.overrides)
            .into_iter()
            .filter(|r| filter.matches(&r.project))
            .collect()
    }

    /// Founders are aggregated over projects with their overrides applied
    fn effective_projects(&self) -> Vec<Project> {
        resolve_all(&self.dataset, &self.overrides)
            .into_iter()
            .map(|r| r.project)
            .collect()
    }

    pub fn founder(&self, handle: &str) -> DirectoryResult<FounderProfile> {
        founder::lookup(&self.effective_projects(), &self.overrides, handle, self.tag_limit)
    }

    /// Founder listing, sorted by name
    pub fn founder_cards(&self) -> Vec<FounderCard> {
        founder::founder_cards(&self.effective_projects(), &self.overrides, self.tag_limit)
    }

    pub fn search_founders(&self, query: &str) -> Vec<FounderCard> {
        let cards = self.founder_cards();
        search_founders(&cards, query).into_iter().cloned().collect()
    }

    /// Founders most like `handle`; the founder never matches themselves
    pub fn similar_founders(&self, handle: &str) -> DirectoryResult<Vec<Scored<FounderCard>>> {
        let profile = self.founder(handle)?;
        let cards = self.founder_cards();
        Ok(similar(&profile, &cards, &self.weights))
    }

    /// Projects sharing tags with `key`
    pub fn similar_projects(&self, key: &str) -> DirectoryResult<Vec<Scored<Project>>> {
        let reference = self.project(key)?.project;
        let candidates = self.effective_projects();
        Ok(similar(&reference, &candidates, &self.weights))
    }

    /// Map pins for every founder
    pub fn markers(&self) -> Vec<MapMarker> {
        place_markers(&self.founder_cards())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryContentSource;
    use crate::error::EntityKind;

    fn directory(source: MemoryContentSource) -> Directory {
        Directory::new(
            Dataset::embedded().unwrap(),
            OverrideCache::new(Arc::new(source)),
        )
    }

    fn plain() -> Directory {
        directory(MemoryContentSource::new())
    }

    fn names(found: &[ResolvedProject]) -> Vec<&str> {
        found.iter().map(|r| r.project.name.as_str()).collect()
    }

    // =========================================================================
    // projects
    // =========================================================================

    #[test]
    fn test_payments_category_is_paybase() {
        let dir = plain();
        let found = dir.projects(&ProjectFilter::new().category("Payments"));
        assert_eq!(names(&found), vec!["PayBase"]);
    }

    #[test]
    fn test_defi_excludes_paybase() {
        let dir = plain();
        let found = dir.projects(&ProjectFilter::new().category("DeFi"));
        assert!(!names(&found).contains(&"PayBase"));
        assert!(!found.is_empty());
    }

    #[test]
    fn test_upi_query_matches_tag() {
        let dir = plain();
        let found = dir.projects(&ProjectFilter::new().query("upi"));
        assert!(names(&found).contains(&"PayBase"));
        assert_eq!(
            names(&dir.projects(&ProjectFilter::new().query("paybase"))),
            names(&dir.projects(&ProjectFilter::new().query("PayBase")))
        );
    }

    #[test]
    fn test_defi_with_missing_sub_tag_is_empty() {
        let dir = plain();
        let filter = ProjectFilter::new().category("DeFi").sub_tag("no-such-tag");
        assert!(dir.projects(&filter).is_empty());
    }

    #[test]
    fn test_project_override_applies() {
        let dir = directory(MemoryContentSource::new().with(
            EntityKind::Project,
            "paybase-8f3c",
            "---\nedit_id: abcdefgh\nname: PayBase Pro\ndescription: \"  \"\n---\nLonger story",
        ));
        let resolved = dir.project("paybase-8f3c").unwrap();
        let original = dir.dataset().project("paybase-8f3c").unwrap();

        assert_eq!(resolved.project.name, "PayBase Pro");
        assert_eq!(resolved.project.description, original.description);
        assert_eq!(resolved.edit_id.as_deref(), Some("abcdefgh"));
        assert_eq!(resolved.content.as_deref(), Some("Longer story"));
    }

    #[test]
    fn test_unknown_project_is_not_found() {
        assert!(plain().project("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_blank_project_name_shows_key() {
        let dataset = Dataset::from_json_str(
            r#"[{"id": "p1", "slug": "ghost-1", "name": "  ", "founderTwitter": "a"}]"#,
        )
        .unwrap();
        let dir = Directory::new(dataset, OverrideCache::empty());

        assert_eq!(dir.project("ghost-1").unwrap().project.name, "ghost-1");
        assert_eq!(names(&dir.projects(&ProjectFilter::new())), vec!["ghost-1"]);
    }

    #[test]
    fn test_similar_projects_exclude_self() {
        let dir = plain();
        let similar = dir.similar_projects("paybase-8f3c").unwrap();
        assert!(similar.iter().all(|s| s.item.key() != "paybase-8f3c"));
        assert!(similar.len() <= 5);
    }

    // =========================================================================
    // founders
    // =========================================================================

    #[test]
    fn test_arjunbuilds_metrics() {
        let profile = plain().founder("arjunbuilds").unwrap();
        assert_eq!(profile.handle, "arjunbuilds");
        // PayBase (Base Batch India) and TipJar (Based India)
        assert_eq!(profile.metrics.projects_built, 2);
        assert_eq!(profile.metrics.hackathons_attended, 2);
        assert_eq!(profile.projects, vec!["paybase-8f3c", "tipjar-6f8a"]);
    }

    #[test]
    fn test_founder_lookup_is_case_insensitive() {
        let dir = plain();
        assert_eq!(
            dir.founder("ArjunBuilds").unwrap().projects,
            dir.founder("arjunbuilds").unwrap().projects
        );
    }

    #[test]
    fn test_unknown_founder_is_not_found() {
        assert!(plain().founder("nobody-here").unwrap_err().is_not_found());
        assert!(plain().similar_founders("nobody-here").is_err());
    }

    #[test]
    fn test_placeholder_handle_not_listed() {
        let cards = plain().founder_cards();
        assert!(cards.iter().all(|c| c.handle != "devfolio"));
        assert!(!cards.is_empty());
    }

    #[test]
    fn test_similar_founders_prefers_same_city() {
        let dir = directory(
            MemoryContentSource::new()
                .with(EntityKind::Founder, "arjunbuilds", "---\ncity: Pune\n---\n")
                .with(EntityKind::Founder, "snehaplays", "---\ncity: Pune\n---\n"),
        );
        let similar = dir.similar_founders("arjunbuilds").unwrap();

        assert!(similar.iter().all(|s| s.item.handle != "arjunbuilds"));
        assert_eq!(similar[0].item.handle, "snehaplays");
        assert!(similar[0].score >= 40);
        assert!(similar.iter().all(|s| s.score <= 99));
    }

    #[test]
    fn test_override_only_founder_is_listed() {
        let dir = directory(MemoryContentSource::new().with(
            EntityKind::Founder,
            "newbuilder",
            "---\nname: New Builder\ncity: Kochi\n---\nHi",
        ));
        assert!(dir.founder_cards().iter().any(|c| c.handle == "newbuilder"));
        assert_eq!(dir.search_founders("kochi").len(), 1);
        assert!(dir.markers().iter().any(|m| m.handle == "newbuilder" && m.city == "Kochi"));
    }
}
