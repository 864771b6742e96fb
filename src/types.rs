//! Core types for the Base India Circle directory
//!
//! Static records come from the dataset, overrides come from content files,
//! and the resolved records are what pages and the API hand out.

use serde::{Deserialize, Serialize};

/// Handle used by the scraper when the real founder handle was unknown
pub const PLACEHOLDER_HANDLE: &str = "devfolio";

/// Strip a leading `@` and anything after the first whitespace
pub fn clean_handle(input: &str) -> String {
    input
        .trim()
        .trim_start_matches('@')
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string()
}

/// Case-insensitive handle comparison
pub fn same_handle(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// One founder reference on a project. The first entry is the primary founder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFounder {
    pub name: String,
    #[serde(alias = "twitter")]
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

/// A listed project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProject", rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub slug: Option<String>,
    pub name: String,
    pub description: String,
    pub description_full: Option<String>,
    pub category: String,
    /// Ordered founder references, primary first
    pub founders: Vec<ProjectFounder>,
    pub url: String,
    pub batch: String,
    pub tags: Vec<String>,
    pub logo: String,
    pub source: Option<String>,
    pub github: Option<String>,
    pub farcaster: Option<String>,
    pub youtube: Option<String>,
    pub links: Vec<String>,
    pub prizes: Vec<String>,
}

impl Project {
    /// Routing key: slug when present, id otherwise
    pub fn key(&self) -> &str {
        self.slug
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(self.id.as_str())
    }

    /// Founder reference matching `handle`, case-insensitive
    pub fn founder_ref(&self, handle: &str) -> Option<&ProjectFounder> {
        self.founders.iter().find(|f| same_handle(&f.handle, handle))
    }

    pub fn has_founder(&self, handle: &str) -> bool {
        self.founder_ref(handle).is_some()
    }

    pub fn is_winner(&self) -> bool {
        !self.prizes.is_empty()
    }
}

/// Dataset shape as exported by the scraper: a primary founder spread over
/// three fields plus an optional full founders list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
    id: String,
    #[serde(default)]
    slug: Option<String>,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    description_full: Option<String>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    founder: String,
    #[serde(default)]
    founder_twitter: String,
    #[serde(default)]
    founder_github: Option<String>,
    #[serde(default)]
    founders: Vec<ProjectFounder>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    batch: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    logo: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    github: Option<String>,
    #[serde(default)]
    farcaster: Option<String>,
    #[serde(default)]
    youtube: Option<String>,
    #[serde(default)]
    links: Vec<String>,
    #[serde(default)]
    prizes: Vec<String>,
}

impl From<RawProject> for Project {
    fn from(raw: RawProject) -> Self {
        let primary = ProjectFounder {
            name: raw.founder.trim().to_string(),
            handle: clean_handle(&raw.founder_twitter),
            github: raw.founder_github.filter(|g| !g.trim().is_empty()),
        };

        let mut founders: Vec<ProjectFounder> = Vec::with_capacity(raw.founders.len() + 1);
        for candidate in std::iter::once(primary).chain(raw.founders) {
            let handle = clean_handle(&candidate.handle);
            if handle.is_empty() {
                continue;
            }
            match founders.iter_mut().find(|f| same_handle(&f.handle, &handle)) {
                Some(existing) => {
                    // Co-founder list repeats the primary; keep whatever it adds
                    if existing.name.is_empty() {
                        existing.name = candidate.name.trim().to_string();
                    }
                    if existing.github.is_none() {
                        existing.github = candidate.github;
                    }
                }
                None => founders.push(ProjectFounder {
                    name: candidate.name.trim().to_string(),
                    handle,
                    github: candidate.github.filter(|g| !g.trim().is_empty()),
                }),
            }
        }

        Project {
            id: raw.id,
            slug: raw.slug.filter(|s| !s.trim().is_empty()),
            name: raw.name,
            description: raw.description,
            description_full: raw.description_full,
            category: raw.category,
            founders,
            url: raw.url,
            batch: raw.batch,
            tags: raw.tags,
            logo: raw.logo,
            source: raw.source,
            github: raw.github,
            farcaster: raw.farcaster,
            youtube: raw.youtube,
            links: raw.links,
            prizes: raw.prizes,
        }
    }
}

/// A single override field: either the content file sets it or it doesn't
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field<T> {
    Present(T),
    #[default]
    Absent,
}

impl<T> Field<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    /// Override wins when present
    pub fn or(self, fallback: T) -> T {
        match self {
            Field::Present(v) => v,
            Field::Absent => fallback,
        }
    }

    pub fn or_option(self, fallback: Option<T>) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent => fallback,
        }
    }

    pub fn into_option(self) -> Option<T> {
        self.or_option(None)
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Present(v),
            None => Field::Absent,
        }
    }
}

impl Field<String> {
    /// Empty or whitespace-only text counts as absent
    pub fn text(value: Option<String>) -> Self {
        match value {
            Some(s) if !s.trim().is_empty() => Field::Present(s.trim().to_string()),
            _ => Field::Absent,
        }
    }
}

impl Field<Vec<String>> {
    /// An empty list (after dropping blank entries) counts as absent
    pub fn list(value: Option<Vec<String>>) -> Self {
        let items: Vec<String> = value
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            Field::Absent
        } else {
            Field::Present(items)
        }
    }
}

/// Fields a project content file may override
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectOverride {
    pub edit_id: Field<String>,
    pub slug: Field<String>,
    pub project_id: Field<String>,
    pub name: Field<String>,
    pub description: Field<String>,
    pub logo: Field<String>,
    pub category: Field<String>,
    pub url: Field<String>,
    pub tags: Field<Vec<String>>,
    /// Markdown body after the header
    pub body: String,
}

/// Fields a founder content file may override
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FounderOverride {
    pub edit_id: Field<String>,
    pub username: Field<String>,
    pub name: Field<String>,
    pub city: Field<String>,
    pub country: Field<String>,
    pub short_bio: Field<String>,
    pub profile_image: Field<String>,
    pub github: Field<String>,
    pub twitter: Field<String>,
    pub linkedin: Field<String>,
    pub hackathons_attended: Field<u32>,
    pub projects_built: Field<u32>,
    pub prizes_won: Field<u32>,
    pub prize_winnings_amount: Field<f64>,
    pub onchain_creds_claimed: Field<u32>,
    pub tags: Field<Vec<String>>,
    pub body: String,
}

/// A project with its override applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProject {
    #[serde(flatten)]
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_id: Option<String>,
    /// Override body, when a content file exists and has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Activity numbers shown on a founder profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FounderMetrics {
    pub projects_built: u32,
    /// Distinct batches across the founder's projects
    pub hackathons_attended: u32,
    pub prizes_won: u32,
    pub prize_winnings_amount: f64,
    pub onchain_creds_claimed: u32,
}

/// Effective founder profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FounderProfile {
    pub handle: String,
    /// Never empty: falls back to the handle
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub short_bio: Option<String>,
    pub profile_image: Option<String>,
    pub github: Option<String>,
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
    pub metrics: FounderMetrics,
    pub tags: Vec<String>,
    /// Keys of associated projects, dataset order
    pub projects: Vec<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_id: Option<String>,
    /// Whether a content file backs this profile
    pub authored: bool,
}

/// Flat founder record for listings, the map and matching
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FounderCard {
    pub handle: String,
    pub name: String,
    pub city: Option<String>,
    pub short_bio: Option<String>,
    pub profile_image: Option<String>,
    pub project: String,
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_handle() {
        assert_eq!(clean_handle("@arjunbuilds"), "arjunbuilds");
        assert_eq!(clean_handle("  arjunbuilds extra words"), "arjunbuilds");
        assert_eq!(clean_handle("   "), "");
    }

    #[test]
    fn test_legacy_shape_unifies_founders() {
        let json = r#"{
            "id": "p1",
            "name": "YieldNest",
            "founder": "Priya",
            "founderTwitter": "@priyadefi",
            "founders": [
                {"name": "Priya Raman", "twitter": "PriyaDefi", "github": "priya"},
                {"name": "Kabir", "twitter": "kabirshah"}
            ],
            "tags": []
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();

        assert_eq!(project.founders.len(), 2);
        assert_eq!(project.founders[0].handle, "priyadefi");
        assert_eq!(project.founders[0].name, "Priya");
        assert_eq!(project.founders[0].github.as_deref(), Some("priya"));
        assert_eq!(project.founders[1].handle, "kabirshah");
        assert!(project.has_founder("KABIRSHAH"));
    }

    #[test]
    fn test_primary_only_from_list() {
        let json = r#"{"id": "p2", "name": "X", "founders": [{"name": "A", "handle": "a"}]}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.founders.len(), 1);
        assert_eq!(project.founders[0].handle, "a");
    }

    #[test]
    fn test_key_falls_back_to_id() {
        let json = r#"{"id": "uuid-1", "slug": "  ", "name": "X", "founderTwitter": "a"}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.key(), "uuid-1");
    }

    #[test]
    fn test_serialized_project_reads_back() {
        let json = r#"{"id": "p3", "slug": "x-1", "name": "X", "founderTwitter": "a", "founder": "A"}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        let again: Project = serde_json::from_str(&serde_json::to_string(&project).unwrap()).unwrap();
        assert_eq!(project, again);
    }

    #[test]
    fn test_field_text_treats_blank_as_absent() {
        assert_eq!(Field::text(Some("   ".into())), Field::Absent);
        assert_eq!(Field::text(None), Field::Absent);
        assert_eq!(Field::text(Some(" Pay ".into())), Field::Present("Pay".to_string()));
    }

    #[test]
    fn test_field_or() {
        assert_eq!(Field::Present("a").or("b"), "a");
        assert_eq!(Field::<&str>::Absent.or("b"), "b");
        assert_eq!(Field::list(Some(vec![" ".into()])), Field::Absent);
    }
}
