//! Founder aggregation
//!
//! A founder exists if any project references their handle, or if a
//! founder content file exists for it. Metrics are derived from the
//! associated projects; a content file may override any of them.

use crate::content::OverrideCache;
use crate::error::{DirectoryError, DirectoryResult, EntityKind};
use crate::types::{
    same_handle, Field, FounderCard, FounderMetrics, FounderOverride, FounderProfile, Project,
    PLACEHOLDER_HANDLE,
};
use std::collections::HashSet;

/// How many tags a profile shows
pub const DISPLAY_TAG_LIMIT: usize = 8;

/// Country assumed for founders known only from the dataset
pub const DEFAULT_COUNTRY: &str = "India";

/// Merge tag lists: case-insensitive dedupe, first appearance wins, bounded
pub fn combined_tags<'a, I>(tags: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .take(limit)
        .map(str::to_string)
        .collect()
}

fn distinct_batches(projects: &[&Project]) -> u32 {
    projects
        .iter()
        .map(|p| p.batch.trim().to_lowercase())
        .filter(|b| !b.is_empty())
        .collect::<HashSet<_>>()
        .len() as u32
}

fn stub_content(project: &Project) -> String {
    format!(
        "## About\n\nBuilder from {}.\n\n## Project\n\n[{}]({})",
        DEFAULT_COUNTRY, project.name, project.url
    )
}

/// Build the effective profile for `handle`.
///
/// `projects` must already be the founder's projects (see [`projects_for`]).
pub fn aggregate(
    handle: &str,
    projects: &[&Project],
    over: Option<&FounderOverride>,
    tag_limit: usize,
) -> DirectoryResult<FounderProfile> {
    if projects.is_empty() && over.is_none() {
        return Err(DirectoryError::not_found(EntityKind::Founder, handle));
    }

    let reference = projects.first().and_then(|p| p.founder_ref(handle));
    let derived_name = reference
        .map(|r| r.name.clone())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| handle.to_string());
    let derived_handle = reference
        .map(|r| r.handle.clone())
        .unwrap_or_else(|| handle.to_string());

    let derived = FounderMetrics {
        projects_built: projects.len() as u32,
        hackathons_attended: distinct_batches(projects),
        prizes_won: projects.iter().map(|p| p.prizes.len() as u32).sum(),
        prize_winnings_amount: 0.0,
        onchain_creds_claimed: 0,
    };
    let derived_tags = combined_tags(projects.iter().flat_map(|p| p.tags.iter()), tag_limit);
    let project_keys: Vec<String> = projects.iter().map(|p| p.key().to_string()).collect();
    let derived_content = projects.first().map(|p| stub_content(p)).unwrap_or_default();

    let Some(over) = over else {
        return Ok(FounderProfile {
            handle: derived_handle.clone(),
            name: derived_name,
            city: None,
            country: Some(DEFAULT_COUNTRY.to_string()),
            short_bio: None,
            profile_image: None,
            github: reference.and_then(|r| r.github.clone()),
            twitter: Some(derived_handle),
            linkedin: None,
            metrics: derived,
            tags: derived_tags,
            projects: project_keys,
            content: derived_content,
            edit_id: None,
            authored: false,
        });
    };

    let over = over.clone();
    let tags = match over.tags {
        Field::Present(t) => combined_tags(t.iter(), tag_limit),
        Field::Absent => derived_tags,
    };

    Ok(FounderProfile {
        handle: over.username.or(derived_handle.clone()),
        name: over.name.or(derived_name),
        city: over.city.into_option(),
        country: over.country.into_option(),
        short_bio: over.short_bio.into_option(),
        profile_image: over.profile_image.into_option(),
        github: over.github.or_option(reference.and_then(|r| r.github.clone())),
        twitter: over.twitter.or_option(Some(derived_handle)),
        linkedin: over.linkedin.into_option(),
        metrics: FounderMetrics {
            projects_built: over.projects_built.or(derived.projects_built),
            hackathons_attended: over.hackathons_attended.or(derived.hackathons_attended),
            prizes_won: over.prizes_won.or(derived.prizes_won),
            prize_winnings_amount: over.prize_winnings_amount.or(derived.prize_winnings_amount),
            onchain_creds_claimed: over.onchain_creds_claimed.or(derived.onchain_creds_claimed),
        },
        tags,
        projects: project_keys,
        content: if over.body.is_empty() {
            derived_content
        } else {
            over.body
        },
        edit_id: over.edit_id.into_option(),
        authored: true,
    })
}

/// Projects referencing `handle` as primary or co-founder, input order
pub fn projects_for<'a>(projects: &'a [Project], handle: &str) -> Vec<&'a Project> {
    projects.iter().filter(|p| p.has_founder(handle)).collect()
}

/// Look a founder up against (resolved) projects and the override store
pub fn lookup(
    projects: &[Project],
    overrides: &OverrideCache,
    handle: &str,
    tag_limit: usize,
) -> DirectoryResult<FounderProfile> {
    let handle = handle.trim();
    if handle.is_empty() {
        return Err(DirectoryError::not_found(EntityKind::Founder, handle));
    }
    let matched = projects_for(projects, handle);
    let over = overrides.founder(handle);
    aggregate(handle, &matched, over.as_deref(), tag_limit)
}

/// Every handle known to the directory: dataset founders first, then
/// handles that only have a content file. Placeholder handle excluded.
pub fn known_handles(projects: &[Project], overrides: &OverrideCache) -> Vec<String> {
    let mut handles: Vec<String> = Vec::new();
    let from_projects = projects.iter().flat_map(|p| p.founders.iter().map(|f| &f.handle));
    let from_content = overrides.keys(EntityKind::Founder);

    for handle in from_projects.chain(from_content.iter()) {
        if same_handle(handle, PLACEHOLDER_HANDLE) {
            continue;
        }
        if !handles.iter().any(|h| same_handle(h, handle)) {
            handles.push(handle.clone());
        }
    }
    handles
}

impl FounderCard {
    pub fn from_profile(profile: &FounderProfile, project: Option<&Project>) -> Self {
        Self {
            handle: profile.handle.clone(),
            name: profile.name.clone(),
            city: profile.city.clone(),
            short_bio: profile.short_bio.clone(),
            profile_image: profile.profile_image.clone(),
            project: project
                .map(|p| p.name.clone())
                .unwrap_or_else(|| profile.name.clone()),
            tags: profile.tags.clone(),
        }
    }
}

/// Founder listing used by the founders page and the map, sorted by name
pub fn founder_cards(
    projects: &[Project],
    overrides: &OverrideCache,
    tag_limit: usize,
) -> Vec<FounderCard> {
    let mut cards: Vec<FounderCard> = known_handles(projects, overrides)
        .iter()
        .filter_map(|handle| {
            let matched = projects_for(projects, handle);
            let over = overrides.founder(handle);
            let profile = aggregate(handle, &matched, over.as_deref(), tag_limit).ok()?;
            Some(FounderCard::from_profile(&profile, matched.first().copied()))
        })
        .collect();

    cards.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryContentSource;
    use std::sync::Arc;

    fn project(json: &str) -> Project {
        serde_json::from_str(json).unwrap()
    }

    fn fixtures() -> Vec<Project> {
        vec![
            project(r#"{"id": "1", "slug": "paybase", "name": "PayBase", "founder": "Arjun", "founderTwitter": "arjunbuilds", "batch": "Batch 1", "url": "https://paybase.xyz", "tags": ["payments", "UPI", "onramp"]}"#),
            project(r#"{"id": "2", "slug": "yieldnest", "name": "YieldNest", "founder": "Priya", "founderTwitter": "priyadefi", "founders": [{"name": "Kabir", "twitter": "kabirshah"}], "batch": "Batch 1", "tags": ["yield"], "prizes": ["First"]}"#),
            project(r#"{"id": "3", "slug": "chaicart", "name": "ChaiCart", "founder": "Kabir S", "founderTwitter": "KabirShah", "batch": "Batch 2", "tags": ["Yield", "merchant"], "prizes": ["Second", "Community"]}"#),
        ]
    }

    // =========================================================================
    // aggregate
    // =========================================================================

    #[test]
    fn test_single_project_founder() {
        let projects = fixtures();
        let profile = lookup(&projects, &OverrideCache::empty(), "arjunbuilds", DISPLAY_TAG_LIMIT).unwrap();

        assert_eq!(profile.name, "Arjun");
        assert_eq!(profile.metrics.projects_built, 1);
        assert_eq!(profile.metrics.hackathons_attended, 1);
        assert_eq!(profile.tags, vec!["payments", "UPI", "onramp"]);
        assert_eq!(profile.country.as_deref(), Some("India"));
        assert!(profile.content.contains("[PayBase](https://paybase.xyz)"));
        assert!(!profile.authored);
    }

    #[test]
    fn test_co_founder_aggregates_across_projects() {
        let projects = fixtures();
        let profile = lookup(&projects, &OverrideCache::empty(), "kabirshah", DISPLAY_TAG_LIMIT).unwrap();

        assert_eq!(profile.name, "Kabir");
        assert_eq!(profile.projects, vec!["yieldnest", "chaicart"]);
        assert_eq!(profile.metrics.projects_built, 2);
        assert_eq!(profile.metrics.hackathons_attended, 2);
        assert_eq!(profile.metrics.prizes_won, 3);
        assert_eq!(profile.tags, vec!["yield", "merchant"]);
    }

    #[test]
    fn test_tags_are_truncated() {
        let tags: Vec<String> = (0..20).map(|i| format!("t{}", i)).collect();
        assert_eq!(combined_tags(tags.iter(), 8).len(), 8);
        assert_eq!(combined_tags(tags.iter(), 8)[0], "t0");
    }

    #[test]
    fn test_unknown_founder_is_not_found() {
        let projects = fixtures();
        let err = lookup(&projects, &OverrideCache::empty(), "nobody", DISPLAY_TAG_LIMIT).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_override_only_founder() {
        let source = MemoryContentSource::new().with(
            EntityKind::Founder,
            "solo",
            "---\nname: Solo Dev\ncity: Pune\n---\nHello",
        );
        let cache = OverrideCache::new(Arc::new(source));
        let profile = lookup(&fixtures(), &cache, "solo", DISPLAY_TAG_LIMIT).unwrap();

        assert_eq!(profile.name, "Solo Dev");
        assert_eq!(profile.city.as_deref(), Some("Pune"));
        assert_eq!(profile.metrics.projects_built, 0);
        assert!(profile.projects.is_empty());
        assert_eq!(profile.content, "Hello");
        assert!(profile.authored);
    }

    #[test]
    fn test_override_wins_per_field() {
        let projects = fixtures();
        let matched = projects_for(&projects, "arjunbuilds");
        let over = FounderOverride {
            hackathons_attended: Field::Present(5),
            short_bio: Field::Present("Payments nerd".to_string()),
            ..Default::default()
        };
        let profile = aggregate("arjunbuilds", &matched, Some(&over), DISPLAY_TAG_LIMIT).unwrap();

        assert_eq!(profile.metrics.hackathons_attended, 5);
        assert_eq!(profile.metrics.projects_built, 1);
        assert_eq!(profile.name, "Arjun");
        assert_eq!(profile.short_bio.as_deref(), Some("Payments nerd"));
        assert!(profile.content.starts_with("## About"));
    }

    // =========================================================================
    // listing
    // =========================================================================

    #[test]
    fn test_known_handles_union() {
        let source = MemoryContentSource::new()
            .with(EntityKind::Founder, "ArjunBuilds", "---\nname: Arjun M\n---\n")
            .with(EntityKind::Founder, "solo", "---\nname: Solo\n---\n");
        let cache = OverrideCache::new(Arc::new(source));

        let handles = known_handles(&fixtures(), &cache);
        assert_eq!(handles, vec!["arjunbuilds", "priyadefi", "kabirshah", "solo"]);
    }

    #[test]
    fn test_founder_cards_sorted_by_name() {
        let cards = founder_cards(&fixtures(), &OverrideCache::empty(), DISPLAY_TAG_LIMIT);
        let names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Arjun", "Kabir", "Priya"]);
        assert_eq!(cards[1].project, "YieldNest");
    }
}
