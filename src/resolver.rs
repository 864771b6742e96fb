//! Static + override merge for projects
//!
//! Override wins per field when present; absent (or blank) override fields
//! fall back to the static value. Merging is pure: no I/O, no mutation of
//! the dataset.

use crate::content::OverrideCache;
use crate::data::Dataset;
use crate::error::{DirectoryError, DirectoryResult, EntityKind};
use crate::types::{Project, ProjectOverride, ResolvedProject};

/// Apply an optional override to a static project.
///
/// The resolved name is never blank: it falls back to the routing key.
pub fn merge_project(project: &Project, over: Option<&ProjectOverride>) -> ResolvedProject {
    let mut merged = project.clone();
    let mut edit_id = None;
    let mut content = None;

    if let Some(over) = over {
        merged.name = over.name.clone().or(merged.name);
        merged.description = over.description.clone().or(merged.description);
        merged.logo = over.logo.clone().or(merged.logo);
        merged.category = over.category.clone().or(merged.category);
        merged.url = over.url.clone().or(merged.url);
        merged.tags = over.tags.clone().or(merged.tags);
        edit_id = over.edit_id.clone().into_option();
        content = Some(over.body.clone()).filter(|b| !b.is_empty());
    }

    if merged.name.trim().is_empty() {
        merged.name = project.key().to_string();
    }

    ResolvedProject {
        project: merged,
        edit_id,
        content,
    }
}

/// Resolve one project by slug or id
pub fn resolve_project(
    dataset: &Dataset,
    overrides: &OverrideCache,
    slug_or_id: &str,
) -> DirectoryResult<ResolvedProject> {
    let project = dataset
        .project(slug_or_id)
        .ok_or_else(|| DirectoryError::not_found(EntityKind::Project, slug_or_id))?;
    let over = overrides.project(project.key());
    Ok(merge_project(project, over.as_deref()))
}

/// Every dataset project with its override applied, dataset order
pub fn resolve_all(dataset: &Dataset, overrides: &OverrideCache) -> Vec<ResolvedProject> {
    dataset
        .projects()
        .iter()
        .map(|p| merge_project(p, overrides.project(p.key()).as_deref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryContentSource;
    use crate::types::Field;
    use std::sync::Arc;

    fn paybase() -> Project {
        serde_json::from_str(
            r#"{
                "id": "pb-1",
                "slug": "paybase",
                "name": "PayBase",
                "description": "Payments on Base",
                "category": "Payments",
                "founder": "Arjun",
                "founderTwitter": "arjunbuilds",
                "batch": "Batch 1",
                "tags": ["payments", "UPI", "onramp"],
                "logo": "static.png"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_merge_without_override_is_identity() {
        let p = paybase();
        let resolved = merge_project(&p, None);
        assert_eq!(resolved.project, p);
        assert!(resolved.content.is_none());
    }

    #[test]
    fn test_merge_is_per_field() {
        let p = paybase();
        let over = ProjectOverride {
            name: Field::Present("PayBase Pro".to_string()),
            logo: Field::Present("override.png".to_string()),
            body: "Story".to_string(),
            ..Default::default()
        };

        let resolved = merge_project(&p, Some(&over));
        assert_eq!(resolved.project.name, "PayBase Pro");
        assert_eq!(resolved.project.logo, "override.png");
        assert_eq!(resolved.project.description, "Payments on Base");
        assert_eq!(resolved.project.tags, p.tags);
        assert_eq!(resolved.content.as_deref(), Some("Story"));
    }

    #[test]
    fn test_resolve_reads_override_by_slug() {
        let dataset = Dataset::new(vec![paybase()]).unwrap();
        let source = MemoryContentSource::new().with(
            EntityKind::Project,
            "paybase",
            "---\nslug: paybase\ndescription: \"   \"\nname: PayBase v2\nedit_id: ab12cd34\n---\n",
        );
        let cache = OverrideCache::new(Arc::new(source));

        let resolved = resolve_project(&dataset, &cache, "pb-1").unwrap();
        assert_eq!(resolved.project.name, "PayBase v2");
        assert_eq!(resolved.project.description, "Payments on Base");
        assert_eq!(resolved.edit_id.as_deref(), Some("ab12cd34"));
    }

    #[test]
    fn test_blank_name_falls_back_to_key() {
        let dataset = Dataset::from_json_str(
            r#"[
                {"id": "p1", "slug": "ghost-1", "name": "  ", "founderTwitter": "a"},
                {"id": "p2", "name": "", "founderTwitter": "b"}
            ]"#,
        )
        .unwrap();
        let cache = OverrideCache::empty();

        assert_eq!(resolve_project(&dataset, &cache, "ghost-1").unwrap().project.name, "ghost-1");
        assert_eq!(resolve_project(&dataset, &cache, "p2").unwrap().project.name, "p2");

        let blank_override = ProjectOverride {
            description: Field::Present("Still blank".to_string()),
            ..Default::default()
        };
        let resolved = merge_project(&dataset.projects()[0], Some(&blank_override));
        assert_eq!(resolved.project.name, "ghost-1");
        assert_eq!(resolved.project.description, "Still blank");
    }

    #[test]
    fn test_malformed_override_leaves_static_record() {
        let dataset = Dataset::new(vec![paybase()]).unwrap();
        for raw in ["---\nname: [unclosed\n---\nBody", "---\nname: Never closed\n"] {
            let source = MemoryContentSource::new().with(EntityKind::Project, "paybase", raw);
            let cache = OverrideCache::new(Arc::new(source));

            let resolved = resolve_project(&dataset, &cache, "paybase").unwrap();
            assert_eq!(resolved.project, paybase());
            assert!(resolved.edit_id.is_none());
            assert!(resolved.content.is_none());
        }
    }

    #[test]
    fn test_resolve_unknown_project_is_not_found() {
        let dataset = Dataset::new(vec![paybase()]).unwrap();
        let source = MemoryContentSource::new().with(EntityKind::Project, "ghost", "---\nname: Ghost\n---\n");
        let cache = OverrideCache::new(Arc::new(source));

        let err = resolve_project(&dataset, &cache, "ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_resolve_all_keeps_order() {
        let dataset = Dataset::embedded().unwrap();
        let all = resolve_all(&dataset, &OverrideCache::empty());
        let names: Vec<&str> = all.iter().map(|r| r.project.name.as_str()).collect();
        let expected: Vec<&str> = dataset.projects().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, expected);
    }
}
