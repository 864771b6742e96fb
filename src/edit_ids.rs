//! Content file maintenance
//!
//! Every override file carries an `edit_id`, a short random token the
//! edit form uses to find the file again. Ids are added to files that lack
//! one and never rewritten once present.

use crate::content::{parse_edit_id, split_frontmatter, FrontmatterError, CONTENT_EXTENSION};
use crate::data::Dataset;
use crate::types::Project;
use anyhow::{Context, Result};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Lowercase letters and digits minus the easily confused ones (i, l, o, 0, 1)
pub const EDIT_ID_ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";
pub const EDIT_ID_LEN: usize = 8;

/// Link used when a project has no listing URL of its own
pub const FALLBACK_LISTING_URL: &str = "https://base-batch-india.devfolio.co";

pub fn generate_edit_id<R: Rng>(rng: &mut R) -> String {
    (0..EDIT_ID_LEN)
        .map(|_| EDIT_ID_ALPHABET[rng.gen_range(0..EDIT_ID_ALPHABET.len())] as char)
        .collect()
}

/// Quote a value for a YAML header line. JSON strings are valid YAML.
fn yaml_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

/// Byte range of a top-level `edit_id:` line inside the header
fn edit_id_line(text: &str) -> Option<std::ops::Range<usize>> {
    let mut offset = 0;
    for (i, line) in text.split_inclusive('\n').enumerate() {
        let start = offset;
        offset += line.len();
        if i == 0 {
            continue;
        }
        if line.trim_end() == "---" {
            return None;
        }
        let is_key = line
            .strip_prefix("edit_id")
            .map(|rest| rest.trim_start().starts_with(':'))
            .unwrap_or(false);
        if is_key {
            return Some(start..offset);
        }
    }
    None
}

/// Add an `edit_id` to a content file that lacks a usable one.
///
/// Returns the rewritten text, or `None` when the file already has an id.
/// A blank or null `edit_id` line is replaced in place; otherwise the id
/// goes on the first header line. A file without a header gains one.
pub fn ensure_edit_id<R: Rng>(
    raw: &str,
    rng: &mut R,
) -> Result<Option<String>, FrontmatterError> {
    if split_frontmatter(raw)?.is_none() {
        let id_line = format!("edit_id: {}\n", yaml_string(&generate_edit_id(rng)));
        return Ok(Some(format!("---\n{}---\n\n{}", id_line, raw)));
    }
    if parse_edit_id(raw)?.is_present() {
        return Ok(None);
    }

    let id_line = format!("edit_id: {}\n", yaml_string(&generate_edit_id(rng)));
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut out = String::with_capacity(text.len() + id_line.len());
    match edit_id_line(text) {
        Some(range) => {
            out.push_str(&text[..range.start]);
            out.push_str(&id_line);
            out.push_str(&text[range.end..]);
        }
        None => {
            let opener = text.split_inclusive('\n').next().unwrap_or("---\n");
            out.push_str(opener);
            out.push_str(&id_line);
            out.push_str(&text[opener.len()..]);
        }
    }
    Ok(Some(out))
}

fn content_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(CONTENT_EXTENSION))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub updated: usize,
    pub unchanged: usize,
    /// Files whose header could not be read; left as they were
    pub skipped: Vec<PathBuf>,
}

/// Give every `.mdx` file in `dir` an edit id
pub fn backfill_edit_ids<R: Rng>(dir: &Path, rng: &mut R) -> Result<BackfillReport> {
    let mut report = BackfillReport::default();
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {:?}", dir);
    }

    for path in content_files(dir) {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        match ensure_edit_id(&raw, rng) {
            Ok(Some(updated)) => {
                std::fs::write(&path, updated)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                info!(path = %path.display(), "added edit_id");
                report.updated += 1;
            }
            Ok(None) => report.unchanged += 1,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping malformed content file");
                report.skipped.push(path);
            }
        }
    }

    Ok(report)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A fresh project override file
pub fn project_stub(project: &Project, edit_id: &str) -> String {
    let mut out = String::from("---\n");
    out.push_str(&format!("edit_id: {}\n", yaml_string(edit_id)));
    out.push_str(&format!("slug: {}\n", yaml_string(project.key())));
    out.push_str(&format!("project_id: {}\n", yaml_string(&project.id)));
    out.push_str(&format!("name: {}\n", yaml_string(&project.name)));
    if !project.description.trim().is_empty() {
        out.push_str(&format!("description: {}\n", yaml_string(project.description.trim())));
    }
    if project.logo.starts_with("http") {
        out.push_str(&format!("logo: {}\n", yaml_string(&project.logo)));
    }
    out.push_str("---\n\n");

    out.push_str("## About this project\n\n");
    out.push_str("Add a longer description of your project here.\n\n");
    out.push_str("## Links\n\n");

    let mut links = Vec::new();
    let listing = non_blank(Some(project.url.as_str()))
        .or_else(|| non_blank(project.source.as_deref()));
    if let Some(listing) = listing {
        links.push(format!("- [Devfolio]({})\n", listing));
    }
    if let Some(github) = non_blank(project.github.as_deref()) {
        links.push(format!("- [GitHub]({})\n", github));
    }
    if let Some(farcaster) = non_blank(project.farcaster.as_deref()) {
        links.push(format!("- [Farcaster miniapp]({})\n", farcaster));
    }
    if links.is_empty() {
        links.push(format!("- [Devfolio]({})\n", FALLBACK_LISTING_URL));
    }
    for link in links {
        out.push_str(&link);
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StubReport {
    pub created: usize,
    pub backfilled: usize,
    pub unchanged: usize,
}

/// Create a stub for every dataset project without a content file.
/// Existing files only gain an edit id when they lack one.
pub fn generate_project_stubs<R: Rng>(
    dataset: &Dataset,
    dir: &Path,
    rng: &mut R,
) -> Result<StubReport> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let mut report = StubReport::default();

    for project in dataset.projects() {
        let path = dir.join(format!("{}.{}", project.key(), CONTENT_EXTENSION));
        if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            match ensure_edit_id(&raw, rng) {
                Ok(Some(updated)) => {
                    std::fs::write(&path, updated)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    report.backfilled += 1;
                }
                Ok(None) => report.unchanged += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "leaving malformed file alone");
                    report.unchanged += 1;
                }
            }
            continue;
        }

        let stub = project_stub(project, &generate_edit_id(rng));
        std::fs::write(&path, stub).with_context(|| format!("Failed to write {:?}", path))?;
        info!(slug = project.key(), "created project stub");
        report.created += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_project_override;
    use crate::types::Field;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn project(json: &str) -> Project {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_edit_id_shape() {
        let mut rng = rng();
        for _ in 0..50 {
            let id = generate_edit_id(&mut rng);
            assert_eq!(id.len(), 8);
            assert!(id.bytes().all(|b| EDIT_ID_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_ensure_inserts_first_header_line() {
        let raw = "---\nname: PayBase\n---\nBody\n";
        let updated = ensure_edit_id(raw, &mut rng()).unwrap().unwrap();
        let lines: Vec<&str> = updated.lines().collect();
        assert_eq!(lines[0], "---");
        assert!(lines[1].starts_with("edit_id: \""));
        assert_eq!(lines[2], "name: PayBase");

        let parsed = parse_project_override(&updated).unwrap();
        assert!(parsed.edit_id.is_present());
        assert_eq!(parsed.name, Field::Present("PayBase".to_string()));
        assert_eq!(parsed.body, "Body");
    }

    #[test]
    fn test_ensure_keeps_existing_id() {
        let raw = "---\nedit_id: abcdefgh\nname: X\n---\n";
        assert_eq!(ensure_edit_id(raw, &mut rng()).unwrap(), None);
    }

    #[test]
    fn test_ensure_replaces_null_edit_id() {
        for raw in [
            "---\nedit_id: null\nname: X\n---\nBody\n",
            "---\nname: X\nedit_id: \"\"\n---\nBody\n",
            "---\nname: X\nedit_id:\n---\nBody\n",
            "---\nedit_id: ~\nname: X\n---\nBody\n",
        ] {
            let updated = ensure_edit_id(raw, &mut rng()).unwrap().unwrap();
            let id_lines = updated.lines().filter(|l| l.starts_with("edit_id")).count();
            assert_eq!(id_lines, 1, "{:?}", updated);

            let parsed = parse_project_override(&updated).unwrap();
            assert!(parsed.edit_id.is_present());
            assert_eq!(parsed.name, Field::Present("X".to_string()));
            assert_eq!(parsed.body, "Body");
        }
    }

    #[test]
    fn test_ensure_ignores_nested_edit_id() {
        let raw = "---\nname: X\nmeta:\n  edit_id: abc\n---\n";
        let updated = ensure_edit_id(raw, &mut rng()).unwrap().unwrap();
        assert!(updated.starts_with("---\nedit_id: \""));
        assert!(updated.contains("  edit_id: abc"));
        assert!(parse_project_override(&updated).unwrap().edit_id.is_present());
    }

    #[test]
    fn test_ensure_reads_founder_headers() {
        let raw = "---\nusername: arjun\nhackathons_attended: 3\ntags: [defi]\nedit_id: \"\"\n---\n";
        let updated = ensure_edit_id(raw, &mut rng()).unwrap().unwrap();
        assert_eq!(parse_edit_id(&updated).unwrap().into_option().map(|id| id.len()), Some(8));
        assert!(updated.contains("hackathons_attended: 3"));
    }

    #[test]
    fn test_ensure_adds_header_when_missing() {
        let updated = ensure_edit_id("Just a body", &mut rng()).unwrap().unwrap();
        assert!(updated.starts_with("---\nedit_id: "));
        let parsed = parse_project_override(&updated).unwrap();
        assert!(parsed.edit_id.is_present());
        assert_eq!(parsed.body, "Just a body");
    }

    #[test]
    fn test_ensure_rejects_unterminated_header() {
        assert!(ensure_edit_id("---\nname: X\n", &mut rng()).is_err());
    }

    // ========================================================================
    // Project stubs
    // ========================================================================

    #[test]
    fn test_project_stub_reads_back() {
        let p = project(
            r#"{"id": "p1", "slug": "paybase-8f3c", "name": "Pay \"Base\"", "description": "UPI: rails", "founderTwitter": "a", "logo": "/logos/p.png", "github": "https://github.com/a/p"}"#,
        );
        let stub = project_stub(&p, "abcdefgh");
        let parsed = parse_project_override(&stub).unwrap();

        assert_eq!(parsed.edit_id, Field::Present("abcdefgh".to_string()));
        assert_eq!(parsed.slug, Field::Present("paybase-8f3c".to_string()));
        assert_eq!(parsed.name, Field::Present("Pay \"Base\"".to_string()));
        assert_eq!(parsed.description, Field::Present("UPI: rails".to_string()));
        assert_eq!(parsed.logo, Field::Absent);
        assert!(stub.contains("- [GitHub](https://github.com/a/p)"));
        assert!(!stub.contains("Devfolio"));
        assert!(!stub.contains("Farcaster"));
    }

    #[test]
    fn test_project_stub_listing_falls_back_to_source() {
        let p = project(
            r#"{"id": "p1", "name": "P", "founderTwitter": "a", "url": " ", "source": "https://devfolio.co/projects/p"}"#,
        );
        let stub = project_stub(&p, "abcdefgh");
        assert!(stub.contains("- [Devfolio](https://devfolio.co/projects/p)"));
        assert!(!stub.contains(FALLBACK_LISTING_URL));

        let with_url = project(
            r#"{"id": "p1", "name": "P", "founderTwitter": "a", "url": "https://p.devfolio.co", "source": "https://devfolio.co/projects/p"}"#,
        );
        assert!(project_stub(&with_url, "abcdefgh").contains("- [Devfolio](https://p.devfolio.co)"));
    }

    #[test]
    fn test_project_stub_without_links_gets_fallback() {
        let p = project(r#"{"id": "p1", "name": "P", "founderTwitter": "a"}"#);
        let stub = project_stub(&p, "abcdefgh");
        let links: Vec<&str> = stub.lines().filter(|l| l.starts_with("- [")).collect();
        assert_eq!(links, vec![format!("- [Devfolio]({})", FALLBACK_LISTING_URL)]);
    }

    #[test]
    fn test_generate_stubs_creates_and_backfills() {
        let dir = tempdir().unwrap();
        let dataset = Dataset::from_json_str(
            r#"[
                {"id": "1", "slug": "one", "name": "One", "founderTwitter": "a"},
                {"id": "2", "slug": "two", "name": "Two", "founderTwitter": "b"},
                {"id": "3", "slug": "three", "name": "Three", "founderTwitter": "c"}
            ]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("two.mdx"), "---\nname: Custom\n---\nMine").unwrap();
        std::fs::write(dir.path().join("three.mdx"), "---\nedit_id: zzzzzzzz\n---\n").unwrap();

        let report = generate_project_stubs(&dataset, dir.path(), &mut rng()).unwrap();
        assert_eq!(
            report,
            StubReport {
                created: 1,
                backfilled: 1,
                unchanged: 1
            }
        );

        let two = std::fs::read_to_string(dir.path().join("two.mdx")).unwrap();
        assert!(two.contains("name: Custom"));
        assert!(two.ends_with("Mine"));

        let again = generate_project_stubs(&dataset, dir.path(), &mut rng()).unwrap();
        assert_eq!(again.unchanged, 3);
    }

    #[test]
    fn test_backfill_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.mdx"), "---\nname: A\n---\n").unwrap();
        std::fs::write(dir.path().join("b.mdx"), "---\nedit_id: \"x\"\n---\n").unwrap();
        std::fs::write(dir.path().join("c.mdx"), "---\nbroken\n").unwrap();
        std::fs::write(dir.path().join("d.mdx"), "---\nedit_id: null\nname: D\n---\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = backfill_edit_ids(dir.path(), &mut rng()).unwrap();
        assert_eq!(report.updated, 2);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(std::fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "ignored");

        let d = std::fs::read_to_string(dir.path().join("d.mdx")).unwrap();
        assert!(parse_edit_id(&d).unwrap().is_present());
        assert!(!d.contains("null"));
    }
}
