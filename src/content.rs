//! Content override store
//!
//! Each project or founder may have one `.mdx` file under the content root:
//!
//! ```text
//! content/
//!   projects/<slug>.mdx
//!   founders/<handle>.mdx
//! ```
//!
//! A file is a `---` delimited YAML header followed by a markdown body.
//! Files are read lazily through [`OverrideCache`], which memoises every
//! lookup (hits, misses and malformed files alike) for the life of the
//! process. Content is static per deployment, so nothing is invalidated.

use crate::error::{DirectoryError, EntityKind};
use crate::types::{Field, FounderOverride, ProjectOverride};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

pub const CONTENT_EXTENSION: &str = "mdx";

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("header opened with --- but never closed")]
    Unterminated,
    #[error("invalid YAML header: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Split a content file into `(header, body)`.
///
/// Returns `Ok(None)` when the file has no header at all.
pub fn split_frontmatter(raw: &str) -> Result<Option<(&str, &str)>, FrontmatterError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = text.split_inclusive('\n');

    let first = match lines.next() {
        Some(line) => line,
        None => return Ok(None),
    };
    if first.trim_end() != "---" {
        return Ok(None);
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if line.trim_end() == "---" {
            let header = &text[header_start..offset];
            let body = &text[offset + line.len()..];
            return Ok(Some((header, body)));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

/// A YAML scalar as authors actually write them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }

    fn as_count(&self) -> Option<u32> {
        match self {
            Scalar::Int(i) => u32::try_from(*i).ok(),
            Scalar::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Some(*f as u32),
            Scalar::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn as_amount(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Bool(_) => None,
        }
    }
}

/// Tags may be a YAML list or a comma separated string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TagList {
    List(Vec<Scalar>),
    Text(String),
}

impl TagList {
    fn into_vec(self) -> Vec<String> {
        match self {
            TagList::List(items) => items.into_iter().map(Scalar::into_text).collect(),
            TagList::Text(s) => s.split(',').map(str::to_string).collect(),
        }
    }
}

fn text(value: Option<Scalar>) -> Field<String> {
    Field::text(value.map(Scalar::into_text))
}

fn count(value: Option<Scalar>) -> Field<u32> {
    value.as_ref().and_then(Scalar::as_count).into()
}

fn amount(value: Option<Scalar>) -> Field<f64> {
    value.as_ref().and_then(Scalar::as_amount).into()
}

fn tags(value: Option<TagList>) -> Field<Vec<String>> {
    Field::list(value.map(TagList::into_vec))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProjectHeader {
    edit_id: Option<Scalar>,
    slug: Option<Scalar>,
    project_id: Option<Scalar>,
    name: Option<Scalar>,
    description: Option<Scalar>,
    logo: Option<Scalar>,
    category: Option<Scalar>,
    url: Option<Scalar>,
    tags: Option<TagList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EditIdHeader {
    edit_id: Option<Scalar>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FounderHeader {
    edit_id: Option<Scalar>,
    username: Option<Scalar>,
    name: Option<Scalar>,
    city: Option<Scalar>,
    country: Option<Scalar>,
    short_bio: Option<Scalar>,
    profile_image: Option<Scalar>,
    github: Option<Scalar>,
    twitter: Option<Scalar>,
    linkedin: Option<Scalar>,
    hackathons_attended: Option<Scalar>,
    projects_built: Option<Scalar>,
    prizes_won: Option<Scalar>,
    prize_winnings_amount: Option<Scalar>,
    onchain_creds_claimed: Option<Scalar>,
    tags: Option<TagList>,
}

fn parse_header<'a, H>(raw: &'a str) -> Result<(H, &'a str), FrontmatterError>
where
    H: Default + serde::de::DeserializeOwned,
{
    match split_frontmatter(raw)? {
        Some((header, body)) if header.trim().is_empty() => Ok((H::default(), body)),
        Some((header, body)) => Ok((serde_yaml::from_str(header)?, body)),
        None => Ok((H::default(), raw)),
    }
}

/// The `edit_id` of any content file, ignoring every other header key
pub fn parse_edit_id(raw: &str) -> Result<Field<String>, FrontmatterError> {
    let (header, _): (EditIdHeader, &str) = parse_header(raw)?;
    Ok(text(header.edit_id))
}

/// Parse a project content file
pub fn parse_project_override(raw: &str) -> Result<ProjectOverride, FrontmatterError> {
    let (header, body): (ProjectHeader, &str) = parse_header(raw)?;
    Ok(ProjectOverride {
        edit_id: text(header.edit_id),
        slug: text(header.slug),
        project_id: text(header.project_id),
        name: text(header.name),
        description: text(header.description),
        logo: text(header.logo),
        category: text(header.category),
        url: text(header.url),
        tags: tags(header.tags),
        body: body.trim().to_string(),
    })
}

/// Parse a founder content file
pub fn parse_founder_override(raw: &str) -> Result<FounderOverride, FrontmatterError> {
    let (header, body): (FounderHeader, &str) = parse_header(raw)?;
    Ok(FounderOverride {
        edit_id: text(header.edit_id),
        username: text(header.username),
        name: text(header.name),
        city: text(header.city),
        country: text(header.country),
        short_bio: text(header.short_bio),
        profile_image: text(header.profile_image),
        github: text(header.github),
        twitter: text(header.twitter),
        linkedin: text(header.linkedin),
        hackathons_attended: count(header.hackathons_attended),
        projects_built: count(header.projects_built),
        prizes_won: count(header.prizes_won),
        prize_winnings_amount: amount(header.prize_winnings_amount),
        onchain_creds_claimed: count(header.onchain_creds_claimed),
        tags: tags(header.tags),
        body: body.trim().to_string(),
    })
}

/// Where override files come from
pub trait ContentSource: Send + Sync {
    /// Raw file for `key`, or `None` when there is no override
    fn read(&self, kind: EntityKind, key: &str) -> io::Result<Option<String>>;

    /// Every key that has an override file
    fn keys(&self, kind: EntityKind) -> io::Result<Vec<String>>;

    /// Human readable location, used in logs
    fn location(&self, kind: EntityKind, key: &str) -> PathBuf {
        PathBuf::from(kind.dir_name()).join(format!("{}.{}", key, CONTENT_EXTENSION))
    }
}

/// Reject keys that could escape the content directory
fn is_safe_key(key: &str) -> bool {
    !key.is_empty() && !key.starts_with('.') && !key.contains(['/', '\\'])
}

fn content_stem(path: &Path) -> Option<&str> {
    if path.extension().and_then(|e| e.to_str()) != Some(CONTENT_EXTENSION) {
        return None;
    }
    path.file_stem().and_then(|s| s.to_str())
}

/// Content files on local disk
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir(&self, kind: EntityKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    fn entries(&self, kind: EntityKind) -> Vec<PathBuf> {
        let dir = self.dir(kind);
        if !dir.is_dir() {
            return Vec::new();
        }
        walkdir::WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| content_stem(p).is_some())
            .collect()
    }
}

impl ContentSource for FsContentSource {
    fn read(&self, kind: EntityKind, key: &str) -> io::Result<Option<String>> {
        if !is_safe_key(key) {
            return Ok(None);
        }

        let exact = self.location(kind, key);
        if exact.is_file() {
            return std::fs::read_to_string(&exact).map(Some);
        }

        // Handles are case-insensitive; file names may not match the request
        let wanted = key.to_lowercase();
        match self
            .entries(kind)
            .into_iter()
            .find(|p| content_stem(p).map(str::to_lowercase).as_deref() == Some(wanted.as_str()))
        {
            Some(path) => std::fs::read_to_string(path).map(Some),
            None => Ok(None),
        }
    }

    fn keys(&self, kind: EntityKind) -> io::Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries(kind)
            .iter()
            .filter_map(|p| content_stem(p).map(str::to_string))
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn location(&self, kind: EntityKind, key: &str) -> PathBuf {
        self.dir(kind).join(format!("{}.{}", key, CONTENT_EXTENSION))
    }
}

/// In-memory content, for tests and for embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryContentSource {
    files: BTreeMap<(EntityKind, String), String>,
}

impl MemoryContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: EntityKind, key: &str, raw: &str) -> Self {
        self.insert(kind, key, raw);
        self
    }

    pub fn insert(&mut self, kind: EntityKind, key: &str, raw: &str) {
        self.files.insert((kind, key.to_string()), raw.to_string());
    }
}

impl ContentSource for MemoryContentSource {
    fn read(&self, kind: EntityKind, key: &str) -> io::Result<Option<String>> {
        if let Some(raw) = self.files.get(&(kind, key.to_string())) {
            return Ok(Some(raw.clone()));
        }
        let wanted = key.to_lowercase();
        Ok(self
            .files
            .iter()
            .find(|((k, name), _)| *k == kind && name.to_lowercase() == wanted)
            .map(|(_, raw)| raw.clone()))
    }

    fn keys(&self, kind: EntityKind) -> io::Result<Vec<String>> {
        Ok(self
            .files
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.clone())
            .collect())
    }
}

type Slot<T> = RwLock<HashMap<String, Option<Arc<T>>>>;

/// Read-through cache over a [`ContentSource`].
///
/// Owned by the composition root and shared by reference. Concurrent first
/// lookups of the same key may both read the file; the first insert wins and
/// both callers see equal values.
pub struct OverrideCache {
    source: Arc<dyn ContentSource>,
    projects: Slot<ProjectOverride>,
    founders: Slot<FounderOverride>,
    keys: RwLock<HashMap<EntityKind, Arc<Vec<String>>>>,
}

impl OverrideCache {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            projects: RwLock::new(HashMap::new()),
            founders: RwLock::new(HashMap::new()),
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Cache with no content at all
    pub fn empty() -> Self {
        Self::new(Arc::new(MemoryContentSource::new()))
    }

    pub fn project(&self, slug: &str) -> Option<Arc<ProjectOverride>> {
        self.read_through(&self.projects, EntityKind::Project, slug, parse_project_override)
    }

    pub fn founder(&self, handle: &str) -> Option<Arc<FounderOverride>> {
        self.read_through(&self.founders, EntityKind::Founder, handle, parse_founder_override)
    }

    /// Keys with an override file, listed once per process
    pub fn keys(&self, kind: EntityKind) -> Arc<Vec<String>> {
        if let Some(hit) = self.keys.read().unwrap_or_else(PoisonError::into_inner).get(&kind) {
            return Arc::clone(hit);
        }

        let listed = match self.source.keys(kind) {
            Ok(keys) => keys,
            Err(e) => {
                warn!(%kind, error = %e, "could not list overrides");
                Vec::new()
            }
        };

        let mut guard = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(guard.entry(kind).or_insert_with(|| Arc::new(listed)))
    }

    fn read_through<T>(
        &self,
        slot: &Slot<T>,
        kind: EntityKind,
        key: &str,
        parse: fn(&str) -> Result<T, FrontmatterError>,
    ) -> Option<Arc<T>> {
        let cache_key = key.to_lowercase();
        if let Some(hit) = slot.read().unwrap_or_else(PoisonError::into_inner).get(&cache_key) {
            return hit.clone();
        }

        let loaded = self.load(kind, key, parse);
        debug!(%kind, key, found = loaded.is_some(), "override cache fill");

        let mut guard = slot.write().unwrap_or_else(PoisonError::into_inner);
        guard.entry(cache_key).or_insert(loaded).clone()
    }

    fn load<T>(
        &self,
        kind: EntityKind,
        key: &str,
        parse: fn(&str) -> Result<T, FrontmatterError>,
    ) -> Option<Arc<T>> {
        let raw = match self.source.read(kind, key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(%kind, key, error = %e, "override read failed, using static record");
                return None;
            }
        };

        match parse(&raw) {
            Ok(parsed) => Some(Arc::new(parsed)),
            Err(e) => {
                let err = DirectoryError::MalformedOverride {
                    path: self.source.location(kind, key),
                    reason: e.to_string(),
                };
                warn!(error = %err, "skipping override");
                None
            }
        }
    }
}
