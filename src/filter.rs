//! Directory filtering and search
//!
//! A full scan per query. The directory holds tens of records, so there
//! is no index. Every predicate is ANDed and input order is preserved.

use crate::data::{ALL_BATCHES, ALL_CATEGORIES};
use crate::types::{FounderCard, Project};

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Filter state for the project directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    category: Option<String>,
    batches: Vec<String>,
    sub_tags: Vec<String>,
    query: Option<String>,
    winners_only: bool,
}

impl ProjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one category. `All` (or blank) clears the restriction.
    pub fn category(mut self, category: &str) -> Self {
        let category = category.trim();
        self.category = if category.is_empty() || category == ALL_CATEGORIES {
            None
        } else {
            Some(category.to_string())
        };
        self
    }

    /// Add an accepted batch. `All Batches` is ignored.
    pub fn batch(mut self, batch: &str) -> Self {
        let batch = batch.trim();
        if !batch.is_empty() && batch != ALL_BATCHES && !self.batches.iter().any(|b| b == batch) {
            self.batches.push(batch.to_string());
        }
        self
    }

    /// Add a sub-tag; projects must carry at least one selected sub-tag
    pub fn sub_tag(mut self, tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !self.sub_tags.contains(&tag) {
            self.sub_tags.push(tag);
        }
        self
    }

    /// Free-text query, case-insensitive substring
    pub fn query(mut self, query: &str) -> Self {
        let query = query.trim().to_lowercase();
        self.query = if query.is_empty() { None } else { Some(query) };
        self
    }

    /// Only projects that won at least one prize
    pub fn winners_only(mut self, on: bool) -> Self {
        self.winners_only = on;
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, project: &Project) -> bool {
        if let Some(category) = &self.category {
            if !project.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }

        if !self.batches.is_empty() && !self.batches.iter().any(|b| *b == project.batch) {
            return false;
        }

        if !self.sub_tags.is_empty()
            && !project
                .tags
                .iter()
                .any(|t| self.sub_tags.contains(&t.trim().to_lowercase()))
        {
            return false;
        }

        if self.winners_only && !project.is_winner() {
            return false;
        }

        match &self.query {
            Some(q) => matches_text(project, q),
            None => true,
        }
    }

    /// Narrow `projects`, keeping their order
    pub fn apply<'a, I>(&self, projects: I) -> Vec<&'a Project>
    where
        I: IntoIterator<Item = &'a Project>,
    {
        projects.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Name, description, founders (names and handles) and tags
fn matches_text(project: &Project, q: &str) -> bool {
    contains_ci(&project.name, q)
        || contains_ci(&project.description, q)
        || project
            .founders
            .iter()
            .any(|f| contains_ci(&f.name, q) || contains_ci(&f.handle, q))
        || project.tags.iter().any(|t| contains_ci(t, q))
}

/// Founder listing search: name, handle, project, city and tags
pub fn search_founders<'a>(cards: &'a [FounderCard], query: &str) -> Vec<&'a FounderCard> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return cards.iter().collect();
    }
    cards
        .iter()
        .filter(|c| {
            contains_ci(&c.name, &q)
                || contains_ci(&c.handle, &q)
                || contains_ci(&c.project, &q)
                || c.city.as_deref().is_some_and(|city| contains_ci(city, &q))
                || c.tags.iter().any(|t| contains_ci(t, &q))
        })
        .collect()
}
