//! Similar founders / projects
//!
//! A lexical and geographic heuristic, nothing learned: sharing a city is
//! worth more than sharing a tag, and the score never reaches 100.

use crate::types::{FounderCard, FounderProfile, Project};
use serde::Serialize;

/// Points for living in the same city
pub const CITY_WEIGHT: u32 = 40;
/// Points per overlapping tag
pub const TAG_WEIGHT: u32 = 15;
/// Highest score ever reported
pub const SCORE_CAP: u32 = 99;
/// How many matches to return
pub const TOP_N: usize = 5;

/// Scoring knobs. The defaults are product-tuned; keep them unless the
/// product asks otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchWeights {
    pub city: u32,
    pub tag: u32,
    pub cap: u32,
    pub limit: usize,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            city: CITY_WEIGHT,
            tag: TAG_WEIGHT,
            cap: SCORE_CAP,
            limit: TOP_N,
        }
    }
}

/// Anything the matcher can compare
pub trait Matchable {
    /// Identity used to exclude the reference from its own matches
    fn match_key(&self) -> &str;
    fn match_city(&self) -> Option<&str>;
    fn match_tags(&self) -> &[String];
}

impl Matchable for FounderCard {
    fn match_key(&self) -> &str {
        &self.handle
    }
    fn match_city(&self) -> Option<&str> {
        self.city.as_deref()
    }
    fn match_tags(&self) -> &[String] {
        &self.tags
    }
}

impl Matchable for FounderProfile {
    fn match_key(&self) -> &str {
        &self.handle
    }
    fn match_city(&self) -> Option<&str> {
        self.city.as_deref()
    }
    fn match_tags(&self) -> &[String] {
        &self.tags
    }
}

impl Matchable for Project {
    fn match_key(&self) -> &str {
        self.key()
    }
    fn match_city(&self) -> Option<&str> {
        None
    }
    fn match_tags(&self) -> &[String] {
        &self.tags
    }
}

/// A candidate with its score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scored<T> {
    #[serde(flatten)]
    pub item: T,
    pub score: u32,
}

fn normalized(s: &str) -> String {
    s.trim().to_lowercase()
}

fn same_city(a: Option<&str>, b: Option<&str>) -> bool {
    match (a.map(normalized), b.map(normalized)) {
        (Some(a), Some(b)) => !a.is_empty() && a == b,
        _ => false,
    }
}

/// Score `candidate` against `reference`, in `[0, weights.cap]`
pub fn score<R, C>(reference: &R, candidate: &C, weights: &MatchWeights) -> u32
where
    R: Matchable + ?Sized,
    C: Matchable + ?Sized,
{
    let mut total = 0u32;
    if same_city(reference.match_city(), candidate.match_city()) {
        total += weights.city;
    }

    let mut reference_tags: Vec<String> = reference
        .match_tags()
        .iter()
        .map(|t| normalized(t))
        .filter(|t| !t.is_empty())
        .collect();
    reference_tags.sort();
    reference_tags.dedup();

    let candidate_tags: Vec<String> = candidate
        .match_tags()
        .iter()
        .map(|t| normalized(t))
        .filter(|t| !t.is_empty())
        .collect();

    let overlaps = reference_tags
        .iter()
        .filter(|r| {
            candidate_tags
                .iter()
                .any(|c| c.contains(r.as_str()) || r.contains(c.as_str()))
        })
        .count() as u32;

    total = total.saturating_add(overlaps.saturating_mul(weights.tag));
    total.min(weights.cap)
}

/// Top matches for `reference`, highest first, ties in input order.
/// The reference itself is never a candidate.
pub fn similar<R, C>(reference: &R, candidates: &[C], weights: &MatchWeights) -> Vec<Scored<C>>
where
    R: Matchable + ?Sized,
    C: Matchable + Clone,
{
    let own_key = normalized(reference.match_key());
    let mut scored: Vec<Scored<C>> = candidates
        .iter()
        .filter(|c| normalized(c.match_key()) != own_key)
        .map(|c| Scored {
            score: score(reference, c, weights),
            item: c.clone(),
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(weights.limit);
    scored
}
