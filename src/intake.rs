//! Project submission intake
//!
//! A strictly linear question sequence. The flow only knows which question
//! is next; the transport (chat bot, terminal) just relays text. Invalid
//! answers are rejected with a retry message and never stored.

use crate::types::clean_handle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Categories accepted at intake (Base ecosystem style)
pub const MAIN_CATEGORIES: &[&str] = &["AI", "Wallet", "Defi", "Consumer", "Onramp", "Infra"];

pub const SKIP: &str = "/skip";
pub const CANCEL: &str = "/cancel";

pub const WELCOME: &str = "Welcome to Base India Circle. We list products and projects building on Base from India. \
Answer a few questions about your project; send /skip for optional fields and /cancel to start over.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    ProductName,
    ProjectUrl,
    Description,
    LogoUrl,
    Category,
    Tags,
    GithubUrl,
    TwitterProfile,
    FounderName,
    FounderTwitter,
    Teammates,
}

impl Step {
    pub fn prompt(&self) -> String {
        match self {
            Step::ProductName => "What is your product/project name?".to_string(),
            Step::ProjectUrl => "What is the project link (website or app URL)?".to_string(),
            Step::Description => {
                "Give a short description of the project (what it does, who it's for).".to_string()
            }
            Step::LogoUrl => "Optional: logo image URL (square image). Send /skip to skip.".to_string(),
            Step::Category => format!(
                "Main category, exactly one of: {}",
                MAIN_CATEGORIES.join(", ")
            ),
            Step::Tags => "Optional: tags, comma-separated. Send /skip to skip.".to_string(),
            Step::GithubUrl => "Optional: GitHub link for the project. Send /skip to skip.".to_string(),
            Step::TwitterProfile => {
                "Optional: the project's X profile (handle or URL). Send /skip to skip.".to_string()
            }
            Step::FounderName => "Who is the founder? (full name)".to_string(),
            Step::FounderTwitter => "Founder's X handle (e.g. @username):".to_string(),
            Step::Teammates => {
                "Optional: teammates, one per line as `Name @handle`. Send /skip if you're solo."
                    .to_string()
            }
        }
    }

    pub fn next(&self) -> Option<Step> {
        match self {
            Step::ProductName => Some(Step::ProjectUrl),
            Step::ProjectUrl => Some(Step::Description),
            Step::Description => Some(Step::LogoUrl),
            Step::LogoUrl => Some(Step::Category),
            Step::Category => Some(Step::Tags),
            Step::Tags => Some(Step::GithubUrl),
            Step::GithubUrl => Some(Step::TwitterProfile),
            Step::TwitterProfile => Some(Step::FounderName),
            Step::FounderName => Some(Step::FounderTwitter),
            Step::FounderTwitter => Some(Step::Teammates),
            Step::Teammates => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teammate {
    pub name: String,
    pub twitter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(SubmissionStatus::Pending),
            "approved" => Some(SubmissionStatus::Approved),
            "rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }
}

/// A completed submission, ready for review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSubmission {
    pub id: String,
    pub product_name: String,
    pub project_url: String,
    pub description: String,
    pub logo_url: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub github_url: Option<String>,
    pub twitter_profile: Option<String>,
    pub founder_name: String,
    pub founder_twitter: String,
    pub teammates: Vec<Teammate>,
    pub status: SubmissionStatus,
    /// Who submitted, as the transport identifies them
    pub submitted_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What the transport should say next
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Answer accepted; ask this
    Next(String),
    /// Answer rejected; same question again
    Retry(String),
    Done(Box<ProjectSubmission>),
}

/// Accepts `@handle`, `handle` or `handle trailing words`
pub fn normalize_handle(input: &str) -> String {
    clean_handle(input)
}

/// True when `s` parses as an absolute URL
pub fn is_valid_url(s: &str) -> bool {
    Url::parse(s.trim()).is_ok()
}

/// Parse `Name @handle` lines. Lines without a usable handle are dropped.
pub fn parse_teammates(text: &str) -> Vec<Teammate> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|line| {
            if let Some(at) = line.find('@') {
                let name = line[..at].trim();
                let twitter = normalize_handle(&line[at..]);
                if name.is_empty() || twitter.is_empty() {
                    return None;
                }
                return Some(Teammate {
                    name: name.to_string(),
                    twitter,
                });
            }
            // "Name handle": last word is the handle
            let (name, handle) = line.rsplit_once(char::is_whitespace)?;
            let is_word = handle.chars().all(|c| c.is_alphanumeric() || c == '_');
            if name.trim().is_empty() || handle.is_empty() || !is_word {
                return None;
            }
            Some(Teammate {
                name: name.trim().to_string(),
                twitter: handle.to_string(),
            })
        })
        .collect()
}

fn is_skip(text: &str) -> bool {
    text.eq_ignore_ascii_case(SKIP)
}

/// One user's progress through the questions
#[derive(Debug, Clone)]
pub struct SubmissionFlow {
    step: Step,
    submitted_by: Option<String>,
    product_name: String,
    project_url: String,
    description: String,
    logo_url: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
    github_url: Option<String>,
    twitter_profile: Option<String>,
    founder_name: String,
    founder_twitter: String,
}

impl SubmissionFlow {
    pub fn new(submitted_by: Option<String>) -> Self {
        Self {
            step: Step::ProductName,
            submitted_by,
            product_name: String::new(),
            project_url: String::new(),
            description: String::new(),
            logo_url: None,
            category: None,
            tags: Vec::new(),
            github_url: None,
            twitter_profile: None,
            founder_name: String::new(),
            founder_twitter: String::new(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// The question currently awaiting an answer
    pub fn prompt(&self) -> String {
        self.step.prompt()
    }

    fn advance(&mut self) -> Reply {
        match self.step.next() {
            Some(next) => {
                self.step = next;
                Reply::Next(next.prompt())
            }
            None => Reply::Retry(self.prompt()),
        }
    }

    fn optional_url(text: &str) -> Result<Option<String>, ()> {
        if is_skip(text) {
            Ok(None)
        } else if is_valid_url(text) {
            Ok(Some(text.to_string()))
        } else {
            Err(())
        }
    }

    /// Feed one answer
    pub fn answer(&mut self, text: &str) -> Reply {
        let text = text.trim();
        if text.is_empty() {
            return Reply::Retry(self.prompt());
        }

        match self.step {
            Step::ProductName => self.product_name = text.to_string(),
            Step::ProjectUrl => {
                if !is_valid_url(text) {
                    return Reply::Retry(
                        "Please send a valid URL (e.g. https://yourproject.xyz).".to_string(),
                    );
                }
                self.project_url = text.to_string();
            }
            Step::Description => self.description = text.to_string(),
            Step::LogoUrl => match Self::optional_url(text) {
                Ok(url) => self.logo_url = url,
                Err(()) => return Reply::Retry("Send a valid image URL or /skip.".to_string()),
            },
            Step::Category => {
                match MAIN_CATEGORIES.iter().find(|c| c.eq_ignore_ascii_case(text)) {
                    Some(c) => self.category = Some(c.to_string()),
                    None => {
                        return Reply::Retry(format!(
                            "Please choose one of: {}",
                            MAIN_CATEGORIES.join(", ")
                        ))
                    }
                }
            }
            Step::Tags => {
                self.tags = if is_skip(text) {
                    Vec::new()
                } else {
                    text.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect()
                };
            }
            Step::GithubUrl => match Self::optional_url(text) {
                Ok(url) => self.github_url = url,
                Err(()) => return Reply::Retry("Send a valid URL or /skip.".to_string()),
            },
            Step::TwitterProfile => {
                self.twitter_profile = if is_skip(text) {
                    None
                } else if text.contains("twitter.com") || text.contains("x.com") {
                    Some(text.to_string())
                } else {
                    Some(normalize_handle(text)).filter(|h| !h.is_empty())
                };
            }
            Step::FounderName => self.founder_name = text.to_string(),
            Step::FounderTwitter => {
                let handle = normalize_handle(text);
                if handle.is_empty() {
                    return Reply::Retry(self.prompt());
                }
                self.founder_twitter = handle;
            }
            Step::Teammates => {
                let teammates = if is_skip(text) {
                    Vec::new()
                } else {
                    parse_teammates(text)
                };
                return Reply::Done(Box::new(self.finish(teammates)));
            }
        }

        self.advance()
    }

    fn finish(&self, teammates: Vec<Teammate>) -> ProjectSubmission {
        ProjectSubmission {
            id: Uuid::new_v4().to_string(),
            product_name: self.product_name.clone(),
            project_url: self.project_url.clone(),
            description: self.description.clone(),
            logo_url: self.logo_url.clone(),
            category: self.category.clone(),
            tags: self.tags.clone(),
            github_url: self.github_url.clone(),
            twitter_profile: self.twitter_profile.clone(),
            founder_name: self.founder_name.clone(),
            founder_twitter: self.founder_twitter.clone(),
            teammates,
            status: SubmissionStatus::Pending,
            submitted_by: self.submitted_by.clone(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(flow: &mut SubmissionFlow, answers: &[&str]) -> Reply {
        let mut last = Reply::Retry(String::new());
        for a in answers {
            last = flow.answer(a);
        }
        last
    }

    #[test]
    fn test_full_flow() {
        let mut flow = SubmissionFlow::new(Some("tg:42".to_string()));
        let reply = run(
            &mut flow,
            &[
                "PayBase",
                "https://paybase.xyz",
                "UPI for USDC",
                "/skip",
                "defi",
                "payments, UPI, ",
                "https://github.com/arjunm/paybase",
                "@paybase_xyz",
                "Arjun Mehta",
                "@arjunbuilds",
                "Kabir Shah @kabirshah\nPriya priyadefi\n???",
            ],
        );

        let Reply::Done(sub) = reply else {
            panic!("flow should complete");
        };
        assert_eq!(sub.product_name, "PayBase");
        assert_eq!(sub.logo_url, None);
        assert_eq!(sub.category.as_deref(), Some("Defi"));
        assert_eq!(sub.tags, vec!["payments", "UPI"]);
        assert_eq!(sub.twitter_profile.as_deref(), Some("paybase_xyz"));
        assert_eq!(sub.founder_twitter, "arjunbuilds");
        assert_eq!(sub.teammates.len(), 2);
        assert_eq!(sub.teammates[1].twitter, "priyadefi");
        assert_eq!(sub.status, SubmissionStatus::Pending);
        assert_eq!(sub.submitted_by.as_deref(), Some("tg:42"));
    }

    #[test]
    fn test_invalid_url_is_not_stored() {
        let mut flow = SubmissionFlow::new(None);
        flow.answer("PayBase");
        let reply = flow.answer("paybase dot xyz");
        assert!(matches!(reply, Reply::Retry(_)));
        assert_eq!(flow.step(), Step::ProjectUrl);

        assert!(matches!(flow.answer("https://paybase.xyz"), Reply::Next(_)));
        assert_eq!(flow.step(), Step::Description);
    }

    #[test]
    fn test_unknown_category_retries() {
        let mut flow = SubmissionFlow::new(None);
        run(&mut flow, &["X", "https://x.io", "desc", "/SKIP"]);
        assert_eq!(flow.step(), Step::Category);
        assert!(matches!(flow.answer("Gaming"), Reply::Retry(_)));
        assert!(matches!(flow.answer("wallet"), Reply::Next(_)));
    }

    #[test]
    fn test_optional_url_rejects_garbage() {
        let mut flow = SubmissionFlow::new(None);
        run(&mut flow, &["X", "https://x.io", "desc"]);
        assert!(matches!(flow.answer("not a url"), Reply::Retry(_)));
        assert_eq!(flow.step(), Step::LogoUrl);
    }

    #[test]
    fn test_blank_answer_retries() {
        let mut flow = SubmissionFlow::new(None);
        assert_eq!(flow.answer("   "), Reply::Retry(Step::ProductName.prompt()));
    }

    #[test]
    fn test_parse_teammates_formats() {
        let mates = parse_teammates("Jane @jane\nJohn Doe johndoe\n@nobody\nsolo");
        assert_eq!(
            mates,
            vec![
                Teammate { name: "Jane".into(), twitter: "jane".into() },
                Teammate { name: "John Doe".into(), twitter: "johndoe".into() },
            ]
        );
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(SubmissionStatus::parse("Approved"), Some(SubmissionStatus::Approved));
        assert_eq!(SubmissionStatus::parse("other"), None);
    }
}
