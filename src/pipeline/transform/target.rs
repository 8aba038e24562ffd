//! Normalization of embed targets.
//!
//! Author input (directive attributes, bare paragraph URLs) is validated and
//! canonicalized here before it reaches any markup. Every function returns
//! `None` on input it does not fully understand.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// A validated embed target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedTarget {
    /// `owner/name` repository.
    Repo { owner: String, name: String },
    /// GitHub user or organization.
    User { owner: String },
    /// Canonical `https://twitter.com/...` status URL.
    Tweet { url: String },
}

impl EmbedTarget {
    /// Canonical identifier: `owner/name`, `owner`, or the status URL.
    pub fn canonical(&self) -> String {
        match self {
            Self::Repo { owner, name } => format!("{owner}/{name}"),
            Self::User { owner } => owner.clone(),
            Self::Tweet { url } => url.clone(),
        }
    }
}

impl fmt::Display for EmbedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// A GitHub owner/repo path segment.
static GITHUB_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").unwrap());

static HTTP_SCHEME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

static GITHUB_HOST_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^github\.com/").unwrap());

static TWITTER_USER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

const TWITTER_HOSTS: &[&str] = &[
    "twitter.com",
    "www.twitter.com",
    "mobile.twitter.com",
    "x.com",
    "www.x.com",
];

/// Normalize a `github` directive target.
///
/// Accepts `owner`, `owner/repo`, `github.com/owner/repo` and
/// `https://github.com/owner/repo[/...]`. Extra path segments after the
/// repository are ignored, but every segment must be well formed.
pub fn normalize_github_target(input: &str) -> Option<EmbedTarget> {
    let mut name = input.trim().to_owned();
    if name.is_empty() {
        return None;
    }

    if HTTP_SCHEME.is_match(&name) {
        let url = Url::parse(&name).ok()?;
        if url.host_str() != Some("github.com") {
            return None;
        }
        name = url.path().to_owned();
    }

    let name = GITHUB_HOST_PREFIX.replace(&name, "");
    let name = name.strip_prefix('/').unwrap_or(&name);
    let name = name.strip_suffix('/').unwrap_or(name);

    let parts: Vec<&str> = name.split('/').filter(|part| !part.is_empty()).collect();
    if !parts.iter().all(|part| GITHUB_SEGMENT.is_match(part)) {
        return None;
    }

    match parts.as_slice() {
        [] => None,
        [owner] => Some(EmbedTarget::User {
            owner: (*owner).to_owned(),
        }),
        [owner, repo, ..] => Some(EmbedTarget::Repo {
            owner: (*owner).to_owned(),
            name: (*repo).to_owned(),
        }),
    }
}

/// Normalize a tweet link into `https://twitter.com/<user>/status/<id>`.
///
/// Hosts are limited to twitter.com and x.com (plus www/mobile); the path
/// must be `<user>/status/<digits>` or `i/web/status/<digits>`. A query
/// string survives; fragments and trailing path segments do not.
pub fn normalize_tweet_url(raw: &str) -> Option<EmbedTarget> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let url = if HTTP_SCHEME.is_match(trimmed) {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("https://{trimmed}"))
    }
    .ok()?;

    let host = url.host_str()?;
    if !TWITTER_HOSTS.contains(&host) {
        return None;
    }

    let parts: Vec<&str> = url.path().split('/').filter(|p| !p.is_empty()).collect();
    let is_id = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let path = match parts.as_slice() {
        ["i", "web", "status", id, ..] if is_id(*id) => format!("i/web/status/{id}"),
        [user, "status", id, ..] if is_id(*id) && TWITTER_USER.is_match(user) => {
            format!("{user}/status/{id}")
        }
        _ => return None,
    };

    let mut normalized = format!("https://twitter.com/{path}");
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        normalized.push('?');
        normalized.push_str(query);
    }

    Some(EmbedTarget::Tweet { url: normalized })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(owner: &str, name: &str) -> Option<EmbedTarget> {
        Some(EmbedTarget::Repo {
            owner: owner.into(),
            name: name.into(),
        })
    }

    fn tweet(url: &str) -> Option<EmbedTarget> {
        Some(EmbedTarget::Tweet { url: url.into() })
    }

    #[test]
    fn test_github_shorthand_and_url_agree() {
        let expected = repo("rust-lang", "rust");
        assert_eq!(normalize_github_target("rust-lang/rust"), expected);
        assert_eq!(normalize_github_target("  rust-lang/rust/  "), expected);
        assert_eq!(normalize_github_target("github.com/rust-lang/rust"), expected);
        assert_eq!(normalize_github_target("GitHub.com/rust-lang/rust"), expected);
        assert_eq!(
            normalize_github_target("https://github.com/rust-lang/rust"),
            expected
        );
        assert_eq!(
            normalize_github_target("HTTP://github.com/rust-lang/rust/tree/master/src"),
            expected
        );
    }

    #[test]
    fn test_github_normalization_is_idempotent() {
        for input in ["octocat", "a.b/c_d", "https://github.com/x-y/z.rs/"] {
            let first = normalize_github_target(input).unwrap();
            let second = normalize_github_target(&first.canonical()).unwrap();
            assert_eq!(first, second, "input: {input}");
        }
    }

    #[test]
    fn test_github_user() {
        assert_eq!(
            normalize_github_target("https://github.com/octocat"),
            Some(EmbedTarget::User {
                owner: "octocat".into()
            })
        );
    }

    #[test]
    fn test_github_rejects() {
        assert_eq!(normalize_github_target(""), None);
        assert_eq!(normalize_github_target("   "), None);
        assert_eq!(normalize_github_target("/"), None);
        assert_eq!(normalize_github_target("https://gitlab.com/owner/repo"), None);
        assert_eq!(normalize_github_target("https://github.com.evil.io/a/b"), None);
        assert_eq!(normalize_github_target("https://github.com/"), None);
        assert_eq!(normalize_github_target("-owner/repo"), None);
        assert_eq!(normalize_github_target("owner/re po"), None);
        assert_eq!(normalize_github_target("owner/<script>"), None);
        assert_eq!(normalize_github_target("owner/repo/.."), None);
    }

    #[test]
    fn test_tweet_x_com_to_twitter() {
        assert_eq!(
            normalize_tweet_url("https://x.com/someuser/status/1234567890123456789"),
            tweet("https://twitter.com/someuser/status/1234567890123456789")
        );
    }

    #[test]
    fn test_tweet_variants() {
        assert_eq!(
            normalize_tweet_url("mobile.twitter.com/a_b/status/42/photo/1"),
            tweet("https://twitter.com/a_b/status/42")
        );
        assert_eq!(
            normalize_tweet_url("https://www.x.com/i/web/status/99#frag"),
            tweet("https://twitter.com/i/web/status/99")
        );
        assert_eq!(
            normalize_tweet_url("https://twitter.com/a/status/1?s=20&t=x"),
            tweet("https://twitter.com/a/status/1?s=20&t=x")
        );
        assert_eq!(
            normalize_tweet_url("https://twitter.com/a/status/1?"),
            tweet("https://twitter.com/a/status/1")
        );
    }

    #[test]
    fn test_tweet_rejects() {
        assert_eq!(normalize_tweet_url(""), None);
        assert_eq!(normalize_tweet_url("just some words"), None);
        assert_eq!(normalize_tweet_url("https://example.com/a/status/1"), None);
        assert_eq!(normalize_tweet_url("https://x.com/a/status/12ab"), None);
        assert_eq!(normalize_tweet_url("https://x.com/a/likes"), None);
        assert_eq!(normalize_tweet_url("https://x.com/a.b/status/1"), None);
        assert_eq!(normalize_tweet_url("https://x.com/i/web/status/"), None);
    }
}
