//! Recognising and decomposing GitHub issue and repository URLs

use std::fmt;

use crate::{Error, Result};

/// Web origin every issue and repository URL must start with
pub const GITHUB_BASE_URL: &str = "https://github.com/";

/// An issue identified by its HTML URL parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub owner: String,
    pub repo: String,
    /// Repository-scoped issue number, kept as it appears in the URL
    pub issue_id: String,
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.issue_id)
    }
}

/// A repository identified by its HTML URL parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Check whether a string looks like `https://github.com/<owner>/<repo>/issues/<n>`.
///
/// Surrounding whitespace is ignored.
pub fn is_github_issue_url(url: &str) -> bool {
    match url.trim().strip_prefix(GITHUB_BASE_URL) {
        Some(path) => {
            let parts: Vec<&str> = path.split('/').collect();
            parts.len() >= 4 && parts[2] == "issues"
        }
        None => false,
    }
}

/// Split an issue URL into owner, repo and issue id
pub fn split_github_issue_url(url: &str) -> Result<IssueRef> {
    let path = url.strip_prefix(GITHUB_BASE_URL).ok_or_else(|| {
        Error::InvalidUrl(format!(
            "GitHub issue URL must start with {GITHUB_BASE_URL}: {url}"
        ))
    })?;

    match path.split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo, "issues", issue_id, ..] => Ok(IssueRef {
            owner: (*owner).to_string(),
            repo: (*repo).to_string(),
            issue_id: (*issue_id).to_string(),
        }),
        _ => Err(Error::InvalidUrl(format!("Invalid GitHub issue URL: {url}"))),
    }
}

/// Split a repository URL into owner and repo
pub fn split_github_repo_url(url: &str) -> Result<RepoRef> {
    let path = url.strip_prefix(GITHUB_BASE_URL).ok_or_else(|| {
        Error::InvalidUrl(format!(
            "GitHub repo URL must start with {GITHUB_BASE_URL}: {url}"
        ))
    })?;

    match path.split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo] => Ok(RepoRef {
            owner: (*owner).to_string(),
            repo: (*repo).to_string(),
        }),
        _ => Err(Error::InvalidUrl(format!("Invalid GitHub repo URL: {url}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_url_recognised() {
        assert!(is_github_issue_url("https://github.com/orgA/r/issues/1"));
        assert!(is_github_issue_url("  https://github.com/orgA/r/issues/1  "));
        assert!(is_github_issue_url(
            "https://github.com/orgA/r/issues/1#issuecomment-42/extra"
        ));
    }

    #[test]
    fn test_issue_url_rejected() {
        assert!(!is_github_issue_url("buy milk"));
        assert!(!is_github_issue_url("http://github.com/orgA/r/issues/1"));
        assert!(!is_github_issue_url("https://gitlab.com/orgA/r/issues/1"));
        assert!(!is_github_issue_url("https://github.com/orgA/r/pull/1"));
        assert!(!is_github_issue_url("https://github.com/orgA/r/issues"));
        assert!(!is_github_issue_url(""));
    }

    #[test]
    fn test_split_issue_url() {
        let issue = split_github_issue_url("https://github.com/orgA/r/issues/17").unwrap();
        assert_eq!(issue.owner, "orgA");
        assert_eq!(issue.repo, "r");
        assert_eq!(issue.issue_id, "17");
        assert_eq!(issue.to_string(), "orgA/r#17");
    }

    #[test]
    fn test_split_issue_url_errors() {
        for url in [
            "https://example.com/orgA/r/issues/1",
            "https://github.com/orgA/r/pulls/1",
            "https://github.com/orgA/r/issues",
            "https://github.com/orgA",
        ] {
            let err = split_github_issue_url(url).unwrap_err();
            assert!(matches!(err, Error::InvalidUrl(_)), "{url}");
        }
    }

    #[test]
    fn test_split_repo_url() {
        let repo = split_github_repo_url("https://github.com/orgA/refs").unwrap();
        assert_eq!(repo.owner, "orgA");
        assert_eq!(repo.repo, "refs");
        assert_eq!(repo.to_string(), "orgA/refs");
    }

    #[test]
    fn test_split_repo_url_errors() {
        for url in [
            "https://gitlab.com/orgA/refs",
            "https://github.com/orgA",
            "https://github.com/orgA/refs/",
            "https://github.com/orgA/refs/issues/1",
        ] {
            assert!(split_github_repo_url(url).is_err(), "{url}");
        }
    }
}
