//! GitHub REST and GraphQL calls used by the converter

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::url::{RepoRef, split_github_issue_url};
use crate::{Error, Result};

const API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "tasks2subissues";

const ADD_SUB_ISSUE_MUTATION: &str = r#"
    mutation AddSubIssue($parentIssueId: ID!, $subIssueId: ID!) {
        addSubIssue(input: {issueId: $parentIssueId, subIssueId: $subIssueId}) {
            issue {
                id
                subIssues(first: 10) {
                    totalCount
                    nodes {
                        id
                        title
                    }
                }
            }
            subIssue {
                id
                title
                url
            }
        }
    }
"#;

/// Issue state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    /// Anything GitHub reports other than `closed` is treated as open
    fn from_api(state: &str) -> Self {
        match state {
            "closed" => IssueState::Closed,
            _ => IssueState::Open,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    html_url: String,
    number: u64,
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: Option<String>,
}

/// Authenticated GitHub API client
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    /// Create a client authenticating with a personal access token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: API_URL.to_string(),
            token: token.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new(token)
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
    }

    fn issues_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{owner}/{repo}/issues", self.base_url)
    }

    /// Create an issue and return its HTML URL.
    ///
    /// GitHub has no state attribute at creation time, so a closed issue is
    /// closed by a follow-up PATCH. A failure of that PATCH is only logged.
    pub async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
        state: IssueState,
    ) -> Result<String> {
        let url = self.issues_url(owner, repo);
        debug!(%url, title, "Creating issue");

        let response = self
            .request(Method::POST, &url)
            .json(&json!({ "title": title, "body": body }))
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = failure_parts(response).await;
            return Err(Error::CreateIssueFailed { repo: url, status, body });
        }

        let created: CreatedIssue = response.json().await?;
        info!(url = %created.html_url, "Created issue");

        if state == IssueState::Closed {
            if let Err(e) = self.set_issue_state(owner, repo, created.number, state).await {
                warn!(url = %created.html_url, error = %e, "Failed to close new issue");
            }
        }

        Ok(created.html_url)
    }

    /// Set the open/closed state of an issue
    pub async fn set_issue_state(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        state: IssueState,
    ) -> Result<()> {
        self.patch_issue(owner, repo, &number.to_string(), json!({ "state": state }))
            .await
    }

    /// Replace the body of an issue
    pub async fn update_issue_body(
        &self,
        owner: &str,
        repo: &str,
        issue_number: &str,
        body: &str,
    ) -> Result<()> {
        self.patch_issue(owner, repo, issue_number, json!({ "body": body }))
            .await
    }

    async fn patch_issue(
        &self,
        owner: &str,
        repo: &str,
        issue_number: &str,
        payload: Value,
    ) -> Result<()> {
        let url = format!("{}/{issue_number}", self.issues_url(owner, repo));
        debug!(%url, "Patching issue");

        let response = self.request(Method::PATCH, &url).json(&payload).send().await?;
        if !response.status().is_success() {
            let (status, body) = failure_parts(response).await;
            return Err(Error::UpdateIssueFailed { issue: url, status, body });
        }
        Ok(())
    }

    /// Fetch the decoded REST representation of an issue.
    ///
    /// Fields are not validated here; callers check what they need.
    pub async fn fetch_issue_details(
        &self,
        owner: &str,
        repo: &str,
        issue_number: &str,
    ) -> Result<Value> {
        let url = format!("{}/{issue_number}", self.issues_url(owner, repo));
        debug!(%url, "Fetching issue");

        let response = self.request(Method::GET, &url).send().await?;
        if !response.status().is_success() {
            let (status, body) = failure_parts(response).await;
            return Err(Error::FetchIssueFailed { issue: url, status, body });
        }
        Ok(response.json().await?)
    }

    /// Fetch an issue given its HTML URL
    pub async fn fetch_issue_details_by_url(&self, issue_url: &str) -> Result<Value> {
        let issue = split_github_issue_url(issue_url)?;
        self.fetch_issue_details(&issue.owner, &issue.repo, &issue.issue_id)
            .await
    }

    /// Resolve the GraphQL node id of an issue from its HTML URL
    pub async fn fetch_issue_node_id(&self, issue_url: &str) -> Result<String> {
        let details = self.fetch_issue_details_by_url(issue_url).await?;
        string_field(&details, "node_id", issue_url)
    }

    /// Attach `child_node_id` as a sub-issue of `parent_node_id`
    pub async fn link_parent_issue_and_sub_issue(
        &self,
        parent_node_id: &str,
        child_node_id: &str,
    ) -> Result<()> {
        debug!(parent_node_id, child_node_id, "Linking sub-issue");

        let response = self
            .request(Method::POST, &format!("{}/graphql", self.base_url))
            .json(&json!({
                "query": ADD_SUB_ISSUE_MUTATION,
                "variables": {
                    "parentIssueId": parent_node_id,
                    "subIssueId": child_node_id,
                },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = failure_parts(response).await;
            return Err(Error::LinkFailed(format!("status {status}: {body}")));
        }

        let graphql: GraphQLResponse = response.json().await?;
        if !graphql.errors.is_empty() {
            let messages: Vec<String> = graphql
                .errors
                .into_iter()
                .filter_map(|e| e.message)
                .collect();
            return Err(Error::LinkFailed(messages.join(" | ")));
        }
        Ok(())
    }

    /// Create a placeholder issue in `reference` standing in for `issue_url`.
    ///
    /// The title is `owner/repo#id:original title`, the body links back to the
    /// original, and the original's open/closed state is mirrored.
    pub async fn create_reference_issue(
        &self,
        issue_url: &str,
        reference: &RepoRef,
    ) -> Result<String> {
        let details = self.fetch_issue_details_by_url(issue_url).await?;
        let title = string_field(&details, "title", issue_url)?;
        let state = IssueState::from_api(&string_field(&details, "state", issue_url)?);

        let issue = split_github_issue_url(issue_url)?;
        let new_title = format!("{issue}:{title}");
        let new_body = format!("This issue is a reference/placeholder to: [{new_title}]({issue_url})");

        self.create_issue(&reference.owner, &reference.repo, &new_title, &new_body, state)
            .await
    }
}

/// Read a string field of an issue, failing with `MissingField` when absent
pub fn string_field(details: &Value, field: &'static str, issue: &str) -> Result<String> {
    details
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::MissingField {
            field,
            issue: issue.to_string(),
        })
}

async fn failure_parts(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response".to_string());
    (status, body)
}
