//! Converting a parent issue's tasklist into sub-issues
//!
//! A run is a single sequential pass: resolve the parent, classify its tasks,
//! create reference issues for tasks owned elsewhere, link everything as
//! sub-issues, then rewrite the parent tasklist. Per-task failures are
//! collected into the report and keep the parent body untouched.

use std::fmt;

use serde_json::Value;
use tracing::{error, info};

use crate::github::{GitHubClient, string_field};
use crate::pacing::Pacer;
use crate::tasklist::{Task, create_tasklist_body, extract_tasks, replace_tasklist_in_issue_body};
use crate::url::{RepoRef, is_github_issue_url, split_github_issue_url};
use crate::{Error, Result};

/// Step of the run in which a task failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Classify,
    Reference,
    Link,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Classify => "categorizing task",
            Stage::Reference => "creating a reference issue for",
            Stage::Link => "linking issue as sub-issue",
        })
    }
}

/// A task that could not be converted
#[derive(Debug)]
pub struct TaskFailure {
    pub stage: Stage,
    /// The task text or issue URL being processed
    pub subject: String,
    pub error: Error,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error encountered while {} {}: {}",
            self.stage, self.subject, self.error
        )
    }
}

/// Tasks of a parent issue split by what has to happen to them
#[derive(Debug, Default)]
pub struct Classified {
    /// Issue URLs owned by the parent's owner
    pub same_owner: Vec<String>,
    /// Issue URLs owned by someone else
    pub different_owner: Vec<String>,
    /// Everything that is not an issue URL
    pub non_issue: Vec<Task>,
    pub failures: Vec<TaskFailure>,
}

/// Bucket tasks by whether they are issues of `parent_owner`, foreign issues, or free text
pub fn classify(parent_owner: &str, tasks: &[Task]) -> Classified {
    let mut classified = Classified::default();

    for task in tasks {
        if !is_github_issue_url(&task.text) {
            classified.non_issue.push(task.clone());
            continue;
        }

        match split_github_issue_url(&task.text) {
            Ok(issue) if issue.owner == parent_owner => {
                classified.same_owner.push(task.text.clone())
            }
            Ok(_) => classified.different_owner.push(task.text.clone()),
            Err(e) => {
                error!(task = %task.text, error = %e, "Failed to categorize task");
                classified.failures.push(TaskFailure {
                    stage: Stage::Classify,
                    subject: task.text.clone(),
                    error: e,
                });
            }
        }
    }

    classified
}

/// What happened to the parent issue's tasklist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TasklistOutcome {
    /// Rewritten with the remaining free-text tasks
    Updated,
    /// Removed because no tasks remained
    Removed,
    /// Nothing was linked, so the body was left alone
    #[default]
    Unchanged,
    /// Left as is because some tasks failed to convert
    KeptForErrors,
    /// Issues were linked but the body has no tasklist block to rewrite
    NoTasklistBlock,
    /// The rewritten body was rejected by GitHub
    UpdateFailed,
}

/// What to do with the parent body once linking is over
#[derive(Debug, PartialEq, Eq)]
enum Rewrite {
    Skip(TasklistOutcome),
    Patch {
        body: String,
        outcome: TasklistOutcome,
    },
}

/// Decide how the parent body changes; any per-task failure keeps it as is
fn plan_rewrite(report: &ConversionReport, parent_body: &str, remaining: &[Task]) -> Rewrite {
    if !report.failures.is_empty() {
        return Rewrite::Skip(TasklistOutcome::KeptForErrors);
    }
    if report.linked.is_empty() {
        return Rewrite::Skip(TasklistOutcome::Unchanged);
    }

    let body = replace_tasklist_in_issue_body(parent_body, &create_tasklist_body(remaining));
    if body == parent_body {
        Rewrite::Skip(TasklistOutcome::NoTasklistBlock)
    } else if remaining.is_empty() {
        Rewrite::Patch {
            body,
            outcome: TasklistOutcome::Removed,
        }
    } else {
        Rewrite::Patch {
            body,
            outcome: TasklistOutcome::Updated,
        }
    }
}

/// A reference issue created for an issue of another owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub original: String,
    pub reference: String,
}

/// Outcome of a conversion run
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// Issue URLs linked as sub-issues, in link order
    pub linked: Vec<String>,
    pub references: Vec<Reference>,
    pub failures: Vec<TaskFailure>,
    pub tasklist: TasklistOutcome,
    /// Why the rewritten parent body was rejected, if it was
    pub update_error: Option<Error>,
}

impl ConversionReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.update_error.is_none()
    }

    /// Closing line describing what was done to the parent issue
    pub fn summary(&self, parent_issue_url: &str) -> String {
        match self.tasklist {
            TasklistOutcome::Updated => format!("Tasklist updated on {parent_issue_url}"),
            TasklistOutcome::Removed => format!("Tasklist removed on {parent_issue_url}"),
            TasklistOutcome::Unchanged => {
                format!("No tasks issues were converted to sub-issues on {parent_issue_url}")
            }
            TasklistOutcome::KeptForErrors => {
                let count = self.failures.len();
                let noun = if count == 1 { "error was" } else { "errors were" };
                format!("{count} {noun} found.  Will leave the task list as is on {parent_issue_url}")
            }
            TasklistOutcome::NoTasklistBlock => {
                format!("Sub-issues linked, but no tasklist block to rewrite on {parent_issue_url}")
            }
            TasklistOutcome::UpdateFailed => {
                format!("Couldn't update tasklist body on parent {parent_issue_url}")
            }
        }
    }
}

/// Drives the conversion of one parent issue
pub struct Converter<P> {
    client: GitHubClient,
    parent_issue_url: String,
    reference_repo: Option<RepoRef>,
    pacer: P,
}

impl<P: Pacer> Converter<P> {
    pub fn new(
        client: GitHubClient,
        parent_issue_url: impl Into<String>,
        reference_repo: Option<RepoRef>,
        pacer: P,
    ) -> Self {
        Self {
            client,
            parent_issue_url: parent_issue_url.into(),
            reference_repo,
            pacer,
        }
    }

    /// Convert the parent's tasklist issues into sub-issues.
    ///
    /// Returns `Err` only for failures that stop the run before any change:
    /// an unreadable parent or cross-owner tasks without a reference
    /// repository. Everything after that lands in the report.
    pub async fn create_sub_issues(&mut self) -> Result<ConversionReport> {
        let parent = split_github_issue_url(&self.parent_issue_url)?;
        let details = self
            .client
            .fetch_issue_details(&parent.owner, &parent.repo, &parent.issue_id)
            .await?;
        let parent_body = details
            .get("body")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let parent_node_id = string_field(&details, "node_id", &self.parent_issue_url)?;
        info!(parent = %self.parent_issue_url, "Converting tasklist issues to sub-issues");

        let tasks = extract_tasks(&parent_body);
        let Classified {
            mut same_owner,
            different_owner,
            non_issue,
            failures,
        } = classify(&parent.owner, &tasks);
        info!(
            same_owner = same_owner.len(),
            different_owner = different_owner.len(),
            non_issue = non_issue.len(),
            "Classified tasks"
        );

        let mut report = ConversionReport {
            failures,
            ..Default::default()
        };

        if !different_owner.is_empty() {
            let Some(reference_repo) = &self.reference_repo else {
                return Err(Error::MissingReferenceRepo {
                    count: different_owner.len(),
                });
            };

            for issue_url in different_owner {
                match self.client.create_reference_issue(&issue_url, reference_repo).await {
                    Ok(reference) => {
                        info!(original = %issue_url, %reference, "Created reference issue");
                        same_owner.push(reference.clone());
                        report.references.push(Reference {
                            original: issue_url,
                            reference,
                        });
                    }
                    Err(e) => {
                        error!(issue = %issue_url, error = %e, "Failed to create reference issue");
                        report.failures.push(TaskFailure {
                            stage: Stage::Reference,
                            subject: issue_url,
                            error: e,
                        });
                    }
                }
            }
        }

        for issue_url in same_owner {
            match self.link(&parent_node_id, &issue_url).await {
                Ok(()) => {
                    info!(issue = %issue_url, "Linked issue as sub-issue");
                    report.linked.push(issue_url);
                    self.pacer.pause().await;
                }
                Err(e) => {
                    error!(issue = %issue_url, error = %e, "Failed to link sub-issue");
                    report.failures.push(TaskFailure {
                        stage: Stage::Link,
                        subject: issue_url,
                        error: e,
                    });
                }
            }
        }

        let outcome = match plan_rewrite(&report, &parent_body, &non_issue) {
            Rewrite::Skip(outcome) => outcome,
            Rewrite::Patch { body, outcome } => match self
                .client
                .update_issue_body(&parent.owner, &parent.repo, &parent.issue_id, &body)
                .await
            {
                Ok(()) => outcome,
                Err(e) => {
                    error!(
                        parent = %self.parent_issue_url,
                        error = %e,
                        "Failed to update tasklist body"
                    );
                    report.update_error = Some(e);
                    TasklistOutcome::UpdateFailed
                }
            },
        };
        report.tasklist = outcome;

        Ok(report)
    }

    async fn link(&self, parent_node_id: &str, issue_url: &str) -> Result<()> {
        let child_node_id = self.client.fetch_issue_node_id(issue_url).await?;
        self.client
            .link_parent_issue_and_sub_issue(parent_node_id, &child_node_id)
            .await
    }
}
