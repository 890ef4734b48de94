use clap::Parser;

/// tasks2subissues - Convert a GitHub tasklist into sub-issues
#[derive(Parser, Debug)]
#[command(name = "tasks2subissues")]
#[command(about = "Convert GitHub tasklist issues to sub-issues")]
#[command(version)]
pub struct Cli {
    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// HTML URL of the target issue containing the task list to convert
    #[arg(long = "issueurl")]
    pub issue_url: String,

    /// HTML URL of a repo where reference issues will be created.
    /// Only needed if the target issue contains task issues from a different owner.
    #[arg(long = "refrepo")]
    pub ref_repo: Option<String>,
}
