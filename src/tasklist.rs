//! Reading and rewriting the markdown tasklist embedded in an issue body
//!
//! Only the first fenced `[tasklist]` block of a body is ever replaced. Bodies
//! with several tasklists, or with fences nested inside one, are not handled.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

const UNCHECKED: &str = "- [ ]";
const CHECKED: &str = "- [x]";

static TASKLIST_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)``` *\[tasklist\].*?```").expect("Failed to compile tasklist regex")
});

/// A single checklist entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub text: String,
    pub is_checked: bool,
}

/// Extract the checklist entries of an issue body, in source order.
///
/// A line counts when, once trimmed, it starts with `- [ ]` or `- [x]`. The
/// checked flag is read from the fixed position inside the brackets.
pub fn extract_tasks(body: &str) -> Vec<Task> {
    body.split('\n')
        .map(str::trim)
        .filter(|line| line.starts_with(UNCHECKED) || line.starts_with(CHECKED))
        .map(|line| Task {
            text: line[UNCHECKED.len()..].trim().to_string(),
            is_checked: line.as_bytes().get(3) == Some(&b'x'),
        })
        .collect()
}

/// Serialize tasks into a fenced tasklist block; empty input yields an empty string.
pub fn create_tasklist_body(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return String::new();
    }

    let mut body = String::from("```[tasklist]\n### Tasks");
    for task in tasks {
        let brackets = if task.is_checked { "[x]" } else { "[ ]" };
        body.push_str(&format!("\n- {brackets} {}", task.text));
    }
    body.push_str("\n```");
    body
}

/// Replace the first tasklist block in `body` with `replacement`.
///
/// The body is returned unchanged when it has no tasklist block.
pub fn replace_tasklist_in_issue_body(body: &str, replacement: &str) -> String {
    TASKLIST_BLOCK
        .replacen(body, 1, NoExpand(replacement))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(text: &str, is_checked: bool) -> Task {
        Task {
            text: text.to_string(),
            is_checked,
        }
    }

    #[test]
    fn test_extract_tasks() {
        let body = "Intro\n- [ ] foo\nnot a task\n- [x] bar\n";
        assert_eq!(
            extract_tasks(body),
            vec![task("foo", false), task("bar", true)]
        );
    }

    #[test]
    fn test_extract_tasks_trims_lines() {
        let body = "   - [ ]   indented  \r\n\t- [x] tabbed\r\n";
        assert_eq!(
            extract_tasks(body),
            vec![task("indented", false), task("tabbed", true)]
        );
    }

    #[test]
    fn test_extract_tasks_ignores_other_markers() {
        let body = "- [X] upper\n* [ ] star\n-[ ] tight\n- [  ] wide\n";
        assert!(extract_tasks(body).is_empty());
    }

    #[test]
    fn test_create_tasklist_body() {
        let body = create_tasklist_body(&[task("write docs", false), task("ship", true)]);
        assert_eq!(body, "```[tasklist]\n### Tasks\n- [ ] write docs\n- [x] ship\n```");
    }

    #[test]
    fn test_create_tasklist_body_empty() {
        assert_eq!(create_tasklist_body(&[]), "");
    }

    #[test]
    fn test_replace_tasklist() {
        let body = "Before\n```[tasklist]\n### Tasks\n- [ ] a\n```\nAfter";
        assert_eq!(
            replace_tasklist_in_issue_body(body, "NEW"),
            "Before\nNEW\nAfter"
        );
        assert_eq!(replace_tasklist_in_issue_body(body, ""), "Before\n\nAfter");
    }

    #[test]
    fn test_replace_only_first_block() {
        let body = "```[tasklist]\n- [ ] a\n```\nmid\n```  [tasklist]\n- [ ] b\n```";
        assert_eq!(
            replace_tasklist_in_issue_body(body, "X"),
            "X\nmid\n```  [tasklist]\n- [ ] b\n```"
        );
    }

    #[test]
    fn test_replace_without_block_is_noop() {
        let body = "```rust\nfn main() {}\n```\n- [ ] loose";
        assert_eq!(replace_tasklist_in_issue_body(body, "X"), body);
    }

    #[test]
    fn test_replacement_is_literal() {
        let body = "```[tasklist]\n- [ ] a\n```";
        assert_eq!(replace_tasklist_in_issue_body(body, "costs $1"), "costs $1");
    }

    #[test]
    fn test_round_trip() {
        let body = "Head\n```[tasklist]\n### Tasks\n- [ ] one\n- [x] two\n```\nTail";
        let tasks = extract_tasks(body);
        let rebuilt = replace_tasklist_in_issue_body(body, &create_tasklist_body(&tasks));
        assert_eq!(rebuilt, body);
        assert_eq!(extract_tasks(&rebuilt), tasks);
    }
}
