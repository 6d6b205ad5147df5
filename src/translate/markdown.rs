//! Markdown rendered into migrated descriptions and comments.
//!
//! Every migrated text starts with an attribution line pointing back at
//! GitLab. Azure DevOps has no multi-line comments and its suggestion fence
//! takes no range, so those are rewritten here.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use crate::platform::types::{MergeRequest, Note, User};

/// GitLab's ranged suggestion fence, e.g. ```` ```suggestion:-1+0 ````.
static RANGED_SUGGESTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```suggestion:.*").expect("suggestion pattern is valid"));

const SUGGESTION_FENCE: &str = "```suggestion";

const MULTILINE_SUGGESTION_WARNING: &str = "🚩 **\u{fe0f}Multiline suggestions are not supported in AzDO - if suggestion is multiline, commit it manually**\n```suggestion";

fn attribution(link: &str, author: &User, marker: &str) -> String {
    format!(
        "*Migrated from [Gitlab]({link}) | Author: ![{name}]({avatar} =24x24) [{name}]({profile}){marker}*",
        name = author.name,
        avatar = author.avatar_url,
        profile = author.web_url,
    )
}

/// Link to a note inside the merge request's diff view.
pub fn note_link(mr: &MergeRequest, note: &Note) -> String {
    format!("{}/diffs#note_{}", mr.web_url, note.id)
}

/// Pull request description: attribution, blank line, original description.
pub fn render_description(mr: &MergeRequest) -> String {
    format!(
        "{}\n\n{}",
        attribution(&mr.web_url, &mr.author, ""),
        mr.description
    )
}

/// Comment body for the note at `position` (1-based) within its discussion.
pub fn render_note_body(mr: &MergeRequest, note: &Note, position: u64) -> String {
    let mut marker = String::new();
    let mut body = note.body.clone();

    if position == 1 {
        if let Some((start, end)) = multiline_range(note) {
            marker = format!("| **🚩 Multiline comment {start}-{end}**");
            body = rewrite_suggestions(&body, true);
        }
    }
    body = rewrite_suggestions(&body, false);

    format!(
        "{}\n\n{body}",
        attribution(&note_link(mr, note), &note.author, &marker)
    )
}

/// The line range of a note spanning more than one line.
fn multiline_range(note: &Note) -> Option<(u64, u64)> {
    let range = note.position.as_ref()?.line_range.as_ref()?;
    match (range.start_line, range.end_line) {
        (Some(start), Some(end)) if start != end => Some((start, end)),
        _ => None,
    }
}

/// Strip the range qualifier from every suggestion fence.
///
/// With `warn_multiline` the plain fence is preceded by a warning that the
/// suggestion has to be applied by hand.
pub fn rewrite_suggestions(body: &str, warn_multiline: bool) -> String {
    let replacement = if warn_multiline {
        MULTILINE_SUGGESTION_WARNING
    } else {
        SUGGESTION_FENCE
    };
    RANGED_SUGGESTION
        .replace_all(body, NoExpand(replacement))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::types::{LineRange, MergeRequestState, NotePosition};
    use chrono::{TimeZone, Utc};

    fn author() -> User {
        User {
            username: "john-doe".to_string(),
            name: "John Doe".to_string(),
            avatar_url: "https://www.gravatar.com/avatar/0".to_string(),
            web_url: "https://gitlab.com/john-doe".to_string(),
        }
    }

    fn merge_request() -> MergeRequest {
        let at = Utc.with_ymd_and_hms(2019, 11, 4, 15, 38, 53).unwrap();
        MergeRequest {
            iid: 1,
            project_id: 42,
            title: "Foo".to_string(),
            description: "open merge request description".to_string(),
            state: MergeRequestState::Opened,
            work_in_progress: true,
            source_branch: "develop".to_string(),
            target_branch: "master".to_string(),
            author: author(),
            created_at: at,
            updated_at: at,
            merge_commit_sha: None,
            web_url: "https://gitlab.com/gitlab-examples/php/-/merge_requests/1".to_string(),
        }
    }

    fn note(body: &str, range: Option<(u64, u64)>) -> Note {
        let at = Utc.with_ymd_and_hms(2019, 11, 4, 15, 38, 53).unwrap();
        Note {
            id: 0,
            body: body.to_string(),
            author: author(),
            system: false,
            resolved: false,
            position: range.map(|(start, end)| NotePosition {
                new_path: Some("README.md".to_string()),
                new_line: Some(start),
                line_range: Some(LineRange {
                    start_line: Some(start),
                    end_line: Some(end),
                }),
            }),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_render_description() {
        assert_eq!(
            render_description(&merge_request()),
            "*Migrated from [Gitlab](https://gitlab.com/gitlab-examples/php/-/merge_requests/1) | Author: ![John Doe](https://www.gravatar.com/avatar/0 =24x24) [John Doe](https://gitlab.com/john-doe)*\n\nopen merge request description"
        );
    }

    #[test]
    fn test_render_multiline_first_note() {
        let body = render_note_body(
            &merge_request(),
            &note("```suggestion:-1+0\nfoo\nbar\n```", Some((1, 2))),
            1,
        );
        assert_eq!(
            body,
            "*Migrated from [Gitlab](https://gitlab.com/gitlab-examples/php/-/merge_requests/1/diffs#note_0) | Author: ![John Doe](https://www.gravatar.com/avatar/0 =24x24) [John Doe](https://gitlab.com/john-doe)| **🚩 Multiline comment 1-2***\n\n🚩 **\u{fe0f}Multiline suggestions are not supported in AzDO - if suggestion is multiline, commit it manually**\n```suggestion\nfoo\nbar\n```"
        );
    }

    #[test]
    fn test_single_line_note_has_no_marker() {
        let body = render_note_body(
            &merge_request(),
            &note("```suggestion:-0+0\nfoo\n```", Some((3, 3))),
            1,
        );
        assert!(!body.contains("Multiline"));
        assert!(body.ends_with("\n\n```suggestion\nfoo\n```"));
    }

    #[test]
    fn test_reply_never_gets_marker() {
        let body = render_note_body(
            &merge_request(),
            &note("```suggestion:-1+0\nfoo\n```", Some((1, 2))),
            2,
        );
        assert!(!body.contains("Multiline"));
        assert!(body.contains("\n\n```suggestion\nfoo\n```"));
    }

    #[test]
    fn test_rewrite_strips_range_qualifier() {
        assert_eq!(
            rewrite_suggestions("before\n```suggestion:-2+1\nx\n```\nafter", false),
            "before\n```suggestion\nx\n```\nafter"
        );
    }

    #[test]
    fn test_rewrite_leaves_plain_fence_alone() {
        let body = "```suggestion\nx\n```";
        assert_eq!(rewrite_suggestions(body, false), body);
        assert_eq!(rewrite_suggestions(body, true), body);
    }

    #[test]
    fn test_rewrite_every_fence() {
        let rewritten = rewrite_suggestions(
            "```suggestion:-1+0\na\n```\n\n```suggestion:-0+3\nb\n```",
            false,
        );
        assert_eq!(rewritten, "```suggestion\na\n```\n\n```suggestion\nb\n```");
    }

    #[test]
    fn test_rewrite_with_warning() {
        let rewritten = rewrite_suggestions("```suggestion:-1+0\na\n```", true);
        assert!(rewritten.starts_with("🚩 **\u{fe0f}Multiline suggestions are not supported in AzDO"));
        assert!(rewritten.ends_with("\n```suggestion\na\n```"));
    }

    #[test]
    fn test_replacement_is_literal() {
        let rewritten = rewrite_suggestions("```suggestion:$1\ncost: $5\n```", false);
        assert_eq!(rewritten, "```suggestion\ncost: $5\n```");
    }
}
