use crate::platform::types::{
    Comment, CommentPosition, CommentThread, CommentThreadStatus, CommentType, Discussion,
    MergeRequest, Note, ThreadContext,
};

use super::markdown;

/// How a discussion is recreated as an Azure DevOps thread.
///
/// Replies can only be added to a thread that already exists, and a reply
/// payload must not carry file context, so multi-note discussions are sent
/// in two steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadPlan {
    /// A single note: create the thread and be done.
    Single(CommentThread),
    /// Create `init` (first comment plus file context), then update the
    /// created thread with `replies`.
    WithReplies {
        init: CommentThread,
        replies: CommentThread,
    },
}

impl ThreadPlan {
    /// The payload that creates the thread.
    pub fn initial(&self) -> &CommentThread {
        match self {
            ThreadPlan::Single(thread) => thread,
            ThreadPlan::WithReplies { init, .. } => init,
        }
    }

    /// The payload appended after creation, if any.
    pub fn replies(&self) -> Option<&CommentThread> {
        match self {
            ThreadPlan::Single(_) => None,
            ThreadPlan::WithReplies { replies, .. } => Some(replies),
        }
    }
}

/// Map a discussion onto a thread plan. Discussions opened by a system note yield `None`.
pub fn translate_discussion(mr: &MergeRequest, discussion: &Discussion) -> Option<ThreadPlan> {
    let first = discussion.notes.first()?;
    if first.system {
        return None;
    }

    let thread_context = thread_context(first);
    let comment_type = if thread_context.is_some() {
        CommentType::CodeChange
    } else {
        CommentType::Text
    };

    let status = if discussion.notes.iter().any(|note| !note.resolved) {
        CommentThreadStatus::Active
    } else {
        CommentThreadStatus::Fixed
    };

    let mut comments: Vec<Comment> = discussion
        .notes
        .iter()
        .zip(1u64..)
        .map(|(note, id)| translate_note(mr, note, id, comment_type))
        .collect();

    let mut thread = CommentThread {
        id: None,
        status,
        published_date: first.created_at,
        thread_context,
        comments: Vec::new(),
    };

    if comments.len() == 1 {
        thread.comments = comments;
        return Some(ThreadPlan::Single(thread));
    }

    let replies = comments.split_off(1);
    let init = CommentThread {
        comments,
        ..thread.clone()
    };
    thread.comments = replies;
    thread.thread_context = None;

    Some(ThreadPlan::WithReplies {
        init,
        replies: thread,
    })
}

/// File context of a diff note, anchored on a single line of the new file.
fn thread_context(note: &Note) -> Option<ThreadContext> {
    let position = note.position.as_ref()?;
    let path = position.file_path()?;

    let line = position
        .line_range
        .as_ref()
        .and_then(|range| range.start_line)
        .or(position.new_line)
        .map(|line| CommentPosition { line });

    Some(ThreadContext {
        file_path: format!("/{path}"),
        right_file_start: line,
        right_file_end: line,
    })
}

fn translate_note(mr: &MergeRequest, note: &Note, id: u64, comment_type: CommentType) -> Comment {
    Comment {
        id,
        parent_comment_id: id - 1,
        content: markdown::render_note_body(mr, note, id),
        comment_type,
        published_date: note.created_at,
        last_updated_date: note.updated_at,
    }
}
