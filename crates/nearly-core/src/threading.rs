//! Two-level comment threads.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::Comment;

#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Group a flat comment list into top-level comments with their replies.
///
/// Threads are two levels deep: a reply to a reply is listed under the root
/// of its chain. A reply whose parent is not in the list becomes a top-level
/// comment. Both levels are ordered by creation time.
pub fn thread_comments(mut comments: Vec<Comment>) -> Vec<CommentThread> {
    comments.sort_by_key(|c| c.created_at);

    let parents: HashMap<Uuid, Option<Uuid>> = comments
        .iter()
        .map(|c| (c.id, c.parent_comment_id))
        .collect();

    let root_of = |id: Uuid| -> Uuid {
        let mut current = id;
        // bounded walk so a corrupt parent cycle cannot hang
        for _ in 0..parents.len() {
            match parents.get(&current).copied().flatten() {
                Some(parent) if parents.contains_key(&parent) => current = parent,
                _ => break,
            }
        }
        current
    };

    let mut threads: Vec<CommentThread> = Vec::new();
    let mut slot: HashMap<Uuid, usize> = HashMap::new();
    let mut replies: Vec<(Uuid, Comment)> = Vec::new();

    for comment in comments {
        let root = root_of(comment.id);
        if root == comment.id {
            slot.insert(comment.id, threads.len());
            threads.push(CommentThread {
                comment,
                replies: Vec::new(),
            });
        } else {
            replies.push((root, comment));
        }
    }

    for (root, reply) in replies {
        match slot.get(&root) {
            Some(&i) => threads[i].replies.push(reply),
            // the root was itself part of a cycle
            None => {
                slot.insert(reply.id, threads.len());
                threads.push(CommentThread {
                    comment: reply,
                    replies: Vec::new(),
                });
            }
        }
    }

    threads.sort_by_key(|t| t.comment.created_at);
    threads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentKind;
    use chrono::{Duration, Utc};

    fn comment(parent: Option<Uuid>, minute: i64) -> Comment {
        let mut c = Comment::new(
            ContentKind::Event,
            Uuid::nil(),
            Uuid::new_v4(),
            parent,
            &format!("comment at {minute}"),
        )
        .unwrap();
        c.created_at = Utc::now() - Duration::hours(1) + Duration::minutes(minute);
        c
    }

    #[test]
    fn test_replies_grouped_under_parent_in_order() {
        let a = comment(None, 0);
        let b = comment(None, 1);
        let a2 = comment(Some(a.id), 5);
        let a1 = comment(Some(a.id), 2);

        let threads = thread_comments(vec![a2.clone(), b.clone(), a.clone(), a1.clone()]);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].comment.id, a.id);
        assert_eq!(threads[1].comment.id, b.id);
        let ids: Vec<_> = threads[0].replies.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a1.id, a2.id]);
        assert!(threads[1].replies.is_empty());
    }

    #[test]
    fn test_nested_reply_flattened_to_root() {
        let root = comment(None, 0);
        let reply = comment(Some(root.id), 1);
        let nested = comment(Some(reply.id), 2);

        let threads = thread_comments(vec![root.clone(), reply.clone(), nested.clone()]);
        assert_eq!(threads.len(), 1);
        let ids: Vec<_> = threads[0].replies.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![reply.id, nested.id]);
    }

    #[test]
    fn test_orphan_reply_promoted() {
        let orphan = comment(Some(Uuid::new_v4()), 0);
        let threads = thread_comments(vec![orphan.clone()]);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].comment.id, orphan.id);
    }

    #[test]
    fn test_parent_cycle_does_not_hang() {
        let mut a = comment(None, 0);
        let mut b = comment(None, 1);
        a.parent_comment_id = Some(b.id);
        b.parent_comment_id = Some(a.id);

        let threads = thread_comments(vec![a, b]);
        let total: usize = threads.iter().map(|t| 1 + t.replies.len()).sum();
        assert_eq!(total, 2);
    }
}
