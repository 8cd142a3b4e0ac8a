use serde::{Deserialize, Serialize};

/// The two vote directions a user can cast on a post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteKind {
    Upvote,
    Downvote,
}

impl VoteKind {
    /// Contribution of this vote to the net score.
    pub fn delta(self) -> i64 {
        match self {
            VoteKind::Upvote => 1,
            VoteKind::Downvote => -1,
        }
    }

    pub fn opposite(self) -> VoteKind {
        match self {
            VoteKind::Upvote => VoteKind::Downvote,
            VoteKind::Downvote => VoteKind::Upvote,
        }
    }

    /// URL path segment used by the vote endpoints.
    pub fn path_segment(self) -> &'static str {
        match self {
            VoteKind::Upvote => "upvote",
            VoteKind::Downvote => "downvote",
        }
    }
}

/// What a vote or flag request is aimed at. Posts and comments share the
/// same endpoint shape under different URL prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VoteTarget {
    Post(String),
    Comment(String),
}

impl VoteTarget {
    pub fn id(&self) -> &str {
        match self {
            VoteTarget::Post(id) | VoteTarget::Comment(id) => id,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            VoteTarget::Post(_) => "posts",
            VoteTarget::Comment(_) => "comments",
        }
    }

    pub fn vote_path(&self, kind: VoteKind) -> String {
        format!("{}/{}/{}/", self.prefix(), self.id(), kind.path_segment())
    }

    pub fn flag_path(&self) -> String {
        format!("{}/{}/flag/", self.prefix(), self.id())
    }
}

impl std::fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteTarget::Post(id) => write!(f, "post {}", id),
            VoteTarget::Comment(id) => write!(f, "comment {}", id),
        }
    }
}

/// The client-side vote state for a single target: the net score as last
/// known, and the requesting user's own vote. This struct is the source of
/// truth for rendering; nothing is read back from rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteState {
    pub score: i64,
    pub user_vote: Option<VoteKind>,
}

impl VoteState {
    pub fn new(score: i64, user_vote: Option<VoteKind>) -> Self {
        Self { score, user_vote }
    }
}

/// Authoritative vote counts returned by the server after a vote request.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteOutcome {
    pub message: String,
    pub net_votes: i64,
    pub upvotes_count: i64,
    pub downvotes_count: i64,
    pub user_vote: Option<VoteKind>,
}

impl VoteOutcome {
    /// The confirmed state, with the score recomputed from the separate
    /// counts rather than trusted from `net_votes`.
    pub fn confirmed_state(&self) -> VoteState {
        VoteState::new(self.upvotes_count - self.downvotes_count, self.user_vote)
    }
}

/// Result of flagging a post or comment for moderator review.
/// `success` is false when the target was already flagged.
#[derive(Debug, Clone, Deserialize)]
pub struct FlagOutcome {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagSuggestion {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentPost {
    pub title: String,
}

/// Search-box autocomplete payload: matching tags plus recent post titles.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSuggestions {
    #[serde(default)]
    pub tags: Vec<TagSuggestion>,
    #[serde(default)]
    pub recent_posts: Vec<RecentPost>,
}

impl SearchSuggestions {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.recent_posts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_and_opposite() {
        assert_eq!(VoteKind::Upvote.delta(), 1);
        assert_eq!(VoteKind::Downvote.delta(), -1);
        assert_eq!(VoteKind::Upvote.opposite(), VoteKind::Downvote);
        assert_eq!(VoteKind::Downvote.opposite(), VoteKind::Upvote);
    }

    #[test]
    fn vote_paths_match_endpoints() {
        let post = VoteTarget::Post("42".to_string());
        assert_eq!(post.vote_path(VoteKind::Upvote), "posts/42/upvote/");
        assert_eq!(post.vote_path(VoteKind::Downvote), "posts/42/downvote/");
        assert_eq!(post.flag_path(), "posts/42/flag/");

        let comment = VoteTarget::Comment("7".to_string());
        assert_eq!(comment.vote_path(VoteKind::Upvote), "comments/7/upvote/");
        assert_eq!(comment.flag_path(), "comments/7/flag/");
    }

    #[test]
    fn user_vote_wire_format() {
        let json = r#"{
            "message": "Vote recorded.",
            "net_votes": 6,
            "upvotes_count": 10,
            "downvotes_count": 4,
            "user_vote": "UPVOTE"
        }"#;
        let outcome: VoteOutcome = serde_json::from_str(json).unwrap();
        assert_eq!(outcome.user_vote, Some(VoteKind::Upvote));
        assert_eq!(
            outcome.confirmed_state(),
            VoteState::new(6, Some(VoteKind::Upvote))
        );
    }

    #[test]
    fn user_vote_null_means_no_vote() {
        let json = r#"{
            "message": "Vote removed.",
            "net_votes": 5,
            "upvotes_count": 9,
            "downvotes_count": 4,
            "user_vote": null
        }"#;
        let outcome: VoteOutcome = serde_json::from_str(json).unwrap();
        assert_eq!(outcome.user_vote, None);
        assert_eq!(outcome.confirmed_state().score, 5);
    }

    #[test]
    fn suggestions_default_to_empty_sections() {
        let suggestions: SearchSuggestions = serde_json::from_str("{}").unwrap();
        assert!(suggestions.is_empty());

        let suggestions: SearchSuggestions =
            serde_json::from_str(r#"{"tags": [{"name": "courses", "count": 3}]}"#).unwrap();
        assert!(!suggestions.is_empty());
        assert_eq!(suggestions.tags[0].name, "courses");
    }
}
