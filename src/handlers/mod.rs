//! Event parsing and dispatch.
//!
//! User actions arrive as text commands on the event loop and are parsed
//! into typed [`UiEvent`]s before anything touches state, the same way the
//! web UI translates DOM events into handler calls.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::api::{ApiError, TreeHoleApi};
use crate::compose;
use crate::models::{SearchSuggestions, VoteKind, VoteState, VoteTarget};
use crate::notify::Notifier;
use crate::search::SearchBox;
use crate::vote::{self, ScoreView, VoteBoard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Load a target's server-rendered score and own-vote into the board.
    Seed {
        target: VoteTarget,
        state: VoteState,
    },
    Vote {
        target: VoteTarget,
        kind: VoteKind,
    },
    Flag {
        target: VoteTarget,
    },
    Show {
        target: VoteTarget,
    },
    Search {
        query: String,
    },
    DismissSearch,
    /// Live hashtag preview over a draft body.
    Preview {
        text: String,
    },
    /// Ask the server for tag suggestions over a draft.
    SuggestTags {
        title: String,
        body: String,
    },
    /// Accept a suggested tag into the tags field.
    AcceptTag {
        tag: String,
    },
    Quit,
}

fn parse_target(kind: &str, id: &str) -> Option<VoteTarget> {
    match kind {
        "post" => Some(VoteTarget::Post(id.to_string())),
        "comment" => Some(VoteTarget::Comment(id.to_string())),
        _ => None,
    }
}

/// Parse one input line into an event. Returns `None` for anything
/// unrecognized; blank lines are ignored upstream.
pub fn parse_event(line: &str) -> Option<UiEvent> {
    let line = line.trim();
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "seed" => {
            // seed <post|comment> <id> <score> [up|down]
            let parts: Vec<&str> = rest.split_whitespace().collect();
            if parts.len() < 3 {
                return None;
            }
            let target = parse_target(parts[0], parts[1])?;
            let score = parts[2].parse::<i64>().ok()?;
            let user_vote = match parts.get(3) {
                Some(&"up") => Some(VoteKind::Upvote),
                Some(&"down") => Some(VoteKind::Downvote),
                Some(_) => return None,
                None => None,
            };
            Some(UiEvent::Seed {
                target,
                state: VoteState::new(score, user_vote),
            })
        }
        "up" | "down" => {
            let (kind, id) = rest.split_once(' ')?;
            let target = parse_target(kind, id.trim())?;
            let vote_kind = if command == "up" {
                VoteKind::Upvote
            } else {
                VoteKind::Downvote
            };
            Some(UiEvent::Vote {
                target,
                kind: vote_kind,
            })
        }
        "flag" => {
            let (kind, id) = rest.split_once(' ')?;
            Some(UiEvent::Flag {
                target: parse_target(kind, id.trim())?,
            })
        }
        "show" => {
            let (kind, id) = rest.split_once(' ')?;
            Some(UiEvent::Show {
                target: parse_target(kind, id.trim())?,
            })
        }
        "search" => Some(UiEvent::Search {
            query: rest.to_string(),
        }),
        "esc" => Some(UiEvent::DismissSearch),
        "preview" => Some(UiEvent::Preview {
            text: rest.to_string(),
        }),
        "suggest" => {
            // suggest <title> | <body>
            let (title, body) = rest.split_once('|')?;
            Some(UiEvent::SuggestTags {
                title: title.trim().to_string(),
                body: body.trim().to_string(),
            })
        }
        "tag" => {
            if rest.is_empty() {
                return None;
            }
            Some(UiEvent::AcceptTag {
                tag: rest.to_string(),
            })
        }
        "quit" | "exit" => Some(UiEvent::Quit),
        _ => None,
    }
}

/// Everything the event loop mutates.
pub struct App {
    pub board: VoteBoard,
    pub api: Arc<dyn TreeHoleApi>,
    pub notifier: Arc<dyn Notifier>,
    pub search: SearchBox,
    /// The comma-separated tags field of the draft form.
    pub tags_input: String,
}

pub fn format_view(target: &VoteTarget, view: &ScoreView) -> String {
    let arrows = match (view.upvote_active, view.downvote_active) {
        (true, _) => "[▲]",
        (_, true) => "[▼]",
        _ => "[ ]",
    };
    let pending = if view.pending { " (pending)" } else { "" };
    format!("{}: {} {}{}", target, view.score_text, arrows, pending)
}

pub fn format_suggestions(suggestions: &SearchSuggestions) -> String {
    let mut lines = Vec::new();
    if !suggestions.tags.is_empty() {
        lines.push("Tags:".to_string());
        for tag in &suggestions.tags {
            lines.push(format!("  #{} ({})", tag.name, tag.count));
        }
    }
    if !suggestions.recent_posts.is_empty() {
        lines.push("Recent posts:".to_string());
        for post in &suggestions.recent_posts {
            lines.push(format!("  {}", post.title));
        }
    }
    lines.join("\n")
}

/// Dispatch one event. Returns false when the loop should stop.
pub async fn handle_event(app: &mut App, event: UiEvent) -> bool {
    match event {
        UiEvent::Seed { target, state } => {
            info!("seeding {} at {:?}", target, state);
            app.board.seed(target, state);
        }
        UiEvent::Vote { target, kind } => {
            vote::cast_vote(
                &mut app.board,
                app.api.as_ref(),
                app.notifier.as_ref(),
                &target,
                kind,
            )
            .await;
            if let Some(view) = app.board.view(&target) {
                println!("{}", format_view(&target, &view));
            }
        }
        UiEvent::Flag { target } => handle_flag(app, &target).await,
        UiEvent::Show { target } => match app.board.view(&target) {
            Some(view) => println!("{}", format_view(&target, &view)),
            None => warn!("show on unknown target {}", target),
        },
        UiEvent::Search { query } => app.search.keystroke(&query),
        UiEvent::DismissSearch => app.search.dismiss(),
        UiEvent::Preview { text } => {
            let tags = compose::extract_hashtags(&text);
            if !tags.is_empty() {
                app.notifier.info(&format!(
                    "Tags: {}",
                    tags.iter()
                        .map(|tag| format!("#{}", tag))
                        .collect::<Vec<_>>()
                        .join(" ")
                ));
            }
        }
        UiEvent::SuggestTags { title, body } => handle_suggest_tags(app, &title, &body).await,
        UiEvent::AcceptTag { tag } => {
            app.tags_input = compose::merge_tag(&app.tags_input, &tag);
            app.notifier.success(&format!("Added tag: {}", tag));
        }
        UiEvent::Quit => return false,
    }
    true
}

async fn handle_flag(app: &mut App, target: &VoteTarget) {
    match app.api.flag(target).await {
        Ok(outcome) => {
            if outcome.success {
                app.notifier.success(&outcome.message);
            } else {
                // Typically a duplicate flag.
                app.notifier.info(&outcome.message);
            }
        }
        Err(ApiError::AuthRequired) => app.notifier.warning("Please log in to flag."),
        Err(err) => {
            warn!("flag failure on {}: {}", target, err);
            app.notifier.error("Could not flag. Please try again.");
        }
    }
}

async fn handle_suggest_tags(app: &mut App, title: &str, body: &str) {
    if !compose::wants_tag_suggestions(title, body) {
        debug!("draft too short for tag suggestions");
        return;
    }
    match app.api.suggest_tags(title, body).await {
        Ok(tags) => {
            let fresh = compose::filter_suggestions(&app.tags_input, &tags);
            if !fresh.is_empty() {
                app.notifier
                    .info(&format!("Suggested tags: {}", fresh.join(", ")));
            }
        }
        Err(ApiError::AuthRequired) => {
            app.notifier.warning("Please log in for tag suggestions.")
        }
        Err(err) => debug!("tag suggestion request failed: {}", err),
    }
}
