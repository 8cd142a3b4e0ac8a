//! Scripted Tree Hole API for tests.
//!
//! `MockApi` is pre-loaded with responses and records every call, so the
//! controller and handler tests run without network access. Scripted vote
//! and flag results are consumed in FIFO order.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::models::{FlagOutcome, SearchSuggestions, VoteKind, VoteOutcome, VoteTarget};

use super::{ApiError, Result, TreeHoleApi};

pub struct MockApi {
    authenticated: bool,
    vote_results: Mutex<VecDeque<Result<VoteOutcome>>>,
    flag_results: Mutex<VecDeque<Result<FlagOutcome>>>,
    suggestions: RwLock<HashMap<String, SearchSuggestions>>,
    tag_suggestions: RwLock<Vec<String>>,
    votes_seen: Mutex<Vec<(VoteTarget, VoteKind)>>,
}

impl MockApi {
    /// Mock with credentials present.
    pub fn new() -> Self {
        Self {
            authenticated: true,
            vote_results: Mutex::new(VecDeque::new()),
            flag_results: Mutex::new(VecDeque::new()),
            suggestions: RwLock::new(HashMap::new()),
            tag_suggestions: RwLock::new(Vec::new()),
            votes_seen: Mutex::new(Vec::new()),
        }
    }

    /// Mock that behaves like a logged-out session.
    pub fn logged_out() -> Self {
        Self {
            authenticated: false,
            ..Self::new()
        }
    }

    /// Queue the next vote response.
    pub fn push_vote_result(&self, result: Result<VoteOutcome>) {
        self.vote_results.lock().unwrap().push_back(result);
    }

    /// Queue a successful vote confirmation built from raw counts.
    pub fn push_vote_counts(
        &self,
        upvotes_count: i64,
        downvotes_count: i64,
        user_vote: Option<VoteKind>,
    ) {
        self.push_vote_result(Ok(VoteOutcome {
            message: "Vote recorded.".to_string(),
            net_votes: upvotes_count - downvotes_count,
            upvotes_count,
            downvotes_count,
            user_vote,
        }));
    }

    pub fn push_flag_result(&self, result: Result<FlagOutcome>) {
        self.flag_results.lock().unwrap().push_back(result);
    }

    pub fn register_suggestions(&self, query: &str, suggestions: SearchSuggestions) {
        self.suggestions
            .write()
            .unwrap()
            .insert(query.to_string(), suggestions);
    }

    pub fn set_tag_suggestions(&self, tags: Vec<String>) {
        *self.tag_suggestions.write().unwrap() = tags;
    }

    /// Every vote call seen so far, in order.
    pub fn votes_seen(&self) -> Vec<(VoteTarget, VoteKind)> {
        self.votes_seen.lock().unwrap().clone()
    }

    pub fn vote_call_count(&self) -> usize {
        self.votes_seen.lock().unwrap().len()
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TreeHoleApi for MockApi {
    fn has_credentials(&self) -> bool {
        self.authenticated
    }

    async fn vote(&self, target: &VoteTarget, kind: VoteKind) -> Result<VoteOutcome> {
        if !self.authenticated {
            return Err(ApiError::AuthRequired);
        }
        self.votes_seen
            .lock()
            .unwrap()
            .push((target.clone(), kind));
        self.vote_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ApiError::Rejected(
                    "no scripted vote outcome".to_string(),
                ))
            })
    }

    async fn flag(&self, _target: &VoteTarget) -> Result<FlagOutcome> {
        if !self.authenticated {
            return Err(ApiError::AuthRequired);
        }
        self.flag_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ApiError::Rejected(
                    "no scripted flag outcome".to_string(),
                ))
            })
    }

    async fn search_suggestions(&self, query: &str) -> Result<SearchSuggestions> {
        Ok(self
            .suggestions
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn suggest_tags(&self, _title: &str, _body: &str) -> Result<Vec<String>> {
        if !self.authenticated {
            return Err(ApiError::AuthRequired);
        }
        Ok(self.tag_suggestions.read().unwrap().clone())
    }
}
