//! In-memory implementations of every repository port.
//!
//! Mirrors the PostgreSQL schema closely enough for service tests: username
//! uniqueness, the share-link upsert, cascading user deletion, the numeric
//! CHECK constraints, and all-or-nothing imports.

use std::cmp::Reverse;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelshelf_model::{
    Book, BookFields, BookListItem, BookStats, BookStatus, ListEntry, Movie,
    MovieFields, MovieListItem, MovieStats, MovieStatus, SCORE_MAX, SCORE_MIN,
    ScoreCount, ShareRecord, TopItem,
};
use uuid::Uuid;

use crate::application::unit_of_work::AppUnitOfWork;
use crate::database::ports::{
    imports::ImportRepository,
    lists::ListsRepository,
    shares::ShareRegistry,
    stats::{StatsRepository, UserInfo},
    users::{SessionRecord, UserRecord, UsersRepository},
};
use crate::error::{CoreError, Result};
use crate::share::ShareId;
use crate::transfer::{ImportPlan, ImportSummary};

#[derive(Debug, Clone, Default)]
struct State {
    users: Vec<UserRecord>,
    sessions: Vec<(String, SessionRecord)>,
    // (sequence, item); higher sequence is newer
    books: Vec<(u64, BookListItem)>,
    movies: Vec<(u64, MovieListItem)>,
    shares: Vec<ShareRecord>,
    sequence: u64,
}

impl State {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    fn require_user(&self, username: &str) -> Result<()> {
        if self.users.iter().any(|u| u.username == username) {
            Ok(())
        } else {
            Err(CoreError::Internal(format!(
                "foreign key violation: unknown user {username}"
            )))
        }
    }

    fn insert_book(
        &mut self,
        username: &str,
        fields: &BookFields,
        entry: &ListEntry<BookStatus>,
    ) -> Result<BookListItem> {
        self.require_user(username)?;
        check_title(&fields.title)?;
        check_non_negative("books_pages_check", fields.pages)?;
        check_score(entry.score)?;

        let item = BookListItem {
            book: Book {
                id: Uuid::new_v4(),
                submitter: username.to_string(),
                fields: fields.clone(),
            },
            entry: entry.clone(),
        };
        let seq = self.next_sequence();
        self.books.push((seq, item.clone()));
        Ok(item)
    }

    fn insert_movie(
        &mut self,
        username: &str,
        fields: &MovieFields,
        entry: &ListEntry<MovieStatus>,
    ) -> Result<MovieListItem> {
        self.require_user(username)?;
        check_title(&fields.title)?;
        check_non_negative("movies_duration_check", fields.duration)?;
        check_score(entry.score)?;

        let item = MovieListItem {
            movie: Movie {
                id: Uuid::new_v4(),
                submitter: username.to_string(),
                fields: fields.clone(),
            },
            entry: entry.clone(),
        };
        let seq = self.next_sequence();
        self.movies.push((seq, item.clone()));
        Ok(item)
    }
}

fn check_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(CoreError::validation("title: must not be empty"));
    }
    Ok(())
}

fn check_non_negative(constraint: &str, value: Option<i32>) -> Result<()> {
    match value {
        Some(v) if v < 0 => Err(CoreError::validation(format!(
            "value out of range ({constraint})"
        ))),
        _ => Ok(()),
    }
}

fn check_score(score: Option<i16>) -> Result<()> {
    match score {
        Some(s) if !(SCORE_MIN..=SCORE_MAX).contains(&s) => Err(
            CoreError::validation("score: value out of range (score_check)"),
        ),
        _ => Ok(()),
    }
}

fn top<S: PartialEq>(
    items: impl Iterator<Item = (String, ListEntry<S>)>,
    completed: S,
    limit: usize,
) -> Vec<TopItem> {
    let mut top: Vec<TopItem> = items
        .filter(|(_, entry)| entry.status == completed)
        .filter_map(|(title, entry)| {
            entry.score.map(|score| TopItem {
                title,
                score,
                end_date: entry.end_date,
            })
        })
        .collect();
    // score DESC, end_date DESC NULLS LAST, title
    top.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| match (a.end_date, b.end_date) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
            .then_with(|| a.title.cmp(&b.title))
    });
    top.truncate(limit);
    top
}

fn score_rows(scores: impl Iterator<Item = Option<i16>>) -> Vec<ScoreCount> {
    let mut counts = std::collections::BTreeMap::<i16, i64>::new();
    for score in scores.flatten() {
        *counts.entry(score).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(score, count)| ScoreCount::new(score, count))
        .collect()
}

fn average(scores: impl Iterator<Item = Option<i16>>) -> Option<f64> {
    let scores: Vec<f64> = scores.flatten().map(f64::from).collect();
    (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64)
}

/// Shared in-memory database. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a user row directly, bypassing password hashing.
    pub fn add_user(&self, username: &str, password_hash: &str) {
        let mut state = self.state();
        state.users.retain(|u| u.username != username);
        state.users.push(UserRecord {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            enabled: true,
            created_at: Utc::now(),
        });
    }

    pub fn unit_of_work(&self) -> AppUnitOfWork {
        AppUnitOfWork {
            users: Arc::new(self.clone()),
            lists: Arc::new(self.clone()),
            stats: Arc::new(self.clone()),
            shares: Arc::new(self.clone()),
            imports: Arc::new(self.clone()),
        }
    }
}

#[async_trait]
impl UsersRepository for InMemoryDatabase {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<UserRecord> {
        let mut state = self.state();
        if state.users.iter().any(|u| u.username == username) {
            return Err(CoreError::Conflict(format!(
                "username {username} is already taken"
            )));
        }
        let user = UserRecord {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            enabled: true,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>> {
        Ok(self.state().users.iter().find(|u| u.username == username).cloned())
    }

    async fn set_enabled(&self, username: &str, enabled: bool) -> Result<()> {
        let mut state = self.state();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.username == username)
            .ok_or_else(|| CoreError::NotFound(format!("user {username}")))?;
        user.enabled = enabled;
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> Result<bool> {
        let mut state = self.state();
        let before = state.users.len();
        state.users.retain(|u| u.username != username);
        if state.users.len() == before {
            return Ok(false);
        }
        state.sessions.retain(|(_, s)| s.username != username);
        state.books.retain(|(_, b)| b.book.submitter != username);
        state.movies.retain(|(_, m)| m.movie.submitter != username);
        state.shares.retain(|s| s.username != username);
        Ok(true)
    }

    async fn create_session(
        &self,
        token_hash: &str,
        username: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state();
        state.require_user(username)?;
        state.sessions.push((
            token_hash.to_string(),
            SessionRecord {
                username: username.to_string(),
                expires_at,
            },
        ));
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<SessionRecord>> {
        Ok(self
            .state()
            .sessions
            .iter()
            .find(|(hash, _)| hash == token_hash)
            .map(|(_, session)| session.clone()))
    }
}

#[async_trait]
impl ListsRepository for InMemoryDatabase {
    async fn add_book(
        &self,
        username: &str,
        fields: &BookFields,
        entry: &ListEntry<BookStatus>,
    ) -> Result<BookListItem> {
        self.state().insert_book(username, fields, entry)
    }

    async fn add_movie(
        &self,
        username: &str,
        fields: &MovieFields,
        entry: &ListEntry<MovieStatus>,
    ) -> Result<MovieListItem> {
        self.state().insert_movie(username, fields, entry)
    }

    async fn list_books(&self, username: &str) -> Result<Vec<BookListItem>> {
        let state = self.state();
        let mut books: Vec<_> = state
            .books
            .iter()
            .filter(|(_, b)| b.book.submitter == username)
            .collect();
        books.sort_by_key(|(seq, _)| Reverse(*seq));
        Ok(books.into_iter().map(|(_, b)| b.clone()).collect())
    }

    async fn list_movies(&self, username: &str) -> Result<Vec<MovieListItem>> {
        let state = self.state();
        let mut movies: Vec<_> = state
            .movies
            .iter()
            .filter(|(_, m)| m.movie.submitter == username)
            .collect();
        movies.sort_by_key(|(seq, _)| Reverse(*seq));
        Ok(movies.into_iter().map(|(_, m)| m.clone()).collect())
    }

    async fn top_completed_books(&self, username: &str, limit: usize) -> Result<Vec<TopItem>> {
        let state = self.state();
        let items = state
            .books
            .iter()
            .filter(|(_, b)| b.book.submitter == username)
            .map(|(_, b)| (b.book.fields.title.clone(), b.entry.clone()));
        Ok(top(items, BookStatus::Completed, limit))
    }

    async fn top_completed_movies(&self, username: &str, limit: usize) -> Result<Vec<TopItem>> {
        let state = self.state();
        let items = state
            .movies
            .iter()
            .filter(|(_, m)| m.movie.submitter == username)
            .map(|(_, m)| (m.movie.fields.title.clone(), m.entry.clone()));
        Ok(top(items, MovieStatus::Completed, limit))
    }
}

#[async_trait]
impl StatsRepository for InMemoryDatabase {
    async fn user_info(&self, username: &str) -> Result<UserInfo> {
        self.state()
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| UserInfo {
                username: u.username.clone(),
                member_since: u.created_at,
            })
            .ok_or_else(|| CoreError::NotFound(format!("user {username}")))
    }

    async fn book_stats(&self, username: &str) -> Result<BookStats> {
        let state = self.state();
        let books: Vec<_> = state
            .books
            .iter()
            .map(|(_, b)| b)
            .filter(|b| b.book.submitter == username)
            .collect();
        Ok(BookStats {
            count: books.len() as i64,
            average_score: average(books.iter().map(|b| b.entry.score)),
            total_pages: books
                .iter()
                .filter(|b| b.entry.status == BookStatus::Completed)
                .filter_map(|b| b.book.fields.pages)
                .map(i64::from)
                .sum(),
            score_distribution: Vec::new(),
        })
    }

    async fn movie_stats(&self, username: &str) -> Result<MovieStats> {
        let state = self.state();
        let movies: Vec<_> = state
            .movies
            .iter()
            .map(|(_, m)| m)
            .filter(|m| m.movie.submitter == username)
            .collect();
        Ok(MovieStats {
            count: movies.len() as i64,
            average_score: average(movies.iter().map(|m| m.entry.score)),
            total_runtime: movies
                .iter()
                .filter(|m| m.entry.status == MovieStatus::Completed)
                .filter_map(|m| m.movie.fields.duration)
                .map(i64::from)
                .sum(),
            score_distribution: Vec::new(),
        })
    }

    async fn book_scores(&self, username: &str) -> Result<Vec<ScoreCount>> {
        let state = self.state();
        Ok(score_rows(
            state
                .books
                .iter()
                .filter(|(_, b)| b.book.submitter == username)
                .map(|(_, b)| b.entry.score),
        ))
    }

    async fn movie_scores(&self, username: &str) -> Result<Vec<ScoreCount>> {
        let state = self.state();
        Ok(score_rows(
            state
                .movies
                .iter()
                .filter(|(_, m)| m.movie.submitter == username)
                .map(|(_, m)| m.entry.score),
        ))
    }
}

#[async_trait]
impl ShareRegistry for InMemoryDatabase {
    async fn register_share(
        &self,
        username: &str,
        share_id: &ShareId,
        generated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state();
        state.require_user(username)?;
        if state
            .shares
            .iter()
            .any(|s| s.share_id == share_id.as_str() && s.username != username)
        {
            return Err(CoreError::Internal("share_links_share_id_key violated".into()));
        }
        let record = ShareRecord {
            username: username.to_string(),
            share_id: share_id.to_string(),
            generated_at,
        };
        match state.shares.iter_mut().find(|s| s.username == username) {
            Some(existing) => *existing = record,
            None => state.shares.push(record),
        }
        Ok(())
    }

    async fn resolve_share(&self, share_id: &ShareId) -> Result<Option<String>> {
        Ok(self
            .state()
            .shares
            .iter()
            .find(|s| s.share_id == share_id.as_str())
            .map(|s| s.username.clone()))
    }

    async fn list_shares(&self, username: &str) -> Result<Vec<ShareRecord>> {
        let mut shares: Vec<_> = self
            .state()
            .shares
            .iter()
            .filter(|s| s.username == username)
            .cloned()
            .collect();
        shares.sort_by_key(|s| s.generated_at);
        Ok(shares)
    }

    async fn delete_share(&self, username: &str) -> Result<bool> {
        let mut state = self.state();
        let before = state.shares.len();
        state.shares.retain(|s| s.username != username);
        Ok(state.shares.len() != before)
    }
}

#[async_trait]
impl ImportRepository for InMemoryDatabase {
    async fn import_profile(&self, plan: &ImportPlan) -> Result<ImportSummary> {
        let mut state = self.state();
        // Work on a copy and swap it in only when every insert succeeded.
        let mut staged = state.clone();

        let mut apply = || -> Result<ImportSummary> {
            for fields in &plan.books {
                let entry = plan
                    .book_entry(fields)
                    .ok_or_else(|| CoreError::Internal("uncorrelated book".into()))?;
                staged.insert_book(&plan.username, fields, entry)?;
            }
            for fields in &plan.movies {
                let entry = plan
                    .movie_entry(fields)
                    .ok_or_else(|| CoreError::Internal("uncorrelated movie".into()))?;
                staged.insert_movie(&plan.username, fields, entry)?;
            }
            Ok(ImportSummary {
                books: plan.books.len(),
                movies: plan.movies.len(),
            })
        };

        match apply() {
            Ok(summary) => {
                *state = staged;
                Ok(summary)
            }
            Err(err) => {
                tracing::error!(username = %plan.username, error = %err, "profile import rolled back");
                Err(CoreError::ImportFailed)
            }
        }
    }
}
