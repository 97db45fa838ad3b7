// In-memory login sessions. Nothing here outlives the process.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::models::User,
    error::{AppError, Result},
    services::investors::{InvestorField, SortState},
};

/// Lifetime of a session and of the token that names it.
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub voted: HashSet<String>,
    pub investor_sort: SortState,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn new(user: User, expires_at: DateTime<Utc>) -> Self {
        Self {
            user,
            voted: HashSet::new(),
            investor_sort: SortState::default(),
            expires_at,
        }
    }

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

type SessionMap = HashMap<String, Session>;

fn live<'a>(sessions: &'a SessionMap, id: &str) -> Option<&'a Session> {
    sessions.get(id).filter(|s| s.is_live(Utc::now()))
}

fn live_mut<'a>(sessions: &'a mut SessionMap, id: &str) -> Result<&'a mut Session> {
    sessions
        .get_mut(id)
        .filter(|s| s.is_live(Utc::now()))
        .ok_or(AppError::Unauthorized)
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<SessionMap>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::days(SESSION_TTL_DAYS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Starts a session and returns its id. Expired sessions are dropped
    /// first.
    pub async fn create(&self, user: User) -> String {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.is_live(now));
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "expired sessions removed");
        }

        sessions.insert(id.clone(), Session::new(user, now + self.ttl));
        id
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        live(&*self.sessions.read().await, id).cloned()
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn has_voted(&self, id: &str, investment_id: &str) -> bool {
        live(&*self.sessions.read().await, id).is_some_and(|s| s.voted.contains(investment_id))
    }

    /// Marks the vote; a second vote on the same investment is a conflict.
    pub async fn record_vote(&self, id: &str, investment_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = live_mut(&mut sessions, id)?;

        if !session.voted.insert(investment_id.to_string()) {
            return Err(AppError::Conflict(
                "You have already voted on this proposal".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn investor_sort(&self, id: &str) -> Result<SortState> {
        live(&*self.sessions.read().await, id)
            .map(|s| s.investor_sort)
            .ok_or(AppError::Unauthorized)
    }

    /// Applies a column click to the session's investor table sort.
    pub async fn click_investor_sort(&self, id: &str, field: InvestorField) -> Result<SortState> {
        let mut sessions = self.sessions.write().await;
        let session = live_mut(&mut sessions, id)?;
        session.investor_sort = session.investor_sort.click(field);
        Ok(session.investor_sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::models::Role, services::investors::SortDirection};

    fn user() -> User {
        User {
            id: "u1".to_string(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            role: Role::Investor,
        }
    }

    #[tokio::test]
    async fn second_vote_conflicts() {
        let store = SessionStore::new();
        let sid = store.create(user()).await;

        assert!(!store.has_voted(&sid, "4").await);
        store.record_vote(&sid, "4").await.unwrap();
        assert!(store.has_voted(&sid, "4").await);
        assert!(matches!(
            store.record_vote(&sid, "4").await,
            Err(AppError::Conflict(_))
        ));
        store.record_vote(&sid, "6").await.unwrap();
    }

    #[tokio::test]
    async fn votes_are_per_session() {
        let store = SessionStore::new();
        let first = store.create(user()).await;
        let second = store.create(user()).await;

        store.record_vote(&first, "4").await.unwrap();
        assert!(!store.has_voted(&second, "4").await);
    }

    #[tokio::test]
    async fn removed_session_is_gone() {
        let store = SessionStore::new();
        let sid = store.create(user()).await;
        assert!(store.remove(&sid).await);
        assert!(store.get(&sid).await.is_none());
        assert!(matches!(
            store.record_vote(&sid, "4").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn investor_sort_clicks_accumulate() {
        let store = SessionStore::new();
        let sid = store.create(user()).await;

        let state = store.click_investor_sort(&sid, InvestorField::Name).await.unwrap();
        assert_eq!(state.direction, SortDirection::Desc);
        assert_eq!(store.investor_sort(&sid).await.unwrap(), state);
    }

    #[tokio::test]
    async fn expired_sessions_are_rejected_and_pruned() {
        let store = SessionStore::with_ttl(Duration::seconds(-1));
        let stale = store.create(user()).await;

        assert!(store.get(&stale).await.is_none());
        assert!(!store.has_voted(&stale, "4").await);
        assert!(matches!(
            store.record_vote(&stale, "4").await,
            Err(AppError::Unauthorized)
        ));

        for _ in 0..100 {
            store.create(user()).await;
        }
        assert_eq!(store.sessions.read().await.len(), 1);
        assert!(!store.remove(&stale).await);
    }

    #[tokio::test]
    async fn live_sessions_survive_new_logins() {
        let store = SessionStore::new();
        let first = store.create(user()).await;
        store.create(user()).await;

        let session = store.get(&first).await.unwrap();
        assert!(session.expires_at > Utc::now() + Duration::days(SESSION_TTL_DAYS - 1));
        assert_eq!(store.sessions.read().await.len(), 2);
    }
}
