//! Server-side sessions: state machine, response cache and latest reports.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::cache::ResponseCache;
use crate::analysis::report::Report;
use crate::errors::AppError;

/// `Idle → InputsCollected → {Dispatching → ResultShown} | InvalidInput`.
/// A failed dispatch returns to `InputsCollected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    InputsCollected,
    Dispatching,
    ResultShown,
    InvalidInput,
}

pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    last_used: Mutex<DateTime<Utc>>,
    state: Mutex<SessionState>,
    cache: ResponseCache,
    reports: Mutex<Vec<Report>>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub reports: Vec<String>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_used: Mutex::new(now),
            state: Mutex::new(SessionState::Idle),
            cache: ResponseCache::new(),
            reports: Mutex::new(Vec::new()),
        }
    }

    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    pub fn last_used(&self) -> DateTime<Utc> {
        *lock(&self.last_used)
    }

    fn touch_at(&self, at: DateTime<Utc>) {
        *lock(&self.last_used) = at;
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            state: self.state(),
            created_at: self.created_at,
            reports: lock(&self.reports)
                .iter()
                .map(|r| r.file_name.clone())
                .collect(),
        }
    }

    /// A report produced by the session's most recent action.
    pub fn report(&self, file_name: &str) -> Option<Report> {
        lock(&self.reports)
            .iter()
            .find(|r| r.file_name == file_name)
            .cloned()
    }

    /// Rejects a trigger while another one is being dispatched.
    pub fn ensure_not_busy(&self) -> Result<(), AppError> {
        if self.state() == SessionState::Dispatching {
            return Err(busy());
        }
        Ok(())
    }

    /// Records rejected inputs. Leaves an in-flight dispatch untouched.
    pub fn mark_invalid(&self) {
        let mut state = lock(&self.state);
        if *state != SessionState::Dispatching {
            self.transition(&mut state, SessionState::InvalidInput);
        }
    }

    /// Moves to `Dispatching`. The returned guard puts the session back into
    /// `InputsCollected` unless `finish` is called.
    pub fn begin_dispatch(&self) -> Result<DispatchGuard<'_>, AppError> {
        let mut state = lock(&self.state);
        if *state == SessionState::Dispatching {
            return Err(busy());
        }
        self.transition(&mut state, SessionState::InputsCollected);
        self.transition(&mut state, SessionState::Dispatching);
        Ok(DispatchGuard {
            session: self,
            finished: false,
        })
    }

    fn transition(&self, state: &mut SessionState, next: SessionState) {
        if *state != next {
            debug!("Session {} {:?} -> {:?}", self.id, *state, next);
            *state = next;
        }
    }
}

fn busy() -> AppError {
    AppError::Busy("An analysis is already running for this session".to_string())
}

pub struct DispatchGuard<'a> {
    session: &'a Session,
    finished: bool,
}

impl DispatchGuard<'_> {
    /// Publishes the reports of this action and shows the result.
    pub fn finish(mut self, reports: Vec<Report>) {
        *lock(&self.session.reports) = reports;
        let mut state = lock(&self.session.state);
        self.session.transition(&mut state, SessionState::ResultShown);
        self.finished = true;
    }

    /// Ends the dispatch because the inputs turned out to be unusable, e.g. an
    /// upload with no readable text. Previous reports are kept.
    pub fn invalid(mut self) {
        let mut state = lock(&self.session.state);
        self.session.transition(&mut state, SessionState::InvalidInput);
        self.finished = true;
    }

    /// Settles the dispatch from an error: validation failures mark the inputs
    /// invalid, anything else returns to `InputsCollected` on drop.
    pub fn fail(self, error: &AppError) {
        if matches!(error, AppError::Validation(_)) {
            self.invalid();
        }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let mut state = lock(&self.session.state);
            self.session
                .transition(&mut state, SessionState::InputsCollected);
        }
    }
}

pub const DEFAULT_IDLE_MINUTES: i64 = 60;
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// All live sessions, keyed by id.
///
/// Sessions idle for longer than `idle_ttl` are reaped, and the store never holds
/// more than `max_sessions` idle sessions: creating one past the cap evicts the
/// least recently used. A session that is `Dispatching` is never removed.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Arc<Session>>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(
            Duration::minutes(DEFAULT_IDLE_MINUTES),
            DEFAULT_MAX_SESSIONS,
        )
    }
}

impl SessionStore {
    pub fn new(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session::new());
        let mut sessions = lock(&self.sessions);

        reap(&mut sessions, session.created_at - self.idle_ttl);
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .values()
                .filter(|s| s.state() != SessionState::Dispatching)
                .min_by_key(|s| s.last_used())
                .map(|s| s.id)
            else {
                warn!("Session cap of {} reached with every session busy", self.max_sessions);
                break;
            };
            sessions.remove(&oldest);
            info!("Session {oldest} evicted to stay under the session cap");
        }

        sessions.insert(session.id, Arc::clone(&session));
        info!("Session {} created", session.id);
        session
    }

    /// Looks up a session and marks it as used.
    pub fn get(&self, id: Uuid) -> Result<Arc<Session>, AppError> {
        let session = lock(&self.sessions)
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        session.touch_at(Utc::now());
        Ok(session)
    }

    pub fn remove(&self, id: Uuid) -> Result<(), AppError> {
        lock(&self.sessions)
            .remove(&id)
            .map(|_| info!("Session {id} removed"))
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    /// Drops every session idle since before `now - idle_ttl`. Returns how many
    /// were removed.
    pub fn reap_idle_at(&self, now: DateTime<Utc>) -> usize {
        reap(&mut lock(&self.sessions), now - self.idle_ttl)
    }

    pub fn session_count(&self) -> usize {
        lock(&self.sessions).len()
    }
}

fn reap(sessions: &mut HashMap<Uuid, Arc<Session>>, cutoff: DateTime<Utc>) -> usize {
    let before = sessions.len();
    sessions.retain(|_, s| s.state() == SessionState::Dispatching || s.last_used() >= cutoff);
    let reaped = before - sessions.len();
    if reaped > 0 {
        info!("Reaped {reaped} idle sessions");
    }
    reaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::report::single_report;

    #[test]
    fn test_new_session_is_idle_without_reports() {
        let store = SessionStore::default();
        let view = store.create().view();
        assert_eq!(view.state, SessionState::Idle);
        assert!(view.reports.is_empty());
    }

    #[test]
    fn test_finish_shows_result_and_publishes_reports() {
        let session = Session::new();
        let guard = session.begin_dispatch().unwrap();
        assert_eq!(session.state(), SessionState::Dispatching);

        guard.finish(vec![single_report("jd", "cv", "ok")]);
        assert_eq!(session.state(), SessionState::ResultShown);
        assert!(session.report("analysis_report.txt").is_some());
        assert!(session.report("other.txt").is_none());
    }

    #[test]
    fn test_dropped_guard_returns_to_inputs_collected() {
        let session = Session::new();
        {
            let _guard = session.begin_dispatch().unwrap();
        }
        assert_eq!(session.state(), SessionState::InputsCollected);
    }

    #[test]
    fn test_second_dispatch_is_busy() {
        let session = Session::new();
        let _guard = session.begin_dispatch().unwrap();
        assert!(matches!(session.begin_dispatch(), Err(AppError::Busy(_))));
        assert!(matches!(session.ensure_not_busy(), Err(AppError::Busy(_))));

        session.mark_invalid();
        assert_eq!(session.state(), SessionState::Dispatching);
    }

    #[test]
    fn test_invalid_input_then_recover() {
        let session = Session::new();
        session.mark_invalid();
        assert_eq!(session.state(), SessionState::InvalidInput);

        session.begin_dispatch().unwrap().finish(Vec::new());
        assert_eq!(session.state(), SessionState::ResultShown);
    }

    #[test]
    fn test_store_get_and_remove() {
        let store = SessionStore::default();
        let id = store.create().id;
        assert_eq!(store.get(id).unwrap().id, id);

        store.remove(id).unwrap();
        assert!(matches!(store.get(id), Err(AppError::NotFound(_))));
        assert!(matches!(store.remove(id), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&SessionState::InputsCollected).unwrap();
        assert_eq!(json, "\"inputs_collected\"");
    }

    #[test]
    fn test_idle_sessions_are_reaped() {
        let store = SessionStore::new(Duration::minutes(30), 10);
        let stale = store.create();
        let fresh = store.create();
        stale.touch_at(Utc::now() - Duration::minutes(45));

        assert_eq!(store.reap_idle_at(Utc::now()), 1);
        assert!(matches!(store.get(stale.id), Err(AppError::NotFound(_))));
        assert!(store.get(fresh.id).is_ok());
    }

    #[test]
    fn test_dispatching_session_survives_reaping() {
        let store = SessionStore::new(Duration::minutes(30), 10);
        let session = store.create();
        let _guard = session.begin_dispatch().unwrap();

        assert_eq!(store.reap_idle_at(Utc::now() + Duration::hours(2)), 0);
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn test_cap_evicts_least_recently_used() {
        let store = SessionStore::new(Duration::minutes(30), 2);
        let first = store.create();
        let second = store.create();
        first.touch_at(Utc::now() - Duration::minutes(5));
        second.touch_at(Utc::now() - Duration::minutes(10));

        let third = store.create();
        assert_eq!(store.session_count(), 2);
        assert!(store.get(first.id).is_ok());
        assert!(matches!(store.get(second.id), Err(AppError::NotFound(_))));
        assert!(store.get(third.id).is_ok());
    }

    #[test]
    fn test_get_refreshes_last_used() {
        let store = SessionStore::default();
        let session = store.create();
        let earlier = Utc::now() - Duration::minutes(20);
        session.touch_at(earlier);

        store.get(session.id).unwrap();
        assert!(session.last_used() > earlier);
    }

    #[test]
    fn test_failed_validation_during_dispatch_is_invalid_input() {
        let session = Session::new();
        session
            .begin_dispatch()
            .unwrap()
            .fail(&AppError::Validation("empty resume".into()));
        assert_eq!(session.state(), SessionState::InvalidInput);

        session
            .begin_dispatch()
            .unwrap()
            .fail(&AppError::ExternalService("timeout".into()));
        assert_eq!(session.state(), SessionState::InputsCollected);
    }
}
