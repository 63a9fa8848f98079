use super::session::DebugSession;
use super::step::Step;
use crate::{DebuggerError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;

/// The process-wide session table. Each id is inserted once by its `start`
/// call; only `advance` mutates an existing entry. Sessions are never
/// removed.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, DebugSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: DebugSession) {
        self.sessions
            .write()
            .insert(session.id().to_string(), session);
    }

    /// Snapshot of a stored session.
    pub fn get(&self, id: &str) -> Result<DebugSession> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| DebuggerError::SessionNotFound(id.to_string()))
    }

    /// Advance the session's cursor and return the session as it now stands
    /// together with the step under the cursor.
    pub fn advance(&self, id: &str) -> Result<(DebugSession, Step)> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| DebuggerError::SessionNotFound(id.to_string()))?;
        let step = session.advance().clone();
        Ok((session.clone(), step))
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
