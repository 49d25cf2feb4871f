use std::sync::Arc;

use dashmap::DashMap;

use crate::common::types::SessionKey;
use crate::player::{self, PlayerDeps, PlayerHandle};

/// Maps a session key to its playback session, creating on first use.
///
/// Sessions live for the rest of the process once created — there is no
/// eviction, so a long-running process accumulates one actor per
/// distinct key ever seen. Deliberate for now; revisit if key
/// cardinality becomes a problem.
pub struct SessionRegistry {
  sessions: DashMap<SessionKey, PlayerHandle>,
  deps: Arc<PlayerDeps>,
}

impl SessionRegistry {
  pub fn new(deps: PlayerDeps) -> Self {
    Self {
      sessions: DashMap::new(),
      deps: Arc::new(deps),
    }
  }

  /// Returns the session for `key`, spawning its actor on first use.
  pub fn get_or_create(&self, key: &SessionKey) -> PlayerHandle {
    self
      .sessions
      .entry(key.clone())
      .or_insert_with(|| player::spawn(key.clone(), self.deps.clone()))
      .clone()
  }

  pub fn get(&self, key: &SessionKey) -> Option<PlayerHandle> {
    self.sessions.get(key).map(|entry| entry.clone())
  }

  pub fn len(&self) -> usize {
    self.sessions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sessions.is_empty()
  }
}
