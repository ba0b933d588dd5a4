//! The connection registry: pending connections and the active roster.
//!
//! # Concurrency note
//!
//! `ConnectionRegistry` is plain data with no locking. It is owned by the
//! event loop and only ever touched from that one task.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wordforge_transport::ConnectionId;

use crate::{Connection, SessionError};

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Where a newly promoted player lands in the turn order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOrder {
    /// Inserted at the head: the newest player is first in turn order.
    #[default]
    MostRecentFirst,
    /// Appended at the tail: players take turns in the order they joined.
    OldestFirst,
}

/// Limits and ordering for a [`ConnectionRegistry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Longest accepted name, in characters.
    pub max_name_len: usize,

    /// Turn-order position of newly promoted players.
    pub join_order: JoinOrder,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_name_len: 30,
            join_order: JoinOrder::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectionRegistry
// ---------------------------------------------------------------------------

/// Which collection currently holds a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Pending,
    Active,
}

/// Owns every live connection.
///
/// ```text
/// insert_pending() ──→ [Pending] ──promote()──→ [Active]
///                          │                        │
///                          └──────── remove() ──────┘
/// ```
///
/// A connection is in at most one collection. The order of the active
/// roster is the turn order.
#[derive(Debug)]
pub struct ConnectionRegistry {
    pending: HashMap<ConnectionId, Connection>,
    pub(crate) active: Vec<Connection>,
    config: RegistryConfig,
}

impl ConnectionRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            pending: HashMap::new(),
            active: Vec::new(),
            config,
        }
    }

    /// Adds a freshly accepted connection to the pending collection.
    pub fn insert_pending(&mut self, conn: Connection) {
        tracing::debug!(conn_id = %conn.id(), addr = %conn.addr(), "connection pending");
        self.pending.insert(conn.id(), conn);
    }

    /// Checks a proposed name against the length limit and the roster.
    pub fn validate_name(&self, name: &str) -> Result<(), SessionError> {
        if name.is_empty() {
            return Err(SessionError::NameEmpty);
        }
        let len = name.chars().count();
        if len > self.config.max_name_len {
            return Err(SessionError::NameTooLong {
                len,
                max: self.config.max_name_len,
            });
        }
        if self.active.iter().any(|c| c.name() == Some(name)) {
            return Err(SessionError::NameTaken(name.to_string()));
        }
        Ok(())
    }

    /// Moves a pending connection into the active roster under `name`.
    ///
    /// # Errors
    /// - [`SessionError::AlreadyActive`]: `id` was promoted earlier.
    /// - [`SessionError::NotFound`]: `id` is not pending.
    /// - [`SessionError::NameEmpty`], [`SessionError::NameTooLong`],
    ///   [`SessionError::NameTaken`]: the name is rejected and the
    ///   connection stays pending.
    pub fn promote(
        &mut self,
        id: ConnectionId,
        name: &str,
    ) -> Result<(), SessionError> {
        if self.position(id).is_some() {
            return Err(SessionError::AlreadyActive(id));
        }
        if !self.pending.contains_key(&id) {
            return Err(SessionError::NotFound(id));
        }
        self.validate_name(name)?;

        let mut conn = self
            .pending
            .remove(&id)
            .ok_or(SessionError::NotFound(id))?;
        conn.set_name(name.to_string());

        match self.config.join_order {
            JoinOrder::MostRecentFirst => self.active.insert(0, conn),
            JoinOrder::OldestFirst => self.active.push(conn),
        }
        tracing::info!(conn_id = %id, name, players = self.active.len(), "player joined");
        Ok(())
    }

    /// Takes a connection out of whichever collection holds it.
    ///
    /// Returns `None` if it was already gone, so removal is idempotent.
    /// Dropping the returned value closes the socket.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Connection> {
        if let Some(conn) = self.pending.remove(&id) {
            return Some(conn);
        }
        let index = self.position(id)?;
        Some(self.active.remove(index))
    }

    /// Reports which collection holds `id`, if any.
    pub fn membership(&self, id: ConnectionId) -> Option<Membership> {
        if self.pending.contains_key(&id) {
            Some(Membership::Pending)
        } else if self.position(id).is_some() {
            Some(Membership::Active)
        } else {
            None
        }
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        match self.pending.get(&id) {
            Some(conn) => Some(conn),
            None => self.active.iter().find(|c| c.id() == id),
        }
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        match self.pending.get_mut(&id) {
            Some(conn) => Some(conn),
            None => self.active.iter_mut().find(|c| c.id() == id),
        }
    }

    /// The name of an active player.
    pub fn name_of(&self, id: ConnectionId) -> Option<&str> {
        self.active
            .iter()
            .find(|c| c.id() == id)
            .and_then(Connection::name)
    }

    /// Active connection ids, in turn order.
    pub fn active_ids(&self) -> Vec<ConnectionId> {
        self.active.iter().map(Connection::id).collect()
    }

    /// The head of the turn order.
    pub fn first_active(&self) -> Option<ConnectionId> {
        self.active.first().map(Connection::id)
    }

    /// The player after `id` in turn order, wrapping to the head.
    ///
    /// With a single player this is `id` itself. If `id` is not active the
    /// head is returned. `None` only when the roster is empty.
    pub fn next_active_after(&self, id: ConnectionId) -> Option<ConnectionId> {
        let next = match self.position(id) {
            Some(index) => self.active.get(index + 1),
            None => None,
        };
        next.or_else(|| self.active.first()).map(Connection::id)
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if no connection of either kind is registered.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.active.is_empty()
    }

    fn position(&self, id: ConnectionId) -> Option<usize> {
        self.active.iter().position(|c| c.id() == id)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `ConnectionRegistry`, named
    //! `test_{function}_{scenario}_{expected}`.

    use super::*;
    use tokio::sync::mpsc;
    use wordforge_protocol::AssemblerConfig;
    use wordforge_transport::Peer;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    /// A connection whose output channel is dropped on the floor.
    fn conn(id: u64) -> Connection {
        let (tx, _rx) = mpsc::channel(64);
        let peer = Peer::from_channel(
            cid(id),
            format!("127.0.0.1:{}", 6000 + id).parse().unwrap(),
            tx,
        );
        Connection::new(peer, AssemblerConfig::default())
    }

    fn registry_with_pending(ids: &[u64]) -> ConnectionRegistry {
        let mut reg = ConnectionRegistry::default();
        for &id in ids {
            reg.insert_pending(conn(id));
        }
        reg
    }

    // =====================================================================
    // promote()
    // =====================================================================

    #[test]
    fn test_promote_pending_connection_becomes_active() {
        let mut reg = registry_with_pending(&[1]);

        reg.promote(cid(1), "alice").expect("should promote");

        assert_eq!(reg.membership(cid(1)), Some(Membership::Active));
        assert_eq!(reg.name_of(cid(1)), Some("alice"));
        assert_eq!(reg.pending_len(), 0);
        assert_eq!(reg.active_len(), 1);
    }

    #[test]
    fn test_promote_duplicate_name_returns_name_taken() {
        let mut reg = registry_with_pending(&[1, 2]);
        reg.promote(cid(1), "bob").unwrap();

        let result = reg.promote(cid(2), "bob");

        assert_eq!(result, Err(SessionError::NameTaken("bob".into())));
        assert_eq!(reg.membership(cid(2)), Some(Membership::Pending));
        assert_eq!(reg.active_len(), 1);
    }

    #[test]
    fn test_promote_long_name_returns_name_too_long() {
        let mut reg = registry_with_pending(&[1]);
        let name = "x".repeat(31);

        let result = reg.promote(cid(1), &name);

        assert_eq!(result, Err(SessionError::NameTooLong { len: 31, max: 30 }));
        assert_eq!(reg.membership(cid(1)), Some(Membership::Pending));
    }

    #[test]
    fn test_promote_name_at_limit_succeeds() {
        let mut reg = registry_with_pending(&[1]);

        assert!(reg.promote(cid(1), &"x".repeat(30)).is_ok());
    }

    #[test]
    fn test_promote_empty_name_returns_name_empty() {
        let mut reg = registry_with_pending(&[1]);

        assert_eq!(reg.promote(cid(1), ""), Err(SessionError::NameEmpty));
    }

    #[test]
    fn test_promote_unknown_connection_returns_not_found() {
        let mut reg = ConnectionRegistry::default();

        assert_eq!(
            reg.promote(cid(9), "zed"),
            Err(SessionError::NotFound(cid(9)))
        );
    }

    #[test]
    fn test_promote_twice_returns_already_active() {
        let mut reg = registry_with_pending(&[1]);
        reg.promote(cid(1), "alice").unwrap();

        assert_eq!(
            reg.promote(cid(1), "alice2"),
            Err(SessionError::AlreadyActive(cid(1)))
        );
    }

    #[test]
    fn test_promote_most_recent_first_inserts_at_head() {
        let mut reg = registry_with_pending(&[1, 2, 3]);
        reg.promote(cid(1), "a").unwrap();
        reg.promote(cid(2), "b").unwrap();
        reg.promote(cid(3), "c").unwrap();

        assert_eq!(reg.active_ids(), vec![cid(3), cid(2), cid(1)]);
        assert_eq!(reg.first_active(), Some(cid(3)));
    }

    #[test]
    fn test_promote_oldest_first_appends_at_tail() {
        let mut reg = ConnectionRegistry::new(RegistryConfig {
            join_order: JoinOrder::OldestFirst,
            ..RegistryConfig::default()
        });
        for id in 1..=3 {
            reg.insert_pending(conn(id));
            reg.promote(cid(id), &format!("p{id}")).unwrap();
        }

        assert_eq!(reg.active_ids(), vec![cid(1), cid(2), cid(3)]);
    }

    // =====================================================================
    // remove()
    // =====================================================================

    #[test]
    fn test_remove_pending_and_active_then_again_is_noop() {
        let mut reg = registry_with_pending(&[1, 2]);
        reg.promote(cid(2), "bee").unwrap();

        assert!(reg.remove(cid(1)).is_some());
        assert!(reg.remove(cid(2)).is_some());
        assert!(reg.remove(cid(1)).is_none());
        assert!(reg.remove(cid(2)).is_none());
        assert!(reg.is_empty());
        assert_eq!(reg.membership(cid(1)), None);
    }

    #[test]
    fn test_remove_frees_name_for_reuse() {
        let mut reg = registry_with_pending(&[1, 2]);
        reg.promote(cid(1), "bob").unwrap();
        reg.remove(cid(1));

        assert!(reg.promote(cid(2), "bob").is_ok());
    }

    // =====================================================================
    // next_active_after()
    // =====================================================================

    #[test]
    fn test_next_active_after_moves_forward_and_wraps() {
        let mut reg = ConnectionRegistry::new(RegistryConfig {
            join_order: JoinOrder::OldestFirst,
            ..RegistryConfig::default()
        });
        for id in 1..=3 {
            reg.insert_pending(conn(id));
            reg.promote(cid(id), &format!("p{id}")).unwrap();
        }

        assert_eq!(reg.next_active_after(cid(1)), Some(cid(2)));
        assert_eq!(reg.next_active_after(cid(2)), Some(cid(3)));
        assert_eq!(reg.next_active_after(cid(3)), Some(cid(1)));
    }

    #[test]
    fn test_next_active_after_single_player_returns_self() {
        let mut reg = registry_with_pending(&[1]);
        reg.promote(cid(1), "solo").unwrap();

        assert_eq!(reg.next_active_after(cid(1)), Some(cid(1)));
    }

    #[test]
    fn test_next_active_after_unknown_returns_head_or_none() {
        let mut reg = registry_with_pending(&[1]);
        assert_eq!(reg.next_active_after(cid(1)), None);

        reg.promote(cid(1), "solo").unwrap();
        assert_eq!(reg.next_active_after(cid(42)), Some(cid(1)));
    }

    #[test]
    fn test_get_mut_finds_both_collections() {
        let mut reg = registry_with_pending(&[1, 2]);
        reg.promote(cid(2), "two").unwrap();

        assert_eq!(reg.get_mut(cid(1)).map(|c| c.id()), Some(cid(1)));
        assert_eq!(reg.get(cid(2)).and_then(Connection::name), Some("two"));
        assert!(reg.get(cid(3)).is_none());
    }
}
