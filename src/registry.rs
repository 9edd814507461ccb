//! Connection registry
//!
//! Named live connections, one of which may be "active" — the connection
//! ad-hoc queries and dialogs operate on by default. The registry is an
//! explicitly constructed value owned by the caller, not process-wide state;
//! whoever needs it gets handed a reference.
//!
//! Every entry owns exactly one session. An entry's session is closed when
//! the entry is removed or replaced, and `close_all` tears everything down at
//! shutdown.

use crate::config::{ConnectionConfig, ConnectionStore};
use crate::db::provider::Database;
use crate::error::DbResult;
use std::collections::HashMap;

/// Registry of named connections backed by a persisted profile store
pub struct ConnectionRegistry<D: Database> {
    connections: HashMap<String, D>,
    /// Invariant: when set, always a key of `connections`
    active: Option<String>,
    store: ConnectionStore,
}

impl<D: Database> ConnectionRegistry<D> {
    pub fn new(store: ConnectionStore) -> Self {
        Self {
            connections: HashMap::new(),
            active: None,
            store,
        }
    }

    /// Open connections for every saved profile.
    ///
    /// A profile that fails to connect is logged and skipped; it cannot block
    /// the rest. The first successfully opened connection becomes active.
    pub async fn load_saved(&mut self) {
        let saved = match self.store.load() {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(error = %e, "could not load saved connections");
                return;
            }
        };

        for config in saved {
            let name = config.display_name();
            match D::connect(&config).await {
                Ok(connection) => {
                    self.connections.insert(name.clone(), connection);
                    if self.active.is_none() {
                        self.active = Some(name);
                    }
                }
                Err(e) => {
                    tracing::warn!(connection = %name, error = %e, "skipping saved connection");
                }
            }
        }
    }

    /// Connect and register under the config's display name, making it
    /// active. An existing entry of the same name is replaced and its session
    /// closed (last write wins). The profile is then upserted into the store;
    /// a persistence failure is logged but does not fail the add.
    pub async fn add(&mut self, config: ConnectionConfig) -> DbResult<()> {
        let name = config.display_name();
        let connection = D::connect(&config).await?;

        if let Some(mut previous) = self.connections.insert(name.clone(), connection) {
            previous.close().await;
        }
        self.active = Some(name.clone());

        if let Err(e) = self.store.upsert(&config) {
            tracing::warn!(connection = %name, error = %e, "could not persist connection");
        }
        Ok(())
    }

    /// The active connection, if any
    pub fn get_active(&self) -> Option<&D> {
        self.connections.get(self.active.as_deref()?)
    }

    /// Name of the active connection, if any
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Make `name` active; false (and no change) if it isn't registered
    pub fn set_active(&mut self, name: &str) -> bool {
        if self.connections.contains_key(name) {
            self.active = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn get(&self, name: &str) -> Option<&D> {
        self.connections.get(name)
    }

    /// Close and drop the named entry. When it was active, active becomes
    /// none — no other entry is promoted.
    pub async fn remove(&mut self, name: &str) -> bool {
        match self.connections.remove(name) {
            Some(mut connection) => {
                connection.close().await;
                if self.active.as_deref() == Some(name) {
                    self.active = None;
                }
                true
            }
            None => false,
        }
    }

    /// Close every session and clear the registry; used at shutdown
    pub async fn close_all(&mut self) {
        for (_, mut connection) in self.connections.drain() {
            connection.close().await;
        }
        self.active = None;
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.connections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Entries in name order, for the browser walk
    pub fn iter(&self) -> impl Iterator<Item = (&str, &D)> {
        let mut entries: Vec<(&str, &D)> = self
            .connections
            .iter()
            .map(|(name, conn)| (name.as_str(), conn))
            .collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries.into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }
}
