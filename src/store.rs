//! Subscriber persistence — one JSON file, rewritten whole on every change.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::subscriber::Subscriber;

/// All confirmed subscriptions, keyed by Telegram user id.
///
/// Every add/remove rewrites the whole file through a temp-file rename, so a
/// crash mid-save leaves the previous file intact. Blocking file I/O is fine
/// here: the dispatcher is strictly sequential and saves are rare.
#[derive(Debug)]
pub struct SubscriberStore {
    path: PathBuf,
    subscribers: HashMap<i64, Subscriber>,
}

impl SubscriberStore {
    /// Load the store from `path`. A missing file is an empty store, not an
    /// error; an unreadable or unparsable file is.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let subscribers = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        Ok(Self { path, subscribers })
    }

    /// Write all subscribers back to disk atomically.
    pub fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.subscribers)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::Write {
                path: self.path.display().to_string(),
                source,
            })?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let write = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, &self.path));
        write.map_err(|source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Add or replace a subscription and persist immediately.
    pub fn insert(&mut self, sub: Subscriber) -> Result<(), StoreError> {
        self.subscribers.insert(sub.user_id, sub);
        self.save()
    }

    /// Remove a subscription and persist immediately. Returns the removed
    /// entry; an unknown id is a no-op with no file write.
    pub fn remove(&mut self, user_id: i64) -> Result<Option<Subscriber>, StoreError> {
        match self.subscribers.remove(&user_id) {
            Some(sub) => {
                self.save()?;
                Ok(Some(sub))
            }
            None => Ok(None),
        }
    }

    pub fn get(&self, user_id: i64) -> Option<&Subscriber> {
        self.subscribers.get(&user_id)
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.subscribers.contains_key(&user_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscriber> {
        self.subscribers.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Subscriber> {
        self.subscribers.values_mut()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
