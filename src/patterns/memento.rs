//! Memento: database snapshots used as transaction backups.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MementoError {
    #[error("key not found: {0}")]
    KeyNotFound(String),
    #[error("no backup available for rollback")]
    NoBackup,
}

/// Opaque snapshot; only the database can read it back.
#[derive(Debug, Clone)]
pub struct DatabaseMemento {
    state: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct Database {
    records: BTreeMap<String, String>,
}

impl Database {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.records.insert(key.into(), value.into());
    }

    pub fn update(&mut self, key: &str, value: impl Into<String>) -> Result<(), MementoError> {
        let slot = self
            .records
            .get_mut(key)
            .ok_or_else(|| MementoError::KeyNotFound(key.to_string()))?;
        *slot = value.into();
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<String, MementoError> {
        self.records
            .remove(key)
            .ok_or_else(|| MementoError::KeyNotFound(key.to_string()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.records.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn create_memento(&self) -> DatabaseMemento {
        DatabaseMemento {
            state: self.records.clone(),
        }
    }

    pub fn restore(&mut self, memento: DatabaseMemento) {
        self.records = memento.state;
    }

    pub fn display(&self) -> Vec<String> {
        if self.records.is_empty() {
            return vec!["Database is empty".to_string()];
        }
        self.records
            .iter()
            .map(|(k, v)| format!("{k} = {v}"))
            .collect()
    }
}

/// Caretaker holding at most one backup.
#[derive(Debug, Default)]
pub struct TransactionManager {
    backup: Option<DatabaseMemento>,
}

impl TransactionManager {
    pub fn begin(&mut self, db: &Database) {
        debug!(records = db.len(), "transaction started");
        self.backup = Some(db.create_memento());
    }

    pub fn commit(&mut self) {
        self.backup = None;
    }

    pub fn rollback(&mut self, db: &mut Database) -> Result<(), MementoError> {
        let backup = self.backup.take().ok_or(MementoError::NoBackup)?;
        db.restore(backup);
        debug!(records = db.len(), "transaction rolled back");
        Ok(())
    }

    pub fn in_transaction(&self) -> bool {
        self.backup.is_some()
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    let mut db = Database::default();
    let mut tx = TransactionManager::default();

    t.heading("Memento: committed transaction");
    tx.begin(&db);
    db.insert("user1", "Abhisek");
    db.insert("user2", "Gaurav");
    tx.commit();
    t.extend(db.display());

    t.heading("Memento: failed transaction");
    tx.begin(&db);
    db.insert("user3", "Saurav");
    db.insert("user4", "Manish");
    t.extend(db.display());
    t.line("ERROR: something went wrong during the transaction");
    tx.rollback(&mut db)?;
    t.extend(db.display());

    if let Err(e) = tx.rollback(&mut db) {
        t.line(format!("second rollback: {e}"));
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollback_restores_snapshot() {
        let mut db = Database::default();
        let mut tx = TransactionManager::default();
        db.insert("a", "1");

        tx.begin(&db);
        db.insert("b", "2");
        db.update("a", "changed").unwrap();
        tx.rollback(&mut db).unwrap();

        assert_eq!(db.len(), 1);
        assert_eq!(db.get("a"), Some("1"));
        assert!(!tx.in_transaction());
    }

    #[test]
    fn test_commit_discards_backup() {
        let mut db = Database::default();
        let mut tx = TransactionManager::default();
        tx.begin(&db);
        db.insert("a", "1");
        tx.commit();

        assert_eq!(tx.rollback(&mut db), Err(MementoError::NoBackup));
        assert_eq!(db.get("a"), Some("1"));
    }

    #[test]
    fn test_update_and_remove_missing_keys() {
        let mut db = Database::default();
        assert_eq!(
            db.update("x", "y"),
            Err(MementoError::KeyNotFound("x".into()))
        );
        assert!(db.remove("x").is_err());
        db.insert("x", "1");
        assert_eq!(db.remove("x"), Ok("1".to_string()));
        assert_eq!(db.display(), vec!["Database is empty"]);
    }
}
