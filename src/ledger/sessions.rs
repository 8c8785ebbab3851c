use super::SessionLedger;
use crate::error::Rejection;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Named counting sessions ("dossiers") sharing one catalog.
///
/// Always holds at least one session, and exactly one is current.
#[derive(Debug, Clone)]
pub struct Sessions {
    ledgers: BTreeMap<String, SessionLedger>,
    current: String,
}

impl Sessions {
    pub fn new(initial: &str) -> Result<Self, Rejection> {
        let name = valid_name(initial)?;
        let mut ledgers = BTreeMap::new();
        ledgers.insert(name.clone(), SessionLedger::new());
        Ok(Self {
            ledgers,
            current: name,
        })
    }

    /// Add an empty session and make it current.
    pub fn create_session(&mut self, name: &str) -> Result<(), Rejection> {
        let name = valid_name(name)?;
        if self.ledgers.contains_key(&name) {
            return Err(Rejection::DuplicateSession(name));
        }
        self.ledgers.insert(name.clone(), SessionLedger::new());
        info!("Created session '{}'", name);
        self.current = name;
        Ok(())
    }

    pub fn reset_session(&mut self, name: &str) -> Result<(), Rejection> {
        let ledger = self
            .ledgers
            .get_mut(name)
            .ok_or_else(|| Rejection::UnknownSession(name.to_string()))?;
        ledger.reset();
        info!("Reset session '{}'", name);
        Ok(())
    }

    /// Remove a session. If it was current, the first remaining one by name
    /// becomes current.
    pub fn delete_session(&mut self, name: &str) -> Result<(), Rejection> {
        if !self.ledgers.contains_key(name) {
            return Err(Rejection::UnknownSession(name.to_string()));
        }
        if self.ledgers.len() == 1 {
            return Err(Rejection::LastSession);
        }
        self.ledgers.remove(name);
        if self.current == name {
            if let Some(next) = self.ledgers.keys().next() {
                self.current = next.clone();
            }
            debug!("Current session is now '{}'", self.current);
        }
        info!("Deleted session '{}'", name);
        Ok(())
    }

    pub fn switch_current(&mut self, name: &str) -> Result<(), Rejection> {
        if !self.ledgers.contains_key(name) {
            return Err(Rejection::UnknownSession(name.to_string()));
        }
        self.current = name.to_string();
        debug!("Switched to session '{}'", name);
        Ok(())
    }

    pub fn current_name(&self) -> &str {
        &self.current
    }

    pub fn current(&self) -> &SessionLedger {
        &self.ledgers[&self.current]
    }

    pub fn current_mut(&mut self) -> &mut SessionLedger {
        self.ledgers.entry(self.current.clone()).or_default()
    }

    pub fn get(&self, name: &str) -> Option<&SessionLedger> {
        self.ledgers.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ledgers.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }
}

fn valid_name(name: &str) -> Result<String, Rejection> {
    let name = name.trim();
    if name.is_empty() {
        Err(Rejection::EmptySessionName)
    } else {
        Ok(name.to_string())
    }
}
