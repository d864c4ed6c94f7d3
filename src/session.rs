//! Local user identification.
//!
//! There is no authentication: the username is only a label stored under
//! `taskTracker_user` so the dashboard can greet the user.

use crate::error::{Error, Result};
use crate::storage::Persistence;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    LoggedOut,
    LoggedIn(String),
}

impl Session {
    pub fn username(&self) -> Option<&str> {
        match self {
            Session::LoggedOut => None,
            Session::LoggedIn(name) => Some(name),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, Session::LoggedIn(_))
    }
}

#[derive(Debug)]
pub struct SessionController {
    state: Session,
    persistence: Persistence,
    min_len: usize,
}

impl SessionController {
    /// Restore the session from storage.
    pub fn restore(persistence: Persistence, min_len: usize) -> Self {
        let state = match persistence.load_username() {
            Some(name) => Session::LoggedIn(name),
            None => Session::LoggedOut,
        };
        Self {
            state,
            persistence,
            min_len: min_len.max(1),
        }
    }

    pub fn state(&self) -> &Session {
        &self.state
    }

    pub fn username(&self) -> Option<&str> {
        self.state.username()
    }

    /// Check a candidate username without changing state.
    pub fn validate(&self, name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("Username is required".to_string()));
        }
        if trimmed.chars().count() < self.min_len {
            return Err(Error::Validation(format!(
                "Username must be at least {} characters",
                self.min_len
            )));
        }
        Ok(trimmed.to_string())
    }

    pub fn login(&mut self, name: &str) -> Result<&str> {
        let name = self.validate(name)?;
        self.persistence.store_username(&name)?;
        tracing::debug!(user = %name, "logged in");
        self.state = Session::LoggedIn(name);
        Ok(self.username().unwrap_or_default())
    }

    /// Forget the stored username. Always ends logged out.
    pub fn logout(&mut self) -> Result<()> {
        self.state = Session::LoggedOut;
        self.persistence.clear_username()?;
        tracing::debug!("logged out");
        Ok(())
    }
}
