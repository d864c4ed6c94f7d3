//! Application root: session plus, when logged in, the dashboard.

use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::error::{Error, Result};
use crate::session::{Session, SessionController};
use crate::storage::Persistence;

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
}

#[derive(Debug)]
pub struct App {
    session: SessionController,
    dashboard: Option<Dashboard>,
    persistence: Persistence,
    config: Config,
}

impl App {
    /// Restore the session and, if logged in, load the dashboard.
    pub fn open(persistence: Persistence, config: Config) -> Self {
        let session =
            SessionController::restore(persistence.clone(), config.session.min_username_len);
        let dashboard = session
            .state()
            .is_logged_in()
            .then(|| Dashboard::load(persistence.clone()));
        Self {
            session,
            dashboard,
            persistence,
            config,
        }
    }

    pub fn view(&self) -> View {
        match self.session.state() {
            Session::LoggedOut => View::Login,
            Session::LoggedIn(_) => View::Dashboard,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn username(&self) -> Option<&str> {
        self.session.username()
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }

    pub fn dashboard_mut(&mut self) -> Result<&mut Dashboard> {
        self.dashboard.as_mut().ok_or(Error::NotLoggedIn)
    }

    pub fn login(&mut self, name: &str) -> Result<String> {
        let name = self.session.login(name)?.to_string();
        self.dashboard = Some(Dashboard::load(self.persistence.clone()));
        Ok(name)
    }

    /// Log out and drop the dashboard with its filter state.
    pub fn logout(&mut self) -> Result<()> {
        self.dashboard = None;
        self.session.logout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskInput;

    #[test]
    fn view_follows_session() {
        let mut app = App::open(Persistence::in_memory(), Config::default());
        assert_eq!(app.view(), View::Login);
        assert!(matches!(app.dashboard_mut(), Err(Error::NotLoggedIn)));

        app.login("alice").expect("login");
        assert_eq!(app.view(), View::Dashboard);
        assert!(app.dashboard().is_some());

        app.logout().expect("logout");
        assert_eq!(app.view(), View::Login);
        assert!(app.dashboard().is_none());
    }

    #[test]
    fn failed_login_keeps_login_view() {
        let mut app = App::open(Persistence::in_memory(), Config::default());
        assert!(app.login("a").is_err());
        assert_eq!(app.view(), View::Login);
    }

    #[test]
    fn reopen_restores_session_and_tasks() {
        let persistence = Persistence::in_memory();
        let mut app = App::open(persistence.clone(), Config::default());
        app.login("alice").expect("login");
        app.dashboard_mut()
            .expect("dashboard")
            .create(TaskInput::new("Buy milk"))
            .expect("create");

        let reopened = App::open(persistence, Config::default());
        assert_eq!(reopened.view(), View::Dashboard);
        assert_eq!(reopened.username(), Some("alice"));
        assert_eq!(reopened.dashboard().expect("dashboard").tasks().len(), 1);
    }

    #[test]
    fn filter_state_resets_across_logins() {
        let mut app = App::open(Persistence::in_memory(), Config::default());
        app.login("alice").expect("login");
        app.dashboard_mut().expect("dashboard").filter_mut().set_query("milk");
        app.logout().expect("logout");
        app.login("alice").expect("login");
        assert!(app.dashboard().expect("dashboard").filter().query.is_empty());
    }
}
