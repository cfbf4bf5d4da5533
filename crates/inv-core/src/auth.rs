//! Verifier login against the configured allow-list.
//!
//! A session belongs to the verifier who started it. When someone else logs
//! in, [`InventorySession::login`] changes nothing and reports
//! [`LoginOutcome::DifferentUserInProgress`]; the caller then either takes
//! over the session ([`continue_as`](InventorySession::continue_as)) or
//! discards it ([`start_new`](InventorySession::start_new)).
//!
//! Login and logout work in read-only mode so a sealed session can still be
//! opened for review; their changes are then kept in memory only.

use chrono::Utc;
use inv_model::Verifier;

use crate::error::{Result, SessionError};
use crate::events::SessionEvent;
use crate::session::InventorySession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// No session owner yet; `verifier` now owns it.
    LoggedIn(Verifier),
    /// The session owner logged in again.
    Resumed(Verifier),
    /// Another verifier owns the session. Nothing was changed.
    DifferentUserInProgress { current: Verifier, requested: Verifier },
}

impl InventorySession {
    fn verifier(&self, number: &str) -> Result<Verifier> {
        self.auth
            .verifier(number)
            .ok_or_else(|| SessionError::UnknownVerifier {
                number: number.trim().to_string(),
            })
    }

    pub fn current_user(&self) -> Option<&Verifier> {
        self.store.state().current_user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.state().logged_in
    }

    pub fn login(&mut self, number: &str) -> Result<LoginOutcome> {
        let verifier = self.verifier(number)?;

        let outcome = match self.current_user() {
            Some(current) if current.number != verifier.number => {
                tracing::info!(current = %current.number, requested = %verifier.number, "login by another verifier");
                return Ok(LoginOutcome::DifferentUserInProgress {
                    current: current.clone(),
                    requested: verifier,
                });
            }
            Some(_) => LoginOutcome::Resumed(verifier.clone()),
            None => LoginOutcome::LoggedIn(verifier.clone()),
        };

        self.start_session_for(verifier.clone());
        let action = match outcome {
            LoginOutcome::Resumed(_) => "Reanudación de sesión",
            _ => "Inicio de sesión",
        };
        self.log(action, &format!("Usuario: {}", verifier.name));
        tracing::info!(number = %verifier.number, "verifier logged in");
        self.persist();
        Ok(outcome)
    }

    fn start_session_for(&mut self, verifier: Verifier) {
        let state = self.store.state_mut();
        state.current_user = Some(verifier);
        state.logged_in = true;
        state.session_start_time.get_or_insert_with(Utc::now);
    }

    /// Take over the current session's data as another verifier.
    pub fn continue_as(&mut self, number: &str) -> Result<Verifier> {
        let verifier = self.verifier(number)?;
        let previous = self
            .current_user()
            .map_or_else(String::new, |user| user.name.clone());

        self.start_session_for(verifier.clone());
        self.log(
            "Cambio de usuario",
            &format!("De {previous} a {}", verifier.name),
        );
        self.persist();
        Ok(verifier)
    }

    /// Discard the current session and its photos, and start fresh as `number`.
    ///
    /// This also lifts read-only mode.
    pub async fn start_new(&mut self, number: &str) -> Result<Verifier> {
        let verifier = self.verifier(number)?;
        self.blobs.clear_all().await?;

        self.store.state_mut().current_user = Some(verifier.clone());
        self.store.reset(true);
        self.sync_read_only();

        self.log("Sesión reiniciada", &format!("Usuario: {}", verifier.name));
        tracing::info!(number = %verifier.number, "started new session");
        self.emit(SessionEvent::SessionReset);
        self.persist();
        Ok(verifier)
    }

    /// End the verifier's session. Data stays until a new session starts.
    pub fn logout(&mut self) -> Result<()> {
        if !self.store.state().logged_in {
            return Err(SessionError::NotLoggedIn);
        }
        let name = self
            .current_user()
            .map_or_else(String::new, |user| user.name.clone());

        self.log("Cierre de sesión", &format!("Usuario: {name}"));
        self.store.state_mut().logged_in = false;
        self.persist();
        Ok(())
    }
}
