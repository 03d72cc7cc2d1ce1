//! Application shell: session gate, composing view, results view.
//!
//! The shell owns the [`SessionContext`], the [`RequestController`] and the
//! mounted [`ResultsView`]. Losing the session (explicit sign-out or an
//! observed change) resets the controller, which also discards any analysis
//! still in flight.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::analysis::{AnalysisResult, Analyzer, BurnoutAnalyzer, GeminiBackend};
use crate::config::{IDENTITY_API_KEY_ENV, NeuraConfig};
use crate::feedback::{FileStore, PreferenceStore};
use crate::lifecycle::{ControllerSnapshot, RequestController, SubmitOutcome, View};
use crate::results::ResultsView;
use crate::session::{
    AuthFault, AuthForm, IdentityProvider, IdentityToolkitProvider, Session, SessionContext,
};

/// What the host should draw.
#[derive(Debug)]
pub enum Screen<'a> {
    /// Waiting for the first session value.
    Loading,
    SignIn(&'a AuthForm),
    Composing(ControllerSnapshot),
    Results(&'a ResultsView),
}

pub struct App {
    identity: Arc<dyn IdentityProvider>,
    preferences: Arc<dyn PreferenceStore>,
    session: SessionContext,
    controller: RequestController,
    auth_form: AuthForm,
    results: Option<ResultsView>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("session", &self.session)
            .field("controller", &self.controller)
            .field("results", &self.results.is_some())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Build the shell and start observing the session.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        analyzer: Arc<dyn Analyzer>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        let mut session = SessionContext::new();
        session.observe(identity.as_ref());
        Self {
            identity,
            preferences,
            session,
            controller: RequestController::new(analyzer),
            auth_form: AuthForm::new(),
            results: None,
        }
    }

    /// Build the shell over the hosted services named in `config`: Gemini
    /// for analysis, Identity Toolkit for accounts, and a preference file
    /// in the data directory.
    pub fn from_config(config: &NeuraConfig) -> Result<Self> {
        let backend = GeminiBackend::new(&config.gemini).context("failed to build Gemini client")?;
        let identity = IdentityToolkitProvider::from_config(&config.identity).with_context(|| {
            format!("identity API key not found; set {IDENTITY_API_KEY_ENV} or add `api_key` under [identity]")
        })?;
        let preferences = FileStore::in_dir(&config.data_dir);
        info!(
            model = %config.gemini.model,
            preferences = %preferences.path().display(),
            "app configured"
        );
        Ok(Self::new(
            Arc::new(identity),
            Arc::new(BurnoutAnalyzer::new(Arc::new(backend))),
            Arc::new(preferences),
        ))
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Handle to the controller, for input events while a submit is pending.
    pub fn controller(&self) -> &RequestController {
        &self.controller
    }

    pub fn auth_form_mut(&mut self) -> &mut AuthForm {
        &mut self.auth_form
    }

    pub fn results_mut(&mut self) -> Option<&mut ResultsView> {
        self.results.as_mut()
    }

    /// The screen to draw. The results view is mounted from the same
    /// controller snapshot the choice is made on, so a submission completed
    /// through a cloned controller shows up here without a separate sync.
    pub fn screen(&mut self) -> Screen<'_> {
        if !self.session.is_resolved() {
            return Screen::Loading;
        }
        if self.session.session().is_none() {
            return Screen::SignIn(&self.auth_form);
        }
        let snapshot = self.controller.snapshot();
        if snapshot.view == View::Results {
            if let Some(result) = snapshot.result.clone() {
                return Screen::Results(self.mount_results(result));
            }
        }
        self.results = None;
        Screen::Composing(snapshot)
    }

    /// Apply any pending session change without waiting.
    pub fn sync_session(&mut self) {
        if self.session.sync() {
            self.on_session_changed();
        }
    }

    /// Wait for the next session change and apply it. Returns `false` once
    /// the provider has gone away.
    pub async fn next_session_change(&mut self) -> bool {
        let alive = self.session.changed().await;
        if alive {
            self.on_session_changed();
        }
        alive
    }

    fn on_session_changed(&mut self) {
        if self.session.session().is_none() {
            self.clear_lifecycle();
        }
    }

    /// Submit through the authentication form.
    pub async fn authenticate(&mut self) -> Result<Session, AuthFault> {
        let result = self.auth_form.submit(self.identity.as_ref()).await;
        self.sync_session();
        result
    }

    /// Submit the current entry and mount the results view on success.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let outcome = self.controller.submit().await;
        self.sync_results();
        outcome
    }

    /// Mount or unmount the results view to match the controller. Hosts
    /// that submit through a cloned controller call this afterwards.
    pub fn sync_results(&mut self) {
        let snapshot = self.controller.snapshot();
        match snapshot.result {
            Some(result) if snapshot.view == View::Results => {
                self.mount_results(result);
            }
            _ => self.results = None,
        }
    }

    /// Keep the mounted view if it already shows `result`, else mount anew.
    fn mount_results(&mut self, result: Arc<AnalysisResult>) -> &ResultsView {
        let view = match self.results.take() {
            Some(view) if view.shows(&result) => view,
            _ => ResultsView::mount(result, Arc::clone(&self.preferences)),
        };
        self.results.insert(view)
    }

    /// "Start Over": back to an empty composing view.
    pub fn start_over(&mut self) {
        self.clear_lifecycle();
    }

    /// Sign out and reset. Provider failures are logged; the local state is
    /// reset regardless.
    pub async fn sign_out(&mut self) {
        if let Err(e) = self.identity.sign_out().await {
            warn!(error = %e, "sign-out failed");
        }
        info!("signed out");
        self.clear_lifecycle();
        self.sync_session();
    }

    fn clear_lifecycle(&mut self) {
        self.controller.reset();
        self.results = None;
    }
}
