//! Shared fakes for NeuraCare integration tests.
//!
//! - [`ScriptedBackend`]: a generative backend replaying canned replies.
//! - [`GatedAnalyzer`]: an analyzer that blocks until released, for
//!   exercising single-flight and late-result handling.
//! - [`FakeIdentity`]: an in-memory account directory.
//! - [`FailingStore`]: a preference store whose every call fails.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Semaphore, watch};

use neuracare_core::analysis::{
    Analysis, AnalysisResult, Analyzer, GenerationError, GenerationRequest, GenerativeBackend,
    PlanStep, StepKind,
};
use neuracare_core::feedback::{PreferenceStore, StoreError};
use neuracare_core::session::{AuthFault, Credentials, IdentityProvider, Session};

// ===========================================================================
// Sample data
// ===========================================================================

/// Entry used across scenario tests.
pub const SAMPLE_ENTRY: &str = "I'm exhausted and can't focus anymore.";

/// A three-step plan whose second step is a breathing exercise.
pub fn sample_result() -> AnalysisResult {
    AnalysisResult {
        analysis: Analysis {
            sentiment: "Signs of Emotional Exhaustion".to_string(),
            summary: "It sounds like you have been running on empty for a while.".to_string(),
        },
        plan: vec![
            PlanStep {
                step: 1,
                title: "Pause and Notice".to_string(),
                description: "Take five minutes away from your screen.".to_string(),
                kind: StepKind::Text,
            },
            PlanStep {
                step: 2,
                title: "Mindful Breathing".to_string(),
                description: "Follow the circle.".to_string(),
                kind: StepKind::Breathing,
            },
            PlanStep {
                step: 3,
                title: "Digital Sunset".to_string(),
                description: "Put devices away an hour before bed.".to_string(),
                kind: StepKind::Text,
            },
        ],
    }
}

/// [`sample_result`] as the JSON text a backend would return.
pub fn sample_json() -> String {
    serde_json::json!({
        "analysis": {
            "sentiment": "Signs of Emotional Exhaustion",
            "summary": "It sounds like you have been running on empty for a while."
        },
        "plan": [
            {"step": 1, "title": "Pause and Notice", "description": "Take five minutes away from your screen.", "type": "text"},
            {"step": 2, "title": "Mindful Breathing", "description": "Follow the circle.", "type": "breathing"},
            {"step": 3, "title": "Digital Sunset", "description": "Put devices away an hour before bed."}
        ]
    })
    .to_string()
}

// ===========================================================================
// Generative backend
// ===========================================================================

/// One canned backend reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Status(u16),
    Empty,
}

/// Backend that pops replies from a script; an exhausted script answers
/// [`Reply::Empty`].
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front().unwrap_or(Reply::Empty);
        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Status(status) => Err(GenerationError::Status {
                status,
                body: String::new(),
            }),
            Reply::Empty => Err(GenerationError::EmptyResponse),
        }
    }
}

// ===========================================================================
// Analyzer
// ===========================================================================

/// Analyzer whose calls block until [`release`](Self::release)d.
#[derive(Debug)]
pub struct GatedAnalyzer {
    gate: Semaphore,
    calls: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
    seen: Mutex<Vec<String>>,
    result: AnalysisResult,
}

impl GatedAnalyzer {
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            result,
        }
    }

    /// Let `n` pending or future calls complete.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    /// Calls running right now.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Most calls ever running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Decrements the active count even if the call is dropped mid-await.
struct Active<'a>(&'a AtomicUsize);

impl Drop for Active<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Analyzer for GatedAnalyzer {
    async fn analyze(&self, text: &str) -> AnalysisResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(text.to_string());
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _active = Active(&self.active);
        self.gate
            .acquire()
            .await
            .expect("gate semaphore is never closed")
            .forget();
        self.result.clone()
    }
}

// ===========================================================================
// Identity
// ===========================================================================

/// In-memory account directory mirroring hosted-provider rules.
#[derive(Debug)]
pub struct FakeIdentity {
    accounts: Mutex<HashMap<String, (String, Session)>>,
    session_tx: watch::Sender<Option<Session>>,
    fail_sign_out: AtomicBool,
}

impl Default for FakeIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeIdentity {
    pub fn new() -> Self {
        let (session_tx, _rx) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session_tx,
            fail_sign_out: AtomicBool::new(false),
        }
    }

    /// Register an account without signing in.
    pub fn with_account(self, email: &str, password: &str, display_name: Option<&str>) -> Self {
        let session = Session {
            uid: format!("uid-{email}"),
            email: Some(email.to_string()),
            display_name: display_name.map(str::to_string),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (password.to_string(), session));
        self
    }

    /// Publish a session change, as a provider would on token expiry.
    pub fn force_session(&self, session: Option<Session>) {
        self.session_tx.send_replace(session);
    }

    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthFault> {
        let session = {
            let accounts = self.accounts.lock().unwrap();
            match accounts.get(&credentials.email) {
                Some((password, session)) if *password == credentials.password => session.clone(),
                _ => return Err(AuthFault::InvalidCredentials),
            }
        };
        self.session_tx.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<Session, AuthFault> {
        if !credentials.email.contains('@') {
            return Err(AuthFault::InvalidEmail);
        }
        if credentials.password.chars().count() < 6 {
            return Err(AuthFault::WeakPassword);
        }
        let session = {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(&credentials.email) {
                return Err(AuthFault::EmailAlreadyInUse);
            }
            let session = Session {
                uid: format!("uid-{}", credentials.email),
                email: Some(credentials.email.clone()),
                display_name: None,
            };
            accounts.insert(
                credentials.email.clone(),
                (credentials.password.clone(), session.clone()),
            );
            session
        };
        self.session_tx.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthFault> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthFault::Unknown);
        }
        self.session_tx.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session_tx.subscribe()
    }
}

// ===========================================================================
// Preference store
// ===========================================================================

/// Store whose reads and writes always fail.
#[derive(Debug, Default)]
pub struct FailingStore {
    writes: AtomicUsize,
}

impl FailingStore {
    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl PreferenceStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }
}
