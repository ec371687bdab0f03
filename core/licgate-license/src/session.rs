//! License session state.
//!
//! [`LicenseSession`] owns the gating decision for the running process. It is
//! constructed with an injected store and clock, shared as
//! `Arc<LicenseSession>`, and publishes every change through a
//! `tokio::sync::watch` channel so that the gate and any screen showing the
//! expiration date stay in step.
//!
//! The state is never persisted on its own. It is recomputed from the stored
//! record and today's date at startup, and after each manual submission.
//!
//! Store I/O runs on tasks the session spawns itself. A caller that stops
//! awaiting `initialize` or `submit` does not abandon the load or save: the
//! task finishes and still lands its transition.

use crate::error::{StoreError, SubmitError};
use crate::gate::Route;
use crate::key::LicenseClaim;
use crate::record::LicenseRecord;
use crate::store::LicenseRecordStore;
use crate::validity::{Clock, Validity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// The gating decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    /// Startup load has not finished.
    Loading,
    /// No usable license record.
    Unlicensed,
    /// A record exists but its date is before today.
    Expired,
    /// A record exists and its date is today or later.
    Valid,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Loading => "loading",
            Self::Unlicensed => "unlicensed",
            Self::Expired => "expired",
            Self::Valid => "valid",
        };
        f.write_str(s)
    }
}

/// What subscribers see after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current gating decision.
    pub state: GateState,
    /// License key of the saved record (empty when none).
    pub license_key: String,
    /// Expiration date behind the current decision, for display.
    pub validation_date: Option<NaiveDate>,
    /// Claim decoded during this process's last accepted submission.
    pub claim: Option<LicenseClaim>,
    /// A submission is in flight; the UI should disable re-submission.
    pub busy: bool,
    /// Number of submissions that changed the state so far.
    pub submissions: u64,
}

impl SessionSnapshot {
    fn loading() -> Self {
        Self {
            state: GateState::Loading,
            license_key: String::new(),
            validation_date: None,
            claim: None,
            busy: false,
            submissions: 0,
        }
    }

    fn unlicensed() -> Self {
        Self {
            state: GateState::Unlicensed,
            ..Self::loading()
        }
    }
}

/// Configuration for the license session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Where the gate sends the user once a license is accepted.
    pub default_route: Route,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_route: Route::Home,
        }
    }
}

/// Successful result of [`LicenseSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The license was saved and the gate is open.
    Activated {
        /// The decoded claim.
        claim: LicenseClaim,
    },
    /// The license decoded fine but its date has passed; any saved record was cleared.
    Expired {
        /// The date the license stopped granting access.
        expired_on: NaiveDate,
    },
}

impl SubmitOutcome {
    /// Inline message shown next to the license input.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Activated { claim } => format!(
                "license valid until {}",
                claim.expiration_date.format(crate::record::RECORD_DATE_FORMAT)
            ),
            Self::Expired { expired_on } => format!(
                "license expired on {}. Contact the system administrator.",
                expired_on.format(crate::record::RECORD_DATE_FORMAT)
            ),
        }
    }
}

/// Process-wide license state with an injected store and clock.
pub struct LicenseSession {
    core: SessionCore,
    config: SessionConfig,
    /// Set by the first `initialize` call; later calls are no-ops.
    initialize_started: AtomicBool,
}

/// The parts of the session that outlive any single caller.
#[derive(Clone)]
struct SessionCore {
    store: Arc<dyn LicenseRecordStore>,
    clock: Arc<dyn Clock>,
    busy: Arc<AtomicBool>,
    tx: Arc<watch::Sender<SessionSnapshot>>,
}

impl fmt::Debug for LicenseSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenseSession")
            .field("clock", &self.core.clock)
            .field("config", &self.config)
            .field("snapshot", &*self.core.tx.borrow())
            .finish_non_exhaustive()
    }
}

impl LicenseSession {
    /// Creates a session in the `Loading` state with the default configuration.
    pub fn new(store: Arc<dyn LicenseRecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(store, clock, SessionConfig::default())
    }

    /// Creates a session with a custom configuration.
    pub fn with_config(
        store: Arc<dyn LicenseRecordStore>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        let (tx, _) = watch::channel(SessionSnapshot::loading());
        Self {
            core: SessionCore {
                store,
                clock,
                busy: Arc::new(AtomicBool::new(false)),
                tx: Arc::new(tx),
            },
            config,
            initialize_started: AtomicBool::new(false),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the current gating decision.
    pub fn state(&self) -> GateState {
        self.core.tx.borrow().state
    }

    /// Returns a copy of the current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.core.tx.borrow().clone()
    }

    /// Returns true while a submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.core.busy.load(Ordering::Acquire)
    }

    /// Subscribes to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.core.tx.subscribe()
    }

    /// Waits until the session has left `Loading` and returns that snapshot.
    ///
    /// Does not start the load; pair it with [`initialize`](Self::initialize)
    /// or an [`AccessGate`](crate::AccessGate).
    pub async fn wait_until_settled(&self) -> SessionSnapshot {
        let mut rx = self.subscribe();
        match rx.wait_for(|snap| snap.state != GateState::Loading).await {
            Ok(snap) => snap.clone(),
            Err(_) => self.snapshot(),
        }
    }

    // ── Startup ──────────────────────────────────────────────────

    /// Loads the saved record and leaves `Loading`.
    ///
    /// Runs at most once per session. Returns `true` for the call that
    /// started the load and `false` for every other call, including ones
    /// made while the first is still in flight. Dropping the returned future
    /// does not cancel the load.
    pub async fn initialize(&self) -> bool {
        let Some(task) = self.start_initialize() else {
            return false;
        };
        if let Err(e) = task.await {
            error!(error = %e, "License load task failed");
        }
        true
    }

    /// Starts [`initialize`](Self::initialize) without waiting for it.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn_initialize(&self) -> JoinHandle<bool> {
        match self.start_initialize() {
            Some(task) => tokio::spawn(async move {
                if let Err(e) = task.await {
                    error!(error = %e, "License load task failed");
                }
                true
            }),
            None => tokio::spawn(async { false }),
        }
    }

    fn start_initialize(&self) -> Option<JoinHandle<()>> {
        if self.initialize_started.swap(true, Ordering::AcqRel) {
            debug!("License initialize already started; ignoring");
            return None;
        }
        let core = self.core.clone();
        Some(tokio::spawn(async move { core.load_and_apply().await }))
    }

    // ── Manual entry ─────────────────────────────────────────────

    /// Decodes, validates and saves a license string entered by the user.
    ///
    /// The gate state only changes once the store has accepted the write.
    /// Dropping the returned future does not cancel a save already started;
    /// its transition still lands.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::Busy`] if another submission is in flight
    /// - [`SubmitError::Decode`] if the string cannot be decoded
    /// - [`SubmitError::Storage`] if the record could not be saved
    pub async fn submit(&self, license: &str) -> Result<SubmitOutcome, SubmitError> {
        let busy = BusyGuard::acquire(&self.core).ok_or(SubmitError::Busy)?;

        let license = license.trim().to_string();
        let claim = LicenseClaim::decode(&license)?;

        let core = self.core.clone();
        let task = tokio::spawn(async move {
            let _busy = busy;
            core.save_and_apply(license, claim).await
        });
        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "License save task failed");
                Err(SubmitError::Storage(StoreError::Unavailable(e.to_string())))
            }
        }
    }
}

impl SessionCore {
    async fn load_and_apply(&self) {
        let next = match self.store.load().await {
            Ok(record) => self.evaluate_record(record),
            Err(e) => {
                warn!(error = %e, "Failed to load license record; treating as unlicensed");
                SessionSnapshot::unlicensed()
            }
        };

        // A submission that finished during the load has already decided.
        let mut prev = GateState::Loading;
        let applied = self.tx.send_if_modified(|snap| {
            prev = snap.state;
            if snap.state != GateState::Loading {
                return false;
            }
            *snap = SessionSnapshot {
                busy: snap.busy,
                submissions: snap.submissions,
                ..next.clone()
            };
            true
        });
        if applied {
            info!(from = %prev, to = %next.state, "License gate transition");
        } else {
            debug!(state = %prev, "Startup load finished after a submission; result dropped");
        }
    }

    fn evaluate_record(&self, record: LicenseRecord) -> SessionSnapshot {
        let date = match record.validation_date() {
            Ok(Some(date)) => date,
            Ok(None) => return SessionSnapshot::unlicensed(),
            Err(e) => {
                warn!(
                    validation_date = %record.validation_date,
                    error = %e,
                    "Saved license record has an unreadable date; treating as unlicensed"
                );
                return SessionSnapshot::unlicensed();
            }
        };

        let state = match Validity::of(date, self.clock.today()) {
            Validity::Valid => GateState::Valid,
            Validity::Expired => GateState::Expired,
        };
        SessionSnapshot {
            state,
            license_key: record.license_key,
            validation_date: Some(date),
            ..SessionSnapshot::loading()
        }
    }

    async fn save_and_apply(
        &self,
        license: String,
        claim: LicenseClaim,
    ) -> Result<SubmitOutcome, SubmitError> {
        let expiration = claim.expiration_date;

        match Validity::of(expiration, self.clock.today()) {
            Validity::Valid => {
                self.save(&LicenseRecord::validated(license.clone(), expiration)).await?;
                self.transition(GateState::Valid, license, Some(claim.clone()), expiration);
                Ok(SubmitOutcome::Activated { claim })
            }
            Validity::Expired => {
                self.save(&LicenseRecord::cleared()).await?;
                self.transition(GateState::Expired, String::new(), Some(claim), expiration);
                Ok(SubmitOutcome::Expired {
                    expired_on: expiration,
                })
            }
        }
    }

    async fn save(&self, record: &LicenseRecord) -> Result<(), SubmitError> {
        self.store.save(record).await.map_err(|e| {
            warn!(error = %e, "Failed to save license record");
            SubmitError::Storage(e)
        })
    }

    fn transition(
        &self,
        state: GateState,
        license_key: String,
        claim: Option<LicenseClaim>,
        validation_date: NaiveDate,
    ) {
        let mut prev = GateState::Loading;
        self.tx.send_modify(|snap| {
            prev = snap.state;
            *snap = SessionSnapshot {
                state,
                license_key,
                validation_date: Some(validation_date),
                claim,
                busy: snap.busy,
                submissions: snap.submissions + 1,
            };
        });
        info!(from = %prev, to = %state, "License gate transition");
    }

    fn set_busy(&self, busy: bool) {
        self.tx.send_if_modified(|snap| {
            let changed = snap.busy != busy;
            snap.busy = busy;
            changed
        });
    }
}

/// Holds the submit slot; releases it on drop, whatever the outcome.
struct BusyGuard {
    core: SessionCore,
}

impl BusyGuard {
    fn acquire(core: &SessionCore) -> Option<Self> {
        core.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        core.set_busy(true);
        Some(Self { core: core.clone() })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.core.busy.store(false, Ordering::Release);
        self.core.set_busy(false);
    }
}
