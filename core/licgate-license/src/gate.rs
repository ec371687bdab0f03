//! Access gate: which screen a navigation request actually reaches.

use crate::session::{GateState, LicenseSession, SessionSnapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::watch;

/// Navigation targets of the application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// License entry screen, reachable in every state.
    License,
    /// Landing screen.
    Home,
    /// Spreadsheet cross-referencing.
    Xls,
    /// XML extraction.
    Xml,
    /// Fixed-format text processing.
    Speed,
}

impl Route {
    /// Routes that require a valid license, in menu order.
    pub const FEATURES: [Route; 4] = [Route::Home, Route::Xls, Route::Xml, Route::Speed];

    /// Returns the URL path of this route.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::License => "/license",
            Self::Home => "/",
            Self::Xls => "/xls",
            Self::Xml => "/xml",
            Self::Speed => "/speed",
        }
    }

    /// Returns true if this route is gated by the license.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        !matches!(self, Self::License)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A path that names no route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown route: {0}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "/license" => Ok(Self::License),
            "/" | "" => Ok(Self::Home),
            "/xls" => Ok(Self::Xls),
            "/xml" => Ok(Self::Xml),
            "/speed" => Ok(Self::Speed),
            other => Err(UnknownRoute(other.to_string())),
        }
    }
}

/// What the shell should put on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// Neutral waiting indicator; the request is deferred.
    Waiting,
    /// The requested screen.
    Screen(Route),
    /// Navigation was replaced; render this route instead.
    Redirect(Route),
    /// Fixed "contact the administrator" notice.
    ExpiredNotice {
        /// When the license stopped granting access, if known.
        expired_on: Option<NaiveDate>,
    },
}

impl Rendering {
    /// The route whose screen ends up displayed, if any.
    #[must_use]
    pub fn route(&self) -> Option<Route> {
        match self {
            Self::Screen(r) | Self::Redirect(r) => Some(*r),
            Self::Waiting | Self::ExpiredNotice { .. } => None,
        }
    }
}

/// Per-consumer view of the session that decides every navigation.
///
/// Dropping a gate only drops its subscription; the session and any load or
/// save in flight are unaffected.
#[derive(Debug)]
pub struct AccessGate {
    rx: watch::Receiver<SessionSnapshot>,
    route: Route,
    default_route: Route,
    last_state: GateState,
    last_submissions: u64,
}

impl AccessGate {
    /// Creates a gate positioned on the session's default route and starts
    /// the session's startup load.
    ///
    /// Mounting more gates on the same session never loads twice.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(session: &LicenseSession) -> Self {
        let rx = session.subscribe();
        let (last_state, last_submissions) = {
            let snap = rx.borrow();
            (snap.state, snap.submissions)
        };
        session.spawn_initialize();
        let default_route = session.config().default_route;
        Self {
            rx,
            route: default_route,
            default_route,
            last_state,
            last_submissions,
        }
    }

    /// Pure routing decision for one request in one state.
    #[must_use]
    pub fn resolve(snapshot: &SessionSnapshot, requested: Route) -> Rendering {
        if !requested.is_protected() {
            return Rendering::Screen(requested);
        }
        match snapshot.state {
            GateState::Loading => Rendering::Waiting,
            GateState::Unlicensed => Rendering::Redirect(Route::License),
            GateState::Expired => Rendering::ExpiredNotice {
                expired_on: snapshot.validation_date,
            },
            GateState::Valid => Rendering::Screen(requested),
        }
    }

    /// Requests `route` and returns what to display.
    pub fn navigate(&mut self, route: Route) -> Rendering {
        self.route = route;
        self.current()
    }

    /// Re-evaluates the current route against the latest session state.
    pub fn current(&mut self) -> Rendering {
        let snapshot = self.rx.borrow_and_update().clone();
        // A new submission counts even if the state stayed (or ended up) Valid.
        let became_valid = snapshot.state == GateState::Valid
            && (self.last_state != GateState::Valid
                || snapshot.submissions != self.last_submissions);
        self.last_state = snapshot.state;
        self.last_submissions = snapshot.submissions;

        if self.route == Route::License && became_valid {
            self.route = self.default_route;
            return Rendering::Redirect(self.route);
        }

        let rendering = Self::resolve(&snapshot, self.route);
        if let Rendering::Redirect(target) = rendering {
            self.route = target;
        }
        rendering
    }

    /// Waits for the next session change and re-evaluates.
    ///
    /// Returns `None` once the session and its in-flight tasks are gone.
    pub async fn changed(&mut self) -> Option<Rendering> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }

    /// The route the gate is currently on.
    #[must_use]
    pub fn route(&self) -> Route {
        self.route
    }

    /// Menu entries to show: the feature routes while licensed, nothing otherwise.
    #[must_use]
    pub fn menu(&self) -> &'static [Route] {
        if self.last_state == GateState::Valid {
            &Route::FEATURES
        } else {
            &[]
        }
    }
}
