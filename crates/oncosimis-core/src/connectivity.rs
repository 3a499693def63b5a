//! Tri-state backend connectivity derived from `/health` polls.

use std::fmt;

use crate::error::ClientError;
use crate::protocol::HealthReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityState {
    Online,
    Degraded,
    #[default]
    Offline,
}

impl ConnectivityState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectivityState::Online => "Online",
            ConnectivityState::Degraded => "Degraded",
            ConnectivityState::Offline => "Offline",
        }
    }
}

/// Result of one health poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connectivity {
    pub state: ConnectivityState,
    pub reason: &'static str,
}

impl Connectivity {
    pub const ONLINE: Connectivity = Connectivity {
        state: ConnectivityState::Online,
        reason: "connected",
    };
    pub const RUNTIME_DISCONNECTED: Connectivity = Connectivity {
        state: ConnectivityState::Degraded,
        reason: "model runtime disconnected",
    };
    pub const BACKEND_ISSUES: Connectivity = Connectivity {
        state: ConnectivityState::Offline,
        reason: "backend issues",
    };
    pub const BACKEND_OFFLINE: Connectivity = Connectivity {
        state: ConnectivityState::Offline,
        reason: "backend offline",
    };

    /// State before the first poll has completed.
    pub fn unknown() -> Self {
        Connectivity {
            state: ConnectivityState::Offline,
            reason: "checking connection",
        }
    }

    pub fn from_report(report: &HealthReport) -> Self {
        if !report.is_healthy() {
            Self::BACKEND_ISSUES
        } else if !report.runtime_connected() {
            Self::RUNTIME_DISCONNECTED
        } else {
            Self::ONLINE
        }
    }

    /// Classify the outcome of a health request. Never fails.
    pub fn classify(outcome: &Result<HealthReport, ClientError>) -> Self {
        match outcome {
            Ok(report) => Self::from_report(report),
            // The backend answered 2xx but not with a health payload.
            Err(ClientError::Decode(_)) => Self::BACKEND_ISSUES,
            Err(ClientError::Transport(_)) | Err(ClientError::Status(_)) => Self::BACKEND_OFFLINE,
        }
    }

    pub fn is_online(&self) -> bool {
        self.state == ConnectivityState::Online
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.state.label(), self.reason)
    }
}
