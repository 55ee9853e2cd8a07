//! Routing of host output to sessions.

use tend_core::SessionId;
use tend_transport::IncomingData;

use crate::registry::SessionRegistry;

/// Where a piece of host output should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Deliver to this session
    Session(SessionId),
    /// Addressed to a session that is not live; drop
    Unknown(SessionId),
    /// Untagged output with several live sessions; drop and report
    Ambiguous {
        /// Number of live sessions
        live: usize,
    },
    /// Untagged output with no live session; drop
    NoTarget,
    /// Untagged output while legacy routing is turned off; drop
    LegacyDisabled,
}

/// Decide which session receives `data`.
///
/// Untagged output goes to the only live session when exactly one exists.
pub fn route_data(registry: &SessionRegistry, data: &IncomingData, accept_legacy: bool) -> Route {
    match data {
        IncomingData::Addressed { id, .. } => {
            if registry.contains(*id) {
                Route::Session(*id)
            } else {
                Route::Unknown(*id)
            }
        }
        IncomingData::Legacy { .. } if !accept_legacy => Route::LegacyDisabled,
        IncomingData::Legacy { .. } => match registry.live_ids().as_slice() {
            [] => Route::NoTarget,
            [only] => Route::Session(*only),
            live => Route::Ambiguous { live: live.len() },
        },
    }
}
