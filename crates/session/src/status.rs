use crate::state::SessionState;

/// The status line shown to the user for `state`.
///
/// Pure; `Error` states always render a non-blank, reason-specific message.
pub fn project(state: &SessionState) -> String {
    match state {
        SessionState::Disconnected => "Disconnected".to_owned(),
        SessionState::Connecting { .. } => "Connecting...".to_owned(),
        SessionState::Connected { address, .. } => format!("Connected Wallet: {address}"),
        SessionState::Error { reason, .. } => format!("Connection failed: {reason}"),
    }
}
