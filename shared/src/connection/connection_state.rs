use std::fmt;

use crate::ConnectionError;

/// Connection lifecycle of a session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl ConnectionState {
    /// Whether `to` is reachable from this state in one step
    pub fn can_transition_to(self, to: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, to),
            // a host comes up connected without dialing out
            (Disconnected, Connected)
                | (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnected)
                | (Connected, Disconnecting)
                | (Disconnecting, Disconnected)
        )
    }

    /// Move to `to`, or leave the state untouched and report the invalid edge
    pub fn transition(&mut self, to: ConnectionState) -> Result<(), ConnectionError> {
        if !self.can_transition_to(to) {
            return Err(ConnectionError::InvalidTransition { from: *self, to });
        }
        *self = to;
        Ok(())
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Disconnecting => write!(f, "Disconnecting"),
        }
    }
}
