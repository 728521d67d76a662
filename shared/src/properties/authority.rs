use std::fmt;

/// How authority over a property's value is shared between host and remotes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthorityMode {
    /// Only the host may originate updates; remotes apply what they receive
    Authoritative,
    /// Remotes may update speculatively ahead of host confirmation
    Predictive,
    /// Received snapshots are smoothed over time by the application
    Interpolated,
}

impl AuthorityMode {
    /// Whether updates of this mode can only ever come from one writer, the host
    pub fn is_single_writer(&self) -> bool {
        matches!(self, AuthorityMode::Authoritative)
    }
}

impl fmt::Display for AuthorityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorityMode::Authoritative => write!(f, "authoritative"),
            AuthorityMode::Predictive => write!(f, "predictive"),
            AuthorityMode::Interpolated => write!(f, "interpolated"),
        }
    }
}
