use std::fmt;

pub type SequenceNumber = u16;

/// Which side of a session this process plays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Host,
    Remote,
}

impl Role {
    /// Prefix used for object ids generated by a session of this role
    pub fn id_prefix(self) -> &'static str {
        match self {
            Role::Host => "H",
            Role::Remote => "R",
        }
    }

    pub fn is_host(self) -> bool {
        self == Role::Host
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "host"),
            Role::Remote => write!(f, "remote"),
        }
    }
}
