use thiserror::Error;

/// Errors that can occur during PropertyRegistry operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    /// A property with this name is already declared on the object
    #[error("Property '{name}' is already registered on this object")]
    AlreadyRegistered { name: String },

    /// The property was never declared on the object
    #[error("Property '{name}' is not registered on this object. Call `register_property()` first")]
    NotRegistered { name: String },

    /// Update frequency is used as a divisor and must be a positive finite number
    #[error("Property '{name}' declared with invalid update frequency {frequency_hz} Hz, must be finite and greater than 0")]
    InvalidFrequency { name: String, frequency_hz: f32 },

    /// A remote tried to originate an update for a host-authoritative property
    #[error("Property '{name}' is authoritative, only the host may originate updates for it")]
    AuthorityDenied { name: String },

    /// The property was sent too recently for its declared frequency
    #[error("Property '{name}' is rate limited, next update allowed in {retry_in_ms} ms")]
    RateLimited { name: String, retry_in_ms: u64 },
}
