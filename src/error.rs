//! Error taxonomy for collaborator calls and local validation.
//!
//! Every failure is terminal for the action that triggered it. Nothing here
//! escalates to a global error state and nothing is retried.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CardError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("sign-in failed: {0}")]
    SignIn(String),

    #[error("sign-out failed: {0}")]
    SignOut(String),

    #[error("wallet provisioning failed: {0}")]
    Provisioning(String),

    #[error("wallet connection failed: {0}")]
    Connection(String),

    /// Connect was requested but the wallet library reported no connectors.
    #[error("no wallet connector available")]
    NoConnectorAvailable,

    #[error("balance query failed: {0}")]
    Balance(String),

    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("invalid balance value: {0}")]
    InvalidBalance(String),

    #[error("config: {0}")]
    Config(String),

    #[error("io: {0}")]
    Io(String),
}

impl From<std::io::Error> for CardError {
    fn from(e: std::io::Error) -> Self {
        CardError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CardError {
    fn from(e: serde_json::Error) -> Self {
        CardError::Config(format!("json: {e}"))
    }
}

impl CardError {
    /// Short machine-readable tag, used in logs and the CLI's JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            CardError::SignIn(_) => "sign_in",
            CardError::SignOut(_) => "sign_out",
            CardError::Provisioning(_) => "provisioning",
            CardError::Connection(_) => "connection",
            CardError::NoConnectorAvailable => "no_connector_available",
            CardError::Balance(_) => "balance",
            CardError::InvalidAddress(_) => "invalid_address",
            CardError::InvalidBalance(_) => "invalid_balance",
            CardError::Config(_) => "config",
            CardError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = CardError::Provisioning("quota".into());
        assert_eq!(err.to_string(), "wallet provisioning failed: quota");
        assert_eq!(CardError::NoConnectorAvailable.to_string(), "no wallet connector available");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CardError = io.into();
        assert_eq!(err.kind(), "io");
    }
}
