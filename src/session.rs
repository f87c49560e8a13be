//! Session data model: who is signed in, which wallet they own, how it is connected.
//!
//! All of it is ephemeral and lives for one page session. A `UserIdentity`
//! optionally owns one `WalletAccount`; the account optionally has a current
//! `BalanceSnapshot`.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::balance::BalanceSnapshot;
use crate::error::{CardError, Result};
use std::sync::OnceLock;

/// Authenticated principal as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), name: None, email: None }
    }
    pub fn with_name(mut self, name: impl Into<String>) -> Self { self.name = Some(name.into()); self }
    pub fn with_email(mut self, email: impl Into<String>) -> Self { self.email = Some(email.into()); self }

    /// Name for the identity control: name, then email, then id.
    pub fn label(&self) -> &str {
        self.name.as_deref().or(self.email.as_deref()).unwrap_or(&self.id)
    }
}

/// Custodial wallet owned by the signed-in user.
///
/// Holding a `WalletAccount` means the user has a wallet, and the address is a
/// syntactically valid EVM address; there is no way to build one otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletAccount {
    address: String,
}

impl WalletAccount {
    pub fn new(address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        if !is_valid_address(&address) {
            return Err(CardError::InvalidAddress(address));
        }
        Ok(Self { address })
    }

    /// Address exactly as the provider reported it.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl<'de> Deserialize<'de> for WalletAccount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw { address: String }
        let raw = Raw::deserialize(deserializer)?;
        WalletAccount::new(raw.address).map_err(serde::de::Error::custom)
    }
}

/// `0x` followed by 40 hex digits, any case.
pub fn is_valid_address(address: &str) -> bool {
    static ADDRESS: OnceLock<Regex> = OnceLock::new();
    ADDRESS
        .get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("address regex"))
        .is_match(address)
}

/// Wallet-connection library state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub address: Option<String>,
    pub chain_id: Option<u64>,
    pub connected: bool,
}

impl ConnectionState {
    pub fn disconnected() -> Self { Self::default() }

    pub fn connected(address: impl Into<String>, chain_id: u64) -> Self {
        Self { address: Some(address.into()), chain_id: Some(chain_id), connected: true }
    }
}

/// One entry of the wallet library's connector list. Order is priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub id: String,
    pub name: String,
}

impl Connector {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// Everything the renderer needs, captured at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<UserIdentity>,
    pub account: Option<WalletAccount>,
    pub connection: ConnectionState,
    pub balance: Option<BalanceSnapshot>,
}

impl SessionSnapshot {
    pub fn user_present(&self) -> bool { self.user.is_some() }
    pub fn has_wallet(&self) -> bool { self.account.is_some() }
    pub fn is_connected(&self) -> bool { self.connection.connected }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    #[test]
    fn accepts_checksummed_and_lowercase_addresses() {
        assert!(WalletAccount::new(ADDR).is_ok());
        assert!(WalletAccount::new(ADDR.to_lowercase()).is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "0x", "52908400098527886E0F7030069857D2E4169EE7", "0xABCDEF1234", "0xZZ908400098527886E0F7030069857D2E4169EE7"] {
            assert!(matches!(WalletAccount::new(bad), Err(CardError::InvalidAddress(_))), "{bad}");
        }
    }

    #[test]
    fn address_kept_verbatim() {
        let account = WalletAccount::new(ADDR).unwrap();
        assert_eq!(account.address(), ADDR);
    }

    #[test]
    fn deserialize_validates() {
        let ok: WalletAccount = serde_json::from_str(&format!(r#"{{"address":"{ADDR}"}}"#)).unwrap();
        assert_eq!(ok.address(), ADDR);
        assert!(serde_json::from_str::<WalletAccount>(r#"{"address":"nope"}"#).is_err());
    }

    #[test]
    fn user_label_fallbacks() {
        assert_eq!(UserIdentity::new("u1").label(), "u1");
        assert_eq!(UserIdentity::new("u1").with_email("a@b.c").label(), "a@b.c");
        assert_eq!(UserIdentity::new("u1").with_email("a@b.c").with_name("Ada").label(), "Ada");
    }
}
