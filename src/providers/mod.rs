//! External collaborators
//!
//! The front end delegates every substantive operation. Each collaborator is a
//! trait so the composition root can be handed real SDK bindings, the wasm
//! bridges, or the in-memory doubles in [`memory`].
//!
//! ```text
//! IdentityProvider   sign-in / sign-out / create_wallet   (custodial identity SDK)
//! WalletConnection   connectors / connect / disconnect     (wallet-connection library)
//! BalanceQuery       balance(address)                      (RPC-backed balance hook)
//! Printer            print(document)                       (host print facility)
//! ```
//!
//! All calls run on the single UI thread, so the async traits are `?Send`.

pub mod memory;

use async_trait::async_trait;

use crate::balance::BalanceSnapshot;
use crate::error::Result;
use crate::session::{ConnectionState, Connector, UserIdentity, WalletAccount};

#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Opaque client identifier the provider was configured with.
    fn client_id(&self) -> &str;

    fn current_user(&self) -> Option<UserIdentity>;

    /// Interactive sign-in.
    async fn sign_in(&self) -> Result<UserIdentity>;

    async fn sign_out(&self) -> Result<()>;

    /// Wallet already attached to the current user, if any.
    fn wallet(&self) -> Option<WalletAccount>;

    /// Provision a custodial wallet for the current user. Idempotent by
    /// convention: a user who already has one gets it back.
    async fn create_wallet(&self) -> Result<WalletAccount>;
}

#[async_trait(?Send)]
pub trait WalletConnection {
    /// Available connectors in priority order.
    fn connectors(&self) -> Vec<Connector>;

    async fn connect(&self, connector: &Connector) -> Result<ConnectionState>;

    async fn disconnect(&self) -> Result<()>;

    fn state(&self) -> ConnectionState;
}

#[async_trait(?Send)]
pub trait BalanceQuery {
    /// `Ok(None)` while the query is still pending.
    async fn balance(&self, address: &str) -> Result<Option<BalanceSnapshot>>;
}

pub trait Printer {
    /// Fire-and-forget; nothing is observed back.
    fn print(&self, document: &str);
}
