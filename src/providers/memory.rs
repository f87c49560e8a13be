//! In-memory collaborators for the terminal front end and tests.
//!
//! Handles are cheap clones over shared state (`Rc<RefCell<..>>`), so a test
//! can keep one handle to inspect or steer the provider while the composition
//! root owns another.

use alloy_primitives::U256;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{BalanceQuery, IdentityProvider, Printer, WalletConnection};
use crate::balance::BalanceSnapshot;
use crate::error::{CardError, Result};
use crate::session::{ConnectionState, Connector, UserIdentity, WalletAccount};

/// Deterministic custodial address for a user id: first 20 bytes of SHA-256.
pub fn derive_address(user_id: &str) -> String {
    let digest = Sha256::digest(user_id.as_bytes());
    format!("0x{}", hex::encode(&digest[..20]))
}

#[derive(Debug, Clone)]
struct IdentityState {
    user: Option<UserIdentity>,
    next_user: UserIdentity,
    wallets: HashMap<String, WalletAccount>,
    fail_sign_in: bool,
    fail_provisioning: bool,
    provision_calls: u32,
}

/// Identity provider that signs in a fixed user and provisions wallets locally.
#[derive(Debug, Clone)]
pub struct MemoryIdentity {
    client_id: String,
    state: Rc<RefCell<IdentityState>>,
}

impl MemoryIdentity {
    pub fn new(client_id: impl Into<String>, user: UserIdentity) -> Self {
        Self {
            client_id: client_id.into(),
            state: Rc::new(RefCell::new(IdentityState {
                user: None,
                next_user: user,
                wallets: HashMap::new(),
                fail_sign_in: false,
                fail_provisioning: false,
                provision_calls: 0,
            })),
        }
    }

    /// Attach a wallet to `user_id` up front, as for a returning user.
    pub fn with_existing_wallet(self, user_id: &str) -> Result<Self> {
        let account = WalletAccount::new(derive_address(user_id))?;
        self.state.borrow_mut().wallets.insert(user_id.to_string(), account);
        Ok(self)
    }

    pub fn set_fail_sign_in(&self, fail: bool) { self.state.borrow_mut().fail_sign_in = fail; }
    pub fn set_fail_provisioning(&self, fail: bool) { self.state.borrow_mut().fail_provisioning = fail; }
    pub fn set_next_user(&self, user: UserIdentity) { self.state.borrow_mut().next_user = user; }

    /// How many times `create_wallet` has been called.
    pub fn provision_calls(&self) -> u32 { self.state.borrow().provision_calls }
}

#[async_trait(?Send)]
impl IdentityProvider for MemoryIdentity {
    fn client_id(&self) -> &str { &self.client_id }

    fn current_user(&self) -> Option<UserIdentity> { self.state.borrow().user.clone() }

    async fn sign_in(&self) -> Result<UserIdentity> {
        let mut state = self.state.borrow_mut();
        if state.fail_sign_in {
            return Err(CardError::SignIn("sign-in rejected".into()));
        }
        let user = state.next_user.clone();
        state.user = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        self.state.borrow_mut().user = None;
        Ok(())
    }

    fn wallet(&self) -> Option<WalletAccount> {
        let state = self.state.borrow();
        let user = state.user.as_ref()?;
        state.wallets.get(&user.id).cloned()
    }

    async fn create_wallet(&self) -> Result<WalletAccount> {
        let mut state = self.state.borrow_mut();
        state.provision_calls += 1;
        let user_id = state
            .user
            .as_ref()
            .map(|u| u.id.clone())
            .ok_or_else(|| CardError::Provisioning("no signed-in user".into()))?;
        if state.fail_provisioning {
            return Err(CardError::Provisioning("provider unavailable".into()));
        }
        if let Some(existing) = state.wallets.get(&user_id) {
            return Ok(existing.clone());
        }
        let account = WalletAccount::new(derive_address(&user_id))?;
        state.wallets.insert(user_id, account.clone());
        Ok(account)
    }
}

/// Wallet-connection library double. Connecting attaches to the identity's
/// custodial wallet, the way an embedded-wallet connector does.
#[derive(Debug, Clone)]
pub struct MemoryWallet {
    connectors: Vec<Connector>,
    chain_id: u64,
    identity: MemoryIdentity,
    state: Rc<RefCell<ConnectionState>>,
    fail_connect: Rc<RefCell<bool>>,
}

impl MemoryWallet {
    pub fn new(identity: MemoryIdentity, connectors: Vec<Connector>, chain_id: u64) -> Self {
        Self {
            connectors,
            chain_id,
            identity,
            state: Rc::new(RefCell::new(ConnectionState::disconnected())),
            fail_connect: Rc::new(RefCell::new(false)),
        }
    }

    pub fn set_fail_connect(&self, fail: bool) { *self.fail_connect.borrow_mut() = fail; }
}

#[async_trait(?Send)]
impl WalletConnection for MemoryWallet {
    fn connectors(&self) -> Vec<Connector> { self.connectors.clone() }

    async fn connect(&self, connector: &Connector) -> Result<ConnectionState> {
        if *self.fail_connect.borrow() {
            return Err(CardError::Connection(format!("{} refused the handshake", connector.name)));
        }
        if !self.connectors.iter().any(|c| c.id == connector.id) {
            return Err(CardError::Connection(format!("unknown connector: {}", connector.id)));
        }
        let account = self
            .identity
            .wallet()
            .ok_or_else(|| CardError::Connection("no wallet to connect".into()))?;
        let state = ConnectionState::connected(account.address(), self.chain_id);
        *self.state.borrow_mut() = state.clone();
        Ok(state)
    }

    async fn disconnect(&self) -> Result<()> {
        *self.state.borrow_mut() = ConnectionState::disconnected();
        Ok(())
    }

    fn state(&self) -> ConnectionState { self.state.borrow().clone() }
}

#[derive(Debug, Default)]
struct BalanceBook {
    by_address: HashMap<String, (U256, String)>,
    fallback: Option<(U256, String)>,
    fail: bool,
}

/// Balance query double. Unknown addresses stay pending.
#[derive(Debug, Clone, Default)]
pub struct MemoryBalances {
    book: Rc<RefCell<BalanceBook>>,
}

impl MemoryBalances {
    pub fn new() -> Self { Self::default() }

    /// Balance reported for every address without an explicit entry.
    pub fn with_fallback(self, raw: U256, symbol: impl Into<String>) -> Self {
        self.set_fallback(raw, symbol);
        self
    }

    pub fn set_fallback(&self, raw: U256, symbol: impl Into<String>) {
        self.book.borrow_mut().fallback = Some((raw, symbol.into()));
    }

    pub fn set(&self, address: &str, raw: U256, symbol: impl Into<String>) {
        self.book.borrow_mut().by_address.insert(address.to_ascii_lowercase(), (raw, symbol.into()));
    }

    pub fn set_fail(&self, fail: bool) { self.book.borrow_mut().fail = fail; }
}

#[async_trait(?Send)]
impl BalanceQuery for MemoryBalances {
    async fn balance(&self, address: &str) -> Result<Option<BalanceSnapshot>> {
        let book = self.book.borrow();
        if book.fail {
            return Err(CardError::Balance("rpc unavailable".into()));
        }
        let entry = book.by_address.get(&address.to_ascii_lowercase()).or(book.fallback.as_ref());
        Ok(entry.map(|(raw, symbol)| BalanceSnapshot::new(*raw, symbol.clone())))
    }
}

/// Keeps every printed document.
#[derive(Debug, Clone, Default)]
pub struct RecordingPrinter {
    documents: Rc<RefCell<Vec<String>>>,
}

impl RecordingPrinter {
    pub fn new() -> Self { Self::default() }
    pub fn documents(&self) -> Vec<String> { self.documents.borrow().clone() }
}

impl Printer for RecordingPrinter {
    fn print(&self, document: &str) {
        self.documents.borrow_mut().push(document.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::is_valid_address;
    use futures::executor::block_on;

    fn identity() -> MemoryIdentity {
        MemoryIdentity::new("client", UserIdentity::new("user-1").with_name("Ada"))
    }

    #[test]
    fn derived_addresses_are_valid_and_stable() {
        let a = derive_address("user-1");
        assert!(is_valid_address(&a));
        assert_eq!(a, derive_address("user-1"));
        assert_ne!(a, derive_address("user-2"));
    }

    #[test]
    fn provisioning_requires_a_user() {
        let id = identity();
        let err = block_on(id.create_wallet()).unwrap_err();
        assert!(matches!(err, CardError::Provisioning(_)));
        assert_eq!(id.provision_calls(), 1);
    }

    #[test]
    fn provisioning_is_idempotent() {
        let id = identity();
        block_on(id.sign_in()).unwrap();
        let first = block_on(id.create_wallet()).unwrap();
        let second = block_on(id.create_wallet()).unwrap();
        assert_eq!(first, second);
        assert_eq!(id.wallet(), Some(first));
    }

    #[test]
    fn wallet_hidden_after_sign_out() {
        let id = identity().with_existing_wallet("user-1").unwrap();
        assert!(id.wallet().is_none());
        block_on(id.sign_in()).unwrap();
        assert!(id.wallet().is_some());
        block_on(id.sign_out()).unwrap();
        assert!(id.wallet().is_none());
    }

    #[test]
    fn connect_uses_custodial_wallet() {
        let id = identity().with_existing_wallet("user-1").unwrap();
        block_on(id.sign_in()).unwrap();
        let wallet = MemoryWallet::new(id.clone(), vec![Connector::new("embedded", "Embedded")], 1);
        let state = block_on(wallet.connect(&Connector::new("embedded", "Embedded"))).unwrap();
        assert!(state.connected);
        assert_eq!(state.address.as_deref(), Some(derive_address("user-1").as_str()));
        assert_eq!(wallet.state(), state);
    }

    #[test]
    fn balances_pending_until_known() {
        let balances = MemoryBalances::new();
        assert_eq!(block_on(balances.balance("0xabc")).unwrap(), None);
        balances.set("0xABC", U256::from(5u8), "ETH");
        let snap = block_on(balances.balance("0xabc")).unwrap().unwrap();
        assert_eq!(snap.raw, U256::from(5u8));
    }

    #[test]
    fn printer_records() {
        let printer = RecordingPrinter::new();
        printer.print("card");
        assert_eq!(printer.documents(), vec!["card".to_string()]);
    }
}
