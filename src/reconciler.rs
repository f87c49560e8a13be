//! Session/Wallet Reconciler
//!
//! Decides, from the identity signal and the wallet signal, whether a wallet
//! must be provisioned. It is fed on every change of `(user_present,
//! has_wallet)`; the connection flag never reaches it, so connecting or
//! disconnecting cannot re-trigger provisioning.
//!
//! ```text
//! user_present  has_wallet  requested  →  action
//! ------------  ----------  ---------     ------------------------------
//! false         *           *             none (flag cleared)
//! true          true        *             none
//! true          false       no            ProvisionWallet (flag set)
//! true          false       yes           none (one attempt per sign-in)
//! ```
//!
//! The flag is the idempotency guard: once provisioning has been requested for
//! a sign-in, repeated or flapping observations are no-ops until the user signs
//! out. A failed attempt is not retried.
//!
//! Connecting is a separate, user-triggered action; [`select_connector`] picks
//! the first connector in the library's priority order.

use crate::error::{CardError, Result};
use crate::session::Connector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    ProvisionWallet,
}

#[derive(Debug, Default)]
pub struct Reconciler {
    user_present: bool,
    has_wallet: bool,
    provisioning_requested: bool,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror the two upstream signals and return the action they call for.
    pub fn observe(&mut self, user_present: bool, has_wallet: bool) -> Option<ReconcileAction> {
        self.user_present = user_present;
        self.has_wallet = has_wallet;

        if !user_present {
            self.provisioning_requested = false;
            return None;
        }
        if has_wallet || self.provisioning_requested {
            return None;
        }
        self.provisioning_requested = true;
        Some(ReconcileAction::ProvisionWallet)
    }

    /// Derived "logged in" flag.
    pub fn logged_in(&self) -> bool {
        self.user_present
    }

    pub fn has_wallet(&self) -> bool {
        self.has_wallet
    }

    pub fn provisioning_requested(&self) -> bool {
        self.provisioning_requested
    }

    /// Forget everything, as on sign-out.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// First connector in priority order, or `NoConnectorAvailable`.
pub fn select_connector(connectors: &[Connector]) -> Result<Connector> {
    connectors.first().cloned().ok_or(CardError::NoConnectorAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_provisions_without_user() {
        let mut r = Reconciler::new();
        assert_eq!(r.observe(false, false), None);
        assert_eq!(r.observe(false, true), None);
        assert!(!r.provisioning_requested());
        assert!(!r.logged_in());
    }

    #[test]
    fn provisions_once_per_sign_in() {
        let mut r = Reconciler::new();
        assert_eq!(r.observe(true, false), Some(ReconcileAction::ProvisionWallet));
        // Same signal delivered again (e.g. the user object was refreshed).
        assert_eq!(r.observe(true, false), None);
        assert_eq!(r.observe(true, false), None);
        assert!(r.logged_in());
    }

    #[test]
    fn no_op_when_wallet_exists() {
        let mut r = Reconciler::new();
        assert_eq!(r.observe(true, true), None);
        assert!(!r.provisioning_requested());
    }

    #[test]
    fn failed_provisioning_is_not_retried() {
        let mut r = Reconciler::new();
        assert!(r.observe(true, false).is_some());
        // Provisioning failed: has_wallet stays false; nothing new is requested.
        assert_eq!(r.observe(true, false), None);
    }

    #[test]
    fn sign_out_then_in_allows_a_new_attempt() {
        let mut r = Reconciler::new();
        assert!(r.observe(true, false).is_some());
        assert_eq!(r.observe(false, false), None);
        assert_eq!(r.observe(true, false), Some(ReconcileAction::ProvisionWallet));
    }

    #[test]
    fn wallet_arriving_then_disappearing_does_not_retrigger() {
        let mut r = Reconciler::new();
        assert!(r.observe(true, false).is_some());
        assert_eq!(r.observe(true, true), None);
        assert_eq!(r.observe(true, false), None);
    }

    #[test]
    fn reset_clears_flags() {
        let mut r = Reconciler::new();
        r.observe(true, false);
        r.reset();
        assert!(!r.logged_in());
        assert!(!r.provisioning_requested());
    }

    #[test]
    fn first_connector_wins() {
        let list = vec![Connector::new("embedded", "Embedded Wallet"), Connector::new("injected", "Browser Wallet")];
        assert_eq!(select_connector(&list).unwrap().id, "embedded");
    }

    #[test]
    fn empty_connector_list_is_a_defined_error() {
        assert_eq!(select_connector(&[]), Err(CardError::NoConnectorAvailable));
    }
}
