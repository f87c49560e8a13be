//! AppContext - explicitly constructed collaborator bundle
//!
//! Built once at process start by the composition root and handed to
//! [`App`](super::App). Cloning is cheap (every field is an `Rc`), which lets
//! in-flight tasks own the context instead of borrowing the app.

use alloy_primitives::U256;
use std::rc::Rc;

use super::config::AppConfig;
use crate::error::{CardError, Result};
use crate::providers::memory::{MemoryBalances, MemoryIdentity, MemoryWallet, RecordingPrinter};
use crate::providers::{BalanceQuery, IdentityProvider, Printer, WalletConnection};
use crate::session::{Connector, UserIdentity};

#[derive(Clone)]
pub struct AppContext {
    config: Rc<AppConfig>,
    identity: Rc<dyn IdentityProvider>,
    wallet: Rc<dyn WalletConnection>,
    balances: Rc<dyn BalanceQuery>,
    printer: Rc<dyn Printer>,
}

impl AppContext {
    pub fn builder(config: AppConfig) -> AppContextBuilder {
        AppContextBuilder { config, identity: None, wallet: None, balances: None, printer: None }
    }

    /// Context wired to the in-memory collaborators. The returned handles
    /// share state with the context, for steering and inspection.
    pub fn in_memory(config: AppConfig, user: UserIdentity) -> Result<(Self, MemoryCollaborators)> {
        let chain = config
            .default_chain()
            .cloned()
            .ok_or_else(|| CardError::Config("no chains configured".into()))?;
        let identity = MemoryIdentity::new(config.client_id.clone(), user);
        let connectors = config.connectors.iter().map(|id| Connector::new(id.clone(), connector_name(id))).collect();
        let wallet = MemoryWallet::new(identity.clone(), connectors, chain.id);
        let balances = MemoryBalances::new();
        let printer = RecordingPrinter::new();

        let handles = MemoryCollaborators {
            identity: identity.clone(),
            wallet: wallet.clone(),
            balances: balances.clone(),
            printer: printer.clone(),
        };
        let ctx = Self::builder(config)
            .identity(identity)
            .wallet(wallet)
            .balances(balances)
            .printer(printer)
            .build()?;
        Ok((ctx, handles))
    }

    pub fn config(&self) -> &AppConfig { &self.config }
    pub fn identity(&self) -> &dyn IdentityProvider { self.identity.as_ref() }
    pub fn wallet(&self) -> &dyn WalletConnection { self.wallet.as_ref() }
    pub fn balances(&self) -> &dyn BalanceQuery { self.balances.as_ref() }
    pub fn printer(&self) -> &dyn Printer { self.printer.as_ref() }
}

pub struct AppContextBuilder {
    config: AppConfig,
    identity: Option<Rc<dyn IdentityProvider>>,
    wallet: Option<Rc<dyn WalletConnection>>,
    balances: Option<Rc<dyn BalanceQuery>>,
    printer: Option<Rc<dyn Printer>>,
}

impl AppContextBuilder {
    pub fn identity(mut self, p: impl IdentityProvider + 'static) -> Self { self.identity = Some(Rc::new(p)); self }
    pub fn wallet(mut self, w: impl WalletConnection + 'static) -> Self { self.wallet = Some(Rc::new(w)); self }
    pub fn balances(mut self, b: impl BalanceQuery + 'static) -> Self { self.balances = Some(Rc::new(b)); self }
    pub fn printer(mut self, p: impl Printer + 'static) -> Self { self.printer = Some(Rc::new(p)); self }

    pub fn build(self) -> Result<AppContext> {
        self.config.validate()?;
        let missing = |what: &str| CardError::Config(format!("missing {what}"));
        Ok(AppContext {
            identity: self.identity.ok_or_else(|| missing("identity provider"))?,
            wallet: self.wallet.ok_or_else(|| missing("wallet connection"))?,
            balances: self.balances.ok_or_else(|| missing("balance query"))?,
            printer: self.printer.ok_or_else(|| missing("printer"))?,
            config: Rc::new(self.config),
        })
    }
}

/// Shared handles to the in-memory collaborators behind a context.
#[derive(Debug, Clone)]
pub struct MemoryCollaborators {
    pub identity: MemoryIdentity,
    pub wallet: MemoryWallet,
    pub balances: MemoryBalances,
    pub printer: RecordingPrinter,
}

impl MemoryCollaborators {
    /// Report `raw` (smallest unit) for every address, in the default chain's symbol.
    pub fn fund_all(&self, config: &AppConfig, raw: U256) {
        if let Some(chain) = config.default_chain() {
            self.balances.set_fallback(raw, chain.symbol.clone());
        }
    }
}

pub(crate) fn connector_name(id: &str) -> String {
    match id {
        "embedded-wallet" => "Embedded Wallet".into(),
        "injected" => "Browser Wallet".into(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::new("test").with_client_id("client")
    }

    #[test]
    fn builder_requires_every_collaborator() {
        let err = AppContext::builder(config())
            .identity(MemoryIdentity::new("client", UserIdentity::new("u")))
            .build()
            .err()
            .expect("missing wallet");
        assert!(matches!(err, CardError::Config(msg) if msg.contains("wallet")));
    }

    #[test]
    fn builder_validates_config() {
        let (ctx, _) = AppContext::in_memory(config(), UserIdentity::new("u")).unwrap();
        assert_eq!(ctx.identity().client_id(), "client");
        assert!(AppContext::in_memory(AppConfig::default(), UserIdentity::new("u")).is_err());
    }

    #[test]
    fn in_memory_connectors_follow_config_order() {
        let cfg = config().with_connectors(vec!["injected".into(), "embedded-wallet".into()]);
        let (ctx, _) = AppContext::in_memory(cfg, UserIdentity::new("u")).unwrap();
        let ids: Vec<String> = ctx.wallet().connectors().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["injected", "embedded-wallet"]);
    }
}
