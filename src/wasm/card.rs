//! DefiCard: JS handle over an [`App`] with in-memory collaborators.
//!
//! In-memory collaborators resolve immediately, so every call drives the app
//! to quiescence within a single poll.

use alloy_primitives::U256;
use futures::FutureExt;
use serde::Serialize;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

use super::log;
use super::print::WindowPrinter;
use crate::app::context::connector_name;
use crate::app::{App, AppConfig, AppContext, Event};
use crate::error::CardError;
use crate::providers::memory::{MemoryBalances, MemoryIdentity, MemoryWallet};
use crate::session::{Connector, UserIdentity};
use crate::view::Panel;

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct DefiCard {
    app: RefCell<App>,
    balances: MemoryBalances,
}

#[wasm_bindgen]
impl DefiCard {
    /// `config` is an optional `AppConfig` object; missing fields take defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(user_id: &str, config: JsValue) -> Result<DefiCard, JsValue> {
        let config: AppConfig = if config.is_undefined() || config.is_null() {
            AppConfig::default().with_client_id("deficard-web")
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_err)?
        };
        let chain = config
            .default_chain()
            .cloned()
            .ok_or_else(|| js_err(CardError::Config("no chains configured".into())))?;

        let identity = MemoryIdentity::new(config.client_id.clone(), UserIdentity::new(user_id));
        let connectors = config.connectors.iter().map(|id| Connector::new(id.clone(), connector_name(id))).collect();
        let wallet = MemoryWallet::new(identity.clone(), connectors, chain.id);
        let balances = MemoryBalances::new();

        let ctx = AppContext::builder(config)
            .identity(identity)
            .wallet(wallet)
            .balances(balances.clone())
            .printer(WindowPrinter)
            .build()
            .map_err(js_err)?;

        log!("[DefiCard] ready for {} on chain {}", user_id, chain.name);
        let card = Self { app: RefCell::new(App::new(ctx)), balances };
        let bootstrap = card.app.borrow().bootstrap_events();
        for event in bootstrap {
            card.drive(event);
        }
        Ok(card)
    }

    #[wasm_bindgen(js_name = "signIn")]
    pub fn sign_in(&self) { self.drive(Event::SignInRequested) }

    #[wasm_bindgen(js_name = "signOut")]
    pub fn sign_out(&self) { self.drive(Event::SignOutRequested) }

    pub fn connect(&self) { self.drive(Event::ConnectRequested) }

    pub fn disconnect(&self) { self.drive(Event::DisconnectRequested) }

    pub fn refresh(&self) { self.drive(Event::RefreshBalance) }

    pub fn print(&self) { self.drive(Event::PrintRequested) }

    /// `"wallet"` or `"business-card"`.
    #[wasm_bindgen(js_name = "selectPanel")]
    pub fn select_panel(&self, name: &str) -> Result<(), JsValue> {
        let panel = Panel::parse(name).ok_or_else(|| js_err(format!("unknown panel: {}", name)))?;
        self.drive(Event::PanelSelected(panel));
        Ok(())
    }

    /// Report `raw` (decimal, smallest unit) for every address.
    #[wasm_bindgen(js_name = "setBalance")]
    pub fn set_balance(&self, raw: &str) -> Result<(), JsValue> {
        let value: U256 = crate::balance::parse_raw(raw).map_err(js_err)?;
        let symbol = {
            let app = self.app.borrow();
            app.context().config().default_chain().map(|c| c.symbol.clone()).unwrap_or_default()
        };
        self.balances.set_fallback(value, symbol);
        self.drive(Event::RefreshBalance);
        Ok(())
    }

    pub fn screen(&self) -> Result<JsValue, JsValue> {
        let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
        self.app.borrow().screen().serialize(&serializer).map_err(js_err)
    }

    pub fn page(&self) -> String {
        self.app.borrow().page()
    }

    #[wasm_bindgen(js_name = "lastError")]
    pub fn last_error(&self) -> Option<String> {
        self.app.borrow().last_error().get().map(|e| e.to_string())
    }

    fn drive(&self, event: Event) {
        let mut app = self.app.borrow_mut();
        if app.dispatch(event).now_or_never().is_none() {
            log!("[DefiCard] dispatch did not settle");
        }
    }
}
