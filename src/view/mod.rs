//! View Renderer
//!
//! One parameterized view-state machine: a single-valued panel selector
//! ([`ViewState`]) and a pure [`render`] function from a [`SessionSnapshot`]
//! to the visible [`Screen`].
//!
//! | user | wallet | panel | screen |
//! |------|--------|-------|--------|
//! | no | - | - | `SignIn` (sign-in prompt only) |
//! | yes | no | - | `Provisioning` (identity control only) |
//! | yes | yes | wallet | `Wallet` (address + balance) |
//! | yes | yes | business-card | `BusinessCard` (wallet view + display name) |
//!
//! The panel persists across balance and connection updates and goes back to
//! `Wallet` on sign-out.

pub mod card;
pub mod layout;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::labels::{card as card_text, identity as identity_text};
use crate::session::SessionSnapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Panel {
    #[default]
    Wallet,
    BusinessCard,
}

impl Panel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Panel::Wallet => "wallet",
            Panel::BusinessCard => "business-card",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wallet" => Some(Panel::Wallet),
            "business-card" | "card" | "businesscard" => Some(Panel::BusinessCard),
            _ => None,
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active panel selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    panel: Panel,
}

impl ViewState {
    pub fn new() -> Self { Self::default() }
    pub fn panel(&self) -> Panel { self.panel }
    pub fn select(&mut self, panel: Panel) { self.panel = panel; }
    pub fn reset(&mut self) { self.panel = Panel::Wallet; }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum BalanceDisplay {
    Loading,
    Value(String),
}

impl BalanceDisplay {
    pub fn as_text(&self) -> &str {
        match self {
            BalanceDisplay::Loading => card_text::LOADING,
            BalanceDisplay::Value(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletView {
    /// Identity control label.
    pub user: String,
    /// Verbatim address.
    pub address: String,
    pub balance: BalanceDisplay,
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub display_name: String,
    pub wallet: WalletView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    SignIn,
    Provisioning { user: String },
    Wallet(WalletView),
    BusinessCard(CardView),
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::SignIn => "sign_in",
            Screen::Provisioning { .. } => "provisioning",
            Screen::Wallet(_) => "wallet",
            Screen::BusinessCard(_) => "business_card",
        }
    }

    pub fn card(&self) -> Option<&CardView> {
        match self {
            Screen::BusinessCard(card) => Some(card),
            _ => None,
        }
    }

    /// Terminal rendering of the screen body (no page frame).
    pub fn to_text(&self) -> String {
        match self {
            Screen::SignIn => format!("[ {} ]\n{}\n", identity_text::SIGN_IN, identity_text::SIGN_IN_PROMPT),
            Screen::Provisioning { user } => identity_control(user),
            Screen::Wallet(view) => {
                let mut out = identity_control(&view.user);
                out.push_str(&format!("{:8} {}\n", card_text::WALLET, view.address));
                out.push_str(&format!("{:8} {}\n", card_text::BALANCE, view.balance.as_text()));
                out.push_str(&actions(view.connected));
                out
            }
            Screen::BusinessCard(card_view) => {
                let mut out = identity_control(&card_view.wallet.user);
                out.push_str(&card::render_card(card_view));
                out.push_str(&actions(card_view.wallet.connected));
                out
            }
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn identity_control(user: &str) -> String {
    format!("[ {} | {} ]\n", user, identity_text::SIGN_OUT)
}

fn actions(connected: bool) -> String {
    if connected {
        format!("{}\n[ {} ]\n", card_text::CONNECTED, card_text::PRINT)
    } else {
        format!("[ {} ]\n", card_text::CONNECT)
    }
}

/// Pure rendering rule. `label` prefixes the card's display name.
pub fn render(session: &SessionSnapshot, panel: Panel, label: &str) -> Screen {
    let Some(user) = &session.user else {
        return Screen::SignIn;
    };
    let Some(account) = &session.account else {
        return Screen::Provisioning { user: user.label().to_string() };
    };

    let wallet = WalletView {
        user: user.label().to_string(),
        address: account.address().to_string(),
        balance: match &session.balance {
            Some(snapshot) => BalanceDisplay::Value(snapshot.display()),
            None => BalanceDisplay::Loading,
        },
        connected: session.connection.connected,
    };

    match panel {
        Panel::Wallet => Screen::Wallet(wallet),
        Panel::BusinessCard => Screen::BusinessCard(CardView {
            display_name: card::display_name_with(label, &wallet.address),
            wallet,
        }),
    }
}
