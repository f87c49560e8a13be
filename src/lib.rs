//! DeFi Card: sign in, get a custodial wallet, print a Web3 business card.
//!
//! # Architecture
//!
//! ```text
//! App (composition root, cooperative event loop)
//!   │
//!   ├── AppContext (built once)
//!   │     ├── IdentityProvider   (sign in/out, custodial wallet provisioning)
//!   │     ├── WalletConnection   (connectors, connect/disconnect)
//!   │     ├── BalanceQuery       (raw U256 balance per address)
//!   │     └── Printer            (print facility)
//!   │
//!   ├── Reconciler (user present + no wallet → provision exactly once)
//!   │
//!   └── View (pure: SessionSnapshot + Panel → Screen)
//! ```
//!
//! # Screens
//!
//! | Session | Panel | Screen |
//! |---------|-------|--------|
//! | no user | any | `SignIn` |
//! | user, no wallet | any | `Provisioning` (identity control only) |
//! | user + wallet | `Wallet` | address + balance |
//! | user + wallet | `BusinessCard` | card with display name |
//!
//! # Features
//!
//! - `native` - CLI, tokio runtime, tracing subscriber, signal handling
//! - `wasm` - browser bindings, console logging, `window.print()`
//!
//! # Usage
//!
//! ```ignore
//! use deficard::{App, AppConfig, AppContext, Event, UserIdentity};
//!
//! let (ctx, _handles) = AppContext::in_memory(
//!     AppConfig::new("deficard").with_client_id("client"),
//!     UserIdentity::new("user-1"),
//! )?;
//! let mut app = App::new(ctx);
//! app.dispatch(Event::SignInRequested).await;
//! println!("{}", app.page());
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod app;
pub mod balance;
pub mod core;
pub mod error;
pub mod providers;
pub mod reconciler;
pub mod session;
pub mod view;

// =============================================================================
// Native-only modules (CLI, tokio)
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;
#[cfg(feature = "native")]
pub mod runtime;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports: Shared
// =============================================================================
pub use app::{App, AppConfig, AppContext, ChainConfig, Command, Epoch, Event, MemoryCollaborators, Task};
pub use balance::{format_balance, BalanceSnapshot};
pub use core::Signal;
pub use error::{CardError, Result};
pub use providers::{BalanceQuery, IdentityProvider, Printer, WalletConnection};
pub use reconciler::{select_connector, ReconcileAction, Reconciler};
pub use session::{ConnectionState, Connector, SessionSnapshot, UserIdentity, WalletAccount};
pub use view::{Panel, Screen};

// =============================================================================
// Re-exports: Native
// =============================================================================
#[cfg(feature = "native")]
pub use logging::init_logging;
#[cfg(feature = "native")]
pub use runtime::{install_signal_handlers, Shutdown};

// =============================================================================
// Re-exports: WASM
// =============================================================================
#[cfg(feature = "wasm")]
pub use wasm::{DefiCard, WindowPrinter};
