//! WASM module: browser front end
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           DefiCard (JS API)             │
//! │  signIn, signOut, connect, print, ...   │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │                 App                     │
//! │  reconciler + signals + view            │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │  memory collaborators + WindowPrinter   │
//! └─────────────────────────────────────────┘
//! ```

mod card;
mod print;

pub use card::DefiCard;
pub use print::WindowPrinter;

use wasm_bindgen::prelude::*;

use crate::balance;
use crate::view::card as card_view;

/// Initialize WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

macro_rules! log {
    ($($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*))
    }
}

pub(crate) use log;

/// `raw` is a decimal string in the smallest unit.
#[wasm_bindgen(js_name = "formatBalance")]
pub fn format_balance(raw: &str, symbol: &str) -> Result<String, JsValue> {
    let value = balance::parse_raw(raw).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(balance::format_balance(value, symbol))
}

#[wasm_bindgen(js_name = "displayName")]
pub fn display_name(address: &str) -> String {
    card_view::display_name(address)
}
