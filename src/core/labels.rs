//! Text constants for the rendered page and card
//!
//! Centralized so the terminal front end, the printable card and the wasm
//! exports all show the same copy.

/// Page frame
pub mod page {
    pub const HEADER: &str = "Welcome to DeFi Card";
    pub const TAGLINE: &str = "Your Web3 Business Card Generator";
    pub const TITLE: &str = "Web3 Business Card Generator";
    pub const FOOTER: &str = "\u{a9} 2025 DeFi Card";
}

/// Identity control
pub mod identity {
    pub const SIGN_IN_PROMPT: &str = "Sign in to create your Web3 business card";
    pub const SIGN_IN: &str = "Sign in";
    pub const SIGN_OUT: &str = "Sign out";
    pub const CREATING_WALLET: &str = "Creating your wallet...";
}

/// Card content
pub mod card {
    pub const TITLE: &str = "Your Web3 Business Card";
    /// Prefix of the display name; the last four address characters follow it.
    pub const NAME_LABEL: &str = "Solana Explorer #";
    pub const NAME: &str = "Name:";
    pub const WALLET: &str = "Wallet:";
    pub const BALANCE: &str = "Balance:";
    pub const LOADING: &str = "Loading...";
    pub const CONNECT: &str = "Connect Wallet";
    pub const CONNECTED: &str = "Wallet is connected";
    pub const PRINT: &str = "Print or Save Business Card";
}

