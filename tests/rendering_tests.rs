//! Rendering tests: balance formatting and the pure view rule.

use alloy_primitives::U256;
use deficard::view::{self, card, layout, BalanceDisplay};
use deficard::{
    format_balance, AppConfig, BalanceSnapshot, ConnectionState, Panel, Screen, SessionSnapshot, UserIdentity,
    WalletAccount,
};
use tempfile::TempDir;

const ADDRESS: &str = "0x00000000000000000000000000000000000abcde";

fn session(balance: Option<BalanceSnapshot>, connected: bool) -> SessionSnapshot {
    SessionSnapshot {
        user: Some(UserIdentity::new("u-1").with_email("ada@example.com")),
        account: Some(WalletAccount::new(ADDRESS).expect("address")),
        connection: if connected { ConnectionState::connected(ADDRESS, 1) } else { ConnectionState::disconnected() },
        balance,
    }
}

#[test]
fn format_truncates_toward_zero() {
    let wei = U256::from(10u64).pow(U256::from(18u8));
    let cases = [
        (U256::ZERO, "0 ETH"),
        (wei - U256::from(1u8), "0 ETH"),
        (wei, "1 ETH"),
        (wei * U256::from(3u8) / U256::from(2u8), "1 ETH"),
        (wei * U256::from(1_000_000u64), "1000000 ETH"),
    ];
    for (raw, expected) in cases {
        assert_eq!(format_balance(raw, "ETH"), expected);
    }
}

#[test]
fn card_names_use_last_four_characters() {
    assert_eq!(card::address_suffix("0xABCDEF1234"), "1234");
    assert_eq!(card::display_name("0xABCDEF1234"), "Solana Explorer #1234");
}

#[test]
fn wallet_and_card_screens() {
    let loading = view::render(&session(None, false), Panel::Wallet, "Solana Explorer #");
    match &loading {
        Screen::Wallet(w) => {
            assert_eq!(w.user, "ada@example.com");
            assert_eq!(w.balance, BalanceDisplay::Loading);
        }
        other => panic!("unexpected screen: {:?}", other),
    }
    assert!(loading.to_text().contains("Connect Wallet"));

    let snapshot = BalanceSnapshot::new(U256::from(7u8) * U256::from(10u64).pow(U256::from(18u8)), "SepoliaETH");
    let screen = view::render(&session(Some(snapshot), true), Panel::BusinessCard, "Card #");
    let card_view = screen.card().expect("card");
    assert_eq!(card_view.display_name, "Card #bcde");
    assert_eq!(card_view.wallet.balance.as_text(), "7 SepoliaETH");

    let text = screen.to_text();
    assert!(text.contains("Wallet is connected"));
    assert!(text.contains("Print or Save Business Card"));
}

#[test]
fn page_frame_surrounds_every_screen() {
    for screen in [
        Screen::SignIn,
        Screen::Provisioning { user: "Ada".into() },
        view::render(&session(None, false), Panel::BusinessCard, "Solana Explorer #"),
    ] {
        let page = layout::render_page(&screen);
        assert!(page.contains("Welcome to DeFi Card"));
        assert!(page.contains("Web3 Business Card Generator"));
        assert!(page.contains(&screen.to_text()));
    }
}

#[test]
fn config_file_round_trip() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("nested").join("deficard.json");
    let config = AppConfig::new("cards").with_client_id("cid").with_card_label("Card #").with_auto_connect(true);
    config.save(&path).expect("save");
    assert_eq!(AppConfig::load(&path).expect("load"), config);
}
