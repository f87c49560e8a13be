//! Business card: display name derivation and the printable text card.

use crate::core::labels::card as text;
use crate::view::{BalanceDisplay, CardView};

/// Label prefix + the last four characters of the address.
///
/// `"0xABCDEF1234"` → `"Solana Explorer #1234"`. Shorter addresses contribute
/// whatever characters they have.
pub fn display_name(address: &str) -> String {
    display_name_with(text::NAME_LABEL, address)
}

pub fn display_name_with(label: &str, address: &str) -> String {
    format!("{}{}", label, address_suffix(address))
}

/// Last four characters (not bytes) of the address.
pub fn address_suffix(address: &str) -> String {
    let count = address.chars().count();
    address.chars().skip(count.saturating_sub(4)).collect()
}

/// Boxed text card, the document handed to the print facility.
pub fn render_card(card: &CardView) -> String {
    let balance = match &card.wallet.balance {
        BalanceDisplay::Value(v) => v.as_str(),
        BalanceDisplay::Loading => text::LOADING,
    };
    let rows = [
        format!("{:8} {}", text::NAME, card.display_name),
        format!("{:8} {}", text::WALLET, card.wallet.address),
        format!("{:8} {}", text::BALANCE, balance),
    ];
    let width = rows
        .iter()
        .map(|r| r.chars().count())
        .chain(std::iter::once(text::TITLE.chars().count()))
        .max()
        .unwrap_or(0)
        + 2;

    let bar = "─".repeat(width);
    let line = |s: &str| format!("│ {}{}│\n", s, " ".repeat(width - 1 - s.chars().count()));

    let mut out = String::new();
    out.push_str(&format!("┌{}┐\n", bar));
    out.push_str(&line(text::TITLE));
    out.push_str(&format!("├{}┤\n", bar));
    for row in &rows {
        out.push_str(&line(row));
    }
    out.push_str(&format!("└{}┘\n", bar));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::WalletView;

    #[test]
    fn suffix_is_last_four_characters() {
        assert_eq!(address_suffix("0xABCDEF1234"), "1234");
        assert_eq!(display_name("0xABCDEF1234"), "Solana Explorer #1234");
    }

    #[test]
    fn short_addresses_do_not_panic() {
        assert_eq!(address_suffix("0x1"), "0x1");
        assert_eq!(address_suffix(""), "");
        assert_eq!(address_suffix("ééééé"), "éééé");
    }

    #[test]
    fn custom_label() {
        assert_eq!(display_name_with("Card #", "0x00000000000000000000000000000000000000ff"), "Card #00ff");
    }

    #[test]
    fn card_lines_are_aligned() {
        let card = CardView {
            display_name: display_name("0x52908400098527886E0F7030069857D2E4169EE7"),
            wallet: WalletView {
                user: "ada".into(),
                address: "0x52908400098527886E0F7030069857D2E4169EE7".into(),
                balance: BalanceDisplay::Value("1 ETH".into()),
                connected: true,
            },
        };
        let rendered = render_card(&card);
        let widths: Vec<usize> = rendered.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{rendered}");
        assert!(rendered.contains("Solana Explorer #9EE7"));
        assert!(rendered.contains("1 ETH"));
    }

    #[test]
    fn card_shows_loading_placeholder() {
        let card = CardView {
            display_name: display_name("0x52908400098527886E0F7030069857D2E4169EE7"),
            wallet: WalletView {
                user: "ada".into(),
                address: "0x52908400098527886E0F7030069857D2E4169EE7".into(),
                balance: BalanceDisplay::Loading,
                connected: false,
            },
        };
        assert!(render_card(&card).contains("Loading..."));
    }
}
