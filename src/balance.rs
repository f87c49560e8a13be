//! Balance snapshots and their user-facing format.
//!
//! Balance collaborators report the native-token balance in its smallest unit
//! (18 decimal places) as a 256-bit unsigned integer. The card shows the whole
//! units only: `raw / 10^18`, integer division, followed by the token symbol.
//!
//! | raw | symbol | shown |
//! |-----|--------|-------|
//! | `1_500_000_000_000_000_000` | ETH | `1 ETH` |
//! | `999_999_999_999_999_999` | ETH | `0 ETH` |
//!
//! The remainder is discarded, never rounded. That is the visible format users
//! already know, so it is kept exactly.

use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CardError, Result};

/// Decimal places of the smallest unit.
pub const DECIMALS: u32 = 18;

/// 10^18, smallest units per whole token.
pub const WEI_PER_UNIT: u64 = 1_000_000_000_000_000_000;

/// Balance as last reported for an address. Stale between refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub raw: U256,
    pub symbol: String,
    pub fetched_at: DateTime<Utc>,
}

impl BalanceSnapshot {
    pub fn new(raw: U256, symbol: impl Into<String>) -> Self {
        Self { raw, symbol: symbol.into(), fetched_at: Utc::now() }
    }

    /// Whole units, remainder discarded.
    pub fn whole_units(&self) -> U256 {
        whole_units(self.raw)
    }

    pub fn display(&self) -> String {
        format_balance(self.raw, &self.symbol)
    }
}

pub fn whole_units(raw: U256) -> U256 {
    raw / U256::from(WEI_PER_UNIT)
}

/// `"<raw / 10^18> <symbol>"`, truncating.
pub fn format_balance(raw: U256, symbol: &str) -> String {
    format!("{} {}", whole_units(raw), symbol)
}

/// Parse a decimal smallest-unit string, as balance endpoints deliver it.
pub fn parse_raw(value: &str) -> Result<U256> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardError::InvalidBalance(value.to_string()));
    }
    U256::from_str_radix(trimmed, 10).map_err(|e| CardError::InvalidBalance(format!("{value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(n: u128) -> U256 {
        U256::from(n)
    }

    #[test]
    fn one_and_a_half_truncates_to_one() {
        assert_eq!(format_balance(raw(1_500_000_000_000_000_000), "ETH"), "1 ETH");
    }

    #[test]
    fn just_under_one_unit_is_zero() {
        assert_eq!(format_balance(raw(999_999_999_999_999_999), "ETH"), "0 ETH");
    }

    #[test]
    fn exact_units() {
        assert_eq!(format_balance(raw(0), "ETH"), "0 ETH");
        assert_eq!(format_balance(raw(1_000_000_000_000_000_000), "ETH"), "1 ETH");
        assert_eq!(format_balance(raw(42_000_000_000_000_000_000), "SepoliaETH"), "42 SepoliaETH");
    }

    #[test]
    fn matches_integer_division_for_arbitrary_values() {
        for value in [1u128, 17, 10u128.pow(18) - 1, 10u128.pow(18) + 1, 123_456_789_012_345_678_901_234, u128::MAX] {
            let expected = format!("{} ETH", value / 10u128.pow(18));
            assert_eq!(format_balance(U256::from(value), "ETH"), expected);
        }
    }

    #[test]
    fn max_value_does_not_overflow() {
        let shown = format_balance(U256::MAX, "ETH");
        // 2^256 - 1 has 78 digits; dividing by 10^18 leaves 60.
        let digits = shown.trim_end_matches(" ETH");
        assert_eq!(digits.len(), 60);
        assert!(digits.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn snapshot_display() {
        let snap = BalanceSnapshot::new(raw(2_999_999_999_999_999_999), "ETH");
        assert_eq!(snap.display(), "2 ETH");
        assert_eq!(snap.whole_units(), U256::from(2u8));
    }

    #[test]
    fn parse_decimal_strings() {
        assert_eq!(parse_raw("1500000000000000000").unwrap(), raw(1_500_000_000_000_000_000));
        assert_eq!(parse_raw(" 7 ").unwrap(), raw(7));
        assert!(matches!(parse_raw(""), Err(CardError::InvalidBalance(_))));
        assert!(matches!(parse_raw("0x10"), Err(CardError::InvalidBalance(_))));
        assert!(matches!(parse_raw("-1"), Err(CardError::InvalidBalance(_))));
    }

    #[test]
    fn parse_rejects_values_wider_than_256_bits() {
        let too_big = format!("{}0", U256::MAX);
        assert!(parse_raw(&too_big).is_err());
    }
}
