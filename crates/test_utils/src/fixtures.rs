//! Fixed test data
//!
//! Deterministic timestamps and amounts so assertions never depend on the
//! wall clock.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::Money;
use rust_decimal_macros::dec;

/// Temporal fixtures
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// A Friday evening session start
    pub fn session_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 6, 19, 0, 0).unwrap()
    }

    /// Four hours after [`TemporalFixtures::session_start`]
    pub fn session_end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 6, 23, 0, 0).unwrap()
    }

    /// A moment mid-session
    pub fn mid_session() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 6, 21, 30, 0).unwrap()
    }
}

/// Monetary fixtures
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The standard table buy-in
    pub fn standard_buy_in() -> Money {
        Money::new(dec!(50))
    }

    /// A deep-stack buy-in
    pub fn deep_buy_in() -> Money {
        Money::new(dec!(200))
    }

    /// A small mid-session cash-out
    pub fn small_cash_out() -> Money {
        Money::new(dec!(20))
    }
}
