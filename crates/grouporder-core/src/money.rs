//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE SPLIT-THE-BILL PROBLEM                                             │
//! │                                                                         │
//! │  Floating point:                                                        │
//! │    fee 10.00 split three ways = 3.3333... each                         │
//! │    Σ shares rendered to 2 decimals = 9.99  → 0.01 vanished              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units + largest remainder                  │
//! │    1000 allocated over [1, 1, 1] = [334, 333, 333]                     │
//! │    Σ shares == 1000, always                                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use grouporder_core::money::Money;
//!
//! let price = Money::from_minor(1099); // 10.99
//! let line_total = price * 2;          // 21.98
//! let shares = Money::from_minor(1000).allocate(&[1, 1, 1]);
//! assert_eq!(shares.iter().copied().sum::<Money>(), Money::from_minor(1000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::DiscountRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents, sen, ...).
///
/// The currency itself is a property of the deployment, not of the value:
/// every amount inside one order shares the same currency.
///
/// ## Where Money Flows
/// ```text
/// MenuItem.price ──► LineItem.item_price ──► line_total
///                                                │
///        gross_total ◄───────────────────────────┘
///             │
///             ├──► discount (rate, cap, threshold)
///             ├──► net_total + fee ──► grand_total
///             └──► per-line allocation ──► final_price
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use grouporder_core::money::Money;
    ///
    /// let price = Money::from_minor(1099);
    /// assert_eq!(price.minor_units(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use grouporder_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(299);
    /// assert_eq!(unit_price.multiply_quantity(3).minor_units(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `rate` of this amount, rounded half-up to a minor unit.
    ///
    /// ## Implementation
    /// Integer math in basis points: `(amount * bps + 5000) / 10000`.
    /// Only meaningful for non-negative amounts, which is all the engine
    /// ever feeds it (gross totals).
    ///
    /// ## Example
    /// ```rust
    /// use grouporder_core::money::Money;
    /// use grouporder_core::types::DiscountRate;
    ///
    /// let gross = Money::from_minor(25000);
    /// let discount = gross.percent_of(DiscountRate::from_bps(1000)); // 10%
    /// assert_eq!(discount.minor_units(), 2500);
    /// ```
    pub fn percent_of(&self, rate: DiscountRate) -> Money {
        let amount = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(amount as i64)
    }

    /// Splits this amount across `weights` proportionally.
    ///
    /// Uses the largest-remainder method: every share is first floored, then
    /// the leftover minor units go one each to the shares with the largest
    /// fractional remainder (earlier positions win ties). The result always
    /// sums to exactly `self`, and a zero weight always receives zero.
    ///
    /// Negative weights are treated as zero. If every weight is zero the
    /// result is all zeros, never a division by zero.
    ///
    /// ## Example
    /// ```rust
    /// use grouporder_core::money::Money;
    ///
    /// let fee = Money::from_minor(1000);
    /// let shares = fee.allocate(&[1, 1, 1]);
    /// assert_eq!(
    ///     shares,
    ///     vec![Money::from_minor(334), Money::from_minor(333), Money::from_minor(333)]
    /// );
    /// ```
    pub fn allocate(&self, weights: &[i64]) -> Vec<Money> {
        let total: i128 = weights.iter().map(|w| (*w).max(0) as i128).sum();
        if total == 0 {
            return vec![Money::zero(); weights.len()];
        }

        let amount = self.0 as i128;
        let mut shares: Vec<i128> = Vec::with_capacity(weights.len());
        let mut remainders: Vec<(usize, i128)> = Vec::with_capacity(weights.len());

        for (index, weight) in weights.iter().enumerate() {
            let product = amount * (*weight).max(0) as i128;
            shares.push(product.div_euclid(total));
            remainders.push((index, product.rem_euclid(total)));
        }

        // Flooring leaves 0 <= leftover < weights.len()
        let leftover = amount - shares.iter().sum::<i128>();
        remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        for (index, _) in remainders.into_iter().take(leftover.max(0) as usize) {
            shares[index] += 1;
        }

        shares.into_iter().map(|s| Money(s as i64)).collect()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Human-readable `major.minor` rendering, for logs and debugging.
///
/// Currency symbols and locale formatting belong to the frontend.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
