//! Compile-time unit safety for shop economics quantities.
//!
//! Prevents mixing currency amounts with plain ratios, and percentages with
//! fractions.
//!
//! # Design Philosophy
//!
//! The derivation engine juggles two kinds of numbers that look the same as
//! `f64` but mean different things:
//! - Currency amounts (order value, ad spend, revenue, profit)
//! - Percentages expressed on a 0 to 100 scale (conversion, COGS, returns)
//!
//! A percentage compared directly against a ratio computed elsewhere is off
//! by a factor of 100. [`Percent`] therefore hides its raw value behind
//! [`Percent::as_fraction`], the only way to use it in arithmetic.
//!
//! # Usage
//!
//! ```
//! use ecomsim_core::units::{Money, Percent};
//!
//! let revenue = Money(37_500_000.0);
//! let cogs = Percent::new(60.0);
//!
//! let product_cost = revenue * cogs.as_fraction();
//! assert_eq!(product_cost, Money(22_500_000.0));
//!
//! // Ratio of two amounts is a plain number
//! let roas = revenue / Money(5_000_000.0);
//! assert_eq!(roas, 7.5);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Macro to implement common arithmetic operations for unit types
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Mul<$type> for f64 {
            type Output = $type;
            fn mul(self, rhs: $type) -> Self::Output {
                <$type>::new(self * rhs.0)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.2} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Check if value is finite
            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// True for exactly zero (either sign)
            #[inline]
            pub fn is_zero(self) -> bool {
                self.0 == 0.0
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

// =============================================================================
// Currency
// =============================================================================

/// An amount of money in the shop's currency.
///
/// The engine is currency-agnostic; the currency label is a display concern
/// (see [`crate::format::DisplayOptions`]).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(pub f64);

impl_unit_ops!(Money, "cu");

// =============================================================================
// Percentages
// =============================================================================

/// A percentage on the 0 to 100 scale.
///
/// The raw value is private: arithmetic goes through [`Percent::as_fraction`]
/// so a percentage is always divided by 100 before it meets a ratio.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Percent(f64);

impl Percent {
    /// Create a percentage from a 0-100 value. Range checks happen in the
    /// engine so that out-of-range configuration is reported, not hidden.
    #[inline]
    pub const fn new(percent: f64) -> Self {
        Self(percent)
    }

    /// Build a percentage from a fraction (0.025 becomes 2.5%).
    #[inline]
    pub fn from_fraction(fraction: f64) -> Self {
        Self(fraction * 100.0)
    }

    /// The value on the 0-100 scale, for display and validation.
    #[inline]
    pub const fn percent(self) -> f64 {
        self.0
    }

    /// The value as a fraction of one.
    #[inline]
    pub fn as_fraction(self) -> f64 {
        self.0 / 100.0
    }

    /// True if the value is finite and inside [0, 100].
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && (0.0..=100.0).contains(&self.0)
    }
}

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
