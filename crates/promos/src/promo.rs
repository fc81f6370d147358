use serde::{Deserialize, Serialize};

use shopkit_core::{DomainError, DomainResult, ValueObject};
use shopkit_pricing::DiscountPercent;

/// A normalized promo code ready for submission to the remote validator.
///
/// Codes are case-insensitive: surrounding whitespace is trimmed and the text
/// uppercased at parse time, so `" save20 "` and `"SAVE20"` are the same code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PromoCode(String);

impl PromoCode {
    /// Normalize raw shopper input into a code.
    ///
    /// Rejects input that is empty after trimming; that check happens here,
    /// before any remote call is made.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(DomainError::validation("promo code cannot be empty"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Display for PromoCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PromoCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PromoCode> for String {
    fn from(value: PromoCode) -> Self {
        value.0
    }
}

impl ValueObject for PromoCode {}

/// Outcome of a validation call, shaped for display.
///
/// An invalid outcome always carries a zero discount, whatever the remote
/// reply said; the discount field is only meaningful alongside
/// `is_valid = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoValidation {
    pub is_valid: bool,
    pub discount: DiscountPercent,
    pub message: String,
}

impl PromoValidation {
    pub fn valid(discount: DiscountPercent, message: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            discount,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            discount: DiscountPercent::ZERO,
            message: message.into(),
        }
    }
}

impl ValueObject for PromoValidation {}

/// A promo code currently applied to a session's cart.
///
/// Constructible only from a successful validation; there is no way to hold
/// an application with a discount the remote side did not grant. One
/// application per session; applying a new code replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoApplication {
    code: PromoCode,
    discount: DiscountPercent,
}

impl PromoApplication {
    /// Build an application from a validation outcome.
    ///
    /// Returns `None` when the validation was not successful, regardless of
    /// what the discount field carries.
    pub fn from_validation(code: PromoCode, validation: &PromoValidation) -> Option<Self> {
        if !validation.is_valid {
            return None;
        }
        Some(Self {
            code,
            discount: validation.discount,
        })
    }

    pub fn code(&self) -> &PromoCode {
        &self.code
    }

    pub fn discount(&self) -> DiscountPercent {
        self.discount
    }
}
