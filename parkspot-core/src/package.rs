//! Prepaid parking bundles and the balances users hold against them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance applied when comparing a package price with its discounted
/// original price.
const PRICE_TOLERANCE: f64 = 0.01;

/// A prepaid block of parking time sold at one location.
///
/// `price` is expected to equal `original_price * (1 - discount / 100)`.
/// The relationship is not enforced; [`LocationPackage::has_consistent_discount`]
/// checks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPackage {
    /// Unique identifier.
    pub id: String,
    /// Location the package is sold at.
    pub location_id: String,
    /// Display name.
    pub name: String,
    /// Parking time included, in minutes.
    pub minutes: u32,
    /// Selling price.
    pub price: f64,
    /// Price before discount.
    pub original_price: f64,
    /// Discount percentage in `0..=100`.
    pub discount: f64,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Presentation hint for highlighted packages.
    #[serde(default)]
    pub is_popular: bool,
}

impl LocationPackage {
    /// Report whether `price`, `original_price` and `discount` agree.
    ///
    /// # Examples
    /// ```
    /// use parkspot_core::LocationPackage;
    ///
    /// let package = LocationPackage {
    ///     id: "pkg".into(),
    ///     location_id: "loc-1".into(),
    ///     name: "Five hours".into(),
    ///     minutes: 300,
    ///     price: 112.5,
    ///     original_price: 125.0,
    ///     discount: 10.0,
    ///     description: String::new(),
    ///     is_popular: false,
    /// };
    /// assert!(package.has_consistent_discount());
    /// ```
    #[must_use]
    pub fn has_consistent_discount(&self) -> bool {
        if !(0.0..=100.0).contains(&self.discount) {
            return false;
        }
        let expected = self.original_price * (1.0 - self.discount / 100.0);
        (expected - self.price).abs() <= PRICE_TOLERANCE
    }
}

/// A package bought by a user, consumed minute by minute elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLocationPackage {
    /// Unique identifier.
    pub id: String,
    /// Owner of the balance.
    pub user_id: String,
    /// Location the balance can be used at.
    pub location_id: String,
    /// Package the balance was bought from.
    pub package_id: String,
    /// Minutes left to use.
    pub remaining_minutes: u32,
    /// Purchase timestamp.
    pub purchase_date: DateTime<Utc>,
    /// Moment the balance lapses.
    pub expiration_date: DateTime<Utc>,
    /// Whether the balance may still be used.
    pub is_active: bool,
}

/// Errors returned by [`UserLocationPackage::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserPackageError {
    /// The balance would expire before, or at, its purchase.
    #[error("expiration {expiration} must be after purchase {purchase}")]
    ExpiresBeforePurchase {
        /// Purchase timestamp.
        purchase: DateTime<Utc>,
        /// Requested expiry.
        expiration: DateTime<Utc>,
    },
}

impl UserLocationPackage {
    /// Validate and construct an active balance holding the package's full
    /// minutes.
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        package: &LocationPackage,
        purchase_date: DateTime<Utc>,
        expiration_date: DateTime<Utc>,
    ) -> Result<Self, UserPackageError> {
        if expiration_date <= purchase_date {
            return Err(UserPackageError::ExpiresBeforePurchase {
                purchase: purchase_date,
                expiration: expiration_date,
            });
        }
        Ok(Self {
            id: id.into(),
            user_id: user_id.into(),
            location_id: package.location_id.clone(),
            package_id: package.id.clone(),
            remaining_minutes: package.minutes,
            purchase_date,
            expiration_date,
            is_active: true,
        })
    }

    /// Report whether the balance can be spent at `now`.
    #[must_use]
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.remaining_minutes > 0 && now < self.expiration_date
    }
}
