//! # Temporal Logic
//!
//! Expiry evaluation for credential dates. All dates are UTC calendar
//! dates; local time conversion is a presentation concern handled at the
//! API layer.
//!
//! The ledger contract performs its own on-chain expiry check and remains
//! the source of truth for verification verdicts. The functions here exist
//! for display-side annotation of stored records, and must agree with the
//! contract's rule: a credential is expired when its expiry date is
//! strictly before the current date. A credential expiring today is still
//! valid for the whole of that day.

use chrono::{NaiveDate, Utc};

/// Whether a credential with the given optional expiry date is expired as
/// of `today`.
///
/// - `expiry` strictly before `today` → expired.
/// - `expiry` equal to `today` or later → not expired.
/// - No expiry date → never expires.
pub fn is_expired_on(expiry: Option<NaiveDate>, today: NaiveDate) -> bool {
    match expiry {
        Some(date) => date < today,
        None => false,
    }
}

/// Whether a credential with the given optional expiry date is expired as
/// of the current UTC date. See [`is_expired_on`].
pub fn is_expired(expiry: Option<NaiveDate>) -> bool {
    is_expired_on(expiry, Utc::now().date_naive())
}
