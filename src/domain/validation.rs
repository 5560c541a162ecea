//! Payment instrument checks.
//!
//! Everything here is pure: no storage, no clock reads except in the `is_valid_expiry`
//! convenience wrapper. Each check answers `true`/`false`; mapping a failed check to
//! an error code is the processor's job.

use super::payment::CardNetwork;
use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use std::sync::LazyLock;

static VPA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9]+$").expect("static VPA pattern"));

/// Checks a UPI handle of the form `localpart@handle`.
pub fn is_valid_vpa(vpa: &str) -> bool {
    VPA_PATTERN.is_match(vpa)
}

/// Removes the separators customers commonly type into card numbers.
pub fn clean_card_number(card_number: &str) -> String {
    card_number
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect()
}

/// Checks length (13 to 19 digits) and the Luhn checksum.
pub fn is_valid_card_number(card_number: &str) -> bool {
    let cleaned = clean_card_number(card_number);
    if !(13..=19).contains(&cleaned.len()) || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = cleaned
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();

    sum % 10 == 0
}

/// Classifies a card by its leading digits.
///
/// Only meaningful once `is_valid_card_number` has accepted the number.
pub fn detect_card_network(card_number: &str) -> CardNetwork {
    let cleaned = clean_card_number(card_number);
    let prefix: Vec<u8> = cleaned.bytes().take(2).collect();

    match prefix.as_slice() {
        [b'4', ..] => CardNetwork::Visa,
        [b'5', b'1'..=b'5'] => CardNetwork::Mastercard,
        [b'3', b'4' | b'7'] => CardNetwork::Amex,
        [b'6', b'0' | b'5'] | [b'8', b'1'..=b'9'] => CardNetwork::Rupay,
        _ => CardNetwork::Unknown,
    }
}

/// Expiry check against the current UTC date.
pub fn is_valid_expiry(month: &str, year: &str) -> bool {
    is_valid_expiry_at(month, year, Utc::now().date_naive())
}

/// A card stays valid through the whole of its expiry month.
///
/// Two-digit years are read as `20YY`. Anything that does not parse is simply invalid.
pub fn is_valid_expiry_at(month: &str, year: &str, today: NaiveDate) -> bool {
    let Ok(month) = month.trim().parse::<u32>() else {
        return false;
    };
    if !(1..=12).contains(&month) {
        return false;
    }

    let year_str = year.trim();
    let Ok(mut year) = year_str.parse::<i32>() else {
        return false;
    };
    if year_str.len() == 2 {
        year += 2000;
    }

    (year, month) >= (today.year(), today.month())
}
