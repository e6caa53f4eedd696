//! Service period: when and where the cadet signed on and off.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Sign-on and sign-off details. Each field may be unset independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePeriod {
    /// ISO calendar date, `YYYY-MM-DD`.
    pub sign_on_date: Option<String>,
    pub sign_on_port: Option<String>,

    /// ISO calendar date, `YYYY-MM-DD`.
    pub sign_off_date: Option<String>,
    pub sign_off_port: Option<String>,
}

impl ServicePeriod {
    /// All four fields are filled in and both dates are valid calendar dates.
    pub fn is_complete(&self) -> bool {
        is_filled(self.sign_on_port.as_deref())
            && is_filled(self.sign_off_port.as_deref())
            && parse_date(self.sign_on_date.as_deref()).is_some()
            && parse_date(self.sign_off_date.as_deref()).is_some()
    }

    /// Applies a patch. Fields absent from the patch are left untouched.
    ///
    /// Values are trimmed, and dates that parse are stored as `YYYY-MM-DD`
    /// so stored dates sort chronologically.
    pub fn merge(&mut self, patch: ServicePeriodPatch) {
        fn apply(
            slot: &mut Option<String>,
            value: Option<String>,
            normalize: fn(&str) -> Option<String>,
        ) {
            if let Some(value) = value {
                *slot = normalize(&value);
            }
        }

        apply(&mut self.sign_on_date, patch.sign_on_date, normalize_date);
        apply(&mut self.sign_on_port, patch.sign_on_port, normalize_text);
        apply(&mut self.sign_off_date, patch.sign_off_date, normalize_date);
        apply(&mut self.sign_off_port, patch.sign_off_port, normalize_text);
    }
}

/// A partial update to a [`ServicePeriod`].
///
/// `Some("")` clears a field; `None` leaves it as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServicePeriodPatch {
    pub sign_on_date: Option<String>,
    pub sign_on_port: Option<String>,
    pub sign_off_date: Option<String>,
    pub sign_off_port: Option<String>,
}

impl ServicePeriodPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn is_filled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn normalize_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// The stored form of an entered date: ISO `YYYY-MM-DD` when it parses,
/// otherwise the trimmed text. Blank input clears the field.
fn normalize_date(value: &str) -> Option<String> {
    let value = normalize_text(value)?;
    Some(value.parse::<Date>().map_or(value, |date| date.to_string()))
}

/// Parses a stored date, tolerating surrounding whitespace.
pub fn parse_date(value: Option<&str>) -> Option<Date> {
    value?.trim().parse::<Date>().ok()
}
