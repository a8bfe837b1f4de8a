use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RequestStatus — the single canonical status vocabulary
// ---------------------------------------------------------------------------

/// The backend historically emitted the same status under several casings
/// (`Sealed`, `SEALED`, `Pending_Consent`). Parsing collapses them all here;
/// serialization always emits the canonical SCREAMING_SNAKE form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    PendingConsent,
    ConsentGiven,
    Completed,
    Declined,
    Analyzed,
    Sealed,
    Expired,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 7] = [
        RequestStatus::PendingConsent,
        RequestStatus::ConsentGiven,
        RequestStatus::Completed,
        RequestStatus::Declined,
        RequestStatus::Analyzed,
        RequestStatus::Sealed,
        RequestStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::PendingConsent => "PENDING_CONSENT",
            RequestStatus::ConsentGiven => "CONSENT_GIVEN",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Declined => "DECLINED",
            RequestStatus::Analyzed => "ANALYZED",
            RequestStatus::Sealed => "SEALED",
            RequestStatus::Expired => "EXPIRED",
        }
    }

    /// Case-insensitive parse accepting space and underscore separators.
    /// Returns `None` for anything outside the vocabulary; callers decide
    /// their own fallback (display code falls back to the first stage).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == normalized)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown request status: {0}")]
pub struct UnknownStatus(pub String);

impl Serialize for RequestStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RequestStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom(UnknownStatus(raw)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
