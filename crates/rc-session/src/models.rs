use chrono::{DateTime, Utc};
use rc_core::domain::{StaffProfile, StaffRole};
use serde::{Deserialize, Serialize};

/// The one record this store keeps: the signed-in staff member, cached
/// between sessions so the portal can skip re-verification at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedUser {
    pub email: String,
    pub name: String,
    pub role: StaffRole,
    pub verified_at: DateTime<Utc>,
}

impl CachedUser {
    pub fn from_profile(profile: StaffProfile, verified_at: DateTime<Utc>) -> Self {
        Self {
            email: profile.email,
            name: profile.name,
            role: profile.role,
            verified_at,
        }
    }
}
