use chrono::Utc;
use rc_session::{CachedUser, SessionStore};

use rc_core::domain::ReferenceBackend;

// ---------------------------------------------------------------------------
// Sign-in lifecycle over the session cache (feature "session-cache")
// ---------------------------------------------------------------------------

/// Verifies the staff member through the gateway and caches the profile.
pub async fn sign_in(
    backend: &dyn ReferenceBackend,
    store: &dyn SessionStore,
    email: &str,
) -> Result<CachedUser, anyhow::Error> {
    let profile = backend.verify_staff(email).await?;
    let user = CachedUser::from_profile(profile, Utc::now());
    store.save_user(&user)?;
    tracing::info!(email = %user.email, "staff sign-in cached");
    Ok(user)
}

/// Load-at-startup half of the cache lifecycle.
pub fn restore(store: &dyn SessionStore) -> Result<Option<CachedUser>, anyhow::Error> {
    Ok(store.load_user()?)
}

/// Clear-on-logout half of the cache lifecycle.
pub fn sign_out(store: &dyn SessionStore) -> Result<(), anyhow::Error> {
    store.clear_user()?;
    tracing::info!("staff sign-out, session cache cleared");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
