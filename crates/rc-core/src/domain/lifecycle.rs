// ---------------------------------------------------------------------------
// Stage — fixed ordered list backing the progress display
// ---------------------------------------------------------------------------

/// Display order for the request progress bar. The list mixes sequential
/// stages with the `Declined` branch and the post-hoc `Analyzed` marker in
/// one line; it is a display simplification, not a state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    PendingConsent,
    ConsentGiven,
    Completed,
    Declined,
    Analyzed,
    Sealed,
}

impl Stage {
    pub const ORDER: [Stage; 6] = [
        Stage::PendingConsent,
        Stage::ConsentGiven,
        Stage::Completed,
        Stage::Declined,
        Stage::Analyzed,
        Stage::Sealed,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Stage::PendingConsent => "PENDING_CONSENT",
            Stage::ConsentGiven => "CONSENT_GIVEN",
            Stage::Completed => "COMPLETED",
            Stage::Declined => "DECLINED",
            Stage::Analyzed => "ANALYZED",
            Stage::Sealed => "SEALED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::PendingConsent => "Awaiting consent",
            Stage::ConsentGiven => "Consent given",
            Stage::Completed => "Reference completed",
            Stage::Declined => "Declined",
            Stage::Analyzed => "Analysis ready",
            Stage::Sealed => "Sealed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageDisplay {
    Completed,
    Active,
    Pending,
}

// ---------------------------------------------------------------------------
// project — pure status-to-stage projection for display
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifecycleProjection {
    pub active: usize,
    pub archived: bool,
}

impl LifecycleProjection {
    pub fn display(&self, index: usize) -> StageDisplay {
        use std::cmp::Ordering;
        match index.cmp(&self.active) {
            Ordering::Less => StageDisplay::Completed,
            Ordering::Equal => StageDisplay::Active,
            Ordering::Greater => StageDisplay::Pending,
        }
    }

    pub fn stages(&self) -> impl Iterator<Item = (Stage, StageDisplay)> + '_ {
        Stage::ORDER
            .iter()
            .enumerate()
            .map(|(i, stage)| (*stage, self.display(i)))
    }
}

/// Maps a raw status string (case-insensitively) onto the stage list.
///
/// An unrecognized status never errors: it falls back to the first stage.
/// That is the designed safe default, so a request with a junk status still
/// renders a progress bar instead of breaking the page. `archived` is
/// carried through untouched; it does not shift the stage math.
pub fn project(raw_status: &str, archived: bool) -> LifecycleProjection {
    let normalized: String = raw_status
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect();

    let active = Stage::ORDER
        .iter()
        .position(|stage| stage.key() == normalized)
        .unwrap_or(0);

    LifecycleProjection { active, archived }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
