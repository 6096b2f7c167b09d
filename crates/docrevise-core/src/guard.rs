//! Embedded-media protection around a paragraph rewrite
//!
//! A guard is armed before any mutation. Paragraphs without media stay
//! `Clean` and cost nothing. Paragraphs with media are snapshotted; after
//! the rewrite [`ImageGuard::verify`] keeps the mutation if no media was
//! lost, or restores the snapshot and reports `Restored`.
//!
//! ```text
//! arm ──► Clean ───────────────────────────► Clean
//!    └──► Snapshotted ──verify──► Verified   (media count kept)
//!                           └───► Restored   (media lost, snapshot written back)
//! ```

use tracing::warn;

use crate::paragraph::StyledParagraph;

/// Whether the paragraph carries embedded media
pub fn detect<P: StyledParagraph + ?Sized>(paragraph: &P) -> bool {
    paragraph.media_count() > 0
}

/// Final state of a guard cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// No media was present; nothing was checked
    Clean,
    /// Media survived the mutation
    Verified,
    /// Media was lost; the paragraph was restored from its snapshot
    Restored,
}

enum GuardState<S> {
    Clean,
    Snapshotted { backup: S, media_before: usize },
}

/// Paragraph-scoped media guard owning the snapshot
pub struct ImageGuard<S> {
    state: GuardState<S>,
}

impl<S> ImageGuard<S> {
    /// Detects media and, when present, snapshots the paragraph
    pub fn arm<P>(paragraph: &P) -> Self
    where
        P: StyledParagraph<Snapshot = S> + ?Sized,
    {
        let media_before = paragraph.media_count();
        let state = if media_before > 0 {
            GuardState::Snapshotted {
                backup: paragraph.snapshot(),
                media_before,
            }
        } else {
            GuardState::Clean
        };
        Self { state }
    }

    /// Whether a snapshot is held
    pub fn is_snapshotted(&self) -> bool {
        matches!(self.state, GuardState::Snapshotted { .. })
    }

    /// Media count observed when the guard was armed
    pub fn media_before(&self) -> usize {
        match self.state {
            GuardState::Clean => 0,
            GuardState::Snapshotted { media_before, .. } => media_before,
        }
    }

    /// Checks the paragraph after mutation, restoring the snapshot if any
    /// media disappeared. Consumes the guard and its snapshot.
    pub fn verify<P>(self, paragraph: &mut P) -> GuardOutcome
    where
        P: StyledParagraph<Snapshot = S> + ?Sized,
    {
        match self.state {
            GuardState::Clean => GuardOutcome::Clean,
            GuardState::Snapshotted {
                backup,
                media_before,
            } => {
                let media_after = paragraph.media_count();
                if media_after >= media_before {
                    GuardOutcome::Verified
                } else {
                    warn!(
                        media_before,
                        media_after, "media lost during rewrite, restoring paragraph"
                    );
                    paragraph.restore(backup);
                    GuardOutcome::Restored
                }
            }
        }
    }
}
