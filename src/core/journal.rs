//! Snapshot and restore for collaborators that a transition may need to unwind.

/// State that can be captured before a transition and put back if it fails
pub trait Journaled {
    /// Captured state
    type Snapshot;

    /// Capture the current state
    fn snapshot(&self) -> Self::Snapshot;

    /// Put back a previously captured state
    fn restore(&mut self, snapshot: Self::Snapshot);
}
