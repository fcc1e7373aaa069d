//! Per-session continuity state.
//!
//! One `DriveSession` belongs to one moving entity and is the only mutable
//! cross-call state in the engine. It is advisory: the remembered segment
//! reorders candidate preference on the next call but never suppresses a
//! lookup, so the engine always recovers from empty or stale state.

use uuid::Uuid;

/// Continuity state for one logical drive session.
///
/// Updated only on successful resolutions; a transient lookup failure leaves
/// the remembered segment in place.
#[derive(Debug, Clone)]
pub struct DriveSession {
    id: Uuid,
    last_segment_id: Option<i64>,
    last_distance_m: Option<f64>,
}

impl DriveSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            last_segment_id: None,
            last_distance_m: None,
        }
    }

    /// Session id, for correlating log lines across concurrent sessions
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Segment confirmed by the most recent successful resolution
    pub fn current(&self) -> Option<i64> {
        self.last_segment_id
    }

    /// Distance to the segment when it was last confirmed; diagnostic only
    pub fn last_distance_m(&self) -> Option<f64> {
        self.last_distance_m
    }

    /// Record a confirmed segment. Only the resolver calls this, and only
    /// after a successful resolution.
    pub(crate) fn confirm(&mut self, segment_id: i64, distance_m: f64) {
        self.last_segment_id = Some(segment_id);
        self.last_distance_m = Some(distance_m);
    }

    /// Clear continuity, e.g. at a simulated trip restart
    pub fn reset(&mut self) {
        self.last_segment_id = None;
        self.last_distance_m = None;
    }
}

impl Default for DriveSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let session = DriveSession::new();
        assert!(session.current().is_none());
        assert!(session.last_distance_m().is_none());
    }

    #[test]
    fn test_confirm_and_reset() {
        let mut session = DriveSession::new();
        session.confirm(41423, 12.4);
        assert_eq!(session.current(), Some(41423));
        assert_eq!(session.last_distance_m(), Some(12.4));

        session.confirm(99, 3.0);
        assert_eq!(session.current(), Some(99));

        session.reset();
        assert!(session.current().is_none());
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = DriveSession::new();
        let b = DriveSession::new();
        a.confirm(1, 1.0);
        assert!(b.current().is_none());
        assert_ne!(a.id(), b.id());
    }
}
