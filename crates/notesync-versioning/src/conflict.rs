use notesync_core::VersionToken;

/// Outcome of comparing the stored version with the version a reader holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadDecision {
    /// Stored is newer: send the content
    Send,
    /// Reader already has the stored version
    NotModified,
    /// Reader claims a version the store never reached
    ReaderAhead,
}

/// Outcome of comparing the stored version with a proposed write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDecision {
    /// Proposed version is strictly newer (or nothing is stored)
    Accept,
    /// Stored version is the same or newer
    Reject,
}

/// Classify a conditional read
pub fn decide_read(stored: VersionToken, client: VersionToken) -> ReadDecision {
    use std::cmp::Ordering;

    match stored.cmp(&client) {
        Ordering::Greater => ReadDecision::Send,
        Ordering::Equal => ReadDecision::NotModified,
        Ordering::Less => ReadDecision::ReaderAhead,
    }
}

/// Classify a conditional write; `None` means no object is stored yet
pub fn decide_write(stored: Option<VersionToken>, proposed: VersionToken) -> WriteDecision {
    match stored {
        Some(stored) if proposed <= stored => WriteDecision::Reject,
        _ => WriteDecision::Accept,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_decide_read_table() {
        let t = VersionToken::from_unix_seconds(1_700_000_000).unwrap();
        let earlier = t - TimeDelta::seconds(1);
        let later = t + TimeDelta::seconds(1);

        assert_eq!(decide_read(t, earlier), ReadDecision::Send);
        assert_eq!(decide_read(t, VersionToken::zero()), ReadDecision::Send);
        assert_eq!(decide_read(t, t), ReadDecision::NotModified);
        assert_eq!(decide_read(t, later), ReadDecision::ReaderAhead);
    }

    #[test]
    fn test_decide_write_table() {
        let t = VersionToken::from_unix_seconds(1_700_000_000).unwrap();

        assert_eq!(decide_write(None, t), WriteDecision::Accept);
        assert_eq!(decide_write(None, VersionToken::zero()), WriteDecision::Accept);
        assert_eq!(
            decide_write(Some(t), t + TimeDelta::seconds(1)),
            WriteDecision::Accept
        );
        assert_eq!(decide_write(Some(t), t), WriteDecision::Reject);
        assert_eq!(
            decide_write(Some(t), t - TimeDelta::days(1)),
            WriteDecision::Reject
        );
    }

    #[test]
    fn test_sub_second_differences_are_invisible() {
        let base = VersionToken::from_unix_seconds(1_700_000_000).unwrap();
        let jittered = VersionToken::from_datetime(base.as_datetime() + TimeDelta::milliseconds(750));

        assert_eq!(decide_read(base, jittered), ReadDecision::NotModified);
        assert_eq!(decide_write(Some(base), jittered), WriteDecision::Reject);
    }
}
