//! Duplicate record suppression
//!
//! Remote controllers tend to resend the same record when they do not see
//! a reaction fast enough. An identical record arriving within the cooldown
//! of the last accepted one is dropped.

use crate::time::{elapsed, Millis};

/// Verdict for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Duplicate { remaining_ms: Millis },
}

/// Last accepted record and when it was accepted
#[derive(Debug, Clone)]
pub struct DedupWindow {
    cooldown_ms: Millis,
    last: Option<(Vec<u8>, Millis)>,
}

impl DedupWindow {
    pub fn new(cooldown_ms: Millis) -> Self {
        Self {
            cooldown_ms,
            last: None,
        }
    }

    /// Check `record` against the window. Only accepted records move the
    /// window; a dropped duplicate does not extend the cooldown.
    pub fn admit(&mut self, record: &[u8], now: Millis) -> Admission {
        if let Some((text, accepted_at)) = &self.last {
            let since = elapsed(*accepted_at, now);
            if text.as_slice() == record && since < self.cooldown_ms {
                return Admission::Duplicate {
                    remaining_ms: self.cooldown_ms - since,
                };
            }
        }
        self.last = Some((record.to_vec(), now));
        Admission::Accepted
    }
}
