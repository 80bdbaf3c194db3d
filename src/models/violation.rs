//! Schedule violations.
//!
//! Edits on the timeline are never blocked. Instead, audits over the
//! current segment set produce violations that the presentation layer
//! shows as advisory alerts.

use serde::{Deserialize, Serialize};

/// A detected problem in a segment set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Segment the violation is reported against.
    pub segment_id: String,
    /// The other segment involved, for pairwise violations.
    pub other_id: Option<String>,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Two segments occupy the same machine at the same time.
    Overlap,
    /// A step starts before the previous step of the same job has ended.
    PrecedenceViolation,
    /// A segment lies (partly) outside the shift calendar.
    OffShift,
    /// A job finishes after its delivery date.
    DeliveryMiss,
}

impl Violation {
    /// Creates an overlap violation between two segments.
    pub fn overlap(
        segment_id: impl Into<String>,
        other_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type: ViolationType::Overlap,
            segment_id: segment_id.into(),
            other_id: Some(other_id.into()),
            message: message.into(),
            severity: 90,
        }
    }

    /// Creates a precedence violation.
    pub fn precedence(
        segment_id: impl Into<String>,
        other_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type: ViolationType::PrecedenceViolation,
            segment_id: segment_id.into(),
            other_id: Some(other_id.into()),
            message: message.into(),
            severity: 95,
        }
    }

    /// Creates an off-shift violation.
    pub fn off_shift(segment_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::OffShift,
            segment_id: segment_id.into(),
            other_id: None,
            message: message.into(),
            severity: 60,
        }
    }

    /// Creates a delivery miss, reported against the job's last segment.
    pub fn delivery_miss(segment_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::DeliveryMiss,
            segment_id: segment_id.into(),
            other_id: None,
            message: message.into(),
            severity: 80,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_factories() {
        let v1 = Violation::overlap("S1", "S2", "M1 double-booked");
        assert_eq!(v1.violation_type, ViolationType::Overlap);
        assert_eq!(v1.other_id.as_deref(), Some("S2"));

        let v2 = Violation::precedence("S3", "S1", "starts early");
        assert_eq!(v2.violation_type, ViolationType::PrecedenceViolation);
        assert!(v2.severity > v1.severity);

        let v3 = Violation::off_shift("S4", "Sunday");
        assert_eq!(v3.violation_type, ViolationType::OffShift);
        assert!(v3.other_id.is_none());

        let v4 = Violation::delivery_miss("S5", "late");
        assert_eq!(v4.violation_type, ViolationType::DeliveryMiss);
    }
}
