//! Property-based tests for the correction rule.
//!
//! Uses `proptest` to check that the chosen timestamp is always the minimum
//! of its sources, that a write happens exactly when the candidate is after
//! the epoch and strictly earlier, and that a corrected file is a fixed point.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use proptest::prelude::*;

use super::corrector::{
    CorrectionDecision, CorrectorOptions, FileRecord, KeepReason, TimestampCorrector,
    corrected_timestamp, decide,
};
use super::events::NormalizeEvent;
use crate::logger::error_log::ErrorLog;
use crate::metadata::extractor::MetadataExtractor;
use crate::platform::pal::MockPlatform;

// ──────────────────── strategies ────────────────────

/// Seconds relative to the epoch, including a slice before it.
fn arb_time() -> impl Strategy<Value = SystemTime> {
    prop_oneof![
        1 => Just(SystemTime::UNIX_EPOCH),
        1 => (1u64..=86_400).prop_map(|s| SystemTime::UNIX_EPOCH - Duration::from_secs(s)),
        8 => (0u64..=4_102_444_800).prop_map(|s| SystemTime::UNIX_EPOCH + Duration::from_secs(s)),
    ]
}

fn arb_record() -> impl Strategy<Value = FileRecord> {
    (arb_time(), arb_time(), proptest::option::of(arb_time())).prop_map(
        |(creation_time, modification_time, capture_time)| FileRecord {
            path: PathBuf::from("/p/f"),
            modification_time,
            creation_time,
            capture_time,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn candidate_is_minimum_of_sources(record in arb_record()) {
        let candidate = corrected_timestamp(&record);
        prop_assert!(candidate <= record.creation_time);
        prop_assert!(candidate <= record.modification_time);
        if let Some(capture) = record.capture_time {
            prop_assert!(candidate <= capture);
        }
        let sources = [
            Some(record.creation_time),
            Some(record.modification_time),
            record.capture_time,
        ];
        prop_assert!(sources.iter().flatten().any(|t| *t == candidate));
    }

    #[test]
    fn applies_exactly_when_after_epoch_and_earlier(record in arb_record()) {
        let candidate = corrected_timestamp(&record);
        let should_apply =
            candidate > SystemTime::UNIX_EPOCH && candidate < record.creation_time;
        match decide(&record) {
            CorrectionDecision::Apply { from, to } => {
                prop_assert!(should_apply);
                prop_assert_eq!(from, record.creation_time);
                prop_assert_eq!(to, candidate);
            }
            CorrectionDecision::Keep { reason, candidate: kept } => {
                prop_assert!(!should_apply);
                prop_assert_eq!(kept, candidate);
                prop_assert_eq!(
                    reason == KeepReason::EpochSentinel,
                    candidate <= SystemTime::UNIX_EPOCH
                );
            }
        }
    }

    #[test]
    fn applying_a_decision_reaches_a_fixed_point(record in arb_record()) {
        if let CorrectionDecision::Apply { to, .. } = decide(&record) {
            let after = FileRecord { creation_time: to, ..record };
            let second = decide(&after);
            prop_assert!(
                matches!(second, CorrectionDecision::Keep { .. }),
                "second decision was {:?}",
                second
            );
        }
    }

    #[test]
    fn corrector_run_is_idempotent(
        created in 1u64..=4_102_444_800,
        modified in 0u64..=4_102_444_800,
    ) {
        let path = PathBuf::from("/p/file.txt");
        let platform = Arc::new(MockPlatform::new().with_times(
            &path,
            SystemTime::UNIX_EPOCH + Duration::from_secs(modified),
            SystemTime::UNIX_EPOCH + Duration::from_secs(created),
        ));
        let corrector = TimestampCorrector::new(
            platform.clone(),
            MetadataExtractor::default(),
            CorrectorOptions::default(),
        );
        let dir = tempfile::tempdir().unwrap();
        let mut log = ErrorLog::new(dir.path().join("error_log.txt"));

        corrector.correct(&path, &mut log);
        let writes = platform.writes().len();
        let second = corrector.correct(&path, &mut log);

        prop_assert!(writes <= 1);
        prop_assert_eq!(platform.writes().len(), writes);
        let is_unchanged = matches!(second.last(), Some(NormalizeEvent::Unchanged { .. }));
        prop_assert!(is_unchanged);
    }
}
