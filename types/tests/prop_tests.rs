use proptest::prelude::*;

use udhaar_types::{
    Amount, DocumentType, OnboardingStatus, RejectedDocument, Role, Timestamp, User,
    SECS_PER_DAY,
};

fn arb_status() -> impl Strategy<Value = OnboardingStatus> {
    let docs = prop::sample::subsequence(DocumentType::ALL.to_vec(), 1..=3).prop_map(|docs| {
        docs.into_iter()
            .map(|d| RejectedDocument::new(d, format!("{d} unreadable")))
            .collect::<Vec<_>>()
    });
    prop_oneof![
        Just(OnboardingStatus::Incomplete),
        Just(OnboardingStatus::Unreviewed),
        Just(OnboardingStatus::PendingReview),
        Just(OnboardingStatus::Verified),
        docs.prop_map(|rejected_documents| OnboardingStatus::Rejected { rejected_documents }),
    ]
}

proptest! {
    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// plus_days then minus_days returns to the start.
    #[test]
    fn timestamp_day_shift_inverse(base in 0u64..1_000_000_000, days in 0u32..10_000) {
        let t = Timestamp::new(base);
        prop_assert_eq!(t.plus_days(days).minus_days(days), t);
    }

    /// days_overdue rounds partial days up and is zero before the due time.
    #[test]
    fn timestamp_days_overdue(due in 0u64..1_000_000_000, offset in 0u64..10_000_000) {
        let due_at = Timestamp::new(due);
        let now = Timestamp::new(due + offset);
        let expected = offset.div_ceil(SECS_PER_DAY) as u32;
        prop_assert_eq!(due_at.days_overdue(now), expected);
        prop_assert_eq!(now.days_overdue(due_at), 0);
    }

    /// Amount: checked_sub returns None when b > a.
    #[test]
    fn amount_checked_sub_underflow(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let result = Amount::new(a).checked_sub(Amount::new(b));
        if b > a {
            prop_assert!(result.is_none());
        } else {
            prop_assert_eq!(result, Some(Amount::new(a - b)));
        }
    }

    /// Amount: interest in basis points never exceeds the principal at 100 %.
    #[test]
    fn amount_apply_bps_bounded(a in 0u64..10_000_000, bps in 0u32..=10_000) {
        prop_assert!(Amount::new(a).apply_bps(bps) <= Amount::new(a));
    }

    /// Every representable onboarding status survives the wire flags.
    #[test]
    fn onboarding_status_wire_roundtrip(status in arb_status(), lender in any::<bool>()) {
        let role = if lender { Role::Lender } else { Role::Borrower };
        let user = User::new("u-prop", role, "p@example.com", "Prop", "Test")
            .with_onboarding(status.clone())
            .unwrap();
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.onboarding(), &status);
    }

    /// Rejected documents are only ever reported with a rejected status.
    #[test]
    fn rejected_documents_imply_rejected_status(status in arb_status()) {
        if !status.rejected_documents().is_empty() {
            prop_assert_eq!(
                status.verification_status(),
                udhaar_types::VerificationStatus::Rejected
            );
            prop_assert!(!status.is_admin_verified());
        }
    }
}
