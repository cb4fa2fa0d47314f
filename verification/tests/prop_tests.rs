use proptest::prelude::*;

use udhaar_types::DocumentType;
use udhaar_verification::{decide, Decision, DocumentDecisions, VerificationOutcome};

fn arb_decision() -> impl Strategy<Value = Decision> {
    prop_oneof![
        Just(Decision::Approve),
        "[a-z]{1,12}".prop_map(|reason: String| Decision::reject(reason)),
    ]
}

proptest! {
    /// The outcome is determined by the number of rejections alone, and lists
    /// exactly the rejected documents in review order.
    #[test]
    fn outcome_matches_rejection_count(
        identity in arb_decision(),
        address in arb_decision(),
        selfie in arb_decision(),
    ) {
        let decisions = DocumentDecisions {
            identity: Some(identity),
            address: Some(address),
            selfie: Some(selfie),
        };
        let expected: Vec<DocumentType> = DocumentType::ALL
            .into_iter()
            .filter(|doc| matches!(decisions.get(*doc), Some(Decision::Reject { .. })))
            .collect();

        let outcome = decide(&decisions).unwrap();
        let got: Vec<DocumentType> =
            outcome.rejected_documents().iter().map(|r| r.document).collect();
        prop_assert_eq!(&got, &expected);
        match expected.len() {
            0 => prop_assert_eq!(outcome, VerificationOutcome::FullApproval),
            3 => prop_assert!(matches!(outcome, VerificationOutcome::FullRejection(_))),
            _ => prop_assert!(matches!(outcome, VerificationOutcome::PartialRejection(_))),
        }
    }

    /// Any missing decision fails, regardless of the others.
    #[test]
    fn any_gap_fails(
        identity in prop::option::of(arb_decision()),
        address in prop::option::of(arb_decision()),
        selfie in prop::option::of(arb_decision()),
    ) {
        let complete = identity.is_some() && address.is_some() && selfie.is_some();
        let decisions = DocumentDecisions { identity, address, selfie };
        prop_assert_eq!(decide(&decisions).is_ok(), complete);
    }
}
