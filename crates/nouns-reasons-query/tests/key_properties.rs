use nouns_reasons_model::{Address, ProposalId, SortOrder};
use nouns_reasons_query::{derive_cache_key, VoteFilter};
use proptest::prelude::*;

fn filter_strategy() -> impl Strategy<Value = VoteFilter> {
    (
        proptest::option::of("[0-9a-f]{40}"),
        proptest::option::of("[0-9]{1,4}"),
        any::<bool>(),
    )
        .prop_map(|(voter, proposal, asc)| VoteFilter {
            voter_id: voter.map(|hex| Address::new(format!("0x{hex}")).expect("address")),
            proposal_id: proposal.map(|id| ProposalId::new(id).expect("proposal id")),
            order: if asc { SortOrder::Asc } else { SortOrder::Desc },
        })
}

proptest! {
    #[test]
    fn equal_inputs_derive_equal_keys(filter in filter_strategy(), page in any::<u64>()) {
        let a = derive_cache_key(&filter, page);
        let b = derive_cache_key(&filter.clone(), page);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn differing_inputs_derive_different_keys(
        left in filter_strategy(),
        right in filter_strategy(),
        left_page in 0_u64..64,
        right_page in 0_u64..64
    ) {
        prop_assume!(left != right || left_page != right_page);
        prop_assert_ne!(
            derive_cache_key(&left, left_page),
            derive_cache_key(&right, right_page)
        );
    }
}
