use nouns_reasons_core::canonical;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn sha256_hex_is_fixed_width(payload in proptest::collection::vec(any::<u8>(), 0..256)) {
        let digest = canonical::sha256_hex(&payload);
        prop_assert_eq!(digest.len(), 64);
        prop_assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn etag_is_independent_of_insertion_order(
        a in "[a-zA-Z]{1,12}",
        b in "[a-zA-Z]{1,12}",
        av in any::<u64>(),
        bv in ".{0,24}"
    ) {
        prop_assume!(a != b);
        let mut left = serde_json::Map::new();
        left.insert(a.clone(), json!(av));
        left.insert(b.clone(), json!(bv.clone()));
        let mut right = serde_json::Map::new();
        right.insert(b, json!(bv));
        right.insert(a, json!(av));

        prop_assert_eq!(
            canonical::canonical_json_bytes(&left).expect("left"),
            canonical::canonical_json_bytes(&right).expect("right")
        );
        prop_assert_eq!(
            canonical::json_etag(&left).expect("left tag"),
            canonical::json_etag(&right).expect("right tag")
        );
    }
}
