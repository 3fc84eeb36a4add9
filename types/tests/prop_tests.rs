use proptest::prelude::*;

use proofdesk_types::{format_ether, Address, WEI_PER_ETHER};

proptest! {
    /// Address bytes survive the hex form.
    #[test]
    fn address_bytes_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::from_bytes(&bytes);
        prop_assert!(addr.is_valid());
        prop_assert_eq!(addr.to_bytes().unwrap(), bytes);
    }

    /// Changing the hex case of a well-formed address keeps its identity.
    #[test]
    fn address_identity_ignores_hex_case(bytes in prop::array::uniform20(0u8..)) {
        let lower = Address::from_bytes(&bytes);
        let upper = Address::new(format!("0x{}", lower.as_str()[2..].to_ascii_uppercase()));
        prop_assert_eq!(&lower, &upper);
        prop_assert_eq!(lower.cmp(&upper), std::cmp::Ordering::Equal);
    }

    /// Any string without the hex prefix is never a valid on-chain address.
    #[test]
    fn unprefixed_strings_are_invalid(s in "[a-f0-9]{40}") {
        prop_assert!(!Address::new(s).is_valid());
    }

    /// The whole-ether part of the display always matches integer division.
    #[test]
    fn format_ether_whole_part(wei in 0u128..u128::MAX) {
        let shown = format_ether(wei);
        let whole = shown
            .trim_end_matches(" ETH")
            .split('.')
            .next()
            .unwrap()
            .to_string();
        prop_assert_eq!(whole, (wei / WEI_PER_ETHER).to_string());
    }
}
