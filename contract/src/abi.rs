//! ABI of the proof contract's calls.

use ethers::abi::{self, ParamType, Token};
use ethers::types::{H160, U256};
use proofdesk_types::{Address, ProofRecord, ProofTerms};

use crate::AbiError;

/// `getProof(address)`
pub const GET_PROOF: &str = "getProof";
/// `newProof(uint8,uint256,uint256)`
pub const NEW_PROOF: &str = "newProof";
/// `updateProof(uint8,uint256,uint256)`
pub const UPDATE_PROOF: &str = "updateProof";

/// `(proofType, interval, amount)`
const TERMS_INPUTS: [ParamType; 3] = [
    ParamType::Uint(8),
    ParamType::Uint(256),
    ParamType::Uint(256),
];

/// `(success, proofType, interval, amount, status)`
const GET_PROOF_OUTPUTS: [ParamType; 5] = [
    ParamType::Bool,
    ParamType::Uint(8),
    ParamType::Uint(256),
    ParamType::Uint(256),
    ParamType::Uint(8),
];

pub fn get_proof_selector() -> [u8; 4] {
    abi::short_signature(GET_PROOF, &[ParamType::Address])
}

pub fn new_proof_selector() -> [u8; 4] {
    abi::short_signature(NEW_PROOF, &TERMS_INPUTS)
}

pub fn update_proof_selector() -> [u8; 4] {
    abi::short_signature(UPDATE_PROOF, &TERMS_INPUTS)
}

/// The 20-byte on-chain form of a provider address.
pub fn to_h160(address: &Address) -> Result<H160, AbiError> {
    address
        .to_bytes()
        .map(H160::from)
        .map_err(|_| AbiError::InvalidAddress(address.to_string()))
}

fn with_selector(selector: [u8; 4], tokens: &[Token]) -> Vec<u8> {
    let mut data = selector.to_vec();
    data.extend_from_slice(&abi::encode(tokens));
    data
}

/// Calldata for `getProof(address)`.
pub fn encode_get_proof(address: &Address) -> Result<Vec<u8>, AbiError> {
    Ok(with_selector(
        get_proof_selector(),
        &[Token::Address(to_h160(address)?)],
    ))
}

fn terms_tokens(terms: &ProofTerms) -> [Token; 3] {
    [
        Token::Uint(U256::from(terms.proof_type)),
        Token::Uint(U256::from(terms.interval)),
        Token::Uint(U256::from(terms.amount)),
    ]
}

/// Calldata for `newProof(uint8,uint256,uint256)`.
pub fn encode_new_proof(terms: &ProofTerms) -> Vec<u8> {
    with_selector(new_proof_selector(), &terms_tokens(terms))
}

/// Calldata for `updateProof(uint8,uint256,uint256)`.
pub fn encode_update_proof(terms: &ProofTerms) -> Vec<u8> {
    with_selector(update_proof_selector(), &terms_tokens(terms))
}

/// Narrow a decoded word to at most `bits` bits.
fn narrow(value: U256, bits: usize, ty: &'static str) -> Result<u128, AbiError> {
    if value.bits() > bits {
        return Err(AbiError::Overflow(ty));
    }
    Ok(value.as_u128())
}

fn uint(token: Option<Token>) -> Result<U256, AbiError> {
    token
        .and_then(Token::into_uint)
        .ok_or(AbiError::UnexpectedToken("uint"))
}

/// Decode the `getProof` return tuple.
///
/// Returns `None` when the contract reports `success = false`; the remaining
/// fields are not inspected in that case.
pub fn decode_get_proof(data: &[u8]) -> Result<Option<ProofRecord>, AbiError> {
    let mut tokens = abi::decode(&GET_PROOF_OUTPUTS, data)
        .map_err(|e| AbiError::Decode(e.to_string()))?
        .into_iter();

    let success = tokens
        .next()
        .and_then(Token::into_bool)
        .ok_or(AbiError::UnexpectedToken("bool"))?;
    if !success {
        return Ok(None);
    }

    let proof_type = narrow(uint(tokens.next())?, 8, "uint8")? as u8;
    let interval = narrow(uint(tokens.next())?, 64, "u64")? as u64;
    let amount = narrow(uint(tokens.next())?, 128, "u128")?;
    let status = narrow(uint(tokens.next())?, 8, "uint8")? as u8;

    Ok(Some(ProofRecord {
        terms: ProofTerms {
            proof_type,
            interval,
            amount,
        },
        status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_proof_return(
        success: bool,
        proof_type: u128,
        interval: u128,
        amount: u128,
        status: u128,
    ) -> Vec<u8> {
        abi::encode(&[
            Token::Bool(success),
            Token::Uint(proof_type.into()),
            Token::Uint(interval.into()),
            Token::Uint(amount.into()),
            Token::Uint(status.into()),
        ])
    }

    #[test]
    fn known_selectors() {
        assert_eq!(
            abi::short_signature("transfer", &[ParamType::Address, ParamType::Uint(256)]),
            [0xa9, 0x05, 0x9c, 0xbb]
        );
        assert_eq!(
            &get_proof_selector(),
            &ethers::utils::keccak256("getProof(address)")[..4]
        );
        assert_eq!(
            &new_proof_selector(),
            &ethers::utils::keccak256("newProof(uint8,uint256,uint256)")[..4]
        );
        assert_ne!(new_proof_selector(), update_proof_selector());
    }

    #[test]
    fn get_proof_calldata_layout() {
        let addr = Address::new("0x00000000000000000000000000000000000000aa");
        let data = encode_get_proof(&addr).unwrap();
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &get_proof_selector());
        assert!(data[4..35].iter().all(|b| *b == 0));
        assert_eq!(data[35], 0xaa);
    }

    #[test]
    fn get_proof_rejects_non_hex_address() {
        let err = encode_get_proof(&Address::new("0xA")).unwrap_err();
        assert_eq!(err, AbiError::InvalidAddress("0xA".into()));
    }

    #[test]
    fn new_proof_calldata_layout() {
        let terms = ProofTerms {
            proof_type: 2,
            interval: 3600,
            amount: 1_000,
        };
        let data = encode_new_proof(&terms);
        assert_eq!(data.len(), 4 + 3 * 32);
        assert_eq!(&data[..4], &new_proof_selector());
        let args = abi::decode(&TERMS_INPUTS, &data[4..]).unwrap();
        assert_eq!(
            args,
            vec![
                Token::Uint(U256::from(2u64)),
                Token::Uint(U256::from(3_600u64)),
                Token::Uint(U256::from(1_000u64))
            ]
        );
        assert_eq!(&encode_update_proof(&terms)[4..], &data[4..]);
    }

    #[test]
    fn decode_configured_proof() {
        let data = get_proof_return(true, 1, 86_400, 5_000, 3);
        let record = decode_get_proof(&data).unwrap().unwrap();
        assert_eq!(record.terms.proof_type, 1);
        assert_eq!(record.terms.interval, 86_400);
        assert_eq!(record.terms.amount, 5_000);
        assert_eq!(record.status, 3);
    }

    #[test]
    fn decode_unsuccessful_proof_ignores_fields() {
        let data = get_proof_return(false, 999, 0, 0, 999);
        assert_eq!(decode_get_proof(&data).unwrap(), None);
    }

    #[test]
    fn decode_short_return_data() {
        assert!(matches!(decode_get_proof(&[]), Err(AbiError::Decode(_))));
    }

    #[test]
    fn decode_out_of_range_fields() {
        let data = get_proof_return(true, 256, 1, 1, 0);
        assert_eq!(decode_get_proof(&data).unwrap_err(), AbiError::Overflow("uint8"));

        let mut data = get_proof_return(true, 1, 1, 1, 0);
        data[64] = 1;
        assert_eq!(decode_get_proof(&data).unwrap_err(), AbiError::Overflow("u64"));
    }
}
