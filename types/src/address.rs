//! Account address type as assigned by the wallet provider.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::TypesError;

/// An account address exposed by the wallet provider.
///
/// The provider owns the format; this type only stores the string it handed
/// out. Addresses are unique within a session. Conversion to the 20-byte
/// on-chain form is checked separately via [`Address::to_bytes`].
///
/// Equality, hashing and ordering ignore hex case when the string is a
/// well-formed on-chain address, so an EIP-55 checksummed address and its
/// lowercase form are the same account. Any other string compares as-is.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// The hex prefix used by EVM-style providers.
    pub const PREFIX: &'static str = "0x";

    /// Length of an on-chain address in bytes.
    pub const BYTE_LEN: usize = 20;

    /// Wrap a provider-assigned address string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build the canonical lowercase hex form of a 20-byte address.
    pub fn from_bytes(bytes: &[u8; 20]) -> Self {
        Self(format!("{}{}", Self::PREFIX, hex::encode(bytes)))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this address is a well-formed `0x`-prefixed 20-byte hex string.
    pub fn is_valid(&self) -> bool {
        self.to_bytes().is_ok()
    }

    /// Decode the address into its 20 raw bytes.
    pub fn to_bytes(&self) -> Result<[u8; 20], TypesError> {
        let digits = self
            .0
            .strip_prefix(Self::PREFIX)
            .or_else(|| self.0.strip_prefix("0X"))
            .ok_or_else(|| TypesError::InvalidAddress(self.0.clone()))?;
        if digits.len() != Self::BYTE_LEN * 2 {
            return Err(TypesError::InvalidAddress(self.0.clone()));
        }
        let mut out = [0u8; 20];
        hex::decode_to_slice(digits, &mut out)
            .map_err(|_| TypesError::InvalidAddress(self.0.clone()))?;
        Ok(out)
    }

    /// The form used for identity: lowercase when well-formed.
    fn identity(&self) -> Cow<'_, str> {
        if self.is_valid() {
            Cow::Owned(self.0.to_ascii_lowercase())
        } else {
            Cow::Borrowed(&self.0)
        }
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
