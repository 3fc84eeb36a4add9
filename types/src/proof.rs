//! The per-account proof record stored by the proof contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The user-chosen parameters of a proof, as passed to `newProof`/`updateProof`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofTerms {
    /// Application-defined proof kind.
    pub proof_type: u8,
    /// Interval between checks, in seconds.
    pub interval: u64,
    /// Amount in wei the proof commits to.
    pub amount: u128,
}

/// A proof as reported by a successful `getProof` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRecord {
    pub terms: ProofTerms,
    /// Contract-side status code.
    pub status: u8,
}

/// What the client knows about an account's proof.
///
/// Always exactly one of the three variants. `Configured` is only produced
/// when the contract call reported `success = true`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProofView {
    /// The contract has no proof for this account (or the read reverted).
    NotConfigured,
    /// The contract reported a proof.
    Configured(ProofRecord),
    /// The read failed at the transport or ABI layer.
    FetchError { reason: String },
}

impl ProofView {
    pub fn is_configured(&self) -> bool {
        matches!(self, ProofView::Configured(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ProofView::FetchError { .. })
    }

    pub fn fetch_error(reason: impl Into<String>) -> Self {
        ProofView::FetchError {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ProofView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofView::NotConfigured => write!(f, "no proof"),
            ProofView::Configured(record) => write!(
                f,
                "proof type {} every {}s for {} wei (status {})",
                record.terms.proof_type, record.terms.interval, record.terms.amount, record.status
            ),
            ProofView::FetchError { reason } => write!(f, "proof unavailable: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_predicates() {
        let record = ProofRecord {
            terms: ProofTerms {
                proof_type: 1,
                interval: 60,
                amount: 10,
            },
            status: 0,
        };
        assert!(ProofView::Configured(record).is_configured());
        assert!(!ProofView::NotConfigured.is_configured());
        assert!(ProofView::fetch_error("boom").is_error());
    }

    #[test]
    fn tagged_json_shape() {
        let json = serde_json::to_string(&ProofView::NotConfigured).unwrap();
        assert_eq!(json, r#"{"kind":"not_configured"}"#);

        let json = serde_json::to_string(&ProofView::fetch_error("x")).unwrap();
        assert_eq!(json, r#"{"kind":"fetch_error","reason":"x"}"#);
    }
}
