// Copyright (C) 2020-2025  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use bherror::{traits::ErrorContext as _, Error};

use crate::{
    FormatError, Jwk, JwsCompact, JwsError, JwsJson, JwsSignatureEntry, ProviderTable, Result,
    SigningAlgorithm,
};

/// A candidate key for verification, together with the algorithm it is
/// meant to verify.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerificationKey<'a> {
    algorithm: SigningAlgorithm,
    key: &'a Jwk,
}

impl<'a> VerificationKey<'a> {
    /// Pair the `key` with the `algorithm`.
    pub fn new(algorithm: SigningAlgorithm, key: &'a Jwk) -> Self {
        Self { algorithm, key }
    }

    /// Use the `key` with the algorithm named by its `alg` member.
    pub fn from_jwk(key: &'a Jwk) -> Result<Self> {
        let algorithm = match key.get("alg") {
            Some(serde_json::Value::String(alg)) => alg.parse()?,
            _ => {
                return Err(Error::root(JwsError::Format(FormatError::JwkParsingFailed(
                    "missing \"alg\" field".to_owned(),
                ))))
            }
        };

        Ok(Self::new(algorithm, key))
    }

    /// The algorithm this key verifies.
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// The key itself.
    pub fn key(&self) -> &'a Jwk {
        self.key
    }
}

/// Why a signature entry was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The signature does not verify with any of the matching keys.
    SignatureMismatch,
    /// The entry could not be decoded; the reason is recorded.
    Malformed(String),
}

/// Final state of a signature entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The signature verifies.
    Verified,
    /// The signature does not verify.
    Rejected(Rejection),
}

/// The result of verifying one signature entry of a [`JwsJson`] document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryVerification {
    /// Position of the entry in the `signatures` array.
    pub index: usize,
    /// The algorithm of the entry, `None` if it could not be resolved.
    pub algorithm: Option<SigningAlgorithm>,
    /// Whether the entry verified.
    pub outcome: Outcome,
}

impl EntryVerification {
    /// Whether the entry verified.
    pub fn is_verified(&self) -> bool {
        self.outcome == Outcome::Verified
    }
}

/// Verifies compact and JSON documents against candidate keys.
///
/// Each signature entry is verified independently: the protected header is
/// decoded and the algorithm resolved, then the signing input is rebuilt from
/// the transmitted protected header and payload, and finally the provider for
/// the algorithm checks the signature. One entry failing, or being
/// malformed, does not affect the others.
#[derive(Debug, Clone, Copy)]
pub struct VerificationEngine<'a> {
    providers: &'a ProviderTable,
}

/// A signature entry with its headers decoded.
struct DecodedEntry {
    algorithm: SigningAlgorithm,
    signature: Vec<u8>,
}

impl DecodedEntry {
    fn decode(entry: &JwsSignatureEntry) -> Result<Self> {
        Ok(Self {
            algorithm: entry.algorithm()?,
            signature: entry.signature()?,
        })
    }
}

impl<'a> VerificationEngine<'a> {
    /// An engine dispatching to the `providers`.
    pub fn new(providers: &'a ProviderTable) -> Self {
        Self { providers }
    }

    /// Verify a compact JWS with the `key` for the `algorithm`.
    ///
    /// Returns `Ok(false)` if the signature does not verify, including when
    /// the JWS is signed with another algorithm.
    ///
    /// # Errors
    ///
    /// Fails if the payload is detached and was not supplied, if the header
    /// does not name a supported algorithm, or if the key cannot be used
    /// with the `algorithm`.
    pub fn verify_compact(
        &self,
        jws: &JwsCompact,
        key: &Jwk,
        algorithm: SigningAlgorithm,
    ) -> Result<bool> {
        let signed_with = jws.algorithm()?;
        if signed_with != algorithm {
            tracing::debug!(%signed_with, %algorithm, "compact JWS signed with another algorithm");
            return Ok(false);
        }

        let signing_input = jws.signing_input()?;
        self.providers
            .verify(algorithm, &signing_input, jws.signature(), key)
            .ctx(|| format!("verifying compact JWS with {algorithm}"))
    }

    /// Verify the entries of a JSON document signed with the `algorithm`
    /// using the `key`.
    ///
    /// See [`VerificationEngine::verify_json_with_keys`].
    pub fn verify_json(
        &self,
        jws: &JwsJson,
        key: &Jwk,
        algorithm: SigningAlgorithm,
    ) -> Result<Vec<EntryVerification>> {
        self.verify_json_with_keys(jws, &[VerificationKey::new(algorithm, key)])
    }

    /// Verify the entries of a JSON document against the candidate `keys`.
    ///
    /// An entry is verified with every candidate whose algorithm equals the
    /// one resolved from the entry's headers, and is [`Outcome::Verified`] if
    /// any of them verifies. Entries without a matching candidate produce no
    /// result. Entries that cannot be decoded are reported as
    /// [`Rejection::Malformed`]. Results are in signer order.
    ///
    /// Misshapen entries never reach this point: they already fail the whole
    /// document when it is parsed, see [`JwsJson::from_value`].
    ///
    /// # Errors
    ///
    /// Fails if the payload is detached and was not supplied, or if a
    /// candidate cannot be used with its algorithm.
    pub fn verify_json_with_keys(
        &self,
        jws: &JwsJson,
        keys: &[VerificationKey<'_>],
    ) -> Result<Vec<EntryVerification>> {
        let encoded_payload = jws
            .encoded_payload()
            .ok_or_else(|| Error::root(JwsError::Format(FormatError::MissingPayload)))?;

        let mut results = Vec::new();
        for (index, entry) in jws.signatures().iter().enumerate() {
            if let Some(result) = self.verify_entry(index, entry, encoded_payload, keys)? {
                results.push(result);
            }
        }

        if results.is_empty() {
            tracing::warn!(
                signatures = jws.signatures().len(),
                "no signature entry matches the supplied keys"
            );
        }

        Ok(results)
    }

    fn verify_entry(
        &self,
        index: usize,
        entry: &JwsSignatureEntry,
        encoded_payload: &str,
        keys: &[VerificationKey<'_>],
    ) -> Result<Option<EntryVerification>> {
        let decoded = match DecodedEntry::decode(entry) {
            Ok(decoded) => decoded,
            Err(error) => {
                tracing::debug!(index, %error, "rejecting malformed signature entry");
                return Ok(Some(EntryVerification {
                    index,
                    algorithm: None,
                    outcome: Outcome::Rejected(Rejection::Malformed(error.error.to_string())),
                }));
            }
        };

        let mut candidates = keys
            .iter()
            .filter(|candidate| candidate.algorithm == decoded.algorithm)
            .peekable();
        if candidates.peek().is_none() {
            tracing::debug!(index, algorithm = %decoded.algorithm, "no key for signature entry");
            return Ok(None);
        }

        let input = entry.signing_input(encoded_payload);
        let mut outcome = Outcome::Rejected(Rejection::SignatureMismatch);
        for candidate in candidates {
            let verified = self
                .providers
                .verify(decoded.algorithm, &input, &decoded.signature, candidate.key)
                .ctx(|| format!("verifying signature entry {index}"))?;
            if verified {
                outcome = Outcome::Verified;
                break;
            }
        }

        if outcome != Outcome::Verified {
            tracing::debug!(index, algorithm = %decoded.algorithm, "signature entry rejected");
        }

        Ok(Some(EntryVerification {
            index,
            algorithm: Some(decoded.algorithm),
            outcome,
        }))
    }
}
