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

use crate::SigningAlgorithm;

/// Top-level error type of the crate.
///
/// A signature that simply does not match is **not** an error; verification
/// reports it as `Ok(false)` or as a [`Rejected`](crate::Outcome::Rejected)
/// outcome.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum JwsError {
    /// Malformed serialization, Base64URL, JSON or JWK.
    #[strum(to_string = "Format error: {0}")]
    Format(FormatError),

    /// The same header parameter is present in both the protected and the
    /// unprotected header of a single signer.
    #[strum(to_string = "Header parameter \"{0}\" is both protected and unprotected")]
    HeaderConflict(String),

    /// Neither the protected nor the unprotected header carries `alg`.
    #[strum(to_string = "Missing \"alg\" header parameter")]
    MissingAlgorithm,

    /// The algorithm identifier is unknown, or no provider is registered
    /// for it.
    #[strum(to_string = "Unsupported algorithm {0}")]
    UnsupportedAlgorithm(String),

    /// The key cannot be used with the requested algorithm.
    #[strum(to_string = "Key {1} cannot be used with algorithm {0}")]
    KeyAlgorithmMismatch(SigningAlgorithm, String),

    /// Cryptographic backend error.
    #[strum(to_string = "Crypto error: {0}")]
    Crypto(CryptoError),
}

impl bherror::BhError for JwsError {}

/// Error in the format of a JWS, or of one of its parts.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum FormatError {
    /// A part that must be `base64url`-encoded (without padding) is not.
    #[strum(to_string = "Invalid base64url encoding of {0}")]
    InvalidBase64Url(&'static str),

    /// The compact serialization does not consist of exactly three segments.
    #[strum(to_string = "Expected 3 segments in compact serialization, got {0}")]
    InvalidSegmentCount(usize),

    /// A part that must be a JSON object is not valid JSON, or not an object.
    #[strum(to_string = "Invalid JSON: {0}")]
    InvalidJson(String),

    /// The document is valid JSON but not a valid JWS JSON serialization.
    #[strum(to_string = "Invalid JWS JSON serialization: {0}")]
    InvalidJwsJson(String),

    /// The payload is detached and was not supplied.
    #[strum(to_string = "Missing detached payload")]
    MissingPayload,

    /// A detached payload was supplied for a JWS that already carries one.
    #[strum(to_string = "Payload is already attached")]
    PayloadAlreadyAttached,

    /// The flattened JSON serialization requires exactly one signature.
    #[strum(to_string = "Flattened serialization requires exactly one signature, got {0}")]
    NotFlattenable(usize),

    /// Error that occurs when JWK parsing failed
    #[strum(to_string = "JWK parsing failed: {0}")]
    JwkParsingFailed(String),
}

/// Cryptographic error
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum CryptoError {
    /// Error that occurs when key generation failed
    #[strum(to_string = "Key generation failed")]
    KeyGenerationFailed,
    /// Error that occurs when the cryptographic backend
    /// unexpectedly failed
    #[strum(to_string = "Crypto backend failed")]
    CryptoBackend,
    /// The key is well-formed but too weak for the algorithm, or otherwise
    /// unusable.
    #[strum(to_string = "Invalid key: {0}")]
    InvalidKey(String),
    /// A public counterpart was requested for a symmetric key.
    #[strum(to_string = "Symmetric keys have no public counterpart")]
    NoPublicKey,
}

impl From<FormatError> for JwsError {
    fn from(value: FormatError) -> Self {
        Self::Format(value)
    }
}

impl From<CryptoError> for JwsError {
    fn from(value: CryptoError) -> Self {
        Self::Crypto(value)
    }
}

/// Result type used across the crate.
pub type Result<T> = bherror::Result<T, JwsError>;
