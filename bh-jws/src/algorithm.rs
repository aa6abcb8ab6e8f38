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

use std::str::FromStr;

use bherror::Error;
use serde::{Deserialize, Serialize};

use crate::error::JwsError;

/// JWS digital signature and MAC algorithms, as registered in [section 3.1 of
/// RFC7518].
///
/// The `"none"` algorithm is deliberately not representable.
///
/// [section 3.1 of RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SigningAlgorithm {
    /// HMAC using SHA-256
    Hs256,
    /// HMAC using SHA-384
    Hs384,
    /// HMAC using SHA-512
    Hs512,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    Rs256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    Rs384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    Rs512,
    /// RSASSA-PSS with SHA-256 and MGF1 with SHA-256
    Ps256,
    /// RSASSA-PSS with SHA-384 and MGF1 with SHA-384
    Ps384,
    /// RSASSA-PSS with SHA-512 and MGF1 with SHA-512
    Ps512,
    /// ECDSA over P-256 with SHA-256
    Es256,
    /// ECDSA over P-384 with SHA-384
    Es384,
    /// ECDSA over P-521 with SHA-512
    Es512,
}

/// JWS `"alg"` header parameter value for **HMAC using SHA-256**.
pub const SIGNING_ALG_HS256: &str = "HS256";
/// JWS `"alg"` header parameter value for **HMAC using SHA-384**.
pub const SIGNING_ALG_HS384: &str = "HS384";
/// JWS `"alg"` header parameter value for **HMAC using SHA-512**.
pub const SIGNING_ALG_HS512: &str = "HS512";
/// JWS `"alg"` header parameter value for **RSASSA-PKCS1-v1_5 using SHA-256**.
pub const SIGNING_ALG_RS256: &str = "RS256";
/// JWS `"alg"` header parameter value for **RSASSA-PKCS1-v1_5 using SHA-384**.
pub const SIGNING_ALG_RS384: &str = "RS384";
/// JWS `"alg"` header parameter value for **RSASSA-PKCS1-v1_5 using SHA-512**.
pub const SIGNING_ALG_RS512: &str = "RS512";
/// JWS `"alg"` header parameter value for digital signature algorithm
/// **RSASSA-PSS using SHA-256 and MGF1 with SHA-256**, as specified in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.1
pub const SIGNING_ALG_PS256: &str = "PS256";
/// JWS `"alg"` header parameter value for digital signature algorithm
/// **RSASSA-PSS using SHA-384 and MGF1 with SHA-384**, as specified in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.1
pub const SIGNING_ALG_PS384: &str = "PS384";
/// JWS `"alg"` header parameter value for digital signature algorithm
/// **RSASSA-PSS using SHA-512 and MGF1 with SHA-512**, as specified in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.1
pub const SIGNING_ALG_PS512: &str = "PS512";
/// JWS `"alg"` header parameter value for digital signature algorithm
/// **ECDSA using P-256 and SHA-256**, as specified in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.1
pub const SIGNING_ALG_ES256: &str = "ES256";
/// JWS `"alg"` header parameter value for digital signature algorithm
/// **ECDSA using P-384 and SHA-384**, as specified in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.1
pub const SIGNING_ALG_ES384: &str = "ES384";
/// JWS `"alg"` header parameter value for digital signature algorithm
/// **ECDSA using P-521 and SHA-512**, as specified in [RFC7518].
///
/// [RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.1
pub const SIGNING_ALG_ES512: &str = "ES512";

/// Family of a [`SigningAlgorithm`]; one [`SignatureProvider`] implements one
/// family.
///
/// [`SignatureProvider`]: crate::SignatureProvider
#[derive(strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    /// Keyed-hash MAC over a symmetric secret.
    #[strum(to_string = "HMAC")]
    Hmac,
    /// RSASSA-PKCS1-v1_5.
    #[strum(to_string = "RSASSA-PKCS1-v1_5")]
    RsaPkcs1,
    /// RSASSA-PSS.
    #[strum(to_string = "RSASSA-PSS")]
    RsaPss,
    /// ECDSA with the fixed-length `R || S` signature encoding.
    #[strum(to_string = "ECDSA")]
    Ecdsa,
}

impl AlgorithmFamily {
    /// All algorithms belonging to this family.
    pub fn algorithms(self) -> &'static [SigningAlgorithm] {
        use SigningAlgorithm::*;

        match self {
            Self::Hmac => &[Hs256, Hs384, Hs512],
            Self::RsaPkcs1 => &[Rs256, Rs384, Rs512],
            Self::RsaPss => &[Ps256, Ps384, Ps512],
            Self::Ecdsa => &[Es256, Es384, Es512],
        }
    }

    /// The JWK `kty` value of keys usable with this family.
    pub fn key_type(self) -> &'static str {
        match self {
            Self::Hmac => "oct",
            Self::RsaPkcs1 | Self::RsaPss => "RSA",
            Self::Ecdsa => "EC",
        }
    }
}

/// Hash function used by a [`SigningAlgorithm`].
#[derive(strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// SHA-256
    #[strum(to_string = "SHA-256")]
    Sha256,
    /// SHA-384
    #[strum(to_string = "SHA-384")]
    Sha384,
    /// SHA-512
    #[strum(to_string = "SHA-512")]
    Sha512,
}

impl DigestAlgorithm {
    /// Length of the digest output in bytes.
    pub fn output_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

/// Every supported algorithm, in registration order.
pub const ALL_SIGNING_ALGORITHMS: [SigningAlgorithm; 12] = [
    SigningAlgorithm::Hs256,
    SigningAlgorithm::Hs384,
    SigningAlgorithm::Hs512,
    SigningAlgorithm::Rs256,
    SigningAlgorithm::Rs384,
    SigningAlgorithm::Rs512,
    SigningAlgorithm::Ps256,
    SigningAlgorithm::Ps384,
    SigningAlgorithm::Ps512,
    SigningAlgorithm::Es256,
    SigningAlgorithm::Es384,
    SigningAlgorithm::Es512,
];

impl SigningAlgorithm {
    /// The algorithm family, which selects the [`SignatureProvider`](crate::SignatureProvider).
    pub fn family(self) -> AlgorithmFamily {
        use SigningAlgorithm::*;

        match self {
            Hs256 | Hs384 | Hs512 => AlgorithmFamily::Hmac,
            Rs256 | Rs384 | Rs512 => AlgorithmFamily::RsaPkcs1,
            Ps256 | Ps384 | Ps512 => AlgorithmFamily::RsaPss,
            Es256 | Es384 | Es512 => AlgorithmFamily::Ecdsa,
        }
    }

    /// The hash function of the algorithm.
    pub fn digest(self) -> DigestAlgorithm {
        use SigningAlgorithm::*;

        match self {
            Hs256 | Rs256 | Ps256 | Es256 => DigestAlgorithm::Sha256,
            Hs384 | Rs384 | Ps384 | Es384 => DigestAlgorithm::Sha384,
            Hs512 | Rs512 | Ps512 | Es512 => DigestAlgorithm::Sha512,
        }
    }

    /// The JWK `kty` value of keys usable with this algorithm.
    pub fn key_type(self) -> &'static str {
        self.family().key_type()
    }

    /// The JWK `crv` value for ECDSA algorithms, `None` otherwise.
    pub fn curve(self) -> Option<&'static str> {
        match self {
            Self::Es256 => Some("P-256"),
            Self::Es384 => Some("P-384"),
            Self::Es512 => Some("P-521"),
            _ => None,
        }
    }

    /// Byte length of each of `R` and `S` in an ECDSA JWS signature, `None`
    /// for non-ECDSA algorithms.
    ///
    /// The full signature is twice as long, e.g. 132 bytes for `ES512`.
    pub fn ecdsa_coordinate_len(self) -> Option<usize> {
        match self {
            Self::Es256 => Some(32),
            Self::Es384 => Some(48),
            Self::Es512 => Some(66),
            _ => None,
        }
    }

    /// The `"alg"` header parameter value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hs256 => SIGNING_ALG_HS256,
            Self::Hs384 => SIGNING_ALG_HS384,
            Self::Hs512 => SIGNING_ALG_HS512,
            Self::Rs256 => SIGNING_ALG_RS256,
            Self::Rs384 => SIGNING_ALG_RS384,
            Self::Rs512 => SIGNING_ALG_RS512,
            Self::Ps256 => SIGNING_ALG_PS256,
            Self::Ps384 => SIGNING_ALG_PS384,
            Self::Ps512 => SIGNING_ALG_PS512,
            Self::Es256 => SIGNING_ALG_ES256,
            Self::Es384 => SIGNING_ALG_ES384,
            Self::Es512 => SIGNING_ALG_ES512,
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = Error<JwsError>;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ALL_SIGNING_ALGORITHMS
            .into_iter()
            .find(|alg| alg.as_str() == value)
            .ok_or_else(|| Error::root(JwsError::UnsupportedAlgorithm(value.to_string())))
    }
}

impl std::fmt::Display for SigningAlgorithm {
    // This trait requires `fmt` with this exact signature.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn signing_algorithms_serialize_correctly() {
        for alg in ALL_SIGNING_ALGORITHMS {
            let alg_str = alg.as_str();

            let serialized = serde_json::to_string(&alg).unwrap();
            let expected = format!("\"{}\"", alg_str);
            assert_eq!(expected, serialized);

            let deserialized_serde: SigningAlgorithm = serde_json::from_str(&expected).unwrap();
            assert_eq!(alg, deserialized_serde);

            let deserialized_str = SigningAlgorithm::from_str(alg_str).unwrap();
            assert_eq!(alg, deserialized_str);

            assert_eq!(alg, SigningAlgorithm::from_str(&alg.to_string()).unwrap());
        }
    }

    #[test]
    fn unknown_algorithms_are_unsupported() {
        for alg in ["none", "hs256", "RS1", "EdDSA", ""] {
            let error = SigningAlgorithm::from_str(alg).unwrap_err();
            assert_matches!(error.error, JwsError::UnsupportedAlgorithm(ref name) if name == alg);
        }
    }

    #[test]
    fn algorithm_parameters() {
        assert_eq!(SigningAlgorithm::Hs384.family(), AlgorithmFamily::Hmac);
        assert_eq!(SigningAlgorithm::Ps512.family(), AlgorithmFamily::RsaPss);
        assert_eq!(SigningAlgorithm::Rs256.key_type(), "RSA");
        assert_eq!(SigningAlgorithm::Es384.digest(), DigestAlgorithm::Sha384);
        assert_eq!(SigningAlgorithm::Es512.curve(), Some("P-521"));
        assert_eq!(SigningAlgorithm::Es512.ecdsa_coordinate_len(), Some(66));
        assert_eq!(SigningAlgorithm::Ps256.ecdsa_coordinate_len(), None);

        for family in [
            AlgorithmFamily::Hmac,
            AlgorithmFamily::RsaPkcs1,
            AlgorithmFamily::RsaPss,
            AlgorithmFamily::Ecdsa,
        ] {
            assert!(family.algorithms().iter().all(|alg| alg.family() == family));
        }
    }
}
