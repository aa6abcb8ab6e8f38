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

use std::{fmt, str::FromStr};

use bherror::{traits::ErrorContext as _, Error};

use crate::{
    signing_input::{encode_protected_header, signing_input},
    utils::{base64_url_encode, decode_part},
    FormatError, Jwk, JwsError, JwsHeaders, ProviderTable, Result, SigningAlgorithm,
    VerificationEngine,
};

/// Producer of a JWS in the [Compact Serialization].
///
/// The header is entirely protected and must carry `alg`.
///
/// [Compact Serialization]: https://www.rfc-editor.org/rfc/rfc7515.html#section-7.1
#[derive(Debug, Clone)]
pub struct JwsCompactProducer {
    algorithm: SigningAlgorithm,
    header: JwsHeaders,
    encoded_header: String,
    encoded_payload: String,
}

impl JwsCompactProducer {
    /// Prepare the `payload` for signing under the protected `header`.
    ///
    /// # Errors
    ///
    /// Fails if the header does not name a supported algorithm.
    pub fn new(header: JwsHeaders, payload: impl AsRef<[u8]>) -> Result<Self> {
        let algorithm = header
            .algorithm()?
            .ok_or_else(|| Error::root(JwsError::MissingAlgorithm))?;
        let encoded_header = encode_protected_header(Some(&header))?;

        Ok(Self {
            algorithm,
            header,
            encoded_header,
            encoded_payload: base64_url_encode(payload),
        })
    }

    /// The algorithm named by the header.
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// The protected header.
    pub fn header(&self) -> &JwsHeaders {
        &self.header
    }

    /// The bytes that get signed.
    pub fn signing_input(&self) -> Vec<u8> {
        signing_input(&self.encoded_header, &self.encoded_payload)
    }

    /// Sign with the `key`, using the provider registered for the header's
    /// algorithm.
    pub fn sign(&self, providers: &ProviderTable, key: &Jwk) -> Result<JwsCompact> {
        let signature = providers
            .sign(self.algorithm, &self.signing_input(), key)
            .ctx(|| format!("signing compact JWS with {}", self.algorithm))?;

        Ok(JwsCompact {
            header: self.header.clone(),
            encoded_header: self.encoded_header.clone(),
            encoded_payload: Some(self.encoded_payload.clone()),
            encoded_signature: base64_url_encode(&signature),
            signature,
        })
    }
}

/// A JWS in the [Compact Serialization]: exactly one signer, with an
/// attached or a detached payload.
///
/// A detached JWS has an empty payload segment; the payload must be
/// supplied with [`JwsCompact::with_detached_payload`] before it can be
/// verified. Consequently an attached empty payload cannot be told apart from
/// a detached one.
///
/// [Compact Serialization]: https://www.rfc-editor.org/rfc/rfc7515.html#section-7.1
#[derive(Debug, Clone, PartialEq)]
pub struct JwsCompact {
    header: JwsHeaders,
    encoded_header: String,
    encoded_payload: Option<String>,
    signature: Vec<u8>,
    encoded_signature: String,
}

impl JwsCompact {
    /// The decoded protected header.
    pub fn header(&self) -> &JwsHeaders {
        &self.header
    }

    /// The algorithm named by the protected header.
    pub fn algorithm(&self) -> Result<SigningAlgorithm> {
        self.header
            .algorithm()?
            .ok_or_else(|| Error::root(JwsError::MissingAlgorithm))
    }

    /// The protected header exactly as transmitted.
    pub fn encoded_header(&self) -> &str {
        &self.encoded_header
    }

    /// The payload exactly as transmitted, `None` if detached.
    pub fn encoded_payload(&self) -> Option<&str> {
        self.encoded_payload.as_deref()
    }

    /// Whether the payload is detached and not yet supplied.
    pub fn is_detached(&self) -> bool {
        self.encoded_payload.is_none()
    }

    /// The decoded payload.
    pub fn payload(&self) -> Result<Vec<u8>> {
        decode_part(self.attached_payload()?, "payload")
    }

    /// The decoded signature.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Reconstruct the signing input from the transmitted segments.
    pub fn signing_input(&self) -> Result<Vec<u8>> {
        let payload = self.attached_payload()?;
        Ok(signing_input(&self.encoded_header, payload))
    }

    /// The serialization: three `base64url` segments separated by `.`, the
    /// middle one empty if the payload is detached.
    pub fn serialize(&self) -> String {
        format!(
            "{}.{}.{}",
            self.encoded_header,
            self.encoded_payload.as_deref().unwrap_or_default(),
            self.encoded_signature
        )
    }

    /// The same JWS with the payload left out of the serialization.
    pub fn detached(&self) -> Self {
        Self {
            encoded_payload: None,
            ..self.clone()
        }
    }

    /// Supply the payload of a detached JWS.
    ///
    /// # Errors
    ///
    /// Fails with [`FormatError::PayloadAlreadyAttached`] if the JWS carries
    /// a payload.
    pub fn with_detached_payload(mut self, payload: impl AsRef<[u8]>) -> Result<Self> {
        if self.encoded_payload.is_some() {
            return Err(Error::root(JwsError::Format(
                FormatError::PayloadAlreadyAttached,
            )));
        }

        self.encoded_payload = Some(base64_url_encode(payload));
        Ok(self)
    }

    /// Verify the signature with the `key` for the `algorithm`.
    ///
    /// See [`VerificationEngine::verify_compact`].
    pub fn verify_signature_with(
        &self,
        providers: &ProviderTable,
        key: &Jwk,
        algorithm: SigningAlgorithm,
    ) -> Result<bool> {
        VerificationEngine::new(providers).verify_compact(self, key, algorithm)
    }

    fn attached_payload(&self) -> Result<&str> {
        self.encoded_payload
            .as_deref()
            .ok_or_else(|| Error::root(JwsError::Format(FormatError::MissingPayload)))
    }
}

impl FromStr for JwsCompact {
    type Err = Error<JwsError>;

    fn from_str(s: &str) -> Result<Self> {
        let segments: Vec<&str> = s.split('.').collect();
        let [encoded_header, encoded_payload, encoded_signature] = segments[..] else {
            return Err(Error::root(JwsError::Format(FormatError::InvalidSegmentCount(
                segments.len(),
            ))));
        };

        let header = JwsHeaders::from_json_bytes(&decode_part(encoded_header, "protected header")?)
            .ctx(|| "decoding compact JWS header")?;

        let encoded_payload = if encoded_payload.is_empty() {
            None
        } else {
            decode_part(encoded_payload, "payload")?;
            Some(encoded_payload.to_owned())
        };

        Ok(Self {
            header,
            encoded_header: encoded_header.to_owned(),
            encoded_payload,
            signature: decode_part(encoded_signature, "signature")?,
            encoded_signature: encoded_signature.to_owned(),
        })
    }
}

impl fmt::Display for JwsCompact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::test_utils::*;

    fn cookbook_header() -> JwsHeaders {
        let mut header = JwsHeaders::with_algorithm(SigningAlgorithm::Hs256);
        header.set_key_id(HMAC_KID);
        header
    }

    #[test]
    fn producer_encodes_header_and_payload() {
        let producer = JwsCompactProducer::new(cookbook_header(), COOKBOOK_PAYLOAD).unwrap();

        assert_eq!(producer.algorithm(), SigningAlgorithm::Hs256);
        assert_eq!(
            producer.signing_input(),
            format!("{HS256_KID_PROTECTED}.{COOKBOOK_PAYLOAD_B64}").into_bytes()
        );
    }

    #[test]
    fn producer_requires_algorithm() {
        let mut header = JwsHeaders::new();
        header.set_key_id(HMAC_KID);

        let error = JwsCompactProducer::new(header, "payload").unwrap_err();
        assert_matches!(error.error, JwsError::MissingAlgorithm);
    }

    #[test]
    fn parse_splits_three_segments() {
        let serialized =
            format!("{HS256_KID_PROTECTED}.{COOKBOOK_PAYLOAD_B64}.{HS256_KID_SIGNATURE}");
        let jws: JwsCompact = serialized.parse().unwrap();

        assert_eq!(jws.algorithm().unwrap(), SigningAlgorithm::Hs256);
        assert_eq!(jws.header().key_id(), Some(HMAC_KID));
        assert_eq!(jws.payload().unwrap(), COOKBOOK_PAYLOAD.as_bytes());
        assert_eq!(jws.signature().len(), 32);
        assert_eq!(jws.to_string(), serialized);
    }

    #[test]
    fn parse_rejects_wrong_segment_count() {
        for (input, count) in [("a.b", 2), ("a.b.c.d", 4), ("abc", 1), ("a.b.c.d.e", 5)] {
            let error = input.parse::<JwsCompact>().unwrap_err();
            assert_eq!(
                error.error,
                JwsError::Format(FormatError::InvalidSegmentCount(count))
            );
        }
    }

    #[test]
    fn parse_rejects_malformed_segments() {
        let error = format!("{HS256_PROTECTED}.{COOKBOOK_PAYLOAD_B64}.not+base64url")
            .parse::<JwsCompact>()
            .unwrap_err();
        assert_eq!(
            error.error,
            JwsError::Format(FormatError::InvalidBase64Url("signature"))
        );

        let error = format!("{HS256_PROTECTED}.pay=load.{HS256_SIGNATURE}")
            .parse::<JwsCompact>()
            .unwrap_err();
        assert_eq!(
            error.error,
            JwsError::Format(FormatError::InvalidBase64Url("payload"))
        );

        // "bm90IGpzb24" is "not json"
        let error = format!("bm90IGpzb24.{COOKBOOK_PAYLOAD_B64}.{HS256_SIGNATURE}")
            .parse::<JwsCompact>()
            .unwrap_err();
        assert_matches!(error.error, JwsError::Format(FormatError::InvalidJson(_)));
    }

    #[test]
    fn parsed_header_is_kept_verbatim() {
        // `{"kid":"x", "alg":"HS256"}`, with a space and non-canonical order
        let encoded_header = base64_url_encode(br#"{"kid":"x", "alg":"HS256"}"#);
        let jws: JwsCompact = format!("{encoded_header}.cGF5bG9hZA.{HS256_SIGNATURE}")
            .parse()
            .unwrap();

        assert_eq!(jws.encoded_header(), encoded_header);
        assert_eq!(
            jws.signing_input().unwrap(),
            format!("{encoded_header}.cGF5bG9hZA").into_bytes()
        );
    }

    #[test]
    fn detached_payload_must_be_supplied() {
        let serialized = format!("{HS256_KID_PROTECTED}..{HS256_KID_SIGNATURE}");
        let jws: JwsCompact = serialized.parse().unwrap();

        assert!(jws.is_detached());
        assert_eq!(jws.serialize(), serialized);
        assert_matches!(
            jws.signing_input().unwrap_err().error,
            JwsError::Format(FormatError::MissingPayload)
        );

        let jws = jws.with_detached_payload(COOKBOOK_PAYLOAD).unwrap();
        assert_eq!(
            jws.signing_input().unwrap(),
            format!("{HS256_KID_PROTECTED}.{COOKBOOK_PAYLOAD_B64}").into_bytes()
        );
        // The payload is supplied, not transmitted.
        assert_eq!(jws.detached().serialize(), serialized);

        let error = jws.with_detached_payload(b"again").unwrap_err();
        assert_matches!(
            error.error,
            JwsError::Format(FormatError::PayloadAlreadyAttached)
        );
    }
}
