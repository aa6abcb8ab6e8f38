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

use bherror::{
    traits::{ErrorContext as _, ForeignError as _},
    Error,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    signing_input::{encode_protected_header, signing_input},
    utils::{base64_url_encode, decode_part},
    FormatError, Jwk, JwsError, JwsHeaders, ProviderTable, Result, SignatureHeaders,
    SigningAlgorithm, VerificationEngine,
};

/// Members of a signature entry, which a flattened document carries at the
/// top level.
const ENTRY_MEMBERS: [&str; 3] = ["protected", "header", "signature"];

/// Shape of the [JWS JSON Serialization].
///
/// [JWS JSON Serialization]: https://www.rfc-editor.org/rfc/rfc7515.html#section-7.2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonFormat {
    /// `{"payload", "signatures": [...]}`, any number of signers.
    General,
    /// The single signature entry inlined next to `payload`.
    Flattened,
}

fn invalid_json(message: impl Into<String>) -> Error<JwsError> {
    let error = FormatError::InvalidJwsJson(message.into());
    Error::root(JwsError::Format(error))
}

/// One signer of a [`JwsJson`] document.
///
/// The protected header is kept as the transmitted `base64url` string, and
/// it is exactly that string which enters the signing input on
/// verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwsSignatureEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    protected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<JwsHeaders>,
    signature: String,
}

impl JwsSignatureEntry {
    /// The protected header exactly as transmitted, if any.
    pub fn encoded_protected_header(&self) -> Option<&str> {
        self.protected.as_deref()
    }

    /// The decoded protected header, if any.
    pub fn protected_header(&self) -> Result<Option<JwsHeaders>> {
        self.protected
            .as_deref()
            .map(|protected| {
                JwsHeaders::from_json_bytes(&decode_part(protected, "protected header")?)
            })
            .transpose()
    }

    /// The unprotected header, if any.
    pub fn unprotected_header(&self) -> Option<&JwsHeaders> {
        self.header.as_ref()
    }

    /// Both headers of the signer, checked to be disjoint.
    pub fn headers(&self) -> Result<SignatureHeaders> {
        SignatureHeaders::new(self.protected_header()?, self.header.clone())
    }

    /// The algorithm named by either header.
    pub fn algorithm(&self) -> Result<SigningAlgorithm> {
        self.headers()?.algorithm()
    }

    /// The signature exactly as transmitted.
    pub fn encoded_signature(&self) -> &str {
        &self.signature
    }

    /// The decoded signature.
    pub fn signature(&self) -> Result<Vec<u8>> {
        decode_part(&self.signature, "signature")
    }

    /// The signing input of this signer over the encoded payload.
    pub fn signing_input(&self, encoded_payload: &str) -> Vec<u8> {
        signing_input(
            self.protected.as_deref().unwrap_or_default(),
            encoded_payload,
        )
    }

    /// The JSON serialization of this entry alone, as found in the
    /// `signatures` array.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).foreign_err(|| {
            JwsError::Format(FormatError::InvalidJson("serialization failed".to_owned()))
        })
    }
}

/// Producer of a JWS in the [JSON Serialization], with one signature entry
/// per signer.
///
/// [JSON Serialization]: https://www.rfc-editor.org/rfc/rfc7515.html#section-7.2
#[derive(Debug, Clone)]
pub struct JwsJsonProducer {
    encoded_payload: String,
    signatures: Vec<JwsSignatureEntry>,
}

impl JwsJsonProducer {
    /// Prepare the `payload` shared by all signers.
    pub fn new(payload: impl AsRef<[u8]>) -> Self {
        Self {
            encoded_payload: base64_url_encode(payload),
            signatures: Vec::new(),
        }
    }

    /// The bytes a signer with the given `headers` signs.
    pub fn signing_input(&self, headers: &SignatureHeaders) -> Result<Vec<u8>> {
        let encoded_protected = encode_protected_header(headers.protected_header())?;
        Ok(signing_input(&encoded_protected, &self.encoded_payload))
    }

    /// Produce the signature entry of one signer without adding it to the
    /// document.
    ///
    /// Signers are independent of each other, so entries may be produced
    /// concurrently and then added with [`JwsJsonProducer::add_signature`]
    /// in the desired order.
    pub fn sign_entry(
        &self,
        headers: SignatureHeaders,
        providers: &ProviderTable,
        key: &Jwk,
    ) -> Result<JwsSignatureEntry> {
        let algorithm = headers.algorithm()?;
        let protected = headers
            .protected_header()
            .map(|header| encode_protected_header(Some(header)))
            .transpose()?;
        let input = signing_input(
            protected.as_deref().unwrap_or_default(),
            &self.encoded_payload,
        );

        let signature = providers
            .sign(algorithm, &input, key)
            .ctx(|| format!("signing JSON signature entry with {algorithm}"))?;

        Ok(JwsSignatureEntry {
            protected,
            header: headers.unprotected_header().cloned(),
            signature: base64_url_encode(signature),
        })
    }

    /// Append a signature entry produced by [`JwsJsonProducer::sign_entry`].
    pub fn add_signature(&mut self, entry: JwsSignatureEntry) -> &mut Self {
        self.signatures.push(entry);
        self
    }

    /// Sign as one more signer, appending its entry to the document.
    pub fn sign_with(
        &mut self,
        headers: SignatureHeaders,
        providers: &ProviderTable,
        key: &Jwk,
    ) -> Result<&JwsSignatureEntry> {
        let entry = self.sign_entry(headers, providers, key)?;
        let index = self.signatures.len();
        self.signatures.push(entry);
        Ok(&self.signatures[index])
    }

    /// The entries produced so far, in signing order.
    pub fn signatures(&self) -> &[JwsSignatureEntry] {
        &self.signatures
    }

    /// The document, with the payload attached.
    pub fn build(self) -> JwsJson {
        JwsJson {
            encoded_payload: Some(self.encoded_payload),
            signatures: self.signatures,
        }
    }
}

#[derive(Serialize)]
struct GeneralSerialization<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a str>,
    signatures: &'a [JwsSignatureEntry],
}

#[derive(Serialize)]
struct FlattenedSerialization<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a str>,
    #[serde(flatten)]
    signature: &'a JwsSignatureEntry,
}

/// A JWS in the [JSON Serialization]: a shared payload, attached or
/// detached, and one or more signature entries.
///
/// The same document can be serialized in either [`JsonFormat`], the
/// flattened one being limited to a single signer.
///
/// [JSON Serialization]: https://www.rfc-editor.org/rfc/rfc7515.html#section-7.2
#[derive(Debug, Clone, PartialEq)]
pub struct JwsJson {
    encoded_payload: Option<String>,
    signatures: Vec<JwsSignatureEntry>,
}

impl JwsJson {
    /// The signature entries, in signer order.
    pub fn signatures(&self) -> &[JwsSignatureEntry] {
        &self.signatures
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
        let encoded_payload = self
            .encoded_payload()
            .ok_or_else(|| Error::root(JwsError::Format(FormatError::MissingPayload)))?;
        decode_part(encoded_payload, "payload")
    }

    /// The same document with the payload left out of the serialization.
    pub fn detached(&self) -> Self {
        Self {
            encoded_payload: None,
            signatures: self.signatures.clone(),
        }
    }

    /// Supply the payload of a detached document.
    ///
    /// # Errors
    ///
    /// Fails with [`FormatError::PayloadAlreadyAttached`] if the document
    /// carries a payload.
    pub fn with_detached_payload(mut self, payload: impl AsRef<[u8]>) -> Result<Self> {
        if self.encoded_payload.is_some() {
            return Err(Error::root(JwsError::Format(
                FormatError::PayloadAlreadyAttached,
            )));
        }

        self.encoded_payload = Some(base64_url_encode(payload));
        Ok(self)
    }

    /// The document as a JSON value of the given `format`.
    ///
    /// # Errors
    ///
    /// The [`JsonFormat::Flattened`] format fails with
    /// [`FormatError::NotFlattenable`] unless there is exactly one signer.
    pub fn to_value(&self, format: JsonFormat) -> Result<Value> {
        let payload = self.encoded_payload();

        let value = match format {
            JsonFormat::General => serde_json::to_value(GeneralSerialization {
                payload,
                signatures: &self.signatures,
            }),
            JsonFormat::Flattened => {
                let [signature] = self.signatures.as_slice() else {
                    return Err(Error::root(JwsError::Format(FormatError::NotFlattenable(
                        self.signatures.len(),
                    ))));
                };
                serde_json::to_value(FlattenedSerialization { payload, signature })
            }
        };

        value.foreign_err(|| {
            JwsError::Format(FormatError::InvalidJson("serialization failed".to_owned()))
        })
    }

    /// The compact JSON text of the document in the given `format`.
    pub fn serialize(&self, format: JsonFormat) -> Result<String> {
        Ok(self.to_value(format)?.to_string())
    }

    /// Verify the entries signed with the `algorithm` using the `key`.
    ///
    /// Returns `true` if at least one of them verifies. See
    /// [`VerificationEngine::verify_json`] for the result of each entry.
    pub fn verify_signature_with(
        &self,
        providers: &ProviderTable,
        key: &Jwk,
        algorithm: SigningAlgorithm,
    ) -> Result<bool> {
        let results = VerificationEngine::new(providers).verify_json(self, key, algorithm)?;
        Ok(results.iter().any(|result| result.is_verified()))
    }

    /// Parse a document from its JSON value, in either format.
    ///
    /// Only the shape of each signature entry is checked here: it must be an
    /// object with a string `signature`, an optional string `protected` and
    /// an optional object `header`. A single misshapen entry fails the whole
    /// document. The `base64url` contents of an entry are decoded on access,
    /// so a well shaped entry that cannot be decoded still parses, and is
    /// rejected on its own by the [`VerificationEngine`].
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidJwsJson`] if the document or one of its
    /// entries is misshapen, and [`FormatError::InvalidBase64Url`] if the
    /// payload is not `base64url`.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(document) = value else {
            return Err(invalid_json("document is not a JSON object"));
        };

        Self::from_object(document)
    }

    fn from_object(mut document: Map<String, Value>) -> Result<Self> {
        let encoded_payload = match document.remove("payload") {
            None => None,
            Some(Value::String(payload)) => {
                decode_part(&payload, "payload")?;
                Some(payload)
            }
            Some(_) => return Err(invalid_json("\"payload\" is not a string")),
        };

        let signatures = match document.remove("signatures") {
            Some(signatures) => {
                if let Some(member) = ENTRY_MEMBERS
                    .iter()
                    .find(|member| document.contains_key(**member))
                {
                    return Err(invalid_json(format!(
                        "\"{member}\" cannot appear next to \"signatures\""
                    )));
                }

                let Value::Array(signatures) = signatures else {
                    return Err(invalid_json("\"signatures\" is not an array"));
                };
                if signatures.is_empty() {
                    return Err(invalid_json("\"signatures\" is empty"));
                }

                signatures
                    .into_iter()
                    .enumerate()
                    .map(|(index, entry)| {
                        parse_entry(entry).ctx(|| format!("signature entry {index}"))
                    })
                    .collect::<Result<Vec<_>>>()?
            }
            None => vec![parse_entry(Value::Object(document))?],
        };

        Ok(Self {
            encoded_payload,
            signatures,
        })
    }
}

fn parse_entry(entry: Value) -> Result<JwsSignatureEntry> {
    serde_json::from_value(entry).foreign_err(|| {
        JwsError::Format(FormatError::InvalidJwsJson(
            "invalid signature entry".to_owned(),
        ))
    })
}

/// Parses the JSON text and then the document, see [`JwsJson::from_value`].
impl FromStr for JwsJson {
    type Err = Error<JwsError>;

    fn from_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s).foreign_err(|| {
            JwsError::Format(FormatError::InvalidJson(
                "JWS JSON serialization is not valid JSON".to_owned(),
            ))
        })?;

        Self::from_value(value)
    }
}
