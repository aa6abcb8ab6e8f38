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

use bherror::{
    traits::{ErrorContext as _, ForeignError as _},
    Error,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{FormatError, JwsError, Result, SigningAlgorithm};

/// Name of the algorithm header parameter, see [section 4.1.1 of RFC7515].
///
/// [section 4.1.1 of RFC7515]: https://www.rfc-editor.org/rfc/rfc7515.html#section-4.1.1
pub const HEADER_ALG: &str = "alg";

/// Name of the key ID header parameter, see [section 4.1.4 of RFC7515].
///
/// [section 4.1.4 of RFC7515]: https://www.rfc-editor.org/rfc/rfc7515.html#section-4.1.4
pub const HEADER_KID: &str = "kid";

/// A JOSE header: an ordered collection of header parameters.
///
/// Parameters are kept in insertion order, and [`JwsHeaders::to_json_bytes`]
/// serializes them in that order without whitespace. Parameters other than
/// `alg` and `kid` are carried opaquely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JwsHeaders(Map<String, Value>);

impl JwsHeaders {
    /// Create an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a header holding only the `alg` parameter.
    pub fn with_algorithm(algorithm: SigningAlgorithm) -> Self {
        let mut header = Self::new();
        header.set_algorithm(algorithm);
        header
    }

    /// Parse a header from its JSON serialization, which must be an object.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .foreign_err(|| {
                JwsError::Format(FormatError::InvalidJson(
                    "header is not valid JSON".to_owned(),
                ))
            })
            .ctx(|| String::from_utf8_lossy(bytes).into_owned())?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(Error::root(JwsError::Format(FormatError::InvalidJson(
                "header is not a JSON object".to_owned(),
            )))),
        }
    }

    /// The compact JSON serialization of this header.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.0).foreign_err(|| {
            JwsError::Format(FormatError::InvalidJson(
                "header serialization failed".to_owned(),
            ))
        })
    }

    /// The `alg` parameter.
    ///
    /// Returns `Ok(None)` if the parameter is absent, and an error if it is
    /// not a string naming a supported algorithm.
    pub fn algorithm(&self) -> Result<Option<SigningAlgorithm>> {
        match self.0.get(HEADER_ALG) {
            None => Ok(None),
            Some(Value::String(alg)) => alg.parse().map(Some),
            Some(other) => Err(Error::root(JwsError::Format(FormatError::InvalidJson(format!(
                "\"alg\" must be a string, got {other}"
            ))))),
        }
    }

    /// Set the `alg` parameter.
    pub fn set_algorithm(&mut self, algorithm: SigningAlgorithm) -> &mut Self {
        self.insert(HEADER_ALG, algorithm.as_str());
        self
    }

    /// The `kid` parameter, if present and a string.
    pub fn key_id(&self) -> Option<&str> {
        self.0.get(HEADER_KID).and_then(Value::as_str)
    }

    /// Set the `kid` parameter.
    pub fn set_key_id(&mut self, kid: impl Into<String>) -> &mut Self {
        self.insert(HEADER_KID, kid.into());
        self
    }

    /// Insert an arbitrary parameter, returning the previous value if any.
    ///
    /// Replacing a parameter keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Get a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Check whether a parameter is present.
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterate over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the header has no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Combine a protected and an unprotected header into a single view.
    ///
    /// The view is meant for callers inspecting the header parameters of a
    /// signature; it never takes part in computing a signing input. The two
    /// headers must be disjoint, otherwise [`JwsError::HeaderConflict`] is
    /// returned. Protected parameters come first.
    pub fn merge(protected: Option<&Self>, unprotected: Option<&Self>) -> Result<Self> {
        check_disjoint(protected, unprotected)?;

        let mut merged = Self::new();
        for header in [protected, unprotected].into_iter().flatten() {
            for (name, value) in header.iter() {
                merged.insert(name.clone(), value.clone());
            }
        }

        Ok(merged)
    }
}

impl From<Map<String, Value>> for JwsHeaders {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl From<JwsHeaders> for Map<String, Value> {
    fn from(value: JwsHeaders) -> Self {
        value.0
    }
}

fn check_disjoint(protected: Option<&JwsHeaders>, unprotected: Option<&JwsHeaders>) -> Result<()> {
    let (Some(protected), Some(unprotected)) = (protected, unprotected) else {
        return Ok(());
    };

    match unprotected
        .iter()
        .map(|(name, _)| name)
        .find(|name| protected.contains_key(name))
    {
        Some(name) => Err(Error::root(JwsError::HeaderConflict(name.clone()))),
        None => Ok(()),
    }
}

/// The headers of a single signer: an optional protected header, covered by
/// the signature, and an optional unprotected header, which is not.
///
/// Construction guarantees the two are disjoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignatureHeaders {
    protected: Option<JwsHeaders>,
    unprotected: Option<JwsHeaders>,
}

impl SignatureHeaders {
    /// Pair up the protected and unprotected header of a signer.
    ///
    /// # Errors
    ///
    /// Returns [`JwsError::HeaderConflict`] if a parameter is present in
    /// both.
    pub fn new(protected: Option<JwsHeaders>, unprotected: Option<JwsHeaders>) -> Result<Self> {
        check_disjoint(protected.as_ref(), unprotected.as_ref())?;

        Ok(Self {
            protected,
            unprotected,
        })
    }

    /// Headers with only a protected part.
    pub fn protected(header: JwsHeaders) -> Self {
        Self {
            protected: Some(header),
            unprotected: None,
        }
    }

    /// Headers with only an unprotected part; the signature then covers
    /// the payload alone.
    pub fn unprotected(header: JwsHeaders) -> Self {
        Self {
            protected: None,
            unprotected: Some(header),
        }
    }

    /// The protected header, if any.
    pub fn protected_header(&self) -> Option<&JwsHeaders> {
        self.protected.as_ref()
    }

    /// The unprotected header, if any.
    pub fn unprotected_header(&self) -> Option<&JwsHeaders> {
        self.unprotected.as_ref()
    }

    /// Both headers combined, protected parameters first.
    pub fn merged(&self) -> JwsHeaders {
        // Disjoint since construction, so merging cannot fail.
        JwsHeaders::merge(self.protected.as_ref(), self.unprotected.as_ref()).unwrap_or_default()
    }

    /// The `alg` parameter, taken from whichever header carries it.
    pub fn algorithm(&self) -> Result<SigningAlgorithm> {
        for header in [&self.protected, &self.unprotected].into_iter().flatten() {
            if let Some(algorithm) = header.algorithm()? {
                return Ok(algorithm);
            }
        }

        Err(Error::root(JwsError::MissingAlgorithm))
    }
}
