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
use serde_json::{Map, Value};

use crate::{
    utils::base64_url_decode, AlgorithmFamily, CryptoError, FormatError, JwsError, Result,
    SigningAlgorithm,
};

/// A JSON object meant to represent a JWK, see [RFC7517].
///
/// Since this is a type alias, no aspects of the schema are enforced; this is
/// left to the [`SignatureProvider`](crate::SignatureProvider) consuming the
/// key. A JWK may hold private members, in which case it can be used for
/// signing as well as for verification.
///
/// [RFC7517]: https://datatracker.ietf.org/doc/html/rfc7517
pub type Jwk = Map<String, Value>;

const RSA_PRIVATE_MEMBERS: [&str; 7] = ["d", "p", "q", "dp", "dq", "qi", "oth"];
const EC_PRIVATE_MEMBERS: [&str; 1] = ["d"];

/// The `kid` member of the JWK, if present and a string.
pub fn jwk_key_id(jwk: &Jwk) -> Option<&str> {
    jwk.get("kid").and_then(Value::as_str)
}

/// Check that the `jwk` can be used with `algorithm`.
///
/// The key type (`kty`) must match the algorithm family, ECDSA keys must be on
/// the algorithm's curve, and an `alg` member, if present, must name the
/// algorithm itself. A mismatch is reported as
/// [`JwsError::KeyAlgorithmMismatch`].
pub fn check_key_algorithm(algorithm: SigningAlgorithm, jwk: &Jwk) -> Result<()> {
    let mismatch = |key: String| Error::root(JwsError::KeyAlgorithmMismatch(algorithm, key));

    let kty = jwk_str(jwk, "kty")?;
    if kty != algorithm.key_type() {
        return Err(mismatch(format!("of type {kty}")));
    }

    if let Some(curve) = algorithm.curve() {
        let crv = jwk_str(jwk, "crv")?;
        if crv != curve {
            return Err(mismatch(format!("on curve {crv}")));
        }
    }

    match jwk.get("alg") {
        None => Ok(()),
        Some(alg) if alg == algorithm.as_str() => Ok(()),
        Some(alg) => Err(mismatch(format!("restricted to {alg}"))),
    }
}

/// Construct the public counterpart of the `jwk` by removing its private
/// members.
///
/// # Errors
///
/// Symmetric (`oct`) keys have no public counterpart and result in
/// [`CryptoError::NoPublicKey`].
pub fn public_jwk(jwk: &Jwk) -> Result<Jwk> {
    let kty = jwk_str(jwk, "kty")?;
    let private_members: &[&str] = match kty {
        kty if kty == AlgorithmFamily::Hmac.key_type() => {
            return Err(Error::root(JwsError::Crypto(CryptoError::NoPublicKey)));
        }
        kty if kty == AlgorithmFamily::Ecdsa.key_type() => &EC_PRIVATE_MEMBERS,
        kty if kty == AlgorithmFamily::RsaPkcs1.key_type() => &RSA_PRIVATE_MEMBERS,
        _ => {
            return Err(Error::root(JwsError::Format(FormatError::JwkParsingFailed(format!(
                "unsupported key type {kty}"
            )))));
        }
    };

    let mut public = jwk.clone();
    for member in private_members {
        public.remove(*member);
    }
    Ok(public)
}

/// Fetch a string member of the JWK.
pub(crate) fn jwk_str<'a>(jwk: &'a Jwk, member: &str) -> Result<&'a str> {
    let error = |message| Error::root(JwsError::Format(FormatError::JwkParsingFailed(message)));

    jwk.get(member)
        .ok_or_else(|| error(format!("missing \"{member}\" field")))?
        .as_str()
        .ok_or_else(|| error(format!("\"{member}\" field is not a string")))
}

/// Fetch and decode a `base64url`-encoded member of the JWK.
pub(crate) fn jwk_bytes(jwk: &Jwk, member: &str) -> Result<Vec<u8>> {
    let encoded = jwk_str(jwk, member)?;

    base64_url_decode(encoded)
        .foreign_err(|| {
            JwsError::Format(FormatError::JwkParsingFailed(format!(
                "decoding \"{member}\" failed"
            )))
        })
        .ctx(|| format!("decoding {encoded} failed"))
}

/// Same as [`jwk_bytes`], but `Ok(None)` if the member is absent.
pub(crate) fn optional_jwk_bytes(jwk: &Jwk, member: &str) -> Result<Option<Vec<u8>>> {
    if jwk.contains_key(member) {
        jwk_bytes(jwk, member).map(Some)
    } else {
        Ok(None)
    }
}
