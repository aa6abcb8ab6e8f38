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

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! This crate provides functions and types for producing and verifying [JSON
//! Web Signatures (JWS)][1].
//!
//! [1]: https://datatracker.ietf.org/doc/html/rfc7515
//!
//! # Details
//!
//! A JWS is produced either in the Compact Serialization, using
//! [`JwsCompactProducer`], or in the JSON Serialization, using
//! [`JwsJsonProducer`], which supports any number of signers, each with its
//! own protected and unprotected header. The JSON document can be written in
//! the general or the flattened format, see [`JsonFormat`]. Both
//! serializations support detached payloads, which are left out of the
//! serialization and supplied again before verification.
//!
//! Verification is done by the [`VerificationEngine`], which rebuilds the
//! signing input of every signature entry from the transmitted protected
//! header and payload, and checks it against the candidate keys.
//!
//! Cryptographic operations are delegated to a [`SignatureProvider`] per
//! [`AlgorithmFamily`], looked up in a [`ProviderTable`]. A default
//! [`openssl`] backed implementation for all of the `HS*`, `RS*`, `PS*` and
//! `ES*` algorithms is available through `ProviderTable::openssl()` under the
//! default feature `openssl`, which can be disabled and replaced by a custom
//! implementation. Keys are passed as JWKs, see [`Jwk`].
//!
//! # Examples
//!
//! ## Sign and verify a compact JWS
//!
//! ```
//! # #[cfg(feature = "openssl")]
//! # {
//! use bh_jws::{
//!     generate_jwk, JwsCompact, JwsCompactProducer, JwsHeaders, ProviderTable, SigningAlgorithm,
//! };
//!
//! let providers = ProviderTable::openssl();
//! let key = generate_jwk(SigningAlgorithm::Hs256, Some("dummy-kid")).unwrap();
//!
//! let mut header = JwsHeaders::with_algorithm(SigningAlgorithm::Hs256);
//! header.set_key_id("dummy-kid");
//!
//! let jws = JwsCompactProducer::new(header, "Hello, world!")
//!     .unwrap()
//!     .sign(&providers, &key)
//!     .unwrap()
//!     .serialize();
//!
//! let parsed: JwsCompact = jws.parse().unwrap();
//! assert!(parsed
//!     .verify_signature_with(&providers, &key, SigningAlgorithm::Hs256)
//!     .unwrap());
//! # }
//! ```
//!
//! ## Sign a JWS with two signers
//!
//! ```
//! # #[cfg(feature = "openssl")]
//! # {
//! use bh_jws::{
//!     generate_jwk, public_jwk, JsonFormat, JwsHeaders, JwsJson, JwsJsonProducer, ProviderTable,
//!     SignatureHeaders, SigningAlgorithm, VerificationEngine, VerificationKey,
//! };
//!
//! let providers = ProviderTable::openssl();
//! let ec_key = generate_jwk(SigningAlgorithm::Es256, Some("ec")).unwrap();
//! let rsa_key = generate_jwk(SigningAlgorithm::Ps256, Some("rsa")).unwrap();
//!
//! let mut producer = JwsJsonProducer::new(r#"{"iss":"joe"}"#);
//!
//! let mut kid = JwsHeaders::new();
//! kid.set_key_id("ec");
//! let headers = SignatureHeaders::new(
//!     Some(JwsHeaders::with_algorithm(SigningAlgorithm::Es256)),
//!     Some(kid),
//! )
//! .unwrap();
//! producer.sign_with(headers, &providers, &ec_key).unwrap();
//!
//! let headers = SignatureHeaders::protected(JwsHeaders::with_algorithm(SigningAlgorithm::Ps256));
//! producer.sign_with(headers, &providers, &rsa_key).unwrap();
//!
//! let serialized = producer.build().serialize(JsonFormat::General).unwrap();
//!
//! // Verify with the public keys only.
//! let jws: JwsJson = serialized.parse().unwrap();
//! let ec_public = public_jwk(&ec_key).unwrap();
//! let rsa_public = public_jwk(&rsa_key).unwrap();
//! let results = VerificationEngine::new(&providers)
//!     .verify_json_with_keys(
//!         &jws,
//!         &[
//!             VerificationKey::from_jwk(&ec_public).unwrap(),
//!             VerificationKey::from_jwk(&rsa_public).unwrap(),
//!         ],
//!     )
//!     .unwrap();
//! assert!(results.iter().all(|result| result.is_verified()));
//! # }
//! ```

#[cfg(feature = "openssl")]
mod openssl_impl;

mod algorithm;
mod compact;
mod error;
mod header;
mod json;
mod jwk;
mod provider;
pub mod signing_input;
#[cfg(test)]
mod test_utils;
mod utils;
mod verify;

pub use algorithm::*;
pub use compact::*;
pub use error::*;
pub use header::*;
pub use json::*;
pub use jwk::*;
#[cfg(feature = "openssl")]
pub use openssl_impl::*;
pub use provider::*;
pub use utils::*;
pub use verify::*;

/// Helper macro with the same syntax as [`serde_json::json`] specialized for
/// constructing JSON objects.
///
/// It will construct a more specific type ([`serde_json::Map<String,Value>`])
/// than just [`serde_json::Value`] when constructing an object, and panic if
/// the syntax is valid JSON but not an object.
#[macro_export]
macro_rules! json_object {
    ($stuff:tt) => {
        match ::serde_json::json!($stuff) {
            ::serde_json::Value::Object(o) => o,
            _ => unreachable!("JSON literal wasn't an object"),
        }
    };
}
