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

//! Construction of the JWS signing input, see [section 5.1 of RFC7515].
//!
//! The protected header only ever enters the signing input as the exact
//! `base64url` string that is (or was) transmitted. On verification it is
//! never re-serialized from a parsed header.
//!
//! [section 5.1 of RFC7515]: https://www.rfc-editor.org/rfc/rfc7515.html#section-5.1

use crate::{utils::base64_url_encode, JwsHeaders, Result};

/// Encode a protected header for transmission.
///
/// An absent protected header is encoded as the empty string.
pub fn encode_protected_header(header: Option<&JwsHeaders>) -> Result<String> {
    match header {
        Some(header) => Ok(base64_url_encode(header.to_json_bytes()?)),
        None => Ok(String::new()),
    }
}

/// Build `ASCII(encoded_protected || '.' || encoded_payload)`.
///
/// Both parts are taken as already encoded, so the result matches the
/// transmitted bytes exactly.
pub fn signing_input(encoded_protected: &str, encoded_payload: &str) -> Vec<u8> {
    let mut input = Vec::with_capacity(encoded_protected.len() + 1 + encoded_payload.len());
    input.extend_from_slice(encoded_protected.as_bytes());
    input.push(b'.');
    input.extend_from_slice(encoded_payload.as_bytes());
    input
}
