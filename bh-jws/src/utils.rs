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

use std::result::Result as StdResult;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bherror::traits::{ErrorContext as _, ForeignError as _};

use crate::{FormatError, JwsError, Result};

/// Returns the `base64url`-encoded string of the given `input`.
pub fn base64_url_encode<T: AsRef<[u8]>>(input: T) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Decodes the given `payload` as the `base64url`-encoded string **without
/// padding** into bytes.
pub fn base64_url_decode<T: AsRef<[u8]>>(payload: T) -> StdResult<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(payload)
}

/// Same as [`base64_url_decode`], but reports a [`FormatError`] naming the
/// `part` of the JWS that failed to decode.
pub(crate) fn decode_part(encoded: &str, part: &'static str) -> Result<Vec<u8>> {
    base64_url_decode(encoded)
        .foreign_err(|| JwsError::Format(FormatError::InvalidBase64Url(part)))
        .ctx(|| format!("decoding {part} failed"))
}
