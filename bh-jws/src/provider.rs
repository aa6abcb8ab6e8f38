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

use std::{collections::HashMap, fmt, sync::Arc};

use bherror::Error;

use crate::{AlgorithmFamily, Jwk, JwsError, Result, SigningAlgorithm, ALL_SIGNING_ALGORITHMS};

/// Cryptographic backend for one [`AlgorithmFamily`].
///
/// A provider receives the exact signing input bytes and a concrete key, and
/// either produces the signature bytes in their JWS encoding or checks them.
/// Implementations must be stateless with respect to individual calls, so a
/// single instance can be shared between threads.
pub trait SignatureProvider: Send + Sync {
    /// The family of algorithms implemented by this provider.
    fn family(&self) -> AlgorithmFamily;

    /// Sign the `signing_input` with the `key` using the `algorithm`.
    ///
    /// Implementations must reject keys that cannot be used with the
    /// `algorithm` with [`JwsError::KeyAlgorithmMismatch`]; see
    /// [`check_key_algorithm`](crate::check_key_algorithm).
    fn sign(
        &self,
        algorithm: SigningAlgorithm,
        signing_input: &[u8],
        key: &Jwk,
    ) -> Result<Vec<u8>>;

    /// Check the `signature` over `signing_input` with the `key` using the
    /// `algorithm`.
    ///
    /// A signature that does not match, including one of the wrong length,
    /// is reported as `Ok(false)`.
    fn verify(
        &self,
        algorithm: SigningAlgorithm,
        signing_input: &[u8],
        signature: &[u8],
        key: &Jwk,
    ) -> Result<bool>;
}

/// Fail with [`JwsError::UnsupportedAlgorithm`] unless `algorithm` belongs to
/// the `family`.
pub(crate) fn ensure_family(family: AlgorithmFamily, algorithm: SigningAlgorithm) -> Result<()> {
    if algorithm.family() == family {
        return Ok(());
    }

    Err(
        Error::root(JwsError::UnsupportedAlgorithm(algorithm.to_string()))
            .ctx(format!("{family} provider cannot handle {algorithm}")),
    )
}

/// Immutable mapping from [`SigningAlgorithm`] to the [`SignatureProvider`]
/// implementing it.
///
/// The table is built once, up front, and is cheap to clone and share between
/// threads.
#[derive(Clone, Default)]
pub struct ProviderTable {
    providers: HashMap<SigningAlgorithm, Arc<dyn SignatureProvider>>,
}

impl ProviderTable {
    /// A table with no algorithms registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register the `provider` for every algorithm of its family, replacing
    /// any provider previously registered for them.
    pub fn with_provider<P>(mut self, provider: P) -> Self
    where
        P: SignatureProvider + 'static,
    {
        let provider: Arc<dyn SignatureProvider> = Arc::new(provider);
        for algorithm in provider.family().algorithms() {
            self.providers.insert(*algorithm, provider.clone());
        }
        self
    }

    /// Whether a provider is registered for the `algorithm`.
    pub fn supports(&self, algorithm: SigningAlgorithm) -> bool {
        self.providers.contains_key(&algorithm)
    }

    /// The registered algorithms, in registration order of
    /// [`ALL_SIGNING_ALGORITHMS`].
    pub fn algorithms(&self) -> impl Iterator<Item = SigningAlgorithm> + '_ {
        ALL_SIGNING_ALGORITHMS
            .into_iter()
            .filter(|algorithm| self.supports(*algorithm))
    }

    /// The provider registered for the `algorithm`.
    pub fn get(&self, algorithm: SigningAlgorithm) -> Result<&dyn SignatureProvider> {
        self.providers
            .get(&algorithm)
            .map(Arc::as_ref)
            .ok_or_else(|| Error::root(JwsError::UnsupportedAlgorithm(algorithm.to_string())))
    }

    /// Dispatch signing to the provider registered for the `algorithm`.
    pub fn sign(
        &self,
        algorithm: SigningAlgorithm,
        signing_input: &[u8],
        key: &Jwk,
    ) -> Result<Vec<u8>> {
        self.get(algorithm)?.sign(algorithm, signing_input, key)
    }

    /// Dispatch verification to the provider registered for the `algorithm`.
    pub fn verify(
        &self,
        algorithm: SigningAlgorithm,
        signing_input: &[u8],
        signature: &[u8],
        key: &Jwk,
    ) -> Result<bool> {
        self.get(algorithm)?
            .verify(algorithm, signing_input, signature, key)
    }
}

impl fmt::Debug for ProviderTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.algorithms()).finish()
    }
}
