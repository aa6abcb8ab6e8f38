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

use bherror::{traits::ForeignError as _, Error};
use openssl::{
    bn::{BigNum, BigNumContext, BigNumRef},
    ec::{EcGroup, EcKey},
    ecdsa::EcdsaSig,
    hash::MessageDigest,
    memcmp,
    nid::Nid,
    pkey::{PKey, Private, Public},
    rand::rand_bytes,
    rsa::{Padding, Rsa, RsaPrivateKeyBuilder},
    sign::{RsaPssSaltlen, Signer, Verifier},
};
use serde_json::Value;

use crate::{
    check_key_algorithm, json_object,
    jwk::{jwk_bytes, optional_jwk_bytes},
    provider::ensure_family,
    utils::base64_url_encode,
    AlgorithmFamily, CryptoError, DigestAlgorithm, FormatError, Jwk, JwsError, ProviderTable,
    Result, SignatureProvider, SigningAlgorithm,
};

/// Smallest RSA modulus accepted, in bits, see [section 3.3 of RFC7518].
///
/// [section 3.3 of RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.3
const MIN_RSA_MODULUS_BITS: i32 = 2048;

fn backend_error() -> JwsError {
    JwsError::Crypto(CryptoError::CryptoBackend)
}

fn key_generation_error() -> JwsError {
    JwsError::Crypto(CryptoError::KeyGenerationFailed)
}

fn message_digest(digest: DigestAlgorithm) -> MessageDigest {
    match digest {
        DigestAlgorithm::Sha256 => MessageDigest::sha256(),
        DigestAlgorithm::Sha384 => MessageDigest::sha384(),
        DigestAlgorithm::Sha512 => MessageDigest::sha512(),
    }
}

fn jwk_bignum(key: &Jwk, member: &str) -> Result<BigNum> {
    BigNum::from_slice(&jwk_bytes(key, member)?).foreign_err(backend_error)
}

fn optional_jwk_bignum(key: &Jwk, member: &str) -> Result<Option<BigNum>> {
    optional_jwk_bytes(key, member)?
        .map(|bytes| BigNum::from_slice(&bytes).foreign_err(backend_error))
        .transpose()
}

fn encode_bignum(value: &BigNumRef) -> Value {
    base64_url_encode(value.to_vec()).into()
}

impl ProviderTable {
    /// A table with the OpenSSL-backed providers registered for all the
    /// supported algorithms.
    pub fn openssl() -> Self {
        Self::empty()
            .with_provider(HmacProvider)
            .with_provider(RsaPkcs1Provider)
            .with_provider(RsaPssProvider)
            .with_provider(EcdsaProvider)
    }
}

/// [`SignatureProvider`] for `HS256`, `HS384` and `HS512`, using `oct` JWKs.
#[derive(Debug, Default, Clone, Copy)]
pub struct HmacProvider;

impl HmacProvider {
    fn mac(&self, algorithm: SigningAlgorithm, signing_input: &[u8], key: &Jwk) -> Result<Vec<u8>> {
        ensure_family(self.family(), algorithm)?;
        check_key_algorithm(algorithm, key)?;

        let secret = jwk_bytes(key, "k")?;
        let min_len = algorithm.digest().output_len();
        if secret.len() < min_len {
            return Err(Error::root(JwsError::Crypto(CryptoError::InvalidKey(format!(
                "{algorithm} requires a key of at least {min_len} bytes, got {}",
                secret.len()
            )))));
        }

        let secret = PKey::hmac(&secret).foreign_err(backend_error)?;
        let mut signer =
            Signer::new(message_digest(algorithm.digest()), &secret).foreign_err(backend_error)?;
        signer.update(signing_input).foreign_err(backend_error)?;
        signer.sign_to_vec().foreign_err(backend_error)
    }
}

impl SignatureProvider for HmacProvider {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Hmac
    }

    fn sign(
        &self,
        algorithm: SigningAlgorithm,
        signing_input: &[u8],
        key: &Jwk,
    ) -> Result<Vec<u8>> {
        self.mac(algorithm, signing_input, key)
    }

    fn verify(
        &self,
        algorithm: SigningAlgorithm,
        signing_input: &[u8],
        signature: &[u8],
        key: &Jwk,
    ) -> Result<bool> {
        let expected = self.mac(algorithm, signing_input, key)?;

        // `memcmp::eq` panics on length mismatch; the length of a MAC is public.
        Ok(expected.len() == signature.len() && memcmp::eq(&expected, signature))
    }
}

fn check_modulus(n: &BigNumRef) -> Result<()> {
    let bits = n.num_bits();
    if bits < MIN_RSA_MODULUS_BITS {
        return Err(Error::root(JwsError::Crypto(CryptoError::InvalidKey(format!(
            "RSA modulus of {bits} bits, at least {MIN_RSA_MODULUS_BITS} required"
        )))));
    }
    Ok(())
}

fn rsa_private_key(key: &Jwk) -> Result<PKey<Private>> {
    let mut builder = RsaPrivateKeyBuilder::new(
        jwk_bignum(key, "n")?,
        jwk_bignum(key, "e")?,
        jwk_bignum(key, "d")?,
    )
    .foreign_err(backend_error)?;

    if let (Some(p), Some(q)) = (
        optional_jwk_bignum(key, "p")?,
        optional_jwk_bignum(key, "q")?,
    ) {
        builder = builder.set_factors(p, q).foreign_err(backend_error)?;
    }

    if let (Some(dp), Some(dq), Some(qi)) = (
        optional_jwk_bignum(key, "dp")?,
        optional_jwk_bignum(key, "dq")?,
        optional_jwk_bignum(key, "qi")?,
    ) {
        builder = builder
            .set_crt_params(dp, dq, qi)
            .foreign_err(backend_error)?;
    }

    let rsa = builder.build();
    check_modulus(rsa.n())?;
    PKey::from_rsa(rsa).foreign_err(backend_error)
}

fn rsa_public_key(key: &Jwk) -> Result<PKey<Public>> {
    let rsa = Rsa::from_public_components(jwk_bignum(key, "n")?, jwk_bignum(key, "e")?)
        .foreign_err(backend_error)?;
    check_modulus(rsa.n())?;
    PKey::from_rsa(rsa).foreign_err(backend_error)
}

fn rsa_sign(
    family: AlgorithmFamily,
    algorithm: SigningAlgorithm,
    signing_input: &[u8],
    key: &Jwk,
) -> Result<Vec<u8>> {
    ensure_family(family, algorithm)?;
    check_key_algorithm(algorithm, key)?;

    let private_key = rsa_private_key(key)?;
    let digest = message_digest(algorithm.digest());
    let mut signer = Signer::new(digest, &private_key).foreign_err(backend_error)?;

    if family == AlgorithmFamily::RsaPss {
        signer
            .set_rsa_padding(Padding::PKCS1_PSS)
            .foreign_err(backend_error)?;
        signer
            .set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)
            .foreign_err(backend_error)?;
        signer.set_rsa_mgf1_md(digest).foreign_err(backend_error)?;
    } else {
        signer
            .set_rsa_padding(Padding::PKCS1)
            .foreign_err(backend_error)?;
    }

    signer.update(signing_input).foreign_err(backend_error)?;
    signer.sign_to_vec().foreign_err(backend_error)
}

fn rsa_verify(
    family: AlgorithmFamily,
    algorithm: SigningAlgorithm,
    signing_input: &[u8],
    signature: &[u8],
    key: &Jwk,
) -> Result<bool> {
    ensure_family(family, algorithm)?;
    check_key_algorithm(algorithm, key)?;

    let public_key = rsa_public_key(key)?;
    if signature.len() != public_key.size() {
        return Ok(false);
    }

    let digest = message_digest(algorithm.digest());
    let mut verifier = Verifier::new(digest, &public_key).foreign_err(backend_error)?;

    if family == AlgorithmFamily::RsaPss {
        verifier
            .set_rsa_padding(Padding::PKCS1_PSS)
            .foreign_err(backend_error)?;
        verifier
            .set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)
            .foreign_err(backend_error)?;
        verifier.set_rsa_mgf1_md(digest).foreign_err(backend_error)?;
    } else {
        verifier
            .set_rsa_padding(Padding::PKCS1)
            .foreign_err(backend_error)?;
    }

    verifier.update(signing_input).foreign_err(backend_error)?;
    // OpenSSL reports some malformed signatures as errors rather than as a
    // mismatch.
    Ok(verifier.verify(signature).unwrap_or(false))
}

/// [`SignatureProvider`] for `RS256`, `RS384` and `RS512`
/// (RSASSA-PKCS1-v1_5), using `RSA` JWKs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RsaPkcs1Provider;

impl SignatureProvider for RsaPkcs1Provider {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::RsaPkcs1
    }

    fn sign(
        &self,
        algorithm: SigningAlgorithm,
        signing_input: &[u8],
        key: &Jwk,
    ) -> Result<Vec<u8>> {
        rsa_sign(self.family(), algorithm, signing_input, key)
    }

    fn verify(
        &self,
        algorithm: SigningAlgorithm,
        signing_input: &[u8],
        signature: &[u8],
        key: &Jwk,
    ) -> Result<bool> {
        rsa_verify(self.family(), algorithm, signing_input, signature, key)
    }
}

/// [`SignatureProvider`] for `PS256`, `PS384` and `PS512` (RSASSA-PSS with
/// MGF1 and a salt as long as the digest), using `RSA` JWKs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RsaPssProvider;

impl SignatureProvider for RsaPssProvider {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::RsaPss
    }

    fn sign(
        &self,
        algorithm: SigningAlgorithm,
        signing_input: &[u8],
        key: &Jwk,
    ) -> Result<Vec<u8>> {
        rsa_sign(self.family(), algorithm, signing_input, key)
    }

    fn verify(
        &self,
        algorithm: SigningAlgorithm,
        signing_input: &[u8],
        signature: &[u8],
        key: &Jwk,
    ) -> Result<bool> {
        rsa_verify(self.family(), algorithm, signing_input, signature, key)
    }
}

/// Parameters of the curve used by an ECDSA algorithm.
struct Curve {
    name: &'static str,
    group: EcGroup,
    coordinate_len: usize,
}

impl Curve {
    // X9_62_PRIME256V1 is an alias for secp256r1
    //
    // ------------------------------------------
    //           Curve names chosen by
    //      different standards organizations
    // ------------+---------------+-------------
    // SECG        |  ANSI X9.62   |  NIST
    // ------------+---------------+-------------
    // secp256r1   |  prime256v1   |   NIST P-256
    // secp384r1   |               |   NIST P-384
    // secp521r1   |               |   NIST P-521
    //
    // source: https://tools.ietf.org/search/rfc4492#appendix-A
    fn of(algorithm: SigningAlgorithm) -> Result<Self> {
        let unsupported =
            || Error::root(JwsError::UnsupportedAlgorithm(algorithm.to_string()));

        let nid = match algorithm {
            SigningAlgorithm::Es256 => Nid::X9_62_PRIME256V1,
            SigningAlgorithm::Es384 => Nid::SECP384R1,
            SigningAlgorithm::Es512 => Nid::SECP521R1,
            _ => return Err(unsupported()),
        };

        Ok(Self {
            name: algorithm.curve().ok_or_else(unsupported)?,
            group: EcGroup::from_curve_name(nid).foreign_err(backend_error)?,
            coordinate_len: algorithm.ecdsa_coordinate_len().ok_or_else(unsupported)?,
        })
    }

    /// Padding length accepted by [`BigNumRef::to_vec_padded`].
    fn pad(&self) -> i32 {
        // At most 66 bytes, for P-521.
        self.coordinate_len as i32
    }

    fn coordinate(&self, key: &Jwk, member: &str) -> Result<BigNum> {
        let bytes = jwk_bytes(key, member)?;
        if bytes.len() != self.coordinate_len {
            return Err(Error::root(JwsError::Format(FormatError::JwkParsingFailed(format!(
                "\"{member}\" must be {} bytes long on {}, got {}",
                self.coordinate_len,
                self.name,
                bytes.len()
            )))));
        }

        BigNum::from_slice(&bytes).foreign_err(backend_error)
    }

    fn public_key(&self, key: &Jwk) -> Result<EcKey<Public>> {
        let x = self.coordinate(key, "x")?;
        let y = self.coordinate(key, "y")?;

        EcKey::from_public_key_affine_coordinates(&self.group, &x, &y).foreign_err(|| {
            JwsError::Format(FormatError::JwkParsingFailed(format!(
                "point is not on {}",
                self.name
            )))
        })
    }

    fn private_key(&self, key: &Jwk) -> Result<EcKey<Private>> {
        let public_key = self.public_key(key)?;
        let d = self.coordinate(key, "d")?;

        let private_key = EcKey::from_private_components(&self.group, &d, public_key.public_key())
            .foreign_err(backend_error)?;
        private_key.check_key().foreign_err(|| {
            JwsError::Crypto(CryptoError::InvalidKey(
                "private key does not match the public point".to_owned(),
            ))
        })?;

        Ok(private_key)
    }

    /// Convert the DER `ECDSA-Sig-Value` produced by OpenSSL into the JWS
    /// `R || S` form.
    fn der_to_fixed(&self, der: &[u8]) -> Result<Vec<u8>> {
        let signature = EcdsaSig::from_der(der).foreign_err(backend_error)?;

        let mut fixed = signature
            .r()
            .to_vec_padded(self.pad())
            .foreign_err(backend_error)?;
        fixed.extend(
            signature
                .s()
                .to_vec_padded(self.pad())
                .foreign_err(backend_error)?,
        );
        Ok(fixed)
    }

    /// Convert a JWS `R || S` signature into DER, or `None` if its length
    /// does not fit the curve.
    fn fixed_to_der(&self, fixed: &[u8]) -> Result<Option<Vec<u8>>> {
        if fixed.len() != 2 * self.coordinate_len {
            return Ok(None);
        }

        let (r, s) = fixed.split_at(self.coordinate_len);
        let r = BigNum::from_slice(r).foreign_err(backend_error)?;
        let s = BigNum::from_slice(s).foreign_err(backend_error)?;
        let signature = EcdsaSig::from_private_components(r, s).foreign_err(backend_error)?;

        signature.to_der().map(Some).foreign_err(backend_error)
    }
}

/// [`SignatureProvider`] for `ES256`, `ES384` and `ES512`, using `EC` JWKs on
/// the P-256, P-384 and P-521 curves respectively.
///
/// Signatures use the fixed-length `R || S` encoding of [section 3.4 of
/// RFC7518]; the conversion from and to the DER encoding used by OpenSSL is
/// done here.
///
/// [section 3.4 of RFC7518]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.4
#[derive(Debug, Default, Clone, Copy)]
pub struct EcdsaProvider;

impl SignatureProvider for EcdsaProvider {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Ecdsa
    }

    fn sign(
        &self,
        algorithm: SigningAlgorithm,
        signing_input: &[u8],
        key: &Jwk,
    ) -> Result<Vec<u8>> {
        ensure_family(self.family(), algorithm)?;
        check_key_algorithm(algorithm, key)?;

        let curve = Curve::of(algorithm)?;
        let private_key = PKey::from_ec_key(curve.private_key(key)?).foreign_err(backend_error)?;
        let mut signer = Signer::new(message_digest(algorithm.digest()), &private_key)
            .foreign_err(backend_error)?;
        signer.update(signing_input).foreign_err(backend_error)?;
        let der = signer.sign_to_vec().foreign_err(backend_error)?;

        curve.der_to_fixed(&der)
    }

    fn verify(
        &self,
        algorithm: SigningAlgorithm,
        signing_input: &[u8],
        signature: &[u8],
        key: &Jwk,
    ) -> Result<bool> {
        ensure_family(self.family(), algorithm)?;
        check_key_algorithm(algorithm, key)?;

        let curve = Curve::of(algorithm)?;
        let public_key = PKey::from_ec_key(curve.public_key(key)?).foreign_err(backend_error)?;
        let Some(der) = curve.fixed_to_der(signature)? else {
            return Ok(false);
        };

        let mut verifier = Verifier::new(message_digest(algorithm.digest()), &public_key)
            .foreign_err(backend_error)?;
        verifier.update(signing_input).foreign_err(backend_error)?;
        Ok(verifier.verify(&der).unwrap_or(false))
    }
}

/// Generate a fresh private JWK for use with the `algorithm`.
///
/// HMAC keys are as long as the digest output, RSA keys have a 2048-bit
/// modulus. The JWK carries the `alg` and `use` members, and `kid` if given.
/// Use [`public_jwk`](crate::public_jwk) to obtain the verification key of an
/// asymmetric algorithm.
pub fn generate_jwk(algorithm: SigningAlgorithm, kid: Option<&str>) -> Result<Jwk> {
    let mut jwk = match algorithm.family() {
        AlgorithmFamily::Hmac => generate_oct(algorithm)?,
        AlgorithmFamily::RsaPkcs1 | AlgorithmFamily::RsaPss => generate_rsa()?,
        AlgorithmFamily::Ecdsa => generate_ec(algorithm)?,
    };

    if let Some(kid) = kid {
        jwk.insert("kid".to_owned(), kid.into());
    }
    jwk.insert("use".to_owned(), "sig".into());
    jwk.insert("alg".to_owned(), algorithm.as_str().into());

    Ok(jwk)
}

fn generate_oct(algorithm: SigningAlgorithm) -> Result<Jwk> {
    let mut secret = vec![0; algorithm.digest().output_len()];
    rand_bytes(&mut secret).foreign_err(key_generation_error)?;

    Ok(json_object!({
        "kty": AlgorithmFamily::Hmac.key_type(),
        "k": base64_url_encode(&secret),
    }))
}

fn generate_rsa() -> Result<Jwk> {
    let rsa = Rsa::generate(MIN_RSA_MODULUS_BITS as u32).foreign_err(key_generation_error)?;

    let mut jwk = json_object!({
        "kty": AlgorithmFamily::RsaPkcs1.key_type(),
        "n": encode_bignum(rsa.n()),
        "e": encode_bignum(rsa.e()),
        "d": encode_bignum(rsa.d()),
    });

    let crt = [
        ("p", rsa.p()),
        ("q", rsa.q()),
        ("dp", rsa.dmp1()),
        ("dq", rsa.dmq1()),
        ("qi", rsa.iqmp()),
    ];
    for (member, value) in crt {
        if let Some(value) = value {
            jwk.insert(member.to_owned(), encode_bignum(value));
        }
    }

    Ok(jwk)
}

fn generate_ec(algorithm: SigningAlgorithm) -> Result<Jwk> {
    let curve = Curve::of(algorithm)?;
    let private_key = EcKey::generate(&curve.group).foreign_err(key_generation_error)?;

    let mut x = BigNum::new().foreign_err(backend_error)?;
    let mut y = BigNum::new().foreign_err(backend_error)?;
    let mut ctx = BigNumContext::new().foreign_err(backend_error)?;
    private_key
        .public_key()
        .affine_coordinates(&curve.group, &mut x, &mut y, &mut ctx)
        .foreign_err(backend_error)?;

    let padded = |value: &BigNumRef| {
        value
            .to_vec_padded(curve.pad())
            .map(base64_url_encode)
            .foreign_err(backend_error)
    };

    Ok(json_object!({
        "kty": AlgorithmFamily::Ecdsa.key_type(),
        "crv": curve.name,
        "x": padded(&x)?,
        "y": padded(&y)?,
        "d": padded(private_key.private_key())?,
    }))
}
