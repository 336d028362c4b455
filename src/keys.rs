// pkix-rs: PKIX path building and test artifact synthesis
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! RSA-2048 key pairs for signing test artifacts.
//!
//! https://datatracker.ietf.org/doc/html/rfc8017

use crate::alg::{DigestAlgorithm, hash_for_signature_algorithm};
use crate::error::{Error, Result};
use crate::input::Input;
use crate::trust::SignedDataWithSignature;
use der::Decode;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::rand_core::OsRng;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// RSA modulus size for generated keys, in bits.
pub const KEY_SIZE_BITS: usize = 2048;

/// How many times key generation is retried before giving up.
pub const MAX_KEY_GENERATION_ATTEMPTS: usize = 10;

/// An RSA-2048 key pair with its derived SubjectPublicKeyInfo.
#[derive(Clone)]
pub struct KeyPair {
    private: RsaPrivateKey,
    spki_der: Vec<u8>,
}

impl KeyPair {
    /// Generates a fresh key pair.
    ///
    /// Generation can transiently fail when the system entropy pool is
    /// starved; retries re-seed a deterministic generator from the
    /// caller-supplied `reseed` buffer. Test keys need not be strong.
    pub fn generate(reseed: &[u8]) -> Result<KeyPair> {
        for attempt in 0..MAX_KEY_GENERATION_ATTEMPTS {
            let generated = if attempt == 0 {
                RsaPrivateKey::new(&mut OsRng, KEY_SIZE_BITS)
            } else {
                let mut stir = Sha256::new();
                stir.update(reseed);
                stir.update([attempt as u8]);
                let mut rng = StdRng::from_seed(stir.finalize().into());
                RsaPrivateKey::new(&mut rng, KEY_SIZE_BITS)
            };
            if let Ok(private) = generated {
                let spki_der = private
                    .to_public_key()
                    .to_public_key_der()
                    .map_err(|_| Error::FatalLibraryFailure)?
                    .into_vec();
                return Ok(KeyPair { private, spki_der });
            }
        }
        Err(Error::FatalLibraryFailure)
    }

    /// Signs `message` with PKCS#1 v1.5 under the given hash.
    ///
    /// The signature is a fresh byte vector; callers copy it into an arena
    /// if it must share an artifact's lifetime.
    pub fn sign(&self, message: &[u8], hash: DigestAlgorithm) -> Vec<u8> {
        match hash {
            DigestAlgorithm::Sha1 => SigningKey::<Sha1>::new(self.private.clone())
                .sign(message)
                .to_vec(),
            DigestAlgorithm::Sha256 => SigningKey::<Sha256>::new(self.private.clone())
                .sign(message)
                .to_vec(),
            DigestAlgorithm::Sha384 => SigningKey::<Sha384>::new(self.private.clone())
                .sign(message)
                .to_vec(),
            DigestAlgorithm::Sha512 => SigningKey::<Sha512>::new(self.private.clone())
                .sign(message)
                .to_vec(),
        }
    }

    /// Returns the DER SubjectPublicKeyInfo of the public key.
    pub fn spki_der(&self) -> &[u8] {
        &self.spki_der
    }

    /// Returns the SHA-1 hash of the subjectPublicKey BIT STRING contents
    /// (tag, length, and unused-bits byte stripped).
    pub fn public_key_hash(&self) -> Result<Vec<u8>> {
        let bits = subject_public_key_bits(Input::from(self.spki_der.as_slice()))?;
        Ok(DigestAlgorithm::Sha1.digest(bits))
    }
}

/// Extracts the subjectPublicKey payload bytes from a DER SPKI.
pub(crate) fn subject_public_key_bits(spki_der: Input<'_>) -> Result<&[u8]> {
    let decoded = spki::SubjectPublicKeyInfoRef::from_der(spki_der.as_slice())?;
    Ok(decoded.subject_public_key.raw_bytes())
}

/// Verifies a signature over `signed_data.data` with the given SPKI.
///
/// The hash is selected through the signature-algorithm registry; an OID
/// outside the registry is a structural error, a mismatched signature is
/// [`Error::BadSignature`].
pub fn verify_signed_data(
    signed_data: &SignedDataWithSignature<'_>,
    subject_public_key_info: Input<'_>,
) -> Result<()> {
    let public = RsaPublicKey::from_public_key_der(subject_public_key_info.as_slice())
        .map_err(|err| Error::bad_der(err.to_string()))?;
    let hash = hash_for_signature_algorithm(&signed_data.algorithm_oid)
        .ok_or_else(|| Error::bad_der("unrecognized signature algorithm"))?;
    let signature =
        Signature::try_from(signed_data.signature.as_slice()).map_err(|_| Error::BadSignature)?;
    let message = signed_data.data.as_slice();
    let verified = match hash {
        DigestAlgorithm::Sha1 => VerifyingKey::<Sha1>::new(public).verify(message, &signature),
        DigestAlgorithm::Sha256 => VerifyingKey::<Sha256>::new(public).verify(message, &signature),
        DigestAlgorithm::Sha384 => VerifyingKey::<Sha384>::new(public).verify(message, &signature),
        DigestAlgorithm::Sha512 => VerifyingKey::<Sha512>::new(public).verify(message, &signature),
    };
    verified.map_err(|_| Error::BadSignature)
}

/// Checks that an SPKI carries an acceptable public key: RSA with a
/// 2048-bit modulus and public exponent 65537.
pub fn check_public_key(subject_public_key_info: Input<'_>) -> Result<()> {
    let public = RsaPublicKey::from_public_key_der(subject_public_key_info.as_slice())
        .map_err(|err| Error::bad_der(err.to_string()))?;
    if public.n().bits() != KEY_SIZE_BITS {
        return Err(Error::bad_der("RSA modulus must be 2048 bits"));
    }
    if *public.e() != BigUint::from(65537u32) {
        return Err(Error::bad_der("RSA public exponent must be 65537"));
    }
    Ok(())
}
