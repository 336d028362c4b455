// pkix-rs: PKIX path building and test artifact synthesis
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Digest family and the signature-algorithm registry.

use crate::error::Result;
use const_oid::ObjectIdentifier;
use const_oid::db::rfc5912;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// OID for SHA-1 (1.3.14.3.2.26).
pub const OID_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.14.3.2.26");
/// OID for SHA-256 (2.16.840.1.101.3.4.2.1).
pub const OID_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");
/// OID for SHA-384 (2.16.840.1.101.3.4.2.2).
pub const OID_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.2");
/// OID for SHA-512 (2.16.840.1.101.3.4.2.3).
pub const OID_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.3");

/// Digest algorithms usable for CertID hashes and signature hashes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// Returns the digest output length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// Returns the algorithm OID.
    pub fn oid(self) -> ObjectIdentifier {
        match self {
            DigestAlgorithm::Sha1 => OID_SHA1,
            DigestAlgorithm::Sha256 => OID_SHA256,
            DigestAlgorithm::Sha384 => OID_SHA384,
            DigestAlgorithm::Sha512 => OID_SHA512,
        }
    }

    /// Digests `bytes` and returns the hash.
    pub fn digest(self, bytes: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Sha1 => Sha1::digest(bytes).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(bytes).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(bytes).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(bytes).to_vec(),
        }
    }
}

/// Key types the signature-algorithm registry knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyType {
    Rsa,
}

/// Maps a key type and signature hash to the signature algorithm OID.
pub fn signature_algorithm_oid(
    key_type: KeyType,
    hash: DigestAlgorithm,
) -> Result<ObjectIdentifier> {
    match (key_type, hash) {
        (KeyType::Rsa, DigestAlgorithm::Sha1) => Ok(rfc5912::SHA_1_WITH_RSA_ENCRYPTION),
        (KeyType::Rsa, DigestAlgorithm::Sha256) => Ok(rfc5912::SHA_256_WITH_RSA_ENCRYPTION),
        (KeyType::Rsa, DigestAlgorithm::Sha384) => Ok(rfc5912::SHA_384_WITH_RSA_ENCRYPTION),
        (KeyType::Rsa, DigestAlgorithm::Sha512) => Ok(rfc5912::SHA_512_WITH_RSA_ENCRYPTION),
    }
}

/// Maps a signature algorithm OID back to its hash; `None` for OIDs outside
/// the registry.
pub(crate) fn hash_for_signature_algorithm(oid: &ObjectIdentifier) -> Option<DigestAlgorithm> {
    if *oid == rfc5912::SHA_1_WITH_RSA_ENCRYPTION {
        Some(DigestAlgorithm::Sha1)
    } else if *oid == rfc5912::SHA_256_WITH_RSA_ENCRYPTION {
        Some(DigestAlgorithm::Sha256)
    } else if *oid == rfc5912::SHA_384_WITH_RSA_ENCRYPTION {
        Some(DigestAlgorithm::Sha384)
    } else if *oid == rfc5912::SHA_512_WITH_RSA_ENCRYPTION {
        Some(DigestAlgorithm::Sha512)
    } else {
        None
    }
}
