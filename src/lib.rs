// pkix-rs: PKIX path building and test artifact synthesis
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

// Pull in the README as the package doc
#![doc = include_str!("../README.md")]

pub mod alg;
pub mod arena;
pub mod build;
pub mod cert;
pub mod der;
pub mod error;
pub mod input;
pub mod keys;
pub mod name;
pub mod ocsp;
pub mod time;
pub mod trust;

pub use alg::{DigestAlgorithm, KeyType, signature_algorithm_oid};
pub use arena::Arena;
pub use build::{MAX_SUB_CA_COUNT, build_cert_chain};
pub use cert::{
    CertificateContext, Version, encode_basic_constraints, encode_certificate,
    encode_eku_extension, encode_serial_number, next_serial_number,
};
pub use der::{ExtensionCriticality, LOG_DIR_ENV, tamper_once};
pub use error::{Error, Result};
pub use input::{Input, Reader};
pub use keys::{KeyPair, check_public_key, verify_signed_data};
pub use name::{DistinguishedName, ascii_to_der_name};
pub use ocsp::{
    CertStatus, OcspResponseContext, OcspResponseExtension, ResponseStatus, encode_ocsp_response,
};
pub use time::{Time, ymdhms};
pub use trust::{
    CertId, CertPolicyId, EndEntityOrCa, IssuerChecker, KeyPurposeId, KeyUsage,
    SignedDataWithSignature, TrustDomain, TrustLevel,
};
