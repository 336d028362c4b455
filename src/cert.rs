// pkix-rs: PKIX path building and test artifact synthesis
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! X.509 certificate synthesis.
//!
//! https://datatracker.ietf.org/doc/html/rfc5280#section-4.1

use crate::alg::{DigestAlgorithm, KeyType, signature_algorithm_oid};
use crate::arena::Arena;
use crate::der::{self, ExtensionCriticality, Output, tag};
use crate::error::Result;
use crate::input::Input;
use crate::keys::KeyPair;
use crate::time::Time;
use const_oid::ObjectIdentifier;
use const_oid::db::rfc5280;
use std::sync::atomic::{AtomicI64, Ordering};

// Allocates serials for the whole test run. Process-global; ordering of
// serials across threads is unspecified.
static SERIAL_NUMBER_VALUE: AtomicI64 = AtomicI64::new(0);

// Test keys need not be strong; a fixed buffer is enough to stir the
// generator when entropy runs short.
const KEY_RESEED: [u8; 8] = [4, 4, 4, 4, 4, 4, 4, 4];

/// Returns the next run-unique serial number value.
pub fn next_serial_number() -> i64 {
    SERIAL_NUMBER_VALUE.fetch_add(1, Ordering::Relaxed) + 1
}

/// X.509 certificate version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Version {
    V1,
    V3,
}

impl Version {
    fn value(self) -> i64 {
        match self {
            Version::V1 => 0,
            Version::V3 => 2,
        }
    }
}

/// Everything [`encode_certificate`] needs to emit one certificate.
pub struct CertificateContext<'a> {
    /// Certificate version; the `[0] EXPLICIT` wrapper is omitted for v1.
    pub version: Version,
    /// Already-encoded serial number INTEGER.
    pub serial_number: Input<'a>,
    /// Signature algorithm OID recorded inside the TBSCertificate.
    pub signature_algorithm: ObjectIdentifier,
    /// DER-encoded issuer Name.
    pub issuer_name: Input<'a>,
    pub not_before: Time,
    pub not_after: Time,
    /// DER-encoded subject Name.
    pub subject_name: Input<'a>,
    /// Already-encoded Extension SEQUENCEs; the `[3] EXPLICIT` block is
    /// omitted when empty.
    pub extensions: Vec<Input<'a>>,
    /// Key that signs the certificate; `None` self-signs with the fresh
    /// subject key.
    pub issuer_key: Option<&'a KeyPair>,
    /// Hash used for the actual signature.
    pub signature_hash: DigestAlgorithm,
    /// Flip one bit inside the signature after signing.
    pub corrupt_signature: bool,
}

/// Encodes a certificate, generating a fresh subject key pair.
///
/// The encoded bytes are owned by `arena`; the subject key is returned so
/// the caller can issue children with it.
pub fn encode_certificate<'a>(
    arena: &'a Arena,
    context: &CertificateContext<'_>,
) -> Result<(&'a [u8], KeyPair)> {
    let subject_key = KeyPair::generate(&KEY_RESEED)?;
    let tbs = tbs_certificate(arena, context, &subject_key)?;
    let signer = context.issuer_key.unwrap_or(&subject_key);
    let cert = encode_signed_data(
        arena,
        tbs,
        signer,
        context.signature_hash,
        context.corrupt_signature,
        None,
    )?;
    Ok((der::maybe_log_output(cert, "cert"), subject_key))
}

// TBSCertificate  ::=  SEQUENCE  {
//      version         [0]  Version DEFAULT v1,
//      serialNumber         CertificateSerialNumber,
//      signature            AlgorithmIdentifier,
//      issuer               Name,
//      validity             Validity,
//      subject              Name,
//      subjectPublicKeyInfo SubjectPublicKeyInfo,
//      extensions      [3]  Extensions OPTIONAL }
fn tbs_certificate<'a>(
    arena: &'a Arena,
    context: &CertificateContext<'_>,
    subject_key: &KeyPair,
) -> Result<&'a [u8]> {
    let mut output = Output::new();

    if context.version != Version::V1 {
        let version_integer = der::integer(arena, context.version.value())?;
        let version = der::encode_nested(
            arena,
            tag::CONTEXT_SPECIFIC | tag::CONSTRUCTED,
            version_integer,
        )?;
        output.add(version)?;
    }

    output.add(context.serial_number.as_slice())?;
    output.add(der::algorithm_identifier(arena, &context.signature_algorithm)?)?;
    output.add(context.issuer_name.as_slice())?;

    // Validity ::= SEQUENCE { notBefore Time, notAfter Time }
    let validity = {
        let mut validity_output = Output::new();
        validity_output.add(der::time_to_time_choice(arena, context.not_before)?)?;
        validity_output.add(der::time_to_time_choice(arena, context.not_after)?)?;
        validity_output.squash(arena, tag::SEQUENCE)?
    };
    output.add(validity)?;

    output.add(context.subject_name.as_slice())?;
    output.add(subject_key.spki_der())?;

    if !context.extensions.is_empty() {
        let mut extensions_output = Output::new();
        for extension in &context.extensions {
            extensions_output.add(extension.as_slice())?;
        }
        let all_extensions = extensions_output.squash(arena, tag::SEQUENCE)?;
        output.add(der::encode_nested(
            arena,
            tag::CONTEXT_SPECIFIC | tag::CONSTRUCTED | 3,
            all_extensions,
        )?)?;
    }

    output.squash(arena, tag::SEQUENCE)
}

// SEQUENCE { tbs, AlgorithmIdentifier, BIT STRING, [0] EXPLICIT certs OPTIONAL }
//
// Shared by certificate and BasicOCSPResponse emission. The signature is
// computed over the exact `tbs_data` bytes; the corrupt flag flips one bit
// inside the signature BIT STRING after signing.
pub(crate) fn encode_signed_data<'a>(
    arena: &'a Arena,
    tbs_data: &[u8],
    signer: &KeyPair,
    hash: DigestAlgorithm,
    corrupt_signature: bool,
    certs: Option<&[Input<'_>]>,
) -> Result<&'a [u8]> {
    let algorithm_oid = signature_algorithm_oid(KeyType::Rsa, hash)?;
    let signature_algorithm = der::algorithm_identifier(arena, &algorithm_oid)?;

    let signature = signer.sign(tbs_data, hash);
    let signature_nested = der::bit_string(arena, &signature, corrupt_signature)?;

    let certs_nested = match certs {
        Some(certs) if !certs.is_empty() => {
            let mut certs_output = Output::new();
            for cert in certs {
                certs_output.add(cert.as_slice())?;
            }
            let certs_sequence = certs_output.squash(arena, tag::SEQUENCE)?;
            Some(der::encode_nested(
                arena,
                tag::CONTEXT_SPECIFIC | tag::CONSTRUCTED,
                certs_sequence,
            )?)
        }
        _ => None,
    };

    let mut output = Output::new();
    output.add(tbs_data)?;
    output.add(signature_algorithm)?;
    output.add(signature_nested)?;
    if let Some(certs_nested) = certs_nested {
        output.add(certs_nested)?;
    }
    output.squash(arena, tag::SEQUENCE)
}

/// Encodes a serial number INTEGER.
pub fn encode_serial_number(arena: &Arena, value: i64) -> Result<&[u8]> {
    der::integer(arena, value)
}

// BasicConstraints ::= SEQUENCE {
//         cA                      BOOLEAN DEFAULT FALSE,
//         pathLenConstraint       INTEGER (0..MAX) OPTIONAL }
/// Encodes a basicConstraints extension.
pub fn encode_basic_constraints(
    arena: &Arena,
    is_ca: bool,
    path_len_constraint: Option<i64>,
    criticality: ExtensionCriticality,
) -> Result<&[u8]> {
    let mut value = Output::new();
    if is_ca {
        value.add(der::boolean(arena, true))?;
    }
    if let Some(path_len) = path_len_constraint {
        value.add(der::integer(arena, path_len)?)?;
    }
    der::extension(arena, &rfc5280::ID_CE_BASIC_CONSTRAINTS, criticality, &value)
}

// ExtKeyUsageSyntax ::= SEQUENCE SIZE (1..MAX) OF KeyPurposeId
/// Encodes an extendedKeyUsage extension.
pub fn encode_eku_extension<'a>(
    arena: &'a Arena,
    purposes: &[ObjectIdentifier],
    criticality: ExtensionCriticality,
) -> Result<&'a [u8]> {
    let mut value = Output::new();
    for purpose in purposes {
        value.add(der::oid(arena, purpose)?)?;
    }
    der::extension(arena, &rfc5280::ID_CE_EXT_KEY_USAGE, criticality, &value)
}
