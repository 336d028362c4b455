// pkix-rs: PKIX path building and test artifact synthesis
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! OCSP response synthesis.
//!
//! https://datatracker.ietf.org/doc/html/rfc6960#section-4.2.1

use crate::alg::DigestAlgorithm;
use crate::arena::Arena;
use crate::cert::encode_signed_data;
use crate::der::{self, Output, tag};
use crate::error::{Error, Result};
use crate::input::Input;
use crate::keys::{KeyPair, subject_public_key_bits};
use crate::time::Time;
use crate::trust::CertId;
use const_oid::ObjectIdentifier;
use const_oid::db::rfc6960;

/// OCSPResponseStatus values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseStatus {
    Successful = 0,
    MalformedRequest = 1,
    InternalError = 2,
    TryLater = 3,
    SigRequired = 5,
    Unauthorized = 6,
}

/// CertStatus CHOICE.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CertStatus {
    /// `[0] IMPLICIT NULL`
    Good,
    /// `[1] IMPLICIT RevokedInfo`
    Revoked { revocation_time: Time },
    /// `[2] IMPLICIT NULL`
    Unknown,
}

/// One response extension.
#[derive(Clone, Copy, Debug)]
pub struct OcspResponseExtension<'a> {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER payload placed inside the extnValue OCTET STRING.
    pub value: Input<'a>,
}

/// Everything [`encode_ocsp_response`] needs to emit one response.
///
/// [`OcspResponseContext::new`] fills in the defaults a well-formed `good`
/// response wants; tests override single fields to manufacture specific
/// malformations.
pub struct OcspResponseContext<'a> {
    pub cert_id: CertId<'a>,
    pub response_status: ResponseStatus,
    /// End the response after the status; no signer needed.
    pub skip_response_bytes: bool,
    /// Key that signs the BasicOCSPResponse.
    pub signer_key: Option<&'a KeyPair>,
    /// ResponderID byName when set, byKey (SHA-1 of signer SPKI) otherwise.
    pub signer_name: Option<Input<'a>>,
    pub produced_at: Time,
    pub extensions: Vec<OcspResponseExtension<'a>>,
    /// Emit an empty `[1] EXPLICIT` extensions block even with no entries.
    pub include_empty_extensions: bool,
    pub signature_hash: DigestAlgorithm,
    /// Flip one bit inside the signature after signing.
    pub corrupt_signature: bool,
    /// Certificates embedded in the BasicOCSPResponse.
    pub certs: Vec<Input<'a>>,
    /// Hash for the CertID name and key hashes.
    pub cert_id_hash: DigestAlgorithm,
    pub cert_status: CertStatus,
    pub this_update: Time,
    pub next_update: Option<Time>,
}

impl<'a> OcspResponseContext<'a> {
    /// Creates a context describing a fresh `good` response at `time`.
    pub fn new(cert_id: CertId<'a>, time: Time) -> Self {
        Self {
            cert_id,
            response_status: ResponseStatus::Successful,
            skip_response_bytes: false,
            signer_key: None,
            signer_name: None,
            produced_at: time,
            extensions: Vec::new(),
            include_empty_extensions: false,
            signature_hash: DigestAlgorithm::Sha256,
            corrupt_signature: false,
            certs: Vec::new(),
            cert_id_hash: DigestAlgorithm::Sha1,
            cert_status: CertStatus::Good,
            this_update: time,
            next_update: Some(time.add_seconds(10)),
        }
    }
}

// OCSPResponse ::= SEQUENCE {
//    responseStatus          OCSPResponseStatus,
//    responseBytes       [0] EXPLICIT ResponseBytes OPTIONAL }
/// Encodes a complete OCSPResponse owned by `arena`.
pub fn encode_ocsp_response<'a>(
    arena: &'a Arena,
    context: &OcspResponseContext<'_>,
) -> Result<&'a [u8]> {
    if !context.skip_response_bytes && context.signer_key.is_none() {
        return Err(Error::FatalInvalidArgs);
    }

    let response_status = arena.alloc_slice(&[
        tag::ENUMERATED,
        1,
        context.response_status as u8,
    ]);

    let mut output = Output::new();
    output.add(response_status)?;
    if !context.skip_response_bytes {
        let response_bytes = response_bytes(arena, context)?;
        output.add(der::encode_nested(
            arena,
            tag::CONTEXT_SPECIFIC | tag::CONSTRUCTED,
            response_bytes,
        )?)?;
    }
    Ok(der::maybe_log_output(
        output.squash(arena, tag::SEQUENCE)?,
        "ocsp",
    ))
}

// ResponseBytes ::= SEQUENCE {
//    responseType            OBJECT IDENTIFIER,
//    response                OCTET STRING }
fn response_bytes<'a>(arena: &'a Arena, context: &OcspResponseContext<'_>) -> Result<&'a [u8]> {
    let response = basic_ocsp_response(arena, context)?;
    let mut output = Output::new();
    output.add(der::oid(arena, &rfc6960::ID_PKIX_OCSP_BASIC)?)?;
    output.add(der::encode_nested(arena, tag::OCTET_STRING, response)?)?;
    output.squash(arena, tag::SEQUENCE)
}

// BasicOCSPResponse ::= SEQUENCE {
//   tbsResponseData          ResponseData,
//   signatureAlgorithm       AlgorithmIdentifier,
//   signature                BIT STRING,
//   certs                [0] EXPLICIT SEQUENCE OF Certificate OPTIONAL }
fn basic_ocsp_response<'a>(
    arena: &'a Arena,
    context: &OcspResponseContext<'_>,
) -> Result<&'a [u8]> {
    let tbs_response_data = response_data(arena, context)?;
    let signer_key = context.signer_key.ok_or(Error::FatalInvalidArgs)?;
    encode_signed_data(
        arena,
        tbs_response_data,
        signer_key,
        context.signature_hash,
        context.corrupt_signature,
        Some(&context.certs),
    )
}

// ResponseData ::= SEQUENCE {
//    version             [0] EXPLICIT Version DEFAULT v1,
//    responderID             ResponderID,
//    producedAt              GeneralizedTime,
//    responses               SEQUENCE OF SingleResponse,
//    responseExtensions  [1] EXPLICIT Extensions OPTIONAL }
fn response_data<'a>(arena: &'a Arena, context: &OcspResponseContext<'_>) -> Result<&'a [u8]> {
    let mut output = Output::new();
    output.add(responder_id(arena, context)?)?;
    output.add(der::time_to_generalized_time(arena, context.produced_at)?)?;

    let single = single_response(arena, context)?;
    output.add(der::encode_nested(arena, tag::SEQUENCE, single)?)?;

    if !context.extensions.is_empty() || context.include_empty_extensions {
        output.add(extensions(arena, context)?)?;
    }
    output.squash(arena, tag::SEQUENCE)
}

// ResponderID ::= CHOICE {
//    byName              [1] Name,
//    byKey               [2] KeyHash }
fn responder_id<'a>(arena: &'a Arena, context: &OcspResponseContext<'_>) -> Result<&'a [u8]> {
    let (contents, responder_id_type) = match context.signer_name {
        Some(name) => (name.as_slice(), 1),
        None => (key_hash(arena, context)?, 2),
    };
    der::encode_nested(
        arena,
        tag::CONTEXT_SPECIFIC | tag::CONSTRUCTED | responder_id_type,
        contents,
    )
}

// KeyHash ::= OCTET STRING -- SHA-1 hash of the value of the BIT STRING
//                          -- subjectPublicKey, excluding tag, length, and
//                          -- number of unused bits
fn key_hash<'a>(arena: &'a Arena, context: &OcspResponseContext<'_>) -> Result<&'a [u8]> {
    let signer_key = context.signer_key.ok_or(Error::FatalInvalidArgs)?;
    let bits = subject_public_key_bits(Input::from(signer_key.spki_der()))?;
    der::hashed_octet_string(arena, bits, DigestAlgorithm::Sha1)
}

// SingleResponse ::= SEQUENCE {
//    certID                  CertID,
//    certStatus              CertStatus,
//    thisUpdate              GeneralizedTime,
//    nextUpdate          [0] EXPLICIT GeneralizedTime OPTIONAL,
//    singleExtensions    [1] EXPLICIT Extensions OPTIONAL }
fn single_response<'a>(arena: &'a Arena, context: &OcspResponseContext<'_>) -> Result<&'a [u8]> {
    let mut output = Output::new();
    output.add(cert_id(arena, context)?)?;
    output.add(cert_status(arena, context)?)?;
    output.add(der::time_to_generalized_time(arena, context.this_update)?)?;
    if let Some(next_update) = context.next_update {
        let encoded = der::time_to_generalized_time(arena, next_update)?;
        output.add(der::encode_nested(
            arena,
            tag::CONTEXT_SPECIFIC | tag::CONSTRUCTED,
            encoded,
        )?)?;
    }
    output.squash(arena, tag::SEQUENCE)
}

// CertID          ::=     SEQUENCE {
//        hashAlgorithm       AlgorithmIdentifier,
//        issuerNameHash      OCTET STRING,
//        issuerKeyHash       OCTET STRING,
//        serialNumber        CertificateSerialNumber }
fn cert_id<'a>(arena: &'a Arena, context: &OcspResponseContext<'_>) -> Result<&'a [u8]> {
    let hash_oid = context.cert_id_hash.oid();
    let issuer_name_hash = der::hashed_octet_string(
        arena,
        context.cert_id.issuer.as_slice(),
        context.cert_id_hash,
    )?;
    let issuer_key_bits =
        subject_public_key_bits(context.cert_id.issuer_subject_public_key_info)?;
    let issuer_key_hash =
        der::hashed_octet_string(arena, issuer_key_bits, context.cert_id_hash)?;
    let serial_number = der::encode_nested(
        arena,
        tag::INTEGER,
        context.cert_id.serial_number.as_slice(),
    )?;

    let mut output = Output::new();
    output.add(der::algorithm_identifier(arena, &hash_oid)?)?;
    output.add(issuer_name_hash)?;
    output.add(issuer_key_hash)?;
    output.add(serial_number)?;
    output.squash(arena, tag::SEQUENCE)
}

// CertStatus ::= CHOICE {
//    good                [0] IMPLICIT NULL,
//    revoked             [1] IMPLICIT RevokedInfo,
//    unknown             [2] IMPLICIT UnknownInfo }
fn cert_status<'a>(arena: &'a Arena, context: &OcspResponseContext<'_>) -> Result<&'a [u8]> {
    match context.cert_status {
        // Good and unknown are both a zero-length value; only the tag
        // number differs.
        CertStatus::Good => Ok(arena.alloc_slice(&[tag::CONTEXT_SPECIFIC, 0])),
        CertStatus::Unknown => Ok(arena.alloc_slice(&[tag::CONTEXT_SPECIFIC | 2, 0])),
        CertStatus::Revoked { revocation_time } => {
            let encoded = der::time_to_generalized_time(arena, revocation_time)?;
            der::encode_nested(
                arena,
                tag::CONTEXT_SPECIFIC | tag::CONSTRUCTED | 1,
                encoded,
            )
        }
    }
}

// Extension ::= SEQUENCE { id OBJECT IDENTIFIER, critical BOOLEAN DEFAULT
// FALSE, value OCTET STRING }
fn ocsp_extension<'a>(
    arena: &'a Arena,
    extension: &OcspResponseExtension<'_>,
) -> Result<&'a [u8]> {
    let mut output = Output::new();
    output.add(der::oid(arena, &extension.oid)?)?;
    if extension.critical {
        output.add(der::boolean(arena, true))?;
    }
    output.add(der::encode_nested(
        arena,
        tag::OCTET_STRING,
        extension.value.as_slice(),
    )?)?;
    output.squash(arena, tag::SEQUENCE)
}

// Extensions ::= [1] EXPLICIT SEQUENCE OF Extension
fn extensions<'a>(arena: &'a Arena, context: &OcspResponseContext<'_>) -> Result<&'a [u8]> {
    let mut output = Output::new();
    for extension in &context.extensions {
        output.add(ocsp_extension(arena, extension)?)?;
    }
    let encoded = output.squash(arena, tag::SEQUENCE)?;
    der::encode_nested(
        arena,
        tag::CONTEXT_SPECIFIC | tag::CONSTRUCTED | 1,
        encoded,
    )
}
