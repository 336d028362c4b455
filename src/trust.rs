// pkix-rs: PKIX path building and test artifact synthesis
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! The pluggable trust-domain surface consumed by the path builder.
//!
//! A trust domain decides what is trusted, enumerates issuer candidates,
//! checks revocation, and performs the actual cryptography. The builder
//! orchestrates; it never holds policy of its own beyond chain shape.

use crate::error::{Error, Result};
use crate::input::Input;
use crate::time::Time;
use const_oid::ObjectIdentifier;
use const_oid::db::rfc5280;

/// How much trust a domain places in one certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrustLevel {
    /// The certificate is an anchor; chains terminate here.
    TrustAnchor,
    /// The certificate is trusted only if it chains to an anchor.
    InheritsTrust,
    /// The certificate must never validate, chain or no chain.
    ActivelyDistrusted,
}

/// Whether a certificate is being considered as an end entity or as a CA.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndEntityOrCa {
    MustBeEndEntity,
    MustBeCa,
}

/// The key usage a caller requires of the target certificate, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyUsage {
    NoParticularUsageRequired,
    DigitalSignature,
    NonRepudiation,
    KeyEncipherment,
    DataEncipherment,
    KeyAgreement,
    KeyCertSign,
    CrlSign,
}

impl KeyUsage {
    /// Returns the keyUsage bit mask for this usage, or `None` when no
    /// particular usage is required.
    pub(crate) fn mask(self) -> Option<u16> {
        match self {
            KeyUsage::NoParticularUsageRequired => None,
            KeyUsage::DigitalSignature => Some(1 << 0),
            KeyUsage::NonRepudiation => Some(1 << 1),
            KeyUsage::KeyEncipherment => Some(1 << 2),
            KeyUsage::DataEncipherment => Some(1 << 3),
            KeyUsage::KeyAgreement => Some(1 << 4),
            KeyUsage::KeyCertSign => Some(1 << 5),
            KeyUsage::CrlSign => Some(1 << 6),
        }
    }
}

/// An extended key usage purpose required of the target certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPurposeId {
    oid: ObjectIdentifier,
}

impl KeyPurposeId {
    pub const SERVER_AUTH: KeyPurposeId = KeyPurposeId {
        oid: rfc5280::ID_KP_SERVER_AUTH,
    };
    pub const CLIENT_AUTH: KeyPurposeId = KeyPurposeId {
        oid: rfc5280::ID_KP_CLIENT_AUTH,
    };
    pub const CODE_SIGNING: KeyPurposeId = KeyPurposeId {
        oid: rfc5280::ID_KP_CODE_SIGNING,
    };
    pub const OCSP_SIGNING: KeyPurposeId = KeyPurposeId {
        oid: rfc5280::ID_KP_OCSP_SIGNING,
    };

    /// Wraps an arbitrary purpose OID.
    pub const fn new(oid: ObjectIdentifier) -> Self {
        Self { oid }
    }

    /// Returns the purpose OID.
    pub const fn oid(&self) -> ObjectIdentifier {
        self.oid
    }
}

/// A certificate policy identifier; only anyPolicy is ever evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CertPolicyId {
    oid: ObjectIdentifier,
}

impl CertPolicyId {
    pub const ANY_POLICY: CertPolicyId = CertPolicyId {
        oid: ObjectIdentifier::new_unwrap("2.5.29.32.0"),
    };

    /// Returns the policy OID.
    pub const fn oid(&self) -> ObjectIdentifier {
        self.oid
    }
}

/// The OCSP identifier of one certificate.
///
/// The hashes of the issuer name and issuer key are computed by the OCSP
/// encoder; this carries the raw material.
#[derive(Clone, Copy, Debug)]
pub struct CertId<'a> {
    /// DER-encoded issuer Name.
    pub issuer: Input<'a>,
    /// DER-encoded issuer SubjectPublicKeyInfo.
    pub issuer_subject_public_key_info: Input<'a>,
    /// Raw serial number INTEGER value bytes.
    pub serial_number: Input<'a>,
}

/// The three pieces a signature check needs.
#[derive(Clone, Copy, Debug)]
pub struct SignedDataWithSignature<'a> {
    /// The exact bytes that were signed.
    pub data: Input<'a>,
    /// Signature algorithm OID from the outer SignedData.
    pub algorithm_oid: ObjectIdentifier,
    /// Signature BIT STRING contents, unused-bits byte stripped.
    pub signature: Input<'a>,
}

/// Callback handed to [`TrustDomain::find_issuer`]; the domain calls
/// [`IssuerChecker::check`] once per candidate issuer.
pub trait IssuerChecker {
    /// Offers one candidate issuer.
    ///
    /// On return, `keep_going` is cleared once a candidate's subtree has
    /// succeeded; the domain must stop enumerating then. A failed candidate
    /// leaves `keep_going` set so siblings may be offered.
    fn check(
        &mut self,
        potential_issuer_der: Input<'_>,
        additional_name_constraints: Option<Input<'_>>,
        keep_going: &mut bool,
    ) -> Result<()>;
}

/// The capability record the path builder is parameterised by.
pub trait TrustDomain {
    /// Classifies the trust placed in `candidate_cert`.
    fn get_cert_trust(
        &self,
        role: EndEntityOrCa,
        policy: CertPolicyId,
        candidate_cert: Input<'_>,
    ) -> Result<TrustLevel>;

    /// Enumerates candidate issuers whose subject is `encoded_issuer_name`,
    /// invoking `checker` for each until it clears `keep_going`.
    fn find_issuer(
        &self,
        encoded_issuer_name: Input<'_>,
        checker: &mut dyn IssuerChecker,
        time: Time,
    ) -> Result<()>;

    /// Checks revocation of the certificate identified by `cert_id`.
    fn check_revocation(
        &self,
        role: EndEntityOrCa,
        cert_id: &CertId<'_>,
        time: Time,
        stapled_ocsp_response: Option<Input<'_>>,
        aia_extension: Option<Input<'_>>,
    ) -> Result<()>;

    /// Final approval of a complete candidate chain, target first and
    /// anchor last.
    fn is_chain_valid(&self, chain: &[&[u8]]) -> Result<()>;

    /// Cryptographically verifies `signed_data` against an SPKI.
    fn verify_signed_data(
        &self,
        signed_data: &SignedDataWithSignature<'_>,
        subject_public_key_info: Input<'_>,
    ) -> Result<()>;

    /// Accepts or rejects a public key's algorithm and parameters.
    fn check_public_key(&self, subject_public_key_info: Input<'_>) -> Result<()>;

    /// Digests a buffer on the domain's behalf.
    ///
    /// Nothing in the builder calls this; the default fails loudly so a
    /// domain that is unexpectedly asked to digest notices immediately.
    fn digest_buf(&self, _item: Input<'_>, _digest_buf: &mut [u8]) -> Result<()> {
        Err(Error::FatalLibraryFailure)
    }
}
