// pkix-rs: PKIX path building and test artifact synthesis
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Certification path building.
//!
//! Given a target certificate, the builder searches for a chain ending at a
//! certificate the trust domain classifies as a trust anchor. The domain
//! controls candidate order; the builder takes the first viable subtree and
//! never backtracks out of a subtree that succeeded.

use crate::error::{Error, Result};
use crate::input::{Input, Reader};
use crate::time::Time;
use crate::trust::{
    CertId, CertPolicyId, EndEntityOrCa, IssuerChecker, KeyPurposeId, KeyUsage,
    SignedDataWithSignature, TrustDomain, TrustLevel,
};
use const_oid::ObjectIdentifier;
use const_oid::db::rfc5280;
use x509_parser::extensions::ParsedExtension;
use x509_parser::prelude::{FromDer, X509Certificate};

/// Hard ceiling on subordinate CAs between the end entity and the anchor.
///
/// Running past it without reaching an anchor is indistinguishable from any
/// other failed search, so it surfaces as [`Error::UnknownIssuer`].
pub const MAX_SUB_CA_COUNT: usize = 6;

/// Splits a SignedData SEQUENCE into the pieces a signature check needs.
pub(crate) fn signed_data_parts(der_bytes: Input<'_>) -> Result<SignedDataWithSignature<'_>> {
    let mut reader = Reader::new(der_bytes);
    let outer = reader.expect_tag(0x30)?;
    if !reader.at_end() {
        return Err(Error::bad_der("trailing data after SignedData"));
    }

    let mut outer_reader = reader.nested(outer)?;
    let tbs = outer_reader.read_tlv()?;

    let algorithm = outer_reader.expect_tag(0x30)?;
    let mut algorithm_reader = outer_reader.nested(algorithm)?;
    let algorithm_oid_value = algorithm_reader.expect_tag(0x06)?;
    let algorithm_oid = ObjectIdentifier::from_bytes(algorithm_oid_value.as_slice())
        .map_err(|_| Error::bad_der("malformed signature algorithm OID"))?;

    let signature_bits = outer_reader.expect_tag(0x03)?.as_slice();
    if signature_bits.is_empty() || signature_bits[0] != 0 {
        return Err(Error::bad_der("signature BIT STRING must have zero unused bits"));
    }

    Ok(SignedDataWithSignature {
        data: tbs.full,
        algorithm_oid,
        signature: Input::from(&signature_bits[1..]),
    })
}

pub(crate) struct BasicConstraintsInfo {
    pub critical: bool,
    pub ca: bool,
    pub path_len_constraint: Option<u32>,
}

pub(crate) struct EkuInfo {
    pub any: bool,
    pub purposes: Vec<ObjectIdentifier>,
}

/// The decoded view of one certificate the builder works with.
pub(crate) struct DecodedCert<'a> {
    pub der: Input<'a>,
    pub signed_data: SignedDataWithSignature<'a>,
    pub issuer: Input<'a>,
    pub subject: Input<'a>,
    pub spki: Input<'a>,
    pub serial: Input<'a>,
    pub not_before: Time,
    pub not_after: Time,
    pub basic_constraints: Option<BasicConstraintsInfo>,
    pub key_usage: Option<u16>,
    pub eku: Option<EkuInfo>,
}

impl DecodedCert<'_> {
    fn is_self_issued(&self) -> bool {
        self.subject == self.issuer
    }
}

pub(crate) fn decode_cert(der_bytes: Input<'_>) -> Result<DecodedCert<'_>> {
    let signed_data = signed_data_parts(der_bytes)?;

    let (rem, cert) = X509Certificate::from_der(der_bytes.as_slice())
        .map_err(|err| Error::bad_der(err.to_string()))?;
    if !rem.is_empty() {
        return Err(Error::bad_der("trailing data after certificate"));
    }
    let tbs = &cert.tbs_certificate;

    let not_before = Time::from_unix_signed(tbs.validity.not_before.timestamp())
        .ok_or_else(|| Error::bad_der("notBefore precedes year 0"))?;
    let not_after = Time::from_unix_signed(tbs.validity.not_after.timestamp())
        .ok_or_else(|| Error::bad_der("notAfter precedes year 0"))?;
    if not_before > not_after {
        return Err(Error::bad_der("notBefore is after notAfter"));
    }

    let mut basic_constraints = None;
    let mut key_usage = None;
    let mut eku = None;
    for ext in tbs.extensions() {
        match ext.parsed_extension() {
            ParsedExtension::BasicConstraints(constraints) => {
                basic_constraints = Some(BasicConstraintsInfo {
                    critical: ext.critical,
                    ca: constraints.ca,
                    path_len_constraint: constraints.path_len_constraint,
                });
            }
            ParsedExtension::KeyUsage(usage) => {
                key_usage = Some(usage.flags);
            }
            ParsedExtension::ExtendedKeyUsage(parsed) => {
                let mut purposes = Vec::new();
                if parsed.server_auth {
                    purposes.push(rfc5280::ID_KP_SERVER_AUTH);
                }
                if parsed.client_auth {
                    purposes.push(rfc5280::ID_KP_CLIENT_AUTH);
                }
                if parsed.code_signing {
                    purposes.push(rfc5280::ID_KP_CODE_SIGNING);
                }
                if parsed.email_protection {
                    purposes.push(rfc5280::ID_KP_EMAIL_PROTECTION);
                }
                if parsed.time_stamping {
                    purposes.push(rfc5280::ID_KP_TIME_STAMPING);
                }
                if parsed.ocsp_signing {
                    purposes.push(rfc5280::ID_KP_OCSP_SIGNING);
                }
                for other in &parsed.other {
                    purposes.push(
                        ObjectIdentifier::new(other.to_id_string().as_str())
                            .map_err(|_| Error::bad_der("malformed EKU purpose OID"))?,
                    );
                }
                eku = Some(EkuInfo {
                    any: parsed.any,
                    purposes,
                });
            }
            _ => {}
        }
    }

    Ok(DecodedCert {
        der: der_bytes,
        signed_data,
        issuer: Input::from(tbs.issuer.as_raw()),
        subject: Input::from(tbs.subject.as_raw()),
        spki: Input::from(tbs.subject_pki.raw),
        serial: Input::from(tbs.raw_serial()),
        not_before,
        not_after,
        basic_constraints,
        key_usage,
        eku,
    })
}

/// Builds and validates a chain from `cert_der` up to a trust anchor.
///
/// The trust domain supplies trust classification, issuer candidates,
/// revocation, and cryptography. On success the assembled chain (target
/// first, anchor last) has been accepted by the domain's
/// [`TrustDomain::is_chain_valid`].
#[allow(clippy::too_many_arguments)]
pub fn build_cert_chain(
    trust_domain: &dyn TrustDomain,
    cert_der: Input<'_>,
    time: Time,
    end_entity_or_ca: EndEntityOrCa,
    required_key_usage: KeyUsage,
    required_eku: KeyPurposeId,
    policy: CertPolicyId,
    stapled_ocsp_response: Option<Input<'_>>,
) -> Result<()> {
    let builder = PathBuilder {
        trust_domain,
        time,
        required_key_usage,
        required_eku,
        policy,
    };
    let subject = decode_cert(cert_der)?;
    let chain = builder.build_forward(&subject, end_entity_or_ca, 0, None, stapled_ocsp_response)?;
    let chain_refs: Vec<&[u8]> = chain.iter().map(|cert| cert.as_slice()).collect();
    trust_domain.is_chain_valid(&chain_refs)
}

struct PathBuilder<'d> {
    trust_domain: &'d dyn TrustDomain,
    time: Time,
    required_key_usage: KeyUsage,
    required_eku: KeyPurposeId,
    policy: CertPolicyId,
}

// One entry of the working chain, stack-linked through the recursion so the
// builder can refuse to place the same (subject, SPKI) pair twice.
struct VisitedLink<'p> {
    subject: Input<'p>,
    spki: Input<'p>,
    parent: Option<&'p VisitedLink<'p>>,
}

impl VisitedLink<'_> {
    fn contains(&self, subject: Input<'_>, spki: Input<'_>) -> bool {
        let mut current = Some(self);
        while let Some(link) = current {
            if link.subject.as_slice() == subject.as_slice()
                && link.spki.as_slice() == spki.as_slice()
            {
                return true;
            }
            current = link.parent;
        }
        false
    }
}

impl PathBuilder<'_> {
    /// Builds the chain from `subject` upward, returning it subject-first.
    fn build_forward(
        &self,
        subject: &DecodedCert<'_>,
        role: EndEntityOrCa,
        sub_ca_count: usize,
        visited: Option<&VisitedLink<'_>>,
        stapled_ocsp_response: Option<Input<'_>>,
    ) -> Result<Vec<Vec<u8>>> {
        // Expiry is decided as soon as a candidate is decoded, before the
        // trust domain is consulted for anything else. Revocation in
        // particular must not be reachable for an already-expired subject.
        self.check_validity(subject)?;
        self.check_role_properties(subject, role, sub_ca_count)?;

        match self
            .trust_domain
            .get_cert_trust(role, self.policy, subject.der)?
        {
            TrustLevel::ActivelyDistrusted => return Err(Error::UntrustedCert),
            TrustLevel::TrustAnchor => {
                // End of the search. The anchor's own signature is never
                // verified against a parent, but its key must still be one
                // the domain accepts.
                self.trust_domain.check_public_key(subject.spki)?;
                return Ok(vec![subject.der.as_slice().to_vec()]);
            }
            TrustLevel::InheritsTrust => {}
        }

        let new_sub_ca_count = if role == EndEntityOrCa::MustBeCa {
            if sub_ca_count >= MAX_SUB_CA_COUNT {
                return Err(Error::UnknownIssuer);
            }
            if subject.is_self_issued() {
                sub_ca_count
            } else {
                sub_ca_count + 1
            }
        } else {
            0
        };

        let mut step = PathBuildingStep {
            builder: self,
            subject,
            role,
            sub_ca_count: new_sub_ca_count,
            visited,
            stapled_ocsp_response,
            chain: None,
            deferred_error: None,
        };
        self.trust_domain
            .find_issuer(subject.issuer, &mut step, self.time)?;

        match step.chain {
            Some(mut chain) => {
                chain.insert(0, subject.der.as_slice().to_vec());
                Ok(chain)
            }
            None => Err(step.deferred_error.unwrap_or(Error::UnknownIssuer)),
        }
    }

    fn check_validity(&self, subject: &DecodedCert<'_>) -> Result<()> {
        if self.time < subject.not_before {
            return Err(Error::NotYetValidCertificate);
        }
        if self.time > subject.not_after {
            return Err(Error::ExpiredCertificate);
        }
        Ok(())
    }

    fn check_role_properties(
        &self,
        subject: &DecodedCert<'_>,
        role: EndEntityOrCa,
        sub_ca_count: usize,
    ) -> Result<()> {
        match role {
            EndEntityOrCa::MustBeCa => {
                let constraints = subject
                    .basic_constraints
                    .as_ref()
                    .filter(|constraints| constraints.ca && constraints.critical)
                    .ok_or(Error::CaCertInvalid)?;
                if let Some(path_len) = constraints.path_len_constraint
                    && sub_ca_count > path_len as usize
                {
                    return Err(Error::PathLenConstraintInvalid);
                }
                if let Some(flags) = subject.key_usage
                    && let Some(mask) = KeyUsage::KeyCertSign.mask()
                    && flags & mask == 0
                {
                    return Err(Error::InadequateKeyUsage);
                }
            }
            EndEntityOrCa::MustBeEndEntity => {
                if let Some(flags) = subject.key_usage
                    && let Some(mask) = self.required_key_usage.mask()
                    && flags & mask == 0
                {
                    return Err(Error::InadequateKeyUsage);
                }
            }
        }

        // An absent EKU extension allows any purpose.
        if let Some(eku) = &subject.eku
            && !eku.any
            && !eku.purposes.contains(&self.required_eku.oid())
        {
            return Err(Error::InadequateCertType);
        }
        Ok(())
    }
}

struct PathBuildingStep<'a> {
    builder: &'a PathBuilder<'a>,
    subject: &'a DecodedCert<'a>,
    role: EndEntityOrCa,
    sub_ca_count: usize,
    visited: Option<&'a VisitedLink<'a>>,
    stapled_ocsp_response: Option<Input<'a>>,
    chain: Option<Vec<Vec<u8>>>,
    deferred_error: Option<Error>,
}

impl PathBuildingStep<'_> {
    // Remembers the most informative failure across sibling candidates:
    // structural errors outrank everything, "unknown issuer" ranks last.
    fn defer(&mut self, error: Error, keep_going: &mut bool) -> Result<()> {
        debug_assert!(!error.is_fatal());
        let replace = match &self.deferred_error {
            None => true,
            Some(existing) => error_rank(&error) > error_rank(existing),
        };
        if replace {
            self.deferred_error = Some(error);
        }
        *keep_going = true;
        Ok(())
    }
}

fn error_rank(error: &Error) -> u8 {
    match error {
        Error::BadDer { .. } => 2,
        Error::UnknownIssuer => 0,
        _ => 1,
    }
}

impl IssuerChecker for PathBuildingStep<'_> {
    fn check(
        &mut self,
        potential_issuer_der: Input<'_>,
        _additional_name_constraints: Option<Input<'_>>,
        keep_going: &mut bool,
    ) -> Result<()> {
        if self.chain.is_some() {
            *keep_going = false;
            return Ok(());
        }

        let potential_issuer = match decode_cert(potential_issuer_der) {
            Ok(cert) => cert,
            Err(error) => return self.defer(error, keep_going),
        };

        // The same (subject, SPKI) pair twice on the working chain would be
        // a cycle.
        let link = VisitedLink {
            subject: self.subject.subject,
            spki: self.subject.spki,
            parent: self.visited,
        };
        if link.contains(potential_issuer.subject, potential_issuer.spki) {
            return self.defer(Error::UnknownIssuer, keep_going);
        }

        let subtree = self.builder.build_forward(
            &potential_issuer,
            EndEntityOrCa::MustBeCa,
            self.sub_ca_count,
            Some(&link),
            None,
        );
        let chain = match subtree {
            Ok(chain) => chain,
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => return self.defer(error, keep_going),
        };

        if let Err(error) = self
            .builder
            .trust_domain
            .verify_signed_data(&self.subject.signed_data, potential_issuer.spki)
        {
            if error.is_fatal() {
                return Err(error);
            }
            return self.defer(error, keep_going);
        }

        let cert_id = CertId {
            issuer: self.subject.issuer,
            issuer_subject_public_key_info: potential_issuer.spki,
            serial_number: self.subject.serial,
        };
        if let Err(error) = self.builder.trust_domain.check_revocation(
            self.role,
            &cert_id,
            self.builder.time,
            self.stapled_ocsp_response,
            None,
        ) {
            if error.is_fatal() {
                return Err(error);
            }
            return self.defer(error, keep_going);
        }

        self.chain = Some(chain);
        *keep_going = false;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::alg::{DigestAlgorithm, KeyType, signature_algorithm_oid};
    use crate::arena::Arena;
    use crate::cert::{
        CertificateContext, Version, encode_basic_constraints, encode_certificate,
        encode_serial_number, next_serial_number,
    };
    use crate::der::ExtensionCriticality;
    use crate::keys::KeyPair;
    use crate::name::ascii_to_der_name;
    use crate::time::{ONE_DAY_IN_SECONDS, Time, ymdhms};
    use std::sync::OnceLock;

    fn now() -> Time {
        ymdhms(2025, 8, 1, 12, 0, 0)
    }

    fn create_cert_with_validity(
        issuer_name: &str,
        subject_name: &str,
        role: EndEntityOrCa,
        issuer_key: Option<&KeyPair>,
        not_before: Time,
        not_after: Time,
    ) -> (Vec<u8>, KeyPair) {
        let arena = Arena::new();
        let serial = encode_serial_number(&arena, next_serial_number()).unwrap();
        let issuer_der = ascii_to_der_name(&arena, issuer_name).unwrap();
        let subject_der = ascii_to_der_name(&arena, subject_name).unwrap();
        let mut extensions = Vec::new();
        if role == EndEntityOrCa::MustBeCa {
            extensions.push(Input::from(
                encode_basic_constraints(&arena, true, None, ExtensionCriticality::Critical)
                    .unwrap(),
            ));
        }
        let context = CertificateContext {
            version: Version::V3,
            serial_number: Input::from(serial),
            signature_algorithm: signature_algorithm_oid(KeyType::Rsa, DigestAlgorithm::Sha256)
                .unwrap(),
            issuer_name: Input::from(issuer_der),
            not_before,
            not_after,
            subject_name: Input::from(subject_der),
            extensions,
            issuer_key,
            signature_hash: DigestAlgorithm::Sha256,
            corrupt_signature: false,
        };
        let (der_bytes, subject_key) = encode_certificate(&arena, &context).unwrap();
        (der_bytes.to_vec(), subject_key)
    }

    fn create_cert(
        issuer_name: &str,
        subject_name: &str,
        role: EndEntityOrCa,
        issuer_key: Option<&KeyPair>,
    ) -> (Vec<u8>, KeyPair) {
        create_cert_with_validity(
            issuer_name,
            subject_name,
            role,
            issuer_key,
            now().sub_seconds(ONE_DAY_IN_SECONDS),
            now().add_seconds(ONE_DAY_IN_SECONDS),
        )
    }

    fn name_der(name: &str) -> Vec<u8> {
        let arena = Arena::new();
        ascii_to_der_name(&arena, name).unwrap().to_vec()
    }

    /// A trust domain over an in-memory certificate list, keyed by encoded
    /// subject name, with the first stored certificate as the anchor.
    #[derive(Clone, Default)]
    struct TestTrustDomain {
        certs: Vec<(Vec<u8>, Vec<u8>)>,
        root_der: Vec<u8>,
    }

    impl TestTrustDomain {
        fn add(&mut self, subject_name: &str, der_bytes: &[u8]) {
            if self.certs.is_empty() {
                self.root_der = der_bytes.to_vec();
            }
            self.certs.push((name_der(subject_name), der_bytes.to_vec()));
        }
    }

    impl TrustDomain for TestTrustDomain {
        fn get_cert_trust(
            &self,
            _role: EndEntityOrCa,
            _policy: CertPolicyId,
            candidate_cert: Input<'_>,
        ) -> crate::error::Result<TrustLevel> {
            if candidate_cert.as_slice() == self.root_der.as_slice() {
                Ok(TrustLevel::TrustAnchor)
            } else {
                Ok(TrustLevel::InheritsTrust)
            }
        }

        fn find_issuer(
            &self,
            encoded_issuer_name: Input<'_>,
            checker: &mut dyn IssuerChecker,
            _time: Time,
        ) -> crate::error::Result<()> {
            for (subject, der_bytes) in &self.certs {
                if subject.as_slice() != encoded_issuer_name.as_slice() {
                    continue;
                }
                let mut keep_going = true;
                checker.check(Input::from(der_bytes.as_slice()), None, &mut keep_going)?;
                if !keep_going {
                    break;
                }
            }
            Ok(())
        }

        fn check_revocation(
            &self,
            _role: EndEntityOrCa,
            _cert_id: &CertId<'_>,
            _time: Time,
            _stapled_ocsp_response: Option<Input<'_>>,
            _aia_extension: Option<Input<'_>>,
        ) -> crate::error::Result<()> {
            Ok(())
        }

        fn is_chain_valid(&self, chain: &[&[u8]]) -> crate::error::Result<()> {
            assert!(!chain.is_empty());
            assert_eq!(*chain.last().unwrap(), self.root_der.as_slice());
            Ok(())
        }

        fn verify_signed_data(
            &self,
            signed_data: &SignedDataWithSignature<'_>,
            subject_public_key_info: Input<'_>,
        ) -> crate::error::Result<()> {
            crate::keys::verify_signed_data(signed_data, subject_public_key_info)
        }

        fn check_public_key(
            &self,
            subject_public_key_info: Input<'_>,
        ) -> crate::error::Result<()> {
            crate::keys::check_public_key(subject_public_key_info)
        }
    }

    struct ChainTail {
        domain: TestTrustDomain,
        leaf_ca_key: KeyPair,
        leaf_ca_der: Vec<u8>,
    }

    // The chain tail CA1 (root) .. CA7 is shared across tests because
    // generating the key pairs is slow.
    fn chain_tail() -> &'static ChainTail {
        static TAIL: OnceLock<ChainTail> = OnceLock::new();
        TAIL.get_or_init(|| {
            let names = [
                "CN=CA1 (Root)",
                "CN=CA2",
                "CN=CA3",
                "CN=CA4",
                "CN=CA5",
                "CN=CA6",
                "CN=CA7",
            ];
            let mut domain = TestTrustDomain::default();
            let mut issuer_key: Option<KeyPair> = None;
            let mut last_der = Vec::new();
            for (i, subject_name) in names.iter().enumerate() {
                let issuer_name = if i == 0 { names[0] } else { names[i - 1] };
                let (der_bytes, subject_key) = create_cert(
                    issuer_name,
                    subject_name,
                    EndEntityOrCa::MustBeCa,
                    issuer_key.as_ref(),
                );
                domain.add(subject_name, &der_bytes);
                issuer_key = Some(subject_key);
                last_der = der_bytes;
            }
            ChainTail {
                domain,
                leaf_ca_key: issuer_key.unwrap(),
                leaf_ca_der: last_der,
            }
        })
    }

    fn build(
        domain: &dyn TrustDomain,
        cert: &[u8],
        role: EndEntityOrCa,
    ) -> crate::error::Result<()> {
        build_cert_chain(
            domain,
            Input::from(cert),
            now(),
            role,
            KeyUsage::NoParticularUsageRequired,
            KeyPurposeId::SERVER_AUTH,
            CertPolicyId::ANY_POLICY,
            None,
        )
    }

    /// Verifies that a chain of seven CAs builds, both for the last CA
    /// itself and for an end entity directly under it.
    #[test]
    fn test_max_acceptable_cert_chain_length() {
        let tail = chain_tail();
        build(&tail.domain, &tail.leaf_ca_der, EndEntityOrCa::MustBeCa).unwrap();

        let (ee_der, _) = create_cert(
            "CN=CA7",
            "CN=Direct End-Entity",
            EndEntityOrCa::MustBeEndEntity,
            Some(&tail.leaf_ca_key),
        );
        build(&tail.domain, &ee_der, EndEntityOrCa::MustBeEndEntity).unwrap();
    }

    /// Verifies that one CA past the ceiling fails as an unknown issuer,
    /// for both the CA and an end entity below it.
    #[test]
    fn test_beyond_max_acceptable_cert_chain_length() {
        let tail = chain_tail();
        let mut domain = tail.domain.clone();

        let (ca_der, ca_key) = create_cert(
            "CN=CA7",
            "CN=CA Too Far",
            EndEntityOrCa::MustBeCa,
            Some(&tail.leaf_ca_key),
        );
        domain.add("CN=CA Too Far", &ca_der);
        assert_eq!(
            build(&domain, &ca_der, EndEntityOrCa::MustBeCa),
            Err(Error::UnknownIssuer)
        );

        let (ee_der, _) = create_cert(
            "CN=CA Too Far",
            "CN=End-Entity Too Far",
            EndEntityOrCa::MustBeEndEntity,
            Some(&ca_key),
        );
        assert_eq!(
            build(&domain, &ee_der, EndEntityOrCa::MustBeEndEntity),
            Err(Error::UnknownIssuer)
        );
    }

    /// A trust domain that treats one root as the anchor, always offers it
    /// as the issuer, and aborts the test if revocation is ever consulted.
    struct ExpiredCertTrustDomain {
        root_der: Vec<u8>,
    }

    impl TrustDomain for ExpiredCertTrustDomain {
        fn get_cert_trust(
            &self,
            _role: EndEntityOrCa,
            _policy: CertPolicyId,
            candidate_cert: Input<'_>,
        ) -> crate::error::Result<TrustLevel> {
            if candidate_cert.as_slice() == self.root_der.as_slice() {
                Ok(TrustLevel::TrustAnchor)
            } else {
                Ok(TrustLevel::InheritsTrust)
            }
        }

        fn find_issuer(
            &self,
            _encoded_issuer_name: Input<'_>,
            checker: &mut dyn IssuerChecker,
            _time: Time,
        ) -> crate::error::Result<()> {
            let mut keep_going = true;
            checker.check(Input::from(self.root_der.as_slice()), None, &mut keep_going)
        }

        fn check_revocation(
            &self,
            _role: EndEntityOrCa,
            _cert_id: &CertId<'_>,
            _time: Time,
            _stapled_ocsp_response: Option<Input<'_>>,
            _aia_extension: Option<Input<'_>>,
        ) -> crate::error::Result<()> {
            panic!("revocation must not be consulted for an expired certificate");
        }

        fn is_chain_valid(&self, _chain: &[&[u8]]) -> crate::error::Result<()> {
            Ok(())
        }

        fn verify_signed_data(
            &self,
            signed_data: &SignedDataWithSignature<'_>,
            subject_public_key_info: Input<'_>,
        ) -> crate::error::Result<()> {
            crate::keys::verify_signed_data(signed_data, subject_public_key_info)
        }

        fn check_public_key(
            &self,
            subject_public_key_info: Input<'_>,
        ) -> crate::error::Result<()> {
            crate::keys::check_public_key(subject_public_key_info)
        }
    }

    /// Verifies that an expired end entity fails before revocation is ever
    /// consulted.
    #[test]
    fn test_no_revocation_checking_for_expired_cert() {
        let (root_der, root_key) = create_cert(
            "CN=Root CA",
            "CN=Root CA",
            EndEntityOrCa::MustBeCa,
            None,
        );
        let domain = ExpiredCertTrustDomain { root_der };

        let (ee_der, _) = create_cert_with_validity(
            "CN=Root CA",
            "CN=Expired End-Entity Cert",
            EndEntityOrCa::MustBeEndEntity,
            Some(&root_key),
            now().sub_seconds(2 * ONE_DAY_IN_SECONDS),
            now().sub_seconds(ONE_DAY_IN_SECONDS),
        );
        assert_eq!(
            build(&domain, &ee_der, EndEntityOrCa::MustBeEndEntity),
            Err(Error::ExpiredCertificate)
        );
    }

    /// Verifies that a not-yet-valid end entity is reported as such.
    #[test]
    fn test_not_yet_valid_cert() {
        let (root_der, root_key) = create_cert(
            "CN=Root CA",
            "CN=Root CA",
            EndEntityOrCa::MustBeCa,
            None,
        );
        let mut domain = TestTrustDomain::default();
        domain.add("CN=Root CA", &root_der);

        let (ee_der, _) = create_cert_with_validity(
            "CN=Root CA",
            "CN=Future End-Entity",
            EndEntityOrCa::MustBeEndEntity,
            Some(&root_key),
            now().add_seconds(ONE_DAY_IN_SECONDS),
            now().add_seconds(2 * ONE_DAY_IN_SECONDS),
        );
        assert_eq!(
            build(&domain, &ee_der, EndEntityOrCa::MustBeEndEntity),
            Err(Error::NotYetValidCertificate)
        );
    }

    /// Verifies that a mutual-issuance cycle terminates as unknown issuer
    /// instead of recursing forever.
    #[test]
    fn test_issuer_cycle_is_detected() {
        let (root_der, _) = create_cert(
            "CN=Unrelated Root",
            "CN=Unrelated Root",
            EndEntityOrCa::MustBeCa,
            None,
        );
        let mut domain = TestTrustDomain::default();
        domain.add("CN=Unrelated Root", &root_der);

        let signer = KeyPair::generate(&[4; 8]).unwrap();
        let (ca_a, _) = create_cert("CN=Cycle B", "CN=Cycle A", EndEntityOrCa::MustBeCa, Some(&signer));
        let (ca_b, _) = create_cert("CN=Cycle A", "CN=Cycle B", EndEntityOrCa::MustBeCa, Some(&signer));
        domain.add("CN=Cycle A", &ca_a);
        domain.add("CN=Cycle B", &ca_b);

        let (ee_der, _) = create_cert(
            "CN=Cycle A",
            "CN=Cycle End-Entity",
            EndEntityOrCa::MustBeEndEntity,
            Some(&signer),
        );
        assert_eq!(
            build(&domain, &ee_der, EndEntityOrCa::MustBeEndEntity),
            Err(Error::UnknownIssuer)
        );
    }

    /// Verifies that an actively distrusted target fails outright.
    #[test]
    fn test_actively_distrusted_cert() {
        struct DistrustingDomain {
            inner: TestTrustDomain,
            distrusted: Vec<u8>,
        }
        impl TrustDomain for DistrustingDomain {
            fn get_cert_trust(
                &self,
                role: EndEntityOrCa,
                policy: CertPolicyId,
                candidate_cert: Input<'_>,
            ) -> crate::error::Result<TrustLevel> {
                if candidate_cert.as_slice() == self.distrusted.as_slice() {
                    return Ok(TrustLevel::ActivelyDistrusted);
                }
                self.inner.get_cert_trust(role, policy, candidate_cert)
            }
            fn find_issuer(
                &self,
                encoded_issuer_name: Input<'_>,
                checker: &mut dyn IssuerChecker,
                time: Time,
            ) -> crate::error::Result<()> {
                self.inner.find_issuer(encoded_issuer_name, checker, time)
            }
            fn check_revocation(
                &self,
                role: EndEntityOrCa,
                cert_id: &CertId<'_>,
                time: Time,
                stapled: Option<Input<'_>>,
                aia: Option<Input<'_>>,
            ) -> crate::error::Result<()> {
                self.inner.check_revocation(role, cert_id, time, stapled, aia)
            }
            fn is_chain_valid(&self, chain: &[&[u8]]) -> crate::error::Result<()> {
                self.inner.is_chain_valid(chain)
            }
            fn verify_signed_data(
                &self,
                signed_data: &SignedDataWithSignature<'_>,
                spki: Input<'_>,
            ) -> crate::error::Result<()> {
                self.inner.verify_signed_data(signed_data, spki)
            }
            fn check_public_key(&self, spki: Input<'_>) -> crate::error::Result<()> {
                self.inner.check_public_key(spki)
            }
        }

        let (root_der, root_key) = create_cert(
            "CN=Root CA",
            "CN=Root CA",
            EndEntityOrCa::MustBeCa,
            None,
        );
        let mut inner = TestTrustDomain::default();
        inner.add("CN=Root CA", &root_der);
        let (ee_der, _) = create_cert(
            "CN=Root CA",
            "CN=Distrusted End-Entity",
            EndEntityOrCa::MustBeEndEntity,
            Some(&root_key),
        );
        let domain = DistrustingDomain {
            inner,
            distrusted: ee_der.clone(),
        };
        assert_eq!(
            build(&domain, &ee_der, EndEntityOrCa::MustBeEndEntity),
            Err(Error::UntrustedCert)
        );
    }

    /// Verifies that repeated builds over identical inputs return identical
    /// results.
    #[test]
    fn test_builder_refusal_is_stable() {
        let tail = chain_tail();
        let first = build(&tail.domain, &tail.leaf_ca_der, EndEntityOrCa::MustBeCa);
        let second = build(&tail.domain, &tail.leaf_ca_der, EndEntityOrCa::MustBeCa);
        assert_eq!(first, second);

        let (orphan_der, _) = create_cert(
            "CN=Nobody Home",
            "CN=Orphan",
            EndEntityOrCa::MustBeEndEntity,
            None,
        );
        let first = build(&tail.domain, &orphan_der, EndEntityOrCa::MustBeEndEntity);
        let second = build(&tail.domain, &orphan_der, EndEntityOrCa::MustBeEndEntity);
        assert_eq!(first, Err(Error::UnknownIssuer));
        assert_eq!(first, second);
    }

    /// Verifies that a non-CA issuer candidate fails the CA invariant and
    /// that the failure wins triage over unknown issuer.
    #[test]
    fn test_non_ca_issuer_is_rejected() {
        let (root_der, root_key) = create_cert(
            "CN=Root CA",
            "CN=Root CA",
            EndEntityOrCa::MustBeCa,
            None,
        );
        let mut domain = TestTrustDomain::default();
        domain.add("CN=Root CA", &root_der);

        // A middle certificate without basicConstraints cannot issue.
        let (middle_der, middle_key) = create_cert(
            "CN=Root CA",
            "CN=Not A CA",
            EndEntityOrCa::MustBeEndEntity,
            Some(&root_key),
        );
        domain.add("CN=Not A CA", &middle_der);

        let (ee_der, _) = create_cert(
            "CN=Not A CA",
            "CN=Below Non-CA",
            EndEntityOrCa::MustBeEndEntity,
            Some(&middle_key),
        );
        assert_eq!(
            build(&domain, &ee_der, EndEntityOrCa::MustBeEndEntity),
            Err(Error::CaCertInvalid)
        );
    }

    /// Verifies that a pathLenConstraint of zero forbids a CA child but
    /// admits an end entity.
    #[test]
    fn test_path_len_constraint() {
        let arena = Arena::new();
        let root_name = ascii_to_der_name(&arena, "CN=Constrained Root").unwrap();
        let context = CertificateContext {
            version: Version::V3,
            serial_number: Input::from(encode_serial_number(&arena, next_serial_number()).unwrap()),
            signature_algorithm: signature_algorithm_oid(KeyType::Rsa, DigestAlgorithm::Sha256)
                .unwrap(),
            issuer_name: Input::from(root_name),
            not_before: now().sub_seconds(ONE_DAY_IN_SECONDS),
            not_after: now().add_seconds(ONE_DAY_IN_SECONDS),
            subject_name: Input::from(root_name),
            extensions: vec![Input::from(
                encode_basic_constraints(&arena, true, Some(0), ExtensionCriticality::Critical)
                    .unwrap(),
            )],
            issuer_key: None,
            signature_hash: DigestAlgorithm::Sha256,
            corrupt_signature: false,
        };
        let (root_der, root_key) = encode_certificate(&arena, &context).unwrap();
        let mut domain = TestTrustDomain::default();
        domain.add("CN=Constrained Root", root_der);

        let (ee_der, _) = create_cert(
            "CN=Constrained Root",
            "CN=Allowed End-Entity",
            EndEntityOrCa::MustBeEndEntity,
            Some(&root_key),
        );
        build(&domain, &ee_der, EndEntityOrCa::MustBeEndEntity).unwrap();

        let (ca_der, ca_key) = create_cert(
            "CN=Constrained Root",
            "CN=Forbidden CA",
            EndEntityOrCa::MustBeCa,
            Some(&root_key),
        );
        domain.add("CN=Forbidden CA", &ca_der);
        let (deep_ee_der, _) = create_cert(
            "CN=Forbidden CA",
            "CN=Too Deep End-Entity",
            EndEntityOrCa::MustBeEndEntity,
            Some(&ca_key),
        );
        assert_eq!(
            build(&domain, &deep_ee_der, EndEntityOrCa::MustBeEndEntity),
            Err(Error::PathLenConstraintInvalid)
        );
    }

    /// Verifies that malformed target DER is rejected as structural.
    #[test]
    fn test_malformed_target_is_structural() {
        let tail = chain_tail();
        let result = build(&tail.domain, &[0x30, 0x02, 0x05], EndEntityOrCa::MustBeEndEntity);
        assert!(matches!(result, Err(Error::BadDer { .. })));
    }
}
