// pkix-rs: PKIX path building and test artifact synthesis
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![no_main]

use darkbio_pkix::{
    CertId, CertPolicyId, EndEntityOrCa, Input, IssuerChecker, KeyPurposeId, KeyUsage,
    SignedDataWithSignature, Time, TrustDomain, TrustLevel, build_cert_chain,
};
use libfuzzer_sys::fuzz_target;

// A domain that trusts nothing and knows no issuers; the fuzz surface is
// the certificate decoder and the builder's structural handling.
struct EmptyTrustDomain;

impl TrustDomain for EmptyTrustDomain {
    fn get_cert_trust(
        &self,
        _role: EndEntityOrCa,
        _policy: CertPolicyId,
        _candidate_cert: Input<'_>,
    ) -> darkbio_pkix::Result<TrustLevel> {
        Ok(TrustLevel::InheritsTrust)
    }

    fn find_issuer(
        &self,
        _encoded_issuer_name: Input<'_>,
        _checker: &mut dyn IssuerChecker,
        _time: Time,
    ) -> darkbio_pkix::Result<()> {
        Ok(())
    }

    fn check_revocation(
        &self,
        _role: EndEntityOrCa,
        _cert_id: &CertId<'_>,
        _time: Time,
        _stapled_ocsp_response: Option<Input<'_>>,
        _aia_extension: Option<Input<'_>>,
    ) -> darkbio_pkix::Result<()> {
        Ok(())
    }

    fn is_chain_valid(&self, _chain: &[&[u8]]) -> darkbio_pkix::Result<()> {
        Ok(())
    }

    fn verify_signed_data(
        &self,
        signed_data: &SignedDataWithSignature<'_>,
        subject_public_key_info: Input<'_>,
    ) -> darkbio_pkix::Result<()> {
        darkbio_pkix::verify_signed_data(signed_data, subject_public_key_info)
    }

    fn check_public_key(
        &self,
        subject_public_key_info: Input<'_>,
    ) -> darkbio_pkix::Result<()> {
        darkbio_pkix::check_public_key(subject_public_key_info)
    }
}

fuzz_target!(|data: &[u8]| {
    let _ = build_cert_chain(
        &EmptyTrustDomain,
        Input::from(data),
        Time::from_unix(1_750_000_000),
        EndEntityOrCa::MustBeEndEntity,
        KeyUsage::NoParticularUsageRequired,
        KeyPurposeId::SERVER_AUTH,
        CertPolicyId::ANY_POLICY,
        None,
    );
});
