// pkix-rs: PKIX path building and test artifact synthesis
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use thiserror::Error;

/// Result type used by all pkix APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type used by all pkix APIs.
///
/// The taxonomy is closed on purpose: the path builder reports one of the
/// non-fatal kinds below for a failed candidate branch, while the two fatal
/// kinds abort a build outright. See [`Error::is_fatal`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("certificate has expired")]
    ExpiredCertificate,
    #[error("certificate is not yet valid")]
    NotYetValidCertificate,
    #[error("no chain to a trust anchor could be built")]
    UnknownIssuer,
    #[error("signature verification failed")]
    BadSignature,
    #[error("certificate is actively distrusted")]
    UntrustedCert,
    #[error("CA certificate lacks a critical cA basicConstraints")]
    CaCertInvalid,
    #[error("issuer pathLenConstraint forbids this chain depth")]
    PathLenConstraintInvalid,
    #[error("certificate keyUsage does not permit the requested usage")]
    InadequateKeyUsage,
    #[error("certificate extendedKeyUsage does not permit the requested purpose")]
    InadequateCertType,
    #[error("malformed DER: {details}")]
    BadDer { details: String },
    #[error("invalid arguments")]
    FatalInvalidArgs,
    #[error("internal library failure")]
    FatalLibraryFailure,
}

impl Error {
    /// Returns whether the error aborts an entire chain build rather than
    /// just the current candidate branch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::FatalInvalidArgs | Error::FatalLibraryFailure)
    }

    pub(crate) fn bad_der(details: impl Into<String>) -> Error {
        Error::BadDer {
            details: details.into(),
        }
    }
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Self {
        Error::bad_der(err.to_string())
    }
}
