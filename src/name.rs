// pkix-rs: PKIX path building and test artifact synthesis
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Distinguished-name construction from ASCII.
//!
//! The rest of the crate treats names as opaque encoded blobs compared by
//! byte equality; this module only exists so tests can spell issuers and
//! subjects as `"CN=CA1 (Root)"`.

use crate::arena::Arena;
use crate::error::{Error, Result};
use const_oid::ObjectIdentifier;
use der::asn1::{Any, SetOfVec};
use der::{Encode, Tag};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

/// OID for CommonName (2.5.4.3).
const OID_CN: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// OID for CountryName (2.5.4.6).
const OID_C: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
/// OID for LocalityName (2.5.4.7).
const OID_L: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
/// OID for StateOrProvinceName (2.5.4.8).
const OID_ST: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
/// OID for OrganizationName (2.5.4.10).
const OID_O: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
/// OID for OrganizationalUnitName (2.5.4.11).
const OID_OU: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");

/// A single DN attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameAttribute {
    /// Attribute OID (for example `2.5.4.3` for CN).
    pub oid: ObjectIdentifier,
    /// Attribute string value.
    pub value: String,
}

/// Distinguished Name represented as ordered attributes, one per RDN.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    /// Ordered list of RDN attributes.
    pub attrs: Vec<NameAttribute>,
}

impl DistinguishedName {
    /// Creates an empty DN.
    pub fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    /// Adds a CN attribute.
    pub fn cn(mut self, value: impl Into<String>) -> Self {
        self.attrs.push(NameAttribute {
            oid: OID_CN,
            value: value.into(),
        });
        self
    }

    /// Adds an arbitrary attribute.
    pub fn push(mut self, oid: ObjectIdentifier, value: impl Into<String>) -> Self {
        self.attrs.push(NameAttribute {
            oid,
            value: value.into(),
        });
        self
    }

    /// Parses a comma-separated attribute list such as `"CN=CA1, O=Test"`.
    ///
    /// Values may not themselves contain commas; the test corpus never
    /// needs escaping.
    pub fn parse(ascii: &str) -> Result<Self> {
        let mut dn = DistinguishedName::new();
        for part in ascii.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or(Error::FatalInvalidArgs)?;
            let oid = match key.trim() {
                "CN" => OID_CN,
                "C" => OID_C,
                "L" => OID_L,
                "ST" => OID_ST,
                "O" => OID_O,
                "OU" => OID_OU,
                _ => return Err(Error::FatalInvalidArgs),
            };
            if value.is_empty() {
                return Err(Error::FatalInvalidArgs);
            }
            dn.attrs.push(NameAttribute {
                oid,
                value: value.to_string(),
            });
        }
        if dn.attrs.is_empty() {
            return Err(Error::FatalInvalidArgs);
        }
        Ok(dn)
    }

    /// Encodes the DN as a DER RDNSequence.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let mut rdns = Vec::with_capacity(self.attrs.len());
        for attr in &self.attrs {
            let mut set = SetOfVec::new();
            set.insert(AttributeTypeAndValue {
                oid: attr.oid,
                value: value_to_any(&attr.value)?,
            })
            .expect("single ATAV per RDN must be unique");
            rdns.push(RelativeDistinguishedName::from(set));
        }
        Ok(RdnSequence(rdns).to_der()?)
    }
}

fn value_to_any(value: &str) -> Result<Any> {
    if is_printable_string(value) {
        Ok(Any::new(Tag::PrintableString, value.as_bytes())?)
    } else {
        Ok(Any::new(Tag::Utf8String, value.as_bytes())?)
    }
}

fn is_printable_string(value: &str) -> bool {
    value.as_bytes().iter().all(|b| {
        b.is_ascii_alphanumeric()
            || matches!(
                *b,
                b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?'
            )
    })
}

/// Parses an ASCII name and returns its DER encoding owned by `arena`.
pub fn ascii_to_der_name<'a>(arena: &'a Arena, ascii: &str) -> Result<&'a [u8]> {
    let der = DistinguishedName::parse(ascii)?.to_der()?;
    Ok(arena.alloc_slice(&der))
}
