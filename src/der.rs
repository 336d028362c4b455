// pkix-rs: PKIX path building and test artifact synthesis
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Deterministic DER synthesis.
//!
//! Every emitter produces canonical DER: definite lengths in their shortest
//! form and BOOLEAN as `0x00`/`0xFF`. The encoders deliberately offer knobs
//! (bit-string corruption, byte-pattern tampering) for manufacturing invalid
//! artifacts with surgical precision.

use crate::alg::DigestAlgorithm;
use crate::arena::Arena;
use crate::error::{Error, Result};
use crate::input::Input;
use crate::time::{Time, explode};
use const_oid::ObjectIdentifier;
use std::sync::atomic::{AtomicUsize, Ordering};

/// ASN.1 tag bytes used by the synthesis engine.
pub mod tag {
    pub const BOOLEAN: u8 = 0x01;
    pub const INTEGER: u8 = 0x02;
    pub const BIT_STRING: u8 = 0x03;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OID: u8 = 0x06;
    pub const ENUMERATED: u8 = 0x0a;
    pub const UTC_TIME: u8 = 0x17;
    pub const GENERALIZED_TIME: u8 = 0x18;
    pub const SEQUENCE: u8 = 0x30;
    pub const CONSTRUCTED: u8 = 0x20;
    pub const CONTEXT_SPECIFIC: u8 = 0x80;
}

/// Maximum number of children one [`Output`] accepts before squashing.
pub const MAX_OUTPUT_ITEMS: usize = 10;

/// Maximum total content length one [`Output`] accepts, in bytes.
pub const MAX_OUTPUT_LENGTH: usize = 65_535;

/// Whether an X.509 extension is marked critical.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtensionCriticality {
    Critical,
    NotCritical,
}

/// A scratch list of already-encoded children awaiting a tag and length.
///
/// Children are borrowed, never copied into the scratch; they must stay
/// alive until [`Output::squash`] concatenates them into a fresh arena
/// buffer behind the chosen tag.
#[derive(Default)]
pub struct Output<'a> {
    items: Vec<Input<'a>>,
    length: usize,
}

impl<'a> Output<'a> {
    /// Creates an empty scratch list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one already-encoded child.
    pub fn add(&mut self, item: &'a [u8]) -> Result<()> {
        if self.items.len() >= MAX_OUTPUT_ITEMS {
            return Err(Error::FatalInvalidArgs);
        }
        if self.length + item.len() > MAX_OUTPUT_LENGTH {
            return Err(Error::FatalInvalidArgs);
        }
        self.items.push(Input::from(item));
        self.length += item.len();
        Ok(())
    }

    /// Concatenates the children behind `tag` and a shortest-form length,
    /// into a buffer owned by `arena`.
    pub fn squash<'x>(&self, arena: &'x Arena, tag: u8) -> Result<&'x [u8]> {
        let length_length = if self.length < 128 {
            1
        } else if self.length < 256 {
            2
        } else {
            3
        };
        let buf = arena.alloc_zeroed(1 + length_length + self.length);
        buf[0] = tag;
        match length_length {
            1 => buf[1] = self.length as u8,
            2 => {
                buf[1] = 0x81;
                buf[2] = self.length as u8;
            }
            _ => {
                buf[1] = 0x82;
                buf[2] = (self.length / 256) as u8;
                buf[3] = (self.length % 256) as u8;
            }
        }
        let mut at = 1 + length_length;
        for item in &self.items {
            buf[at..at + item.len()].copy_from_slice(item.as_slice());
            at += item.len();
        }
        Ok(&*buf)
    }
}

/// Wraps `inner` in a single outer TLV with the given tag.
pub fn encode_nested<'a>(arena: &'a Arena, tag: u8, inner: &[u8]) -> Result<&'a [u8]> {
    let mut output = Output::new();
    output.add(inner)?;
    output.squash(arena, tag)
}

/// Encodes a BOOLEAN as the canonical three bytes.
pub fn boolean(arena: &Arena, value: bool) -> &[u8] {
    arena.alloc_slice(&[tag::BOOLEAN, 1, if value { 0xff } else { 0x00 }])
}

/// Encodes a small non-negative INTEGER (three bytes).
///
/// Values outside `0..=127` are a caller error; nothing in the test
/// corpus needs multi-byte integers.
pub fn integer(arena: &Arena, value: i64) -> Result<&[u8]> {
    if !(0..=127).contains(&value) {
        return Err(Error::FatalInvalidArgs);
    }
    Ok(arena.alloc_slice(&[tag::INTEGER, 1, value as u8]))
}

/// Encodes an OBJECT IDENTIFIER from the registry type.
pub fn oid<'a>(arena: &'a Arena, value: &ObjectIdentifier) -> Result<&'a [u8]> {
    encode_nested(arena, tag::OID, value.as_bytes())
}

/// Encodes an ASN.1 NULL.
pub fn null(arena: &Arena) -> &[u8] {
    arena.alloc_slice(&[tag::NULL, 0])
}

/// Encodes a BIT STRING with zero unused bits.
///
/// With `corrupt` set, one bit inside the payload is flipped, which is how
/// forged signatures are manufactured.
pub fn bit_string<'a>(arena: &'a Arena, raw_bytes: &[u8], corrupt: bool) -> Result<&'a [u8]> {
    let prefixed = arena.alloc_zeroed(raw_bytes.len() + 1);
    prefixed[0] = 0; // no unused bits
    prefixed[1..].copy_from_slice(raw_bytes);
    if corrupt {
        if prefixed.len() <= 8 {
            return Err(Error::FatalInvalidArgs);
        }
        prefixed[8] ^= 0x01;
    }
    encode_nested(arena, tag::BIT_STRING, prefixed)
}

/// Digests `bytes` under `hash` and wraps the digest as an OCTET STRING.
pub fn hashed_octet_string<'a>(
    arena: &'a Arena,
    bytes: &[u8],
    hash: DigestAlgorithm,
) -> Result<&'a [u8]> {
    let digest = hash.digest(bytes);
    encode_nested(arena, tag::OCTET_STRING, &digest)
}

/// Encodes an AlgorithmIdentifier with explicit NULL parameters.
pub fn algorithm_identifier<'a>(
    arena: &'a Arena,
    algorithm: &ObjectIdentifier,
) -> Result<&'a [u8]> {
    let mut output = Output::new();
    output.add(oid(arena, algorithm)?)?;
    output.add(null(arena))?;
    output.squash(arena, tag::SEQUENCE)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TimeEncoding {
    UtcTime,
    GeneralizedTime,
}

fn time_to_encoded_time(arena: &Arena, time: Time, encoding: TimeEncoding) -> Result<&[u8]> {
    let mut exploded = explode(time);
    if exploded.second >= 60 {
        // round down for leap seconds
        exploded.second = 59;
    }
    match encoding {
        TimeEncoding::UtcTime => {
            if !(1950..2050).contains(&exploded.year) {
                return Err(Error::FatalInvalidArgs);
            }
        }
        TimeEncoding::GeneralizedTime => {
            if exploded.year > 9999 {
                return Err(Error::FatalInvalidArgs);
            }
        }
    }

    let total = if encoding == TimeEncoding::UtcTime {
        15
    } else {
        17
    };
    let buf = arena.alloc_zeroed(total);
    buf[0] = if encoding == TimeEncoding::GeneralizedTime {
        tag::GENERALIZED_TIME
    } else {
        tag::UTC_TIME
    };
    buf[1] = (total - 2) as u8;

    let mut i = 2;
    if encoding == TimeEncoding::GeneralizedTime {
        buf[i] = b'0' + (exploded.year / 1000) as u8;
        buf[i + 1] = b'0' + ((exploded.year % 1000) / 100) as u8;
        i += 2;
    }
    buf[i] = b'0' + ((exploded.year % 100) / 10) as u8;
    buf[i + 1] = b'0' + (exploded.year % 10) as u8;
    buf[i + 2] = b'0' + exploded.month / 10;
    buf[i + 3] = b'0' + exploded.month % 10;
    buf[i + 4] = b'0' + exploded.day / 10;
    buf[i + 5] = b'0' + exploded.day % 10;
    buf[i + 6] = b'0' + exploded.hour / 10;
    buf[i + 7] = b'0' + exploded.hour % 10;
    buf[i + 8] = b'0' + exploded.minute / 10;
    buf[i + 9] = b'0' + exploded.minute % 10;
    buf[i + 10] = b'0' + exploded.second / 10;
    buf[i + 11] = b'0' + exploded.second % 10;
    buf[i + 12] = b'Z';
    Ok(&*buf)
}

/// Encodes a GeneralizedTime (`YYYYMMDDHHMMSSZ`).
pub fn time_to_generalized_time(arena: &Arena, time: Time) -> Result<&[u8]> {
    time_to_encoded_time(arena, time, TimeEncoding::GeneralizedTime)
}

/// Encodes the RFC 5280 Time CHOICE: UTCTime for years `[1950, 2050)`,
/// GeneralizedTime otherwise.
pub fn time_to_time_choice(arena: &Arena, time: Time) -> Result<&[u8]> {
    let encoding = if (1950..2050).contains(&explode(time).year) {
        TimeEncoding::UtcTime
    } else {
        TimeEncoding::GeneralizedTime
    };
    time_to_encoded_time(arena, time, encoding)
}

/// Encodes an X.509 Extension SEQUENCE.
///
/// `value` holds the extension's inner children; they are squashed into one
/// SEQUENCE that becomes the OCTET STRING extnValue payload.
pub fn extension<'a>(
    arena: &'a Arena,
    extension_oid: &ObjectIdentifier,
    criticality: ExtensionCriticality,
    value: &Output<'_>,
) -> Result<&'a [u8]> {
    let mut output = Output::new();
    output.add(oid(arena, extension_oid)?)?;
    if criticality == ExtensionCriticality::Critical {
        output.add(boolean(arena, true))?;
    }
    let value_bytes = value.squash(arena, tag::SEQUENCE)?;
    output.add(encode_nested(arena, tag::OCTET_STRING, value_bytes)?)?;
    output.squash(arena, tag::SEQUENCE)
}

/// Overwrites exactly one occurrence of `from` inside `blob` with `to`.
///
/// Patterns must be at least eight bytes and of equal length; zero or more
/// than one occurrence is a fatal error, so a test that tampers a field
/// knows it changed precisely that field.
pub fn tamper_once(blob: &mut [u8], from: &[u8], to: &[u8]) -> Result<()> {
    if from.len() != to.len() || from.len() < 8 {
        return Err(Error::FatalInvalidArgs);
    }
    let mut found: Option<usize> = None;
    let mut at = 0;
    while at + from.len() <= blob.len() {
        if &blob[at..at + from.len()] == from {
            if found.is_some() {
                return Err(Error::FatalInvalidArgs);
            }
            found = Some(at);
            at += from.len();
        } else {
            at += 1;
        }
    }
    match found {
        Some(at) => {
            blob[at..at + to.len()].copy_from_slice(to);
            Ok(())
        }
        None => Err(Error::FatalInvalidArgs),
    }
}

static LOG_FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Environment variable naming the directory for the debug file sink.
pub const LOG_DIR_ENV: &str = "PKIX_TEST_LOG_DIR";

/// Writes `result` to `NNN-<suffix>.der` under [`LOG_DIR_ENV`] if that
/// variable is set, and hands `result` back either way.
///
/// The file counter is process-global and NOT thread-safe with respect to
/// ordering of concurrently emitted artifacts.
pub(crate) fn maybe_log_output<'a>(result: &'a [u8], suffix: &str) -> &'a [u8] {
    if let Ok(dir) = std::env::var(LOG_DIR_ENV) {
        let counter = LOG_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::path::Path::new(&dir).join(format!("{counter}-{suffix}.der"));
        // Logging is best effort; an unwritable directory must not fail the
        // encode itself.
        let _ = std::fs::write(path, result);
    }
    result
}
