// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/bury

//! Payload encryption, compression, and checksum framing.
//!
//! The payload is everything that follows the header on the wire:
//!
//! ```text
//! [16 bytes] IV             fresh random CBC initialization vector
//! [N bytes ] CIPHERTEXT     AES-128-CBC, PKCS#7 padding
//! [16 bytes] MD5            digest of CIPHERTEXT alone (not IV, not header)
//! ```
//!
//! The plaintext fed to the cipher is, in order: the optional 32-byte
//! filename field, then the message bytes, the whole optionally
//! BZip2-compressed. The MD5 is an unkeyed integrity check: it detects a
//! wrong password or a damaged carrier, it does not authenticate.
//!
//! The cipher key is the first 16 bytes of the 32-byte stretched key; the
//! IV comes from the thread-local CSPRNG and never from the stride PRNG.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};
use rand::RngCore;
use std::io::{Read, Write};
use zeroize::Zeroizing;

use crate::codec::error::{BuryError, Result};
use crate::codec::header::{PARAM_COMPRESSED, PARAM_ENCRYPTED, PARAM_FILENAME};
use crate::codec::keys::DerivedParams;
use crate::codec::options::Options;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// CBC initialization vector length.
pub const IV_LEN: usize = 16;
/// MD5 digest length.
pub const CHECKSUM_LEN: usize = 16;
/// Fixed payload overhead: IV plus checksum.
pub const PAYLOAD_OVERHEAD: usize = IV_LEN + CHECKSUM_LEN;
/// Length of the optional filename field.
pub const FILENAME_LEN: usize = 32;

/// Decompressed plaintext is capped to guard against crafted BZip2 bombs.
const MAX_PLAINTEXT: usize = 64 * 1024 * 1024;

/// A framed payload ready for modulation, plus the MSG_PARAMS flags that
/// describe how to undo it.
pub struct SealedPayload {
    pub msg_params: u8,
    pub payload: Vec<u8>,
}

/// The inverse of [`seal`]: the recovered message and, when one was stored,
/// the trimmed filename.
///
/// The filename comes back as the raw trimmed field bytes. Whether those
/// bytes make an acceptable name is the caller's call; [`validate_filename`]
/// implements the strict check.
#[derive(Debug)]
pub struct OpenedPayload {
    pub message: Vec<u8>,
    pub filename: Option<Vec<u8>>,
}

/// Build the wire payload for a message under the given options.
pub fn seal(message: &[u8], options: &Options, params: &DerivedParams) -> Result<SealedPayload> {
    let mut msg_params = PARAM_ENCRYPTED;

    let mut plaintext = Vec::with_capacity(FILENAME_LEN + message.len());
    if let Some(name) = &options.filename {
        plaintext.extend_from_slice(&filename_field(name));
        msg_params |= PARAM_FILENAME;
    }
    plaintext.extend_from_slice(message);

    let body = if options.compress {
        msg_params |= PARAM_COMPRESSED;
        compress(&plaintext)
    } else {
        plaintext
    };

    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let key = cipher_key(params);
    let ciphertext =
        Aes128CbcEnc::new((&*key).into(), (&iv).into()).encrypt_padded_vec_mut::<Pkcs7>(&body);
    let checksum = Md5::digest(&ciphertext);

    let mut payload = Vec::with_capacity(PAYLOAD_OVERHEAD + ciphertext.len());
    payload.extend_from_slice(&iv);
    payload.extend_from_slice(&ciphertext);
    payload.extend_from_slice(checksum.as_slice());

    Ok(SealedPayload { msg_params, payload })
}

/// Verify, decrypt, decompress, and split a wire payload.
///
/// # Errors
/// - [`BuryError::BadChecksum`] if the payload is truncated or the MD5 over
///   the ciphertext does not match.
/// - [`BuryError::DecryptFailure`] on a padding check failure.
/// - [`BuryError::DecompressFailure`] on a malformed BZip2 stream.
/// - [`BuryError::FilenameInvalid`] if the plaintext is too short to hold
///   the filename field the flags promise.
pub fn open(payload: &[u8], msg_params: u8, params: &DerivedParams) -> Result<OpenedPayload> {
    if payload.len() < PAYLOAD_OVERHEAD {
        return Err(BuryError::BadChecksum);
    }
    let iv: [u8; IV_LEN] = payload[..IV_LEN].try_into().unwrap();
    let ciphertext = &payload[IV_LEN..payload.len() - CHECKSUM_LEN];
    let stored = &payload[payload.len() - CHECKSUM_LEN..];

    if Md5::digest(ciphertext).as_slice() != stored {
        return Err(BuryError::BadChecksum);
    }

    let key = cipher_key(params);
    let body = Aes128CbcDec::new((&*key).into(), (&iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| BuryError::DecryptFailure)?;

    let plaintext = if msg_params & PARAM_COMPRESSED != 0 { decompress(&body)? } else { body };

    if msg_params & PARAM_FILENAME == 0 {
        return Ok(OpenedPayload { message: plaintext, filename: None });
    }

    if plaintext.len() < FILENAME_LEN {
        return Err(BuryError::FilenameInvalid);
    }
    let (field, message) = plaintext.split_at(FILENAME_LEN);
    let filename = trim_spaces(field).to_vec();
    Ok(OpenedPayload { message: message.to_vec(), filename: Some(filename) })
}

/// Strict filename check for callers that intend to write the file out:
/// ASCII only, no path separators, not empty. Decode never applies this
/// itself; it hands back the trimmed field bytes as-is.
pub fn validate_filename(name: &[u8]) -> Result<()> {
    if name.is_empty()
        || !name.is_ascii()
        || name.contains(&b'/')
        || name.contains(&b'\\')
        || name.contains(&b'\0')
    {
        return Err(BuryError::FilenameInvalid);
    }
    Ok(())
}

fn cipher_key(params: &DerivedParams) -> Zeroizing<[u8; 16]> {
    let mut key = Zeroizing::new([0u8; 16]);
    key.copy_from_slice(&params.cipher_key()[..16]);
    key
}

/// Fit a filename into the fixed 32-byte field: left-pad with spaces, and on
/// truncation keep the last 32 bytes so the extension survives.
fn filename_field(name: &str) -> [u8; FILENAME_LEN] {
    let bytes = name.as_bytes();
    let mut field = [b' '; FILENAME_LEN];
    if bytes.len() >= FILENAME_LEN {
        field.copy_from_slice(&bytes[bytes.len() - FILENAME_LEN..]);
    } else {
        field[FILENAME_LEN - bytes.len()..].copy_from_slice(bytes);
    }
    field
}

/// Strip leading and trailing ASCII spaces only; inner spaces are part of
/// the name.
fn trim_spaces(field: &[u8]) -> &[u8] {
    let start = field.iter().position(|&b| b != b' ').unwrap_or(field.len());
    let end = field.iter().rposition(|&b| b != b' ').map_or(start, |i| i + 1);
    &field[start..end]
}

fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
    encoder.write_all(data).expect("BZip2 compression should not fail");
    encoder.finish().expect("BZip2 compression should not fail")
}

fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let decoder = bzip2::read::BzDecoder::new(data);
    decoder
        .take(MAX_PLAINTEXT as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|_| BuryError::DecompressFailure)?;
    if out.len() > MAX_PLAINTEXT {
        return Err(BuryError::DecompressFailure);
    }
    Ok(out)
}
