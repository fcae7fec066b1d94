use super::PdfDocument;
use crate::error::CliError;
use anyhow::{Context, Result};
use lopdf::encryption::PasswordAlgorithm;
use lopdf::{
    decode_text_string, Document, EncryptionState, EncryptionVersion, Object, Permissions,
    StringFormat,
};
use md5::Md5;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info, instrument};

/// RC4 key length used unless the 40-bit scheme is requested.
const KEY_LENGTH: usize = 128;

/// Password padding string from the standard security handler.
const PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

/// Encrypt `doc` with RC4. The owner password defaults to the user password.
///
/// `seed` feeds the file identifier the key derivation needs when the
/// document does not carry one yet.
#[instrument(skip_all, fields(use_40bit = use_40bit))]
pub fn encrypt(
    doc: &mut Document,
    user_password: &str,
    owner_password: Option<&str>,
    use_40bit: bool,
    seed: &[u8],
) -> Result<()> {
    ensure_file_id(doc, seed);
    let owner_password = owner_password.unwrap_or(user_password);

    let version = if use_40bit {
        EncryptionVersion::V1 {
            document: &*doc,
            owner_password,
            user_password,
            permissions: Permissions::all(),
        }
    } else {
        EncryptionVersion::V2 {
            document: &*doc,
            owner_password,
            user_password,
            key_length: KEY_LENGTH,
            permissions: Permissions::all(),
        }
    };
    let state = EncryptionState::try_from(version).context("Failed to set up encryption")?;
    doc.encrypt(&state).context("Failed to encrypt document")?;
    let bits = if use_40bit { 40 } else { KEY_LENGTH };
    info!(bits, "encrypted document");
    Ok(())
}

/// Open an encrypted file and decrypt it with `password`, which may be
/// either the user or the owner password.
///
/// Files encrypted with an empty user password open with any password.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn decrypt<P: AsRef<Path>>(path: P, password: &str) -> Result<PdfDocument> {
    let pdf = PdfDocument::load(&path)?;
    if !pdf.is_encrypted() {
        anyhow::bail!(CliError::bad_usage("File is not encrypted."));
    }
    if !pdf.is_locked() {
        debug!("opened without a password");
        return Ok(pdf);
    }

    if pdf.doc.authenticate_user_password(password).is_ok() {
        return PdfDocument::open_with_password(path, password);
    }
    if pdf.doc.authenticate_owner_password(password).is_err() {
        anyhow::bail!(CliError::bad_parameter("Wrong password."));
    }

    // The file key derives from the user password only.
    debug!("owner password accepted");
    let user_password = user_password_from_owner(&pdf.doc, password)?;
    if pdf.doc.authenticate_user_password(&user_password).is_err() {
        anyhow::bail!(CliError::bad_parameter(
            "User password cannot be recovered from the owner password."
        ));
    }
    PdfDocument::open_with_password(path, &user_password)
}

/// Recover the user password from the `/O` entry (revisions 2 to 4).
fn user_password_from_owner(doc: &Document, owner_password: &str) -> Result<String> {
    let encrypt = doc.get_encrypted().context("Missing encryption dictionary")?;
    let revision = encrypt.get(b"R").and_then(Object::as_i64)?;
    let owner_value = encrypt.get(b"O").and_then(Object::as_str)?;
    let key_length = match revision {
        2 => 5,
        3 | 4 => encrypt
            .get(b"Length")
            .and_then(Object::as_i64)
            .map_or(5, |bits| (bits / 8) as usize),
        _ => anyhow::bail!(CliError::bad_parameter(format!(
            "Owner password decryption is not supported for revision {revision}."
        ))),
    };
    if !(5..=16).contains(&key_length) {
        anyhow::bail!("Invalid encryption key length: {key_length} bytes");
    }

    let owner = PasswordAlgorithm::try_from(doc)?.sanitize_password(owner_password)?;
    let len = owner.len().min(32);
    let mut hash = Md5::new()
        .chain_update(&owner[..len])
        .chain_update(&PADDING[..32 - len])
        .finalize();
    if revision >= 3 {
        for _ in 0..50 {
            hash = Md5::digest(hash);
        }
    }
    let key = &hash[..key_length];

    let mut user = owner_value.to_vec();
    if revision >= 3 {
        for round in (1..=19u8).rev() {
            let round_key: Vec<u8> = key.iter().map(|b| b ^ round).collect();
            user = rc4(&round_key, &user);
        }
    }
    user = rc4(key, &user);

    let end = (0..=user.len())
        .find(|&i| PADDING.starts_with(&user[i..]))
        .unwrap_or(user.len());
    user.truncate(end);
    Ok(decode_text_string(&Object::string_literal(user))?)
}

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut state: Vec<u8> = (0..=255).collect();
    let mut j = 0u8;
    for i in 0..256 {
        j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
        state.swap(i, j as usize);
    }

    let (mut i, mut j) = (0u8, 0u8);
    data.iter()
        .map(|byte| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(state[i as usize]);
            state.swap(i as usize, j as usize);
            let k = state[state[i as usize].wrapping_add(state[j as usize]) as usize];
            byte ^ k
        })
        .collect()
}

/// Give the document a file identifier derived from `seed` if it has none.
fn ensure_file_id(doc: &mut Document, seed: &[u8]) {
    let has_id = doc
        .trailer
        .get(b"ID")
        .and_then(Object::as_array)
        .is_ok_and(|id| !id.is_empty());
    if has_id {
        return;
    }

    let digest = Sha256::digest(seed);
    let id = Object::String(digest[..16].to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("ID", vec![id.clone(), id]);
}
