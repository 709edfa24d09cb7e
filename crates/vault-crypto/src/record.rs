//! Password-field handling for [`VaultItem`] records on the write and read paths.
//!
//! Writes are strict: a record is never stored with a half-protected
//! password. Reads are fault-tolerant: a record whose payload cannot be
//! decrypted is shown with an empty password instead of failing the listing.

use common::{SecretsError, VaultItem};

use crate::crypto::PayloadCodec;

/// Encrypt `item.password` before the record is written.
///
/// # Errors
///
/// Propagates every [`PayloadCodec::encrypt`] error, including
/// [`SecretsError::AlreadyEncrypted`] when a caller resubmits a stored payload.
pub fn protect(codec: &PayloadCodec, mut item: VaultItem) -> Result<VaultItem, SecretsError> {
    item.password = codec.encrypt(&item.password)?;
    Ok(item)
}

/// Apply a password change to a stored record.
///
/// `None` keeps the stored (already protected) value; `Some` replaces it with
/// the encryption of the new plaintext.
///
/// # Errors
///
/// Same as [`protect`].
pub fn update_password(
    codec: &PayloadCodec,
    current: &mut VaultItem,
    new_password: Option<&str>,
) -> Result<(), SecretsError> {
    if let Some(plaintext) = new_password {
        current.password = codec.encrypt(plaintext)?;
    }
    Ok(())
}

/// Decrypt `item.password` for display, substituting `""` on failure.
pub fn reveal(codec: &PayloadCodec, mut item: VaultItem) -> VaultItem {
    item.password = codec.decrypt_safe(&item.password);
    item
}

/// [`reveal`] every record in a listing.
pub fn reveal_all(codec: &PayloadCodec, items: impl IntoIterator<Item = VaultItem>) -> Vec<VaultItem> {
    items.into_iter().map(|item| reveal(codec, item)).collect()
}
