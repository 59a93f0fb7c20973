//! AES-256-CBC backend built on the RustCrypto `aes` and `cbc` crates.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use super::{Cipher, CipherError, CipherResult, KeyPolicy, BLOCK_SIZE, IV_SIZE};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-256-CBC with PKCS#7 padding and a random IV per encryption.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "aes-cbc")] {
/// use kaspay_lib::cipher::{Aes256CbcCipher, Cipher};
///
/// let cipher = Aes256CbcCipher::new();
/// let key = cipher.generate_key();
/// let blob = cipher.encrypt(&key, b"{}").unwrap();
/// assert_eq!(cipher.decrypt(&key, &blob).unwrap(), b"{}");
/// # }
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Aes256CbcCipher {
    policy: KeyPolicy,
}

impl Aes256CbcCipher {
    /// Create a cipher using the compatible [`KeyPolicy::Fit`] policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cipher with an explicit key policy.
    pub fn with_policy(policy: KeyPolicy) -> Self {
        Self { policy }
    }

    /// The key policy in effect.
    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }
}

impl Cipher for Aes256CbcCipher {
    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> CipherResult<Vec<u8>> {
        let key = self.policy.apply(key)?;

        let mut iv = [0u8; IV_SIZE];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut iv);

        let raw = Aes256CbcEnc::new(&(*key).into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut out = Vec::with_capacity(IV_SIZE + raw.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(&raw);
        Ok(out)
    }

    fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> CipherResult<Vec<u8>> {
        let key = self.policy.apply(key)?;

        // At least one block after the IV, and whole blocks only.
        if ciphertext.len() < IV_SIZE + BLOCK_SIZE || (ciphertext.len() - IV_SIZE) % BLOCK_SIZE != 0
        {
            return Err(CipherError::MalformedCiphertext(ciphertext.len()));
        }

        let (iv, raw) = ciphertext.split_at(IV_SIZE);
        let mut iv_block = [0u8; IV_SIZE];
        iv_block.copy_from_slice(iv);

        Aes256CbcDec::new(&(*key).into(), &iv_block.into())
            .decrypt_padded_vec_mut::<Pkcs7>(raw)
            .map_err(|_| CipherError::BadPadding)
    }
}
