//! Ed25519 keypairs and payment signing.
//!
//! # Signing scheme
//!
//! A payment is signed over
//!
//! ```text
//! SHA-256( SHA-256(network passphrase) || bincode(PaymentTransaction) )
//! ```
//!
//! Prefixing the network id keeps a testnet signature from being valid on
//! any other network. The resulting 32-byte digest doubles as the
//! transaction hash reported to the user.

use ed25519_dalek::{Signer, Verifier};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::strkey::{self, KeyKind};
use crate::types::{PaymentTransaction, SignedPayment};

/// Ed25519 keypair.
///
/// Wraps [`ed25519_dalek::SigningKey`], which zeroizes its secret on drop.
/// `Debug` shows only the account id.
pub struct KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl KeyPair {
    /// Generate a random keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Create a keypair from raw 32-byte seed material.
    pub fn from_seed_bytes(bytes: [u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(&bytes),
        }
    }

    /// Parse an `S…` secret seed.
    pub fn from_secret_seed(seed: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(
            strkey::decode(KeyKind::Seed, seed).map_err(CryptoError::InvalidSecret)?,
        );
        Ok(Self::from_seed_bytes(*bytes))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// The `G…` account id derived from this keypair.
    pub fn account_id(&self) -> String {
        self.public_key().account_id()
    }

    /// The `S…` secret seed. Handle with care.
    pub fn secret_seed(&self) -> Zeroizing<String> {
        let bytes = Zeroizing::new(self.signing_key.to_bytes());
        Zeroizing::new(strkey::encode(KeyKind::Seed, &bytes))
    }

    /// Sign a message, returning the raw 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("account_id", &self.account_id())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: ed25519_dalek::VerifyingKey,
}

impl PublicKey {
    /// Parse a `G…` account id.
    pub fn from_account_id(account_id: &str) -> Result<Self, CryptoError> {
        let bytes =
            strkey::decode(KeyKind::AccountId, account_id).map_err(CryptoError::InvalidAccountId)?;
        let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { verifying_key })
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    pub fn account_id(&self) -> String {
        strkey::encode(KeyKind::AccountId, &self.to_bytes())
    }

    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> Result<(), CryptoError> {
        let sig = ed25519_dalek::Signature::from_bytes(signature);
        self.verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.account_id())
    }
}

/// SHA-256 of the network passphrase.
pub fn network_id(passphrase: &str) -> [u8; 32] {
    Sha256::digest(passphrase.as_bytes()).into()
}

/// Compute the signing hash of a transaction on the given network.
pub fn transaction_hash(
    tx: &PaymentTransaction,
    passphrase: &str,
) -> Result<[u8; 32], CryptoError> {
    let body = bincode::encode_to_vec(tx, bincode::config::standard())
        .map_err(|e| CryptoError::Serialization(e.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(network_id(passphrase));
    hasher.update(&body);
    Ok(hasher.finalize().into())
}

/// Sign a payment transaction with the source account's keypair.
pub fn sign_payment(
    tx: PaymentTransaction,
    keypair: &KeyPair,
    passphrase: &str,
) -> Result<SignedPayment, CryptoError> {
    let hash = transaction_hash(&tx, passphrase)?;
    let signature = keypair.sign(&hash);
    Ok(SignedPayment {
        transaction: tx,
        hash,
        signature,
        signer: keypair.account_id(),
    })
}

/// Verify that a signed payment was signed by its declared signer on `passphrase`.
pub fn verify_payment(signed: &SignedPayment, passphrase: &str) -> Result<(), CryptoError> {
    let hash = transaction_hash(&signed.transaction, passphrase)?;
    if hash != signed.hash {
        return Err(CryptoError::VerificationFailed);
    }
    PublicKey::from_account_id(&signed.signer)?.verify(&hash, &signed.signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::constants::{PUBLIC_PASSPHRASE, TESTNET_PASSPHRASE};
    use crate::types::{Asset, PaymentOperation};

    const SEED_7: &str = "SADQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQP54X";
    const ACCOUNT_7: &str = "GDVEU3DD4KOFECV66VIHWEZOYX4ZKR3WV27L464SIIPOU2IUI3JCZA57";

    fn sample_tx(source: &str) -> PaymentTransaction {
        PaymentTransaction {
            source: source.to_string(),
            sequence: 101,
            fee: 100,
            valid_until: 1_700_000_030,
            memo: Some("hello".into()),
            operation: PaymentOperation {
                destination: "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF".into(),
                asset: Asset::Native,
                amount: Amount::from_stroops(250_000_000),
            },
        }
    }

    #[test]
    fn seed_derives_known_account() {
        let kp = KeyPair::from_secret_seed(SEED_7).unwrap();
        assert_eq!(kp.account_id(), ACCOUNT_7);
        assert_eq!(kp.secret_seed().as_str(), SEED_7);
    }

    #[test]
    fn account_id_is_not_a_seed() {
        let err = KeyPair::from_secret_seed(ACCOUNT_7).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSecret(_)));
    }

    #[test]
    fn generated_keys_are_distinct() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        assert_ne!(a.account_id(), b.account_id());
        assert!(a.account_id().starts_with('G'));
        assert!(a.secret_seed().starts_with('S'));
    }

    #[test]
    fn debug_hides_secret() {
        let kp = KeyPair::from_secret_seed(SEED_7).unwrap();
        let dbg = format!("{kp:?}");
        assert!(dbg.contains(ACCOUNT_7));
        assert!(!dbg.contains(SEED_7));
    }

    #[test]
    fn sign_and_verify_payment() {
        let kp = KeyPair::from_secret_seed(SEED_7).unwrap();
        let signed = sign_payment(sample_tx(ACCOUNT_7), &kp, TESTNET_PASSPHRASE).unwrap();
        assert_eq!(signed.signer, ACCOUNT_7);
        assert!(verify_payment(&signed, TESTNET_PASSPHRASE).is_ok());
    }

    #[test]
    fn signature_is_bound_to_network() {
        let kp = KeyPair::from_secret_seed(SEED_7).unwrap();
        let signed = sign_payment(sample_tx(ACCOUNT_7), &kp, TESTNET_PASSPHRASE).unwrap();
        assert_eq!(
            verify_payment(&signed, PUBLIC_PASSPHRASE),
            Err(CryptoError::VerificationFailed)
        );
    }

    #[test]
    fn tampered_payment_fails_verification() {
        let kp = KeyPair::from_secret_seed(SEED_7).unwrap();
        let mut signed = sign_payment(sample_tx(ACCOUNT_7), &kp, TESTNET_PASSPHRASE).unwrap();
        signed.transaction.operation.amount = Amount::from_stroops(1);
        assert!(verify_payment(&signed, TESTNET_PASSPHRASE).is_err());
    }

    #[test]
    fn hash_changes_with_sequence() {
        let a = sample_tx(ACCOUNT_7);
        let mut b = a.clone();
        b.sequence += 1;
        assert_ne!(
            transaction_hash(&a, TESTNET_PASSPHRASE).unwrap(),
            transaction_hash(&b, TESTNET_PASSPHRASE).unwrap()
        );
    }
}
