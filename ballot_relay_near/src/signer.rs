use crate::transaction::{PublicKey, Signature, SignedTransaction, Transaction, ED25519_KEY_TYPE};
use ballot_relay::LedgerError;
use ed25519_dalek::{Keypair, Signer as _};
use std::fmt;

const ED25519_PREFIX: &str = "ed25519:";

/// The relay account and the key it signs with
pub struct Signer {
    account_id: String,
    keypair: Keypair,
}

impl Signer {
    /// Parse a NEAR secret key string (`ed25519:<base58>`).
    ///
    /// The key may hold the 32-byte seed alone or the 64-byte seed + public key pair, in which
    /// case the public half must match the seed.
    pub fn from_secret_key(account_id: &str, secret_key: &str) -> Result<Self, LedgerError> {
        let encoded = secret_key
            .strip_prefix(ED25519_PREFIX)
            .ok_or_else(|| LedgerError::SignerKey("only ed25519 keys are supported".to_owned()))?;

        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| LedgerError::SignerKey(e.to_string()))?;
        if bytes.len() != 32 && bytes.len() != 64 {
            return Err(LedgerError::SignerKey(format!(
                "expected 32 or 64 key bytes, got {}",
                bytes.len()
            )));
        }

        let secret = ed25519_dalek::SecretKey::from_bytes(&bytes[..32])
            .map_err(|e| LedgerError::SignerKey(e.to_string()))?;
        let public: ed25519_dalek::PublicKey = (&secret).into();

        if bytes.len() == 64 && public.as_bytes()[..] != bytes[32..] {
            return Err(LedgerError::SignerKey(
                "public key does not match secret key".to_owned(),
            ));
        }

        Ok(Signer {
            account_id: account_id.to_owned(),
            keypair: Keypair { secret, public },
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::ed25519(self.keypair.public.to_bytes())
    }

    /// The public key in NEAR's text format, as used by RPC queries
    pub fn public_key_string(&self) -> String {
        format!(
            "{}{}",
            ED25519_PREFIX,
            bs58::encode(self.keypair.public.as_bytes()).into_string()
        )
    }

    pub fn sign(&self, transaction: Transaction) -> Result<SignedTransaction, LedgerError> {
        let hash = transaction.hash()?;
        let signature = self.keypair.sign(&hash);

        Ok(SignedTransaction {
            transaction,
            signature: Signature {
                key_type: ED25519_KEY_TYPE,
                data: signature.to_bytes(),
            },
        })
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Signer")
            .field("account_id", &self.account_id)
            .field("public_key", &self.public_key_string())
            .finish()
    }
}
