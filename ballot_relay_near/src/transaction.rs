use ballot_relay::LedgerError;
use base64::Engine;
use borsh::BorshSerialize;
use sha2::{Digest, Sha256};
use std::io;

/// NEAR key-type tag for ed25519 keys and signatures
pub const ED25519_KEY_TYPE: u8 = 0;

// Position of FunctionCall in NEAR's Action enum
const FUNCTION_CALL_ACTION: u8 = 2;

/// A NEAR public key as it is encoded on the wire
#[derive(BorshSerialize, Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub key_type: u8,
    pub data: [u8; 32],
}

impl PublicKey {
    pub fn ed25519(data: [u8; 32]) -> Self {
        PublicKey {
            key_type: ED25519_KEY_TYPE,
            data,
        }
    }
}

#[derive(BorshSerialize, Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub key_type: u8,
    pub data: [u8; 64],
}

#[derive(BorshSerialize, Clone, Debug, PartialEq, Eq)]
pub struct FunctionCallAction {
    pub method_name: String,
    pub args: Vec<u8>,
    pub gas: u64,
    pub deposit: u128,
}

/// The subset of NEAR actions the relay sends
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    FunctionCall(FunctionCallAction),
}

impl BorshSerialize for Action {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Action::FunctionCall(call) => {
                FUNCTION_CALL_ACTION.serialize(writer)?;
                call.serialize(writer)
            }
        }
    }
}

#[derive(BorshSerialize, Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub signer_id: String,
    pub public_key: PublicKey,
    pub nonce: u64,
    pub receiver_id: String,
    pub block_hash: [u8; 32],
    pub actions: Vec<Action>,
}

impl Transaction {
    /// A transaction with a single function call and no deposit
    pub fn function_call(
        signer_id: &str,
        public_key: PublicKey,
        nonce: u64,
        receiver_id: &str,
        block_hash: [u8; 32],
        method_name: &str,
        args: Vec<u8>,
        gas: u64,
    ) -> Self {
        Transaction {
            signer_id: signer_id.to_owned(),
            public_key,
            nonce,
            receiver_id: receiver_id.to_owned(),
            block_hash,
            actions: vec![Action::FunctionCall(FunctionCallAction {
                method_name: method_name.to_owned(),
                args,
                gas,
                deposit: 0,
            })],
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        borsh::to_vec(self).map_err(|e| LedgerError::MalformedResponse(e.to_string()))
    }

    /// The sha256 of the borsh encoding, which is what gets signed
    pub fn hash(&self) -> Result<[u8; 32], LedgerError> {
        let digest = Sha256::digest(&self.to_bytes()?);
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&digest);
        Ok(hash)
    }
}

#[derive(BorshSerialize, Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: Signature,
}

impl SignedTransaction {
    /// Encode for `broadcast_tx_commit`
    pub fn to_base64(&self) -> Result<String, LedgerError> {
        let bytes =
            borsh::to_vec(self).map_err(|e| LedgerError::MalformedResponse(e.to_string()))?;
        Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
    }
}

/// Decode a base58 block hash
pub fn decode_hash(hash: &str) -> Result<[u8; 32], LedgerError> {
    let bytes = bs58::decode(hash)
        .into_vec()
        .map_err(|e| LedgerError::MalformedResponse(format!("block hash: {}", e)))?;

    if bytes.len() != 32 {
        return Err(LedgerError::MalformedResponse(format!(
            "block hash: expected 32 bytes, got {}",
            bytes.len()
        )));
    }

    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}
