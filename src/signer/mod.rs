pub mod remote;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::address::Address;

/// A transaction ready for signing: every field the node needs except
/// the public key and signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
	pub version: u32,
	pub nonce: u64,
	/// Checksum address without the `0x` prefix.
	pub to_addr: String,
	pub amount: String,
	pub gas_price: String,
	pub gas_limit: String,
	pub code: String,
	pub data: String,
	pub priority: bool,
}

/// The `CreateTransaction` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
	#[serde(flatten)]
	pub tx: UnsignedTransaction,
	pub pub_key: String,
	pub signature: String,
}

/// Produces signed transactions without holding private keys in this
/// process. Implementations delegate to a wallet or signing service
/// that owns the key for [`Signer::address`].
#[async_trait::async_trait]
pub trait Signer: Send + Sync {
	/// The account this signer controls.
	fn address(&self) -> Address;

	async fn sign_transaction(&self, tx: UnsignedTransaction) -> Result<SignedTransaction>;
}
