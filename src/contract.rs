use anyhow::Result;
use serde_json::Value;

use crate::address::Address;
use crate::chain::Chain;
use crate::params::{Param, TxParams};
use crate::receipt::Transaction;

/// Handle to a contract already deployed at `address`.
pub struct DeployedContract<C> {
	chain: C,
	address: Address,
}

impl<C: Chain> DeployedContract<C> {
	pub fn at(chain: C, address: Address) -> Self {
		Self { chain, address }
	}

	/// Deploy `code` and return a handle to the new contract along with
	/// the deploy transaction.
	pub async fn deploy(
		chain: C,
		code: &str,
		init: &[Param],
		params: TxParams,
	) -> Result<(Transaction, Self)> {
		let (tx, address) = chain.deploy(code, init, params).await?;
		tracing::info!(contract = %address, success = tx.receipt.success, "contract deployed");
		Ok((tx, Self { chain, address }))
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn chain(&self) -> &C {
		&self.chain
	}

	pub fn chain_mut(&mut self) -> &mut C {
		&mut self.chain
	}

	pub async fn call(&self, tag: &str, args: &[Param], params: TxParams) -> Result<Transaction> {
		self.chain.call(&self.address, tag, args, params).await
	}

	/// Read one field; the node wraps it as `{field: value}`.
	pub async fn get_sub_state(&self, field: &str) -> Result<Option<Value>> {
		self.chain.sub_state(&self.address, field, &[]).await
	}

	pub async fn get_state(&self) -> Result<Value> {
		self.chain.state(&self.address).await
	}
}
