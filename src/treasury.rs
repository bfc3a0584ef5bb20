use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;

use crate::address::Address;
use crate::chain::Chain;
use crate::contract::DeployedContract;
use crate::params::{pack_version, Param, TxParams, DEPLOY_GAS_LIMIT, MSG_VERSION};
use crate::receipt::{Receipt, Transaction};
use crate::signer::Signer;

/// Immutable parameters the Treasury contract is deployed with.
#[derive(Debug, Clone)]
pub struct TreasuryInit {
	pub admin: Address,
	pub company: Address,
	pub proxy: Address,
	pub token: Address,
	/// Initial token price.
	pub base_value: u128,
}

impl TreasuryInit {
	/// Init with every role held by one account.
	pub fn owned_by(account: Address, base_value: u128) -> Self {
		Self {
			admin: account,
			company: account,
			proxy: account,
			token: account,
			base_value,
		}
	}

	pub fn to_params(&self) -> Vec<Param> {
		vec![
			Param::uint32("_scilla_version", 0),
			Param::by_str20("init_admin", &self.admin),
			Param::by_str20("init_company", &self.company),
			Param::by_str20("proxy_address", &self.proxy),
			Param::by_str20("token_address", &self.token),
			Param::uint256("base_value", self.base_value),
		]
	}
}

/// Client wrapper around a deployed Treasury contract.
///
/// Every transition method sends exactly one transaction and hands back
/// its receipt. A receipt with `success == false` is a normal return;
/// only transport, signing or node errors surface as `Err`.
pub struct TreasuryApi<C> {
	treasury: DeployedContract<C>,
	chain_id: u32,
	version: u32,
	params_default: TxParams,
}

impl<C: Chain> TreasuryApi<C> {
	/// Fails if `chain_id` does not fit the 16-bit half of the version tag.
	pub fn new(treasury: DeployedContract<C>, chain_id: u32) -> Result<Self> {
		Ok(Self {
			treasury,
			chain_id,
			version: pack_version(chain_id, MSG_VERSION)?,
			params_default: TxParams::for_chain(chain_id)?,
		})
	}

	/// Deploy a fresh Treasury contract and wrap it.
	pub async fn deploy(
		chain: C,
		chain_id: u32,
		code: &str,
		init: &TreasuryInit,
	) -> Result<(Transaction, Self)> {
		let params = TxParams::for_chain(chain_id)?.with_gas_limit(DEPLOY_GAS_LIMIT);
		let (tx, contract) = DeployedContract::deploy(chain, code, &init.to_params(), params).await?;
		Ok((tx, Self::new(contract, chain_id)?))
	}

	pub fn contract(&self) -> &DeployedContract<C> {
		&self.treasury
	}

	pub fn address(&self) -> Address {
		self.treasury.address()
	}

	pub fn chain_id(&self) -> u32 {
		self.chain_id
	}

	pub fn version(&self) -> u32 {
		self.version
	}

	/// Copy of the default transaction parameters.
	pub fn params(&self) -> TxParams {
		self.params_default
	}

	pub fn params_with_amount(&self, amount: u128) -> TxParams {
		self.params_default.with_amount(amount)
	}

	/// Switch the key used for later transitions.
	pub fn set_signer(&mut self, signer: Box<dyn Signer>) {
		self.treasury.chain_mut().set_signer(signer);
	}

	// -- Transitions --

	pub async fn pause(&self) -> Result<Receipt> {
		self.invoke("Pause", vec![], self.params()).await
	}

	pub async fn unpause(&self) -> Result<Receipt> {
		self.invoke("Unpause", vec![], self.params()).await
	}

	pub async fn change_admin(&self, new_admin: &Address) -> Result<Receipt> {
		let args = vec![Param::by_str20("newAdmin", new_admin)];
		self.invoke("ChangeAdmin", args, self.params()).await
	}

	pub async fn change_company(&self, new_company: &Address) -> Result<Receipt> {
		let args = vec![Param::by_str20("newCompany", new_company)];
		self.invoke("ChangeCompany", args, self.params()).await
	}

	/// Buy tokens with `zil_amount` Qa attached to the call.
	pub async fn buy_tokens(&self, zil_amount: u128) -> Result<Receipt> {
		self.invoke("buyTokens", vec![], self.params_with_amount(zil_amount))
			.await
	}

	pub async fn sell_tokens(&self, tokens: u128) -> Result<Receipt> {
		let args = vec![Param::uint256("tokens", tokens)];
		self.invoke("sellTokens", args, self.params()).await
	}

	pub async fn create_debt(&self, debtor: &Address, amount: u128) -> Result<Receipt> {
		let args = vec![
			Param::by_str20("debtor", debtor),
			Param::uint256("amount", amount),
		];
		self.invoke("createDebt", args, self.params()).await
	}

	async fn invoke(&self, tag: &str, args: Vec<Param>, params: TxParams) -> Result<Receipt> {
		let tx = self.treasury.call(tag, &args, params).await?;
		Ok(tx.receipt)
	}

	// -- State --

	/// Contract balance in Qa.
	pub async fn get_zil_balance(&self) -> Result<u128> {
		parse_uint(&self.field("_balance").await?, "_balance")
	}

	pub async fn get_token_balance(&self) -> Result<u128> {
		parse_uint(&self.field("tokenBalance").await?, "tokenBalance")
	}

	pub async fn get_zil_price(&self) -> Result<u128> {
		parse_uint(&self.field("zilPrice").await?, "zilPrice")
	}

	pub async fn get_token_price(&self) -> Result<u128> {
		parse_uint(&self.field("tokenPrice").await?, "tokenPrice")
	}

	pub async fn get_admin(&self) -> Result<Address> {
		parse_address(&self.field("admin").await?, "admin")
	}

	pub async fn get_company(&self) -> Result<Address> {
		parse_address(&self.field("company").await?, "company")
	}

	pub async fn is_paused(&self) -> Result<bool> {
		parse_bool(&self.field("paused").await?, "paused")
	}

	pub async fn is_under_funded(&self) -> Result<bool> {
		parse_bool(&self.field("underFunded").await?, "underFunded")
	}

	pub async fn get_state(&self) -> Result<Value> {
		self.treasury.get_state().await
	}

	/// Read one field and unwrap it from the `{field: value}` envelope.
	pub async fn field(&self, name: &str) -> Result<Value> {
		let wrapped = self.treasury.get_sub_state(name).await?;
		wrapped
			.and_then(|mut v| v.get_mut(name).map(Value::take))
			.ok_or_else(|| anyhow!("field {name} not present in contract state"))
	}
}

// -- Field decoders --

fn parse_uint(v: &Value, field: &str) -> Result<u128> {
	let s = v
		.as_str()
		.ok_or_else(|| anyhow!("field {field}: expected numeric string, got {v}"))?;
	s.parse()
		.with_context(|| format!("field {field}: invalid integer {s:?}"))
}

fn parse_address(v: &Value, field: &str) -> Result<Address> {
	let s = v
		.as_str()
		.ok_or_else(|| anyhow!("field {field}: expected address string, got {v}"))?;
	s.parse().with_context(|| format!("field {field}: invalid address"))
}

/// Scilla booleans are ADT values: `{"constructor": "True", ..}`.
fn parse_bool(v: &Value, field: &str) -> Result<bool> {
	match v.get("constructor").and_then(Value::as_str) {
		Some("True") => Ok(true),
		Some("False") => Ok(false),
		_ => bail!("field {field}: expected Bool, got {v}"),
	}
}
