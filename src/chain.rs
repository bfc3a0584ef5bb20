use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;

use crate::address::Address;
use crate::params::{call_data, Param, TxParams};
use crate::receipt::Transaction;
use crate::rpc::{Balance, RpcClient, RpcError, TxSubmission};
use crate::signer::{Signer, UnsignedTransaction};

/// The blockchain primitives the Treasury wrapper is built on.
///
/// `NodeClient` implements this against a real node; tests substitute
/// an in-memory recorder.
#[async_trait::async_trait]
pub trait Chain: Send + Sync {
	async fn network_id(&self) -> Result<u32>;

	async fn balance(&self, address: &Address) -> Result<Balance>;

	async fn minimum_gas_price(&self) -> Result<u128>;

	/// Deploy contract `code` with its init list, returning the confirmed
	/// deploy transaction and the new contract's address.
	async fn deploy(
		&self,
		code: &str,
		init: &[Param],
		params: TxParams,
	) -> Result<(Transaction, Address)>;

	/// Invoke transition `tag` on `contract` and wait for confirmation.
	async fn call(
		&self,
		contract: &Address,
		tag: &str,
		args: &[Param],
		params: TxParams,
	) -> Result<Transaction>;

	/// Read one field of a contract's state; `None` if it does not exist.
	async fn sub_state(
		&self,
		contract: &Address,
		field: &str,
		indices: &[String],
	) -> Result<Option<Value>>;

	async fn state(&self, contract: &Address) -> Result<Value>;

	/// Replace the key used for subsequent transactions.
	fn set_signer(&mut self, signer: Box<dyn Signer>);

	fn signer_address(&self) -> Option<Address>;
}

/// How long to wait for a submitted transaction to be mined.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmPolicy {
	pub attempts: u32,
	pub interval: Duration,
}

impl Default for ConfirmPolicy {
	fn default() -> Self {
		Self {
			attempts: 33,
			interval: Duration::from_millis(1000),
		}
	}
}

/// [`Chain`] over a node's JSON-RPC API, signing through a [`Signer`].
pub struct NodeClient {
	rpc: RpcClient,
	signer: Option<Box<dyn Signer>>,
	confirm: ConfirmPolicy,
}

impl NodeClient {
	pub fn new(url: &str) -> Self {
		Self {
			rpc: RpcClient::new(url),
			signer: None,
			confirm: ConfirmPolicy::default(),
		}
	}

	pub fn with_signer(mut self, signer: Box<dyn Signer>) -> Self {
		self.signer = Some(signer);
		self
	}

	pub fn with_confirm_policy(mut self, confirm: ConfirmPolicy) -> Self {
		self.confirm = confirm;
		self
	}

	pub fn rpc(&self) -> &RpcClient {
		&self.rpc
	}

	fn signer(&self) -> Result<&dyn Signer> {
		self.signer
			.as_deref()
			.ok_or_else(|| anyhow!("no signer configured for sending transactions"))
	}

	/// Sign and submit one transaction, returning the node's submission
	/// record (not yet confirmed).
	async fn submit(
		&self,
		to: &Address,
		code: &str,
		data: String,
		params: TxParams,
	) -> Result<TxSubmission> {
		let signer = self.signer()?;
		let account = self.rpc.get_balance(&signer.address()).await?;
		let unsigned = unsigned_transaction(to, code, data, params, account.nonce + 1);

		let signed = signer.sign_transaction(unsigned).await?;
		let submission = self.rpc.create_transaction(&signed).await?;
		tracing::info!(
			tx = %submission.tran_id,
			info = %submission.info,
			"transaction submitted"
		);
		Ok(submission)
	}

	/// Poll `GetTransaction` until the node knows the transaction. The
	/// node answers with an error object while the tx is still pending.
	async fn confirm(&self, tx_id: &str) -> Result<Transaction> {
		for attempt in 1..=self.confirm.attempts {
			match self.rpc.get_transaction(tx_id).await {
				Ok(tx) => {
					tracing::info!(tx = tx_id, success = tx.receipt.success, "transaction confirmed");
					return Ok(tx);
				}
				Err(RpcError::Node { message, .. }) => {
					tracing::debug!(tx = tx_id, attempt, %message, "not yet confirmed");
				}
				Err(e) => return Err(e.into()),
			}
			if attempt < self.confirm.attempts {
				tokio::time::sleep(self.confirm.interval).await;
			}
		}
		bail!(
			"transaction {tx_id} not confirmed after {} attempts",
			self.confirm.attempts
		)
	}
}

/// Lay out a transaction the way `CreateTransaction` expects: checksum
/// `toAddr` without `0x`, amounts and gas as decimal strings.
pub fn unsigned_transaction(
	to: &Address,
	code: &str,
	data: String,
	params: TxParams,
	nonce: u64,
) -> UnsignedTransaction {
	UnsignedTransaction {
		version: params.version,
		nonce,
		to_addr: to.to_checksum().trim_start_matches("0x").to_owned(),
		amount: params.amount.to_string(),
		gas_price: params.gas_price.to_string(),
		gas_limit: params.gas_limit.to_string(),
		code: code.to_owned(),
		data,
		priority: false,
	}
}

#[async_trait::async_trait]
impl Chain for NodeClient {
	async fn network_id(&self) -> Result<u32> {
		let id = self.rpc.get_network_id().await?;
		id.trim()
			.parse()
			.with_context(|| format!("node returned non-numeric network id {id:?}"))
	}

	async fn balance(&self, address: &Address) -> Result<Balance> {
		Ok(self.rpc.get_balance(address).await?)
	}

	async fn minimum_gas_price(&self) -> Result<u128> {
		let price = self.rpc.get_minimum_gas_price().await?;
		price
			.parse()
			.with_context(|| format!("node returned invalid gas price {price:?}"))
	}

	async fn deploy(
		&self,
		code: &str,
		init: &[Param],
		params: TxParams,
	) -> Result<(Transaction, Address)> {
		let data = serde_json::to_string(init)?;
		let submission = self.submit(&Address::ZERO, code, data, params).await?;
		let address: Address = submission
			.contract_address
			.as_deref()
			.ok_or_else(|| anyhow!("node did not report a contract address for {}", submission.tran_id))?
			.parse()?;
		let tx = self.confirm(&submission.tran_id).await?;
		Ok((tx, address))
	}

	async fn call(
		&self,
		contract: &Address,
		tag: &str,
		args: &[Param],
		params: TxParams,
	) -> Result<Transaction> {
		let data = serde_json::to_string(&call_data(tag, args))?;
		tracing::debug!(contract = %contract, tag, "calling transition");
		let submission = self.submit(contract, "", data, params).await?;
		self.confirm(&submission.tran_id).await
	}

	async fn sub_state(
		&self,
		contract: &Address,
		field: &str,
		indices: &[String],
	) -> Result<Option<Value>> {
		Ok(self.rpc.get_sub_state(contract, field, indices).await?)
	}

	async fn state(&self, contract: &Address) -> Result<Value> {
		Ok(self.rpc.get_state(contract).await?)
	}

	fn set_signer(&mut self, signer: Box<dyn Signer>) {
		tracing::info!(account = %signer.address(), "signer changed");
		self.signer = Some(signer);
	}

	fn signer_address(&self) -> Option<Address> {
		self.signer.as_ref().map(|s| s.address())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use tokio::io::{AsyncReadExt, AsyncWriteExt};
	use tokio::net::TcpListener;
	use tokio::task::JoinHandle;

	use super::*;
	use crate::signer::SignedTransaction;

	const CONTRACT: &str = "0x7bb3b0e8a59f3f61d9bff038f4aeb42cae2ecce8";
	const ACCOUNT: &str = "0x1111111111111111111111111111111111111111";

	struct StubSigner(Address);

	#[async_trait::async_trait]
	impl Signer for StubSigner {
		fn address(&self) -> Address {
			self.0
		}

		async fn sign_transaction(&self, tx: UnsignedTransaction) -> Result<SignedTransaction> {
			Ok(SignedTransaction {
				tx,
				pub_key: "02aa".into(),
				signature: "bb".into(),
			})
		}
	}

	/// Serve one canned JSON-RPC reply per connection, in order, and hand
	/// back the request bodies once every reply has been sent.
	async fn serve(replies: Vec<Value>) -> (String, JoinHandle<Vec<Value>>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let url = format!("http://{}", listener.local_addr().unwrap());

		let handle = tokio::spawn(async move {
			let mut requests = Vec::new();
			for reply in replies {
				let (mut sock, _) = listener.accept().await.unwrap();
				requests.push(read_body(&mut sock).await);

				let mut body = reply;
				body["id"] = json!("1");
				body["jsonrpc"] = json!("2.0");
				let body = serde_json::to_string(&body).unwrap();
				let resp = format!(
					"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
					body.len()
				);
				sock.write_all(resp.as_bytes()).await.unwrap();
				sock.shutdown().await.unwrap();
			}
			requests
		});
		(url, handle)
	}

	async fn read_body(sock: &mut tokio::net::TcpStream) -> Value {
		let mut buf = Vec::new();
		let mut chunk = [0u8; 4096];
		loop {
			let n = sock.read(&mut chunk).await.unwrap();
			assert!(n > 0, "connection closed before request was complete");
			buf.extend_from_slice(&chunk[..n]);

			let text = String::from_utf8_lossy(&buf).to_string();
			let Some(end) = text.find("\r\n\r\n") else { continue };
			let len = text[..end]
				.lines()
				.find_map(|l| {
					let (k, v) = l.split_once(':')?;
					k.eq_ignore_ascii_case("content-length").then(|| v.trim().parse::<usize>().ok())?
				})
				.unwrap_or(0);
			if buf.len() >= end + 4 + len {
				return serde_json::from_slice(&buf[end + 4..end + 4 + len]).unwrap();
			}
		}
	}

	fn fast_confirm(attempts: u32) -> ConfirmPolicy {
		ConfirmPolicy {
			attempts,
			interval: Duration::ZERO,
		}
	}

	fn pending() -> Value {
		json!({"error": {"code": -20, "message": "Txn Hash not Present"}})
	}

	fn mined(id: &str) -> Value {
		json!({"result": {"ID": id, "receipt": {"success": true, "cumulative_gas": "420"}}})
	}

	#[test]
	fn default_confirm_policy_matches_sdk() {
		let p = ConfirmPolicy::default();
		assert_eq!(p.attempts, 33);
		assert_eq!(p.interval, Duration::from_secs(1));
	}

	#[test]
	fn unsigned_transaction_layout() {
		let to: Address = CONTRACT.parse().unwrap();
		let params = TxParams::for_chain(333).unwrap().with_amount(7_000_000);
		let data = serde_json::to_string(&call_data("Pause", &[])).unwrap();
		let tx = unsigned_transaction(&to, "", data.clone(), params, 5);

		assert_eq!(tx.version, (333 << 16) | 1);
		assert_eq!(tx.nonce, 5);
		assert!(!tx.to_addr.starts_with("0x"));
		assert_eq!(tx.to_addr.len(), 40);
		assert_eq!(tx.to_addr.to_lowercase(), CONTRACT.trim_start_matches("0x"));
		assert_eq!(format!("0x{}", tx.to_addr), to.to_checksum());
		assert_eq!(tx.amount, "7000000");
		assert_eq!(tx.gas_price, "1000000000");
		assert_eq!(tx.gas_limit, "8000");
		assert_eq!(tx.code, "");
		assert_eq!(tx.data, data);
		assert!(!tx.priority);
	}

	#[tokio::test]
	async fn sending_without_signer_fails_before_network() {
		// Nothing listens on this port; the signer check must fail first.
		let client = NodeClient::new("http://127.0.0.1:9");
		assert!(client.signer_address().is_none());
		let err = client
			.call(&Address::ZERO, "Pause", &[], TxParams::for_chain(1).unwrap())
			.await
			.unwrap_err();
		assert!(err.to_string().contains("no signer configured"));
	}

	#[tokio::test]
	async fn confirm_polls_until_found() {
		let (url, server) = serve(vec![pending(), mined("abc")]).await;
		let client = NodeClient::new(&url).with_confirm_policy(fast_confirm(2));

		let tx = client.confirm("abc").await.unwrap();
		assert_eq!(tx.id, "abc");
		assert_eq!(tx.receipt.cumulative_gas, 420);

		let requests = server.await.unwrap();
		assert_eq!(requests.len(), 2);
		assert!(requests.iter().all(|r| r["method"] == "GetTransaction"));
		assert_eq!(requests[0]["params"], json!(["abc"]));
	}

	#[tokio::test]
	async fn confirm_gives_up_after_last_attempt() {
		let (url, server) = serve(vec![pending(), pending()]).await;
		let client = NodeClient::new(&url).with_confirm_policy(fast_confirm(2));

		let err = client.confirm("abc").await.unwrap_err();
		assert!(err.to_string().contains("not confirmed after 2 attempts"));
		assert_eq!(server.await.unwrap().len(), 2);
	}

	#[tokio::test]
	async fn call_signs_with_next_nonce_and_confirms() {
		let (url, server) = serve(vec![
			json!({"result": {"balance": "5000", "nonce": 4}}),
			json!({"result": {"Info": "Contract Txn, Shards Match of the sender and receiver", "TranID": "t1"}}),
			mined("t1"),
		])
		.await;
		let account: Address = ACCOUNT.parse().unwrap();
		let contract: Address = CONTRACT.parse().unwrap();
		let client = NodeClient::new(&url)
			.with_signer(Box::new(StubSigner(account)))
			.with_confirm_policy(fast_confirm(1));

		let params = TxParams::for_chain(1).unwrap();
		let tx = client.call(&contract, "Pause", &[], params).await.unwrap();
		assert_eq!(tx.id, "t1");
		assert!(tx.receipt.success);

		let requests = server.await.unwrap();
		assert_eq!(requests[0]["method"], "GetBalance");
		assert_eq!(requests[0]["params"], json!([account.to_bare_hex()]));

		assert_eq!(requests[1]["method"], "CreateTransaction");
		let sent = &requests[1]["params"][0];
		assert_eq!(sent["nonce"], 5);
		assert_eq!(sent["version"], 65537);
		assert_eq!(sent["toAddr"], contract.to_checksum().trim_start_matches("0x"));
		assert_eq!(sent["amount"], "0");
		assert_eq!(sent["gasLimit"], "8000");
		assert_eq!(sent["pubKey"], "02aa");
		assert_eq!(sent["signature"], "bb");
		let data: Value = serde_json::from_str(sent["data"].as_str().unwrap()).unwrap();
		assert_eq!(data, json!({"_tag": "Pause", "params": []}));

		assert_eq!(requests[2]["method"], "GetTransaction");
		assert_eq!(requests[2]["params"], json!(["t1"]));
	}

	#[tokio::test]
	async fn deploy_takes_address_from_submission() {
		let (url, server) = serve(vec![
			json!({"result": {"balance": "5000", "nonce": 0}}),
			json!({"result": {
				"Info": "Contract Creation txn, sent to shard",
				"TranID": "d1",
				"ContractAddress": CONTRACT.trim_start_matches("0x")
			}}),
			mined("d1"),
		])
		.await;
		let client = NodeClient::new(&url)
			.with_signer(Box::new(StubSigner(ACCOUNT.parse().unwrap())))
			.with_confirm_policy(fast_confirm(1));

		let init = vec![Param::uint32("_scilla_version", 0)];
		let params = TxParams::for_chain(1).unwrap().with_gas_limit(15000);
		let (tx, address) = client.deploy("scilla_version 0", &init, params).await.unwrap();
		assert_eq!(tx.id, "d1");
		assert_eq!(address.to_string(), CONTRACT);

		let requests = server.await.unwrap();
		let sent = &requests[1]["params"][0];
		assert_eq!(sent["nonce"], 1);
		assert_eq!(sent["toAddr"], "0000000000000000000000000000000000000000");
		assert_eq!(sent["code"], "scilla_version 0");
		assert_eq!(sent["gasLimit"], "15000");
		let data: Value = serde_json::from_str(sent["data"].as_str().unwrap()).unwrap();
		assert_eq!(data, json!([{"vname": "_scilla_version", "type": "Uint32", "value": "0"}]));
	}
}
