use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::networks::{self, NetworkProfile, DEFAULT_NETWORK};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub network: NetworkConfig,
	pub signer: SignerConfig,
	pub contract: ContractConfig,
	/// `TREASURY_RPC_URL`; wins over file endpoints for every network.
	#[serde(skip)]
	pub rpc_url_override: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
	pub default: String,
	/// Endpoint overrides, keyed by profile name.
	pub endpoints: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
	pub url: Option<String>,
	pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
	pub address: Option<String>,
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			default: DEFAULT_NETWORK.into(),
			endpoints: Default::default(),
		}
	}
}

impl Config {
	/// Directory where CLI state is stored (~/.treasury/).
	pub fn dir() -> Result<PathBuf> {
		dirs::home_dir()
			.map(|h| h.join(".treasury"))
			.ok_or_else(|| anyhow!("could not determine home directory"))
	}

	/// Path to the config file.
	pub fn path() -> Result<PathBuf> {
		Ok(Self::dir()?.join("config.toml"))
	}

	/// Load the effective config: the file (or defaults) with environment
	/// overrides applied.
	pub fn load() -> Result<Self> {
		let mut config = Self::load_file()?;
		config.apply_env(|key| std::env::var(key).ok());
		Ok(config)
	}

	/// Load config from disk only, falling back to defaults if no file
	/// exists. Use this before `save` so overrides are not persisted.
	pub fn load_file() -> Result<Self> {
		let path = Self::path()?;
		if path.exists() {
			let content = std::fs::read_to_string(&path)?;
			Ok(toml::from_str(&content)?)
		} else {
			Ok(Self::default())
		}
	}

	/// Persist the current config to disk, creating the directory if needed.
	pub fn save(&self) -> Result<()> {
		let path = Self::path()?;
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&path, toml::to_string_pretty(self)?)?;
		Ok(())
	}

	fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
		if let Some(n) = var(networks::NETWORK_ENV) {
			self.network.default = n;
		}
		if let Some(url) = var("TREASURY_RPC_URL") {
			self.rpc_url_override = Some(url);
		}
		if let Some(url) = var("TREASURY_SIGNER_URL") {
			self.signer.url = Some(url);
		}
		if let Some(addr) = var("TREASURY_CONTRACT") {
			self.contract.address = Some(addr);
		}
	}

	pub fn profile(&self, network: &str) -> Result<&'static NetworkProfile> {
		networks::lookup(network)
	}

	/// Return the RPC URL for the given network name.
	pub fn rpc_url(&self, network: &str) -> Result<String> {
		if let Some(url) = &self.rpc_url_override {
			return Ok(url.clone());
		}
		if let Some(url) = self.network.endpoints.get(&network.to_lowercase()) {
			return Ok(url.clone());
		}
		Ok(self.profile(network)?.endpoint.to_owned())
	}

	pub fn signer_url(&self, network: &str) -> Result<String> {
		match &self.signer.url {
			Some(url) => Ok(url.clone()),
			None => Ok(self.profile(network)?.signer_url.to_owned()),
		}
	}

	/// Signing account: configured address, else the profile's test account.
	pub fn signer_address(&self, network: &str) -> Result<Address> {
		match &self.signer.address {
			Some(a) => a.parse(),
			None => self.profile(network)?.account_address(),
		}
	}

	pub fn contract_address(&self) -> Result<Address> {
		self.contract
			.address
			.as_deref()
			.ok_or_else(|| {
				anyhow!("No contract configured. Run: treasury deploy --code <file> or treasury config set-contract <addr>")
			})?
			.parse()
	}
}
