pub mod config;
pub mod deploy;
pub mod network;
pub mod state;
pub mod transition;

use anyhow::Result;

use crate::address::Address;
use crate::chain::NodeClient;
use crate::cli::Cli;
use crate::config::Config;
use crate::contract::DeployedContract;
use crate::networks::NetworkProfile;
use crate::signer::remote::RemoteSigner;
use crate::treasury::TreasuryApi;

/// Resolve the network profile from CLI flag or config.
pub fn resolve_network(cli: &Cli, config: &Config) -> Result<&'static NetworkProfile> {
	let name = cli.network.as_deref().unwrap_or(&config.network.default);
	config.profile(name)
}

/// Resolve the RPC URL from CLI flag or config.
pub fn resolve_rpc(cli: &Cli, config: &Config, profile: &NetworkProfile) -> Result<String> {
	match &cli.rpc_url {
		Some(url) => Ok(url.clone()),
		None => config.rpc_url(profile.name),
	}
}

pub fn resolve_account(cli: &Cli, config: &Config, profile: &NetworkProfile) -> Result<Address> {
	match &cli.account {
		Some(a) => a.parse(),
		None => config.signer_address(profile.name),
	}
}

/// Build a node client with the configured remote signer attached.
pub fn resolve_chain(cli: &Cli, config: &Config, profile: &NetworkProfile) -> Result<NodeClient> {
	let rpc_url = resolve_rpc(cli, config, profile)?;
	let signer_url = match &cli.signer_url {
		Some(url) => url.clone(),
		None => config.signer_url(profile.name)?,
	};
	let account = resolve_account(cli, config, profile)?;
	tracing::debug!(rpc = %rpc_url, signer = %signer_url, %account, "chain client");

	Ok(NodeClient::new(&rpc_url).with_signer(Box::new(RemoteSigner::new(&signer_url, account))))
}

/// Open the configured Treasury contract.
pub fn resolve_treasury(cli: &Cli, config: &Config) -> Result<TreasuryApi<NodeClient>> {
	let profile = resolve_network(cli, config)?;
	let chain = resolve_chain(cli, config, profile)?;
	let address = match &cli.contract {
		Some(a) => a.parse()?,
		None => config.contract_address()?,
	};
	TreasuryApi::new(DeployedContract::at(chain, address), profile.chain_id)
}
