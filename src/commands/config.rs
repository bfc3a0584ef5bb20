use anyhow::Result;

use crate::address::Address;
use crate::cli::ConfigCommand;
use crate::config::Config;

pub fn run(cmd: &ConfigCommand) -> Result<()> {
	match cmd {
		ConfigCommand::Show => show(),
		ConfigCommand::SetContract { address } => set_contract(address),
	}
}

fn show() -> Result<()> {
	let config = Config::load()?;
	let network = &config.network.default;

	println!("Config   {}", Config::path()?.display());
	println!("  Network:  {network}");
	println!("  RPC:      {}", config.rpc_url(network)?);
	println!("  Signer:   {}", config.signer_url(network)?);
	println!("  Account:  {}", config.signer_address(network)?);
	println!(
		"  Contract: {}",
		config.contract.address.as_deref().unwrap_or("not set")
	);
	Ok(())
}

fn set_contract(address: &str) -> Result<()> {
	let parsed: Address = address.parse()?;
	let mut config = Config::load_file()?;
	config.contract.address = Some(parsed.to_string());
	config.save()?;
	println!("Contract set to: {parsed}");
	Ok(())
}
