use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
	name = "treasury",
	about = "Client for the Treasury smart contract on Zilliqa.",
	version
)]
pub struct Cli {
	/// Network profile to use (dev, sim). Defaults to config / TREASURY_NETWORK.
	#[arg(long, global = true)]
	pub network: Option<String>,

	/// Override RPC endpoint URL.
	#[arg(long, global = true)]
	pub rpc_url: Option<String>,

	/// Override signing service URL.
	#[arg(long, global = true)]
	pub signer_url: Option<String>,

	/// Override signing account (hex or bech32).
	#[arg(long, global = true)]
	pub account: Option<String>,

	/// Override Treasury contract address.
	#[arg(long, global = true)]
	pub contract: Option<String>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Check connectivity and the test account.
	Network {
		#[command(subcommand)]
		command: NetworkCommand,
	},

	/// Deploy a new Treasury contract.
	Deploy {
		/// Path to the contract source.
		#[arg(long, default_value = "contracts/treasury.scilla")]
		code: PathBuf,

		/// Initial token price.
		#[arg(long, default_value = "1000")]
		base_value: u128,

		/// Initial admin (defaults to the signing account).
		#[arg(long)]
		admin: Option<String>,

		/// Initial company (defaults to the signing account).
		#[arg(long)]
		company: Option<String>,

		/// Proxy contract (defaults to the signing account).
		#[arg(long)]
		proxy: Option<String>,

		/// Token contract (defaults to the signing account).
		#[arg(long)]
		token: Option<String>,
	},

	/// Read contract state: one field, or everything.
	State {
		field: Option<StateField>,
	},

	/// Pause the contract (admin only).
	Pause,

	/// Unpause the contract (admin only).
	Unpause,

	/// Hand the admin role to another address.
	ChangeAdmin {
		address: String,
	},

	/// Change the company address.
	ChangeCompany {
		address: String,
	},

	/// Buy tokens by sending ZIL.
	BuyTokens {
		/// Whole ZIL to send.
		#[arg(long, conflicts_with = "qa")]
		zil: Option<u128>,

		/// Amount in Qa.
		#[arg(long)]
		qa: Option<u128>,
	},

	/// Sell tokens back to the treasury.
	SellTokens {
		tokens: u128,
	},

	/// Record a debt owed by `debtor`.
	CreateDebt {
		debtor: String,
		amount: u128,
	},

	/// Inspect or edit the local config.
	Config {
		#[command(subcommand)]
		command: ConfigCommand,
	},
}

#[derive(Subcommand)]
pub enum NetworkCommand {
	/// Verify chain id, signing account and account balance.
	Check,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
	/// Print the effective config.
	Show,

	/// Remember the Treasury contract address.
	SetContract {
		address: String,
	},
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StateField {
	Balance,
	TokenBalance,
	ZilPrice,
	TokenPrice,
	Admin,
	Company,
	Paused,
	UnderFunded,
}
