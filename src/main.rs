use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use treasury_client::cli::{Cli, Command};
use treasury_client::commands::{self, deploy::DeployArgs, transition::Transition};

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.with_target(false)
		.init();

	let cli = Cli::parse();

	match &cli.command {
		Command::Network { command } => commands::network::run(&cli, command).await,
		Command::Deploy {
			code,
			base_value,
			admin,
			company,
			proxy,
			token,
		} => {
			let args = DeployArgs {
				code,
				base_value: *base_value,
				admin: admin.as_deref(),
				company: company.as_deref(),
				proxy: proxy.as_deref(),
				token: token.as_deref(),
			};
			commands::deploy::run(&cli, args).await
		}
		Command::State { field } => commands::state::run(&cli, *field).await,
		Command::Pause => commands::transition::run(&cli, Transition::Pause).await,
		Command::Unpause => commands::transition::run(&cli, Transition::Unpause).await,
		Command::ChangeAdmin { address } => {
			let t = Transition::ChangeAdmin(address.parse()?);
			commands::transition::run(&cli, t).await
		}
		Command::ChangeCompany { address } => {
			let t = Transition::ChangeCompany(address.parse()?);
			commands::transition::run(&cli, t).await
		}
		Command::BuyTokens { zil, qa } => {
			let qa = match (zil, qa) {
				(Some(z), _) => treasury_client::params::zil_to_qa(*z)?,
				(None, Some(q)) => *q,
				(None, None) => anyhow::bail!("pass --zil or --qa"),
			};
			commands::transition::run(&cli, Transition::BuyTokens { qa }).await
		}
		Command::SellTokens { tokens } => {
			let t = Transition::SellTokens { tokens: *tokens };
			commands::transition::run(&cli, t).await
		}
		Command::CreateDebt { debtor, amount } => {
			let t = Transition::CreateDebt {
				debtor: debtor.parse()?,
				amount: *amount,
			};
			commands::transition::run(&cli, t).await
		}
		Command::Config { command } => commands::config::run(command),
	}
}
