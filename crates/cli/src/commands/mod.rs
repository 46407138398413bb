//! Command dispatch: one login, one command, best-effort logout.

mod staff;
mod status;
mod ticket;

use anyhow::{Context as _, Result};
use wt::{Client, Credentials};

use crate::cli::{Cli, Commands};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let host = resolve(cli.host.clone(), "WT_HOST").context("no server; pass --host or set WT_HOST")?;
	let username =
		resolve(cli.username.clone(), "WT_USERNAME").context("no username; pass --username or set WT_USERNAME")?;
	let password =
		resolve(cli.password.clone(), "WT_PASSWORD").context("no password; pass --password or set WT_PASSWORD")?;

	let client = Client::new(&host)?;
	client.auth().login(&Credentials::new(username, password)).await?;

	let result = run(&client, &cli).await;
	client.auth().logout().await;
	result
}

async fn run(client: &Client, cli: &Cli) -> Result<()> {
	match &cli.command {
		Commands::Status => status::show(client, cli.json).await,
		Commands::Staff(command) => staff::dispatch(client, command, cli.json).await,
		Commands::Ticket(command) => ticket::dispatch(client, command, cli.json).await,
	}
}

fn resolve(flag: Option<String>, var: &str) -> Option<String> {
	flag.or_else(|| std::env::var(var).ok())
}
