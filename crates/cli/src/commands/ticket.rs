//! `wt ticket ...`

use anyhow::Result;
use colored::Colorize as _;
use wt::Client;
use wt::services::{NewMessage, Ticket};

use crate::cli::TicketCommands;

pub async fn dispatch(client: &Client, command: &TicketCommands, json: bool) -> Result<()> {
	match command {
		TicketCommands::Get { number } => get(client, *number, json).await,
		TicketCommands::Messages { ticket_unid } => messages(client, *ticket_unid, json).await,
		TicketCommands::Message { ticket_unid, title, message, color, external } => {
			let mut new_message = NewMessage::new();
			if *external {
				new_message = new_message.external();
			}
			if let Some(color) = color {
				new_message = new_message.with_color((*color).into());
			}
			if let Some(title) = title {
				new_message = new_message.with_title(title.clone());
			}
			if let Some(message) = message {
				new_message = new_message.with_body(message.clone());
			}
			client.tickets().add_message(*ticket_unid, &new_message).await?;
			println!("message added to ticket {ticket_unid}");
			Ok(())
		}
		TicketCommands::Pin { message_unid } => {
			client.tickets().pin_message(*message_unid).await?;
			println!("message {message_unid} pinned");
			Ok(())
		}
		TicketCommands::Unpin { message_unid } => {
			client.tickets().unpin_message(*message_unid).await?;
			println!("message {message_unid} unpinned");
			Ok(())
		}
	}
}

async fn get(client: &Client, number: i64, json: bool) -> Result<()> {
	let ticket = client.tickets().get(number).await?;
	if json {
		println!("{}", serde_json::to_string_pretty(&ticket)?);
		return Ok(());
	}
	print_tickets(std::slice::from_ref(&ticket));
	Ok(())
}

async fn messages(client: &Client, ticket_unid: u64, json: bool) -> Result<()> {
	let messages = client.tickets().list_messages(ticket_unid).await?;
	if json {
		println!("{}", serde_json::to_string_pretty(&messages)?);
		return Ok(());
	}

	for message in &messages {
		println!(
			"{} {} {} {}",
			message.timestamp.format("%d-%m-%Y %H:%M").to_string().dimmed(),
			message.author.bold(),
			format!("[{:?}]", message.kind).dimmed(),
			message.title
		);
	}
	Ok(())
}

pub(crate) fn print_tickets(tickets: &[Ticket]) {
	for ticket in tickets {
		println!(
			"{:>8}  {:<10} {:<24} {}",
			ticket.unid,
			ticket.number.to_string().bold(),
			ticket.search_name,
			ticket.description.as_deref().unwrap_or("-")
		);
	}
}
