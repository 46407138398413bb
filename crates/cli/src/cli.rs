use clap::{Parser, Subcommand, ValueEnum};
use wt::services::MessageColor;

#[derive(Parser, Debug)]
#[command(name = "wt")]
#[command(about = "WTicket CLI - query and update tickets from the command line")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Server to talk to, e.g. wticket.example.nl (or WT_HOST)
	#[arg(long, global = true)]
	pub host: Option<String>,

	/// Login username (or WT_USERNAME)
	#[arg(short, long, global = true)]
	pub username: Option<String>,

	/// Login password (or WT_PASSWORD)
	#[arg(short, long, global = true)]
	pub password: Option<String>,

	/// Print results as JSON
	#[arg(long, global = true)]
	pub json: bool,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Show server status and the authenticated user
	Status,

	/// Staff listings
	#[command(subcommand)]
	Staff(StaffCommands),

	/// Ticket lookup and updates
	#[command(subcommand)]
	Ticket(TicketCommands),
}

#[derive(Subcommand, Debug)]
pub enum StaffCommands {
	/// List staff members with their open task counts
	List,

	/// List the running tickets of a staff member
	Tickets { staff_unid: u64 },
}

#[derive(Subcommand, Debug)]
pub enum TicketCommands {
	/// Look a ticket up by its number
	Get { number: i64 },

	/// List the message thread of a ticket
	Messages { ticket_unid: u64 },

	/// Append a message to a ticket
	Message {
		ticket_unid: u64,
		/// Message subject
		#[arg(long)]
		title: Option<String>,
		/// Message body
		#[arg(long)]
		message: Option<String>,
		/// Header color
		#[arg(long, value_enum)]
		color: Option<ColorArg>,
		/// Make the message visible to the customer
		#[arg(long)]
		external: bool,
	},

	/// Pin a message to the top of its thread
	Pin { message_unid: u64 },

	/// Remove a message's pin
	Unpin { message_unid: u64 },
}

/// Header colors the application accepts, in CLI spelling.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorArg {
	Blauw,
	DonkerGrijs,
	Oranje,
	Geel,
	Groen,
	Paars,
	Rood,
	Roze,
	Turquoise,
}

impl From<ColorArg> for MessageColor {
	fn from(color: ColorArg) -> Self {
		match color {
			ColorArg::Blauw => MessageColor::Blauw,
			ColorArg::DonkerGrijs => MessageColor::DonkerGrijs,
			ColorArg::Oranje => MessageColor::Oranje,
			ColorArg::Geel => MessageColor::Geel,
			ColorArg::Groen => MessageColor::Groen,
			ColorArg::Paars => MessageColor::Paars,
			ColorArg::Rood => MessageColor::Rood,
			ColorArg::Roze => MessageColor::Roze,
			ColorArg::Turquoise => MessageColor::Turquoise,
		}
	}
}
