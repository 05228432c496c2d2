// ews-delegate
// Queries a mailbox as the user with the given SID, through the configured service account

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use log::info;

use ews_delegate::ews::types::{DistinguishedFolder, Message};
use ews_delegate::{
    DirectorySid, FolderLocator, HttpTransport, ImpersonationBuilder, ItemQueryExecutor,
    ServiceConfig,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Configuration file, overridden by EWS_* environment variables
    #[arg(long, default_value = "ews.toml")]
    config: PathBuf,

    /// SID of the user to impersonate, e.g. S-1-5-21-...
    #[arg(long)]
    sid: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the number of unread messages in the inbox
    UnreadCount,

    /// List unread messages in the inbox
    Unread {
        #[arg(long, default_value_t = 50)]
        max: u32,
    },

    /// List calendar items between two RFC 3339 timestamps
    Calendar {
        #[arg(long)]
        start: DateTime<Utc>,

        #[arg(long)]
        end: DateTime<Utc>,
    },
}

fn print_message(message: &Message) {
    let received = message
        .date_time_received
        .map(|time| time.to_rfc3339())
        .unwrap_or_default();
    let from = message
        .from
        .as_ref()
        .and_then(|from| from.mailbox.email_address.as_deref())
        .unwrap_or("<unknown sender>");
    println!(
        "{}  {}  {}",
        received,
        from,
        message.subject.as_deref().unwrap_or("<no subject>")
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let config = ServiceConfig::load_from(&cli.config)?;
    info!("Using Exchange server {}", config.url);

    let transport = HttpTransport::from_config(&config)?;
    let impersonation = ImpersonationBuilder::build(DirectorySid::parse(&cli.sid)?);
    let locator = FolderLocator::new(&transport);
    let executor = ItemQueryExecutor::new(&transport);

    match cli.command {
        Command::UnreadCount => {
            let inbox = locator
                .find_folder(
                    &impersonation,
                    DistinguishedFolder::Root,
                    config.inbox_names.as_slice(),
                    1,
                )
                .await?;
            println!("{}", inbox.require_unread_count()?);
        }
        Command::Unread { max } => {
            let inbox = locator
                .locate(
                    &impersonation,
                    DistinguishedFolder::Root,
                    config.inbox_names.as_slice(),
                    1,
                )
                .await?;
            for message in executor.find_unread(&impersonation, inbox, max).await? {
                print_message(&message);
            }
        }
        Command::Calendar { start, end } => {
            match executor.find_calendar_items(&impersonation, start, end).await? {
                Some(items) => {
                    for item in items {
                        println!(
                            "{}  {}  {}",
                            item.start.map(|time| time.to_rfc3339()).unwrap_or_default(),
                            item.end.map(|time| time.to_rfc3339()).unwrap_or_default(),
                            item.subject.as_deref().unwrap_or("<no subject>")
                        );
                    }
                }
                None => println!("No calendar data between {} and {}", start, end),
            }
        }
    }

    Ok(())
}
