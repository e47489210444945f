mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;

use crate::client::ApiClient;
use crate::commands::{activity, announcements, contact, inbox, login, lookup, media, results};

#[derive(Parser)]
#[command(name = "schoolsite", version, about = "Terminal client for the school website API")]
struct Cli {
    /// Server base URL
    #[arg(
        long,
        env = "SCHOOLSITE_API_URL",
        default_value = "http://127.0.0.1:5000",
        global = true
    )]
    api_url: String,

    /// Admin token from `schoolsite login`
    #[arg(long, env = "SCHOOLSITE_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up a published result by roll number
    Lookup(lookup::LookupArgs),

    /// Log in as an admin and print a token
    Login(login::LoginArgs),

    /// Manage student results
    Results {
        #[command(subcommand)]
        command: results::ResultsCommand,
    },

    /// Manage gallery, banner and event images
    Media {
        #[command(subcommand)]
        command: media::MediaCommand,
    },

    /// Manage announcements
    Announcements {
        #[command(subcommand)]
        command: announcements::AnnouncementsCommand,
    },

    /// Send a message through the contact form
    Contact(contact::ContactArgs),

    /// Read and triage contact messages
    Inbox {
        #[command(subcommand)]
        command: inbox::InboxCommand,
    },

    /// Show recent admin activity
    Activity(activity::ActivityArgs),
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", style("error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let client = ApiClient::new(&cli.api_url, cli.token)?;

    match cli.command {
        Command::Lookup(args) => lookup::run(&client, args),
        Command::Login(args) => login::run(&client, args),
        Command::Results { command } => results::run(&client, command),
        Command::Media { command } => media::run(&client, command),
        Command::Announcements { command } => announcements::run(&client, command),
        Command::Contact(args) => contact::run(&client, args),
        Command::Inbox { command } => inbox::run(&client, command),
        Command::Activity(args) => activity::run(&client, args),
    }
}
