use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use common::ContactStatus;
use common::api::MessageEnvelope;
use console::style;
use dialoguer::Confirm;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::client::ApiClient;
use crate::output;

#[derive(Subcommand)]
pub enum InboxCommand {
    /// List contact messages, newest first
    List {
        /// new, in-progress or resolved
        #[arg(long)]
        status: Option<ContactStatus>,

        /// Match against name, email or subject
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: u64,

        #[arg(long, default_value_t = 20)]
        limit: u64,

        /// Print full message bodies
        #[arg(short, long)]
        full: bool,
    },

    /// Move a message to another triage state
    Status { id: i32, status: ContactStatus },

    /// Delete a message
    Delete {
        id: i32,

        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Contact {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    subject: String,
    message: String,
    status: ContactStatus,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ContactPage {
    total: u64,
    page: u64,
    pages: u64,
    contacts: Vec<Contact>,
}

#[derive(Deserialize)]
struct ContactEnvelope {
    message: String,
    contact: Contact,
}

pub fn run(client: &ApiClient, command: InboxCommand) -> Result<()> {
    match command {
        InboxCommand::List {
            status,
            search,
            page,
            limit,
            full,
        } => {
            let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
            if let Some(status) = status {
                query.push(("status", status.to_string()));
            }
            if let Some(search) = search {
                query.push(("search", search));
            }
            let page: ContactPage = client.get("/contacts", &query, true)?;

            output::heading(&format!(
                "Inbox: page {} of {} ({} total)",
                page.page,
                page.pages.max(1),
                page.total
            ));
            for c in &page.contacts {
                println!(
                    "{:>5}  {:<11} {}  {} <{}>",
                    c.id,
                    status_label(c.status),
                    output::timestamp(&c.created_at),
                    c.name,
                    c.email
                );
                println!("       {}", style(output::truncate(&c.subject, 72)).bold());
                if full {
                    if let Some(phone) = &c.phone {
                        println!("       {}", output::dim(&format!("phone: {phone}")));
                    }
                    for line in c.message.lines() {
                        println!("       {line}");
                    }
                    println!();
                }
            }
            Ok(())
        }
        InboxCommand::Status { id, status } => {
            let res: ContactEnvelope = client.send_json(
                Method::PATCH,
                &format!("/contacts/{id}"),
                &json!({ "status": status }),
                true,
            )?;
            output::success(&format!(
                "{} ({} is now {})",
                res.message,
                res.contact.id,
                status_label(res.contact.status)
            ));
            Ok(())
        }
        InboxCommand::Delete { id, yes } => {
            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Delete message {id}?"))
                    .default(false)
                    .interact()?
            {
                println!("Cancelled.");
                return Ok(());
            }
            let res: MessageEnvelope = client.delete(&format!("/contacts/{id}"))?;
            output::success(&res.message);
            Ok(())
        }
    }
}

fn status_label(status: ContactStatus) -> String {
    let label = format!("{:<11}", status.as_str());
    match status {
        ContactStatus::New => style(label).cyan().to_string(),
        ContactStatus::InProgress => style(label).yellow().to_string(),
        ContactStatus::Resolved => style(label).green().to_string(),
    }
}
