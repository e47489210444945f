use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;
use common::api::MessageEnvelope;
use console::style;
use reqwest::Method;
use reqwest::blocking::multipart::Form;
use serde::Deserialize;

use crate::client::{ApiClient, image_part};
use crate::output;

#[derive(Subcommand)]
pub enum AnnouncementsCommand {
    /// Show announcements that are live right now
    List,

    /// Publish an announcement
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Pin as important
        #[arg(long)]
        important: bool,

        /// Last day the announcement is shown
        #[arg(long, value_name = "YYYY-MM-DD")]
        expires: Option<NaiveDate>,

        /// Image to attach
        #[arg(long)]
        attachment: Option<PathBuf>,
    },

    /// Take an announcement down
    Remove { id: i32 },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Announcement {
    id: i32,
    title: String,
    description: String,
    attachment_url: Option<String>,
    is_important: bool,
    expiry_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct AnnouncementList {
    announcements: Vec<Announcement>,
}

#[derive(Deserialize)]
struct AnnouncementEnvelope {
    message: String,
    announcement: Announcement,
}

pub fn run(client: &ApiClient, command: AnnouncementsCommand) -> Result<()> {
    match command {
        AnnouncementsCommand::List => {
            let list: AnnouncementList = client.get("/announcements", &[], false)?;
            if list.announcements.is_empty() {
                println!("{}", output::dim("No active announcements."));
            }
            for a in &list.announcements {
                print_announcement(client, a);
            }
            Ok(())
        }
        AnnouncementsCommand::Create {
            title,
            description,
            important,
            expires,
            attachment,
        } => {
            let mut form = Form::new()
                .text("title", title)
                .text("description", description)
                .text("isImportant", important.to_string());
            if let Some(date) = expires {
                form = form.text("expiryDate", date.to_string());
            }
            if let Some(path) = attachment {
                form = form.part("attachment", image_part(&path)?);
            }
            let res: AnnouncementEnvelope =
                client.send_form(Method::POST, "/announcements", form)?;
            output::success(&res.message);
            print_announcement(client, &res.announcement);
            Ok(())
        }
        AnnouncementsCommand::Remove { id } => {
            let res: MessageEnvelope = client.delete(&format!("/announcements/{id}"))?;
            output::success(&res.message);
            Ok(())
        }
    }
}

fn print_announcement(client: &ApiClient, a: &Announcement) {
    let marker = if a.is_important {
        style("!").red().bold().to_string()
    } else {
        " ".to_string()
    };
    println!("{} [{}] {}", marker, a.id, style(&a.title).bold());
    println!("      {}", a.description);
    let mut meta = format!("posted {}", output::timestamp(&a.created_at));
    if let Some(expiry) = &a.expiry_date {
        meta.push_str(&format!(", until {}", output::timestamp(expiry)));
    }
    if let Some(url) = &a.attachment_url {
        meta.push_str(&format!(", {}", client.absolute_url(url)));
    }
    println!("      {}", output::dim(&meta));
}
