use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use common::MediaType;
use common::api::MessageEnvelope;
use dialoguer::Confirm;
use reqwest::Method;
use reqwest::blocking::multipart::Form;
use serde::Deserialize;

use crate::client::{ApiClient, image_part};
use crate::output;

#[derive(Subcommand)]
pub enum MediaCommand {
    /// List uploaded images, newest first
    List {
        /// banner, gallery or event
        #[arg(long = "type")]
        media_type: Option<MediaType>,
    },

    /// Upload an image
    Upload {
        path: PathBuf,

        #[arg(long)]
        title: String,

        /// banner, gallery or event
        #[arg(long = "type", default_value = "gallery")]
        media_type: MediaType,
    },

    /// Delete an image
    Delete {
        id: i32,

        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaItem {
    id: i32,
    title: String,
    media_type: MediaType,
    image_url: String,
    uploaded_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct MediaList {
    count: usize,
    media: Vec<MediaItem>,
}

#[derive(Deserialize)]
struct MediaEnvelope {
    message: String,
    media: MediaItem,
}

pub fn run(client: &ApiClient, command: MediaCommand) -> Result<()> {
    match command {
        MediaCommand::List { media_type } => {
            let query: Vec<(&str, String)> = media_type
                .map(|t| vec![("mediaType", t.to_string())])
                .unwrap_or_default();
            let list: MediaList = client.get("/media", &query, false)?;

            output::heading(&format!("Media ({})", list.count));
            for item in &list.media {
                println!(
                    "{:>5}  {:<8} {:<32} {}  {}",
                    item.id,
                    item.media_type,
                    output::truncate(&item.title, 32),
                    output::timestamp(&item.uploaded_at),
                    output::dim(&client.absolute_url(&item.image_url))
                );
            }
            Ok(())
        }
        MediaCommand::Upload {
            path,
            title,
            media_type,
        } => {
            let form = Form::new()
                .text("title", title)
                .text("mediaType", media_type.to_string())
                .part("file", image_part(&path)?);
            let res: MediaEnvelope = client.send_form(Method::POST, "/media", form)?;
            output::success(&res.message);
            println!(
                "id {}  {}",
                res.media.id,
                client.absolute_url(&res.media.image_url)
            );
            Ok(())
        }
        MediaCommand::Delete { id, yes } => {
            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Delete media {id}?"))
                    .default(false)
                    .interact()?
            {
                println!("Cancelled.");
                return Ok(());
            }
            let res: MessageEnvelope = client.delete(&format!("/media/{id}"))?;
            output::success(&res.message);
            Ok(())
        }
    }
}
