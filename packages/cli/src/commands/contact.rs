use anyhow::Result;
use clap::Args;
use dialoguer::Editor;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::output;

#[derive(Args)]
pub struct ContactArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    subject: String,

    /// Message text; opens $EDITOR when omitted
    #[arg(short, long)]
    message: Option<String>,
}

#[derive(Serialize)]
struct ContactRequest {
    name: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    subject: String,
    message: String,
}

#[derive(Deserialize)]
struct ContactEnvelope {
    message: String,
}

pub fn run(client: &ApiClient, args: ContactArgs) -> Result<()> {
    let message = match args.message {
        Some(message) => message,
        None => match Editor::new().edit("")? {
            Some(text) => text,
            None => {
                println!("Cancelled.");
                return Ok(());
            }
        },
    };

    let body = ContactRequest {
        name: args.name,
        email: args.email,
        phone: args.phone,
        subject: args.subject,
        message,
    };
    let res: ContactEnvelope = client.send_json(Method::POST, "/contact", &body, false)?;
    output::success(&res.message);
    Ok(())
}
