use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Deserialize;

use crate::client::ApiClient;
use crate::output;

#[derive(Args)]
pub struct ActivityArgs {
    /// Number of entries, at most 100
    #[arg(short = 'n', long, default_value_t = 20)]
    limit: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Activity {
    description: String,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ActivityList {
    activities: Vec<Activity>,
}

pub fn run(client: &ApiClient, args: ActivityArgs) -> Result<()> {
    let list: ActivityList = client.get("/activity", &[("limit", args.limit.to_string())], true)?;
    for entry in &list.activities {
        println!(
            "{}  {}",
            output::dim(&output::timestamp(&entry.created_at)),
            entry.description
        );
    }
    Ok(())
}
