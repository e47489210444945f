use anyhow::Result;
use clap::Args;
use dialoguer::{Input, Password};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::client::ApiClient;
use crate::output;

#[derive(Args)]
pub struct LoginArgs {
    /// Admin user name; prompted for when omitted
    #[arg(short, long)]
    user: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    admin: AdminProfile,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminProfile {
    name: String,
}

pub fn run(client: &ApiClient, args: LoginArgs) -> Result<()> {
    let user_name = match args.user {
        Some(user) => user,
        None => Input::new().with_prompt("User name").interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    let res: LoginResponse = client.send_json(
        Method::POST,
        "/auth/login",
        &json!({"userName": user_name, "password": password}),
        false,
    )?;

    output::success(&format!("Logged in as {}", res.admin.name));
    eprintln!("{}", output::dim("Export the token to use admin commands:"));
    println!("export SCHOOLSITE_TOKEN={}", res.token);
    Ok(())
}
