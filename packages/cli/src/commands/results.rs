use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use common::api::{MessageEnvelope, ResultPage, StudentEnvelope};
use common::form::{EditSession, ResultForm};
use common::StudentResult;
use dialoguer::{Confirm, Editor};
use reqwest::Method;
use reqwest::blocking::multipart::Form;

use crate::client::{ApiClient, image_part};
use crate::output;

#[derive(Subcommand)]
pub enum ResultsCommand {
    /// List results
    List(ListArgs),

    /// Print an empty result draft to fill in
    Template,

    /// Upload a new result from a TOML draft
    Create {
        draft: PathBuf,

        /// Student photo (jpg, png or gif)
        #[arg(long)]
        photo: Option<PathBuf>,
    },

    /// Edit a saved result in $EDITOR
    Edit { roll_no: String },

    /// Replace a saved result with the contents of a TOML draft
    Update { id: i32, draft: PathBuf },

    /// Replace a result's photo
    Photo { id: i32, path: PathBuf },

    /// Delete a result and its photo
    Delete {
        id: i32,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u64,

    #[arg(long, default_value_t = 10)]
    limit: u64,

    /// Only this class
    #[arg(long)]
    class: Option<String>,

    /// Match against name or roll number
    #[arg(short, long)]
    search: Option<String>,

    /// name, rollNo, className or createdAt
    #[arg(long, default_value = "name")]
    sort_by: String,

    #[arg(long)]
    desc: bool,
}

pub fn run(client: &ApiClient, command: ResultsCommand) -> Result<()> {
    match command {
        ResultsCommand::List(args) => list(client, args),
        ResultsCommand::Template => {
            print!("{}", toml::to_string_pretty(&ResultForm::default())?);
            Ok(())
        }
        ResultsCommand::Create { draft, photo } => create(client, &draft, photo.as_deref()),
        ResultsCommand::Edit { roll_no } => edit(client, &roll_no),
        ResultsCommand::Update { id, draft } => update(client, id, &draft),
        ResultsCommand::Photo { id, path } => {
            let form = Form::new().part("photo", image_part(&path)?);
            let res: StudentEnvelope =
                client.send_form(Method::PUT, &format!("/results/{id}/photo"), form)?;
            output::success(res.message.as_deref().unwrap_or("Photo updated"));
            print_photo(client, &res.student);
            Ok(())
        }
        ResultsCommand::Delete { id, yes } => {
            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Delete result {id} and its photo?"))
                    .default(false)
                    .interact()?
            {
                println!("Cancelled.");
                return Ok(());
            }
            let res: MessageEnvelope = client.delete(&format!("/results/{id}"))?;
            output::success(&res.message);
            Ok(())
        }
    }
}

fn list(client: &ApiClient, args: ListArgs) -> Result<()> {
    let mut query = vec![
        ("page", args.page.to_string()),
        ("limit", args.limit.to_string()),
        ("sortBy", args.sort_by),
        ("sortOrder", if args.desc { "desc" } else { "asc" }.to_string()),
    ];
    if let Some(class) = args.class {
        query.push(("className", class));
    }
    if let Some(search) = args.search {
        query.push(("search", search));
    }

    let page: ResultPage = client.get("/results", &query, true)?;
    output::heading(&format!(
        "Results: page {} of {} ({} total)",
        page.page,
        page.pages.max(1),
        page.total
    ));
    if page.results.is_empty() {
        println!("{}", output::dim("No results match."));
        return Ok(());
    }
    println!(
        "{:>5}  {:<10} {:<24} {:<8} {:>6}  {}",
        "ID", "ROLL NO", "NAME", "CLASS", "ATTEND", "FEES"
    );
    for r in &page.results {
        let class = if r.section.is_empty() {
            r.class_name.clone()
        } else {
            format!("{}-{}", r.class_name, r.section)
        };
        println!(
            "{:>5}  {:<10} {:<24} {:<8} {:>5}%  {}",
            r.id,
            output::truncate(&r.roll_no, 10),
            output::truncate(&r.name, 24),
            output::truncate(&class, 8),
            r.attendance_percentage,
            if r.fees_paid { "paid" } else { "pending" }
        );
    }
    Ok(())
}

fn read_draft(path: &Path) -> Result<ResultForm> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("{} is not a valid result draft", path.display()))
}

fn create(client: &ApiClient, draft: &Path, photo: Option<&Path>) -> Result<()> {
    let payload = read_draft(draft)?.to_payload()?;

    let mut form = Form::new();
    for (name, value) in payload.multipart_fields() {
        form = form.text(name, value);
    }
    if let Some(photo) = photo {
        form = form.part("photo", image_part(photo)?);
    }

    let res: StudentEnvelope = client.send_form(Method::POST, "/results", form)?;
    output::success(res.message.as_deref().unwrap_or("Result uploaded"));
    println!("id {} for roll no {}", res.student.id, res.student.roll_no);
    print_photo(client, &res.student);
    Ok(())
}

fn update(client: &ApiClient, id: i32, draft: &Path) -> Result<()> {
    let payload = read_draft(draft)?.to_payload()?;
    let res: StudentEnvelope =
        client.send_json(Method::PUT, &format!("/results/{id}"), &payload, true)?;
    output::success(res.message.as_deref().unwrap_or("Result updated"));
    Ok(())
}

fn edit(client: &ApiClient, roll_no: &str) -> Result<()> {
    let Some(found) = client.find_result(roll_no.trim())? else {
        bail!("No result for roll no {}", roll_no.trim());
    };
    let mut session = EditSession::begin(&found.student);

    let original = toml::to_string_pretty(&session.draft)?;
    let Some(edited) = Editor::new().extension(".toml").edit(&original)? else {
        session.cancel();
        println!("Cancelled.");
        return Ok(());
    };
    session.draft = toml::from_str(&edited).context("Edited draft is not valid")?;

    if !session.is_dirty() {
        println!("No changes.");
        return Ok(());
    }
    if session.draft.roll_no.trim() != found.student.roll_no {
        bail!("rollNo cannot be changed");
    }
    let (id, payload) = session.save()?;
    if !Confirm::new()
        .with_prompt(format!("Save changes to {}?", found.student.roll_no))
        .default(true)
        .interact()?
    {
        session.cancel();
        println!("Cancelled.");
        return Ok(());
    }

    let res: StudentEnvelope =
        client.send_json(Method::PUT, &format!("/results/{id}"), &payload, true)?;
    output::success(res.message.as_deref().unwrap_or("Result updated"));
    Ok(())
}

fn print_photo(client: &ApiClient, student: &StudentResult) {
    if let Some(photo) = &student.photo {
        println!("{}", output::dim(&format!("photo: {}", client.absolute_url(&photo.url))));
    }
}
