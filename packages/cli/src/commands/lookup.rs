use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use common::lookup::{LookupOutcome, ResultLookup, Severity};

use crate::client::ApiClient;
use crate::output;

#[derive(Args)]
pub struct LookupArgs {
    /// Roll number printed on the admit card
    roll_no: String,

    /// Also save the report card as text. A directory gets the default file name.
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

pub fn run(client: &ApiClient, args: LookupArgs) -> Result<()> {
    let mut lookup = ResultLookup::new();
    let roll_no = lookup.submit(&args.roll_no)?;

    let outcome = match client.find_result(&roll_no) {
        Ok(Some(envelope)) => LookupOutcome::Found(envelope.student),
        Ok(None) => LookupOutcome::Missing,
        Err(e) => LookupOutcome::Failed(format!("Could not fetch the result: {e:#}")),
    };
    lookup.resolve(outcome)?;

    report_notice(&lookup)?;

    let Some(card) = lookup.report_card() else {
        return Ok(());
    };
    let text = card.render_text();
    print!("{text}");

    if let Some(target) = args.export {
        let path = if target.is_dir() {
            target.join(card.export_file_name())
        } else {
            target
        };
        std::fs::write(&path, &text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        output::success(&format!("Saved to {}", path.display()));
    }

    Ok(())
}

/// Fees-pending is shown and the command succeeds; not-found and failed
/// searches end the command with an error.
fn report_notice(lookup: &ResultLookup) -> Result<()> {
    match lookup.notice() {
        Some(notice) if notice.severity == Severity::Error => bail!("{}", notice.message),
        Some(notice) => {
            output::notice(&notice);
            Ok(())
        }
        None => Ok(()),
    }
}
