//! The `document` subcommand: comments and comment details for one document.

use anyhow::Result;
use clap::Args;
use regsgov_lib::validation;
use regsgov_lib::CancelFlag;

use super::ApiArgs;
use crate::output::{self, DestinationArgs};

#[derive(Args)]
pub struct DocumentArgs {
    /// Document ID (e.g. FDA-2021-N-0270-0001)
    pub document_id: String,

    #[command(flatten)]
    pub dest: DestinationArgs,
}

pub async fn run(args: &DocumentArgs, api: &ApiArgs, cancel: CancelFlag) -> Result<()> {
    let document_id = validation::validate_document_id(&args.document_id)?;
    let mut dest = args.dest.open(&document_id)?;

    let spinner = output::new_spinner()?;
    let pipeline = api.pipeline(cancel, &spinner)?;
    let result = pipeline.document_comments(&document_id, &mut dest).await;
    spinner.finish_and_clear();

    output::print_tracker(&pipeline.harvester().gate().tracker().summary());
    let report = result?;
    output::print_report(&report);
    Ok(())
}
