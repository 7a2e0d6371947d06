//! The `docket` subcommand: documents, comments and comment details for one docket.

use anyhow::Result;
use clap::Args;
use regsgov_lib::validation;
use regsgov_lib::CancelFlag;

use super::ApiArgs;
use crate::output::{self, DestinationArgs};

#[derive(Args)]
pub struct DocketArgs {
    /// Docket ID (e.g. FDA-2021-N-0270)
    pub docket_id: String,

    #[command(flatten)]
    pub dest: DestinationArgs,
}

pub async fn run(args: &DocketArgs, api: &ApiArgs, cancel: CancelFlag) -> Result<()> {
    let docket_id = validation::validate_docket_id(&args.docket_id)?;
    let mut dest = args.dest.open(&docket_id)?;

    let spinner = output::new_spinner()?;
    let pipeline = api.pipeline(cancel, &spinner)?;
    let result = pipeline.docket_comments(&docket_id, &mut dest).await;
    spinner.finish_and_clear();

    output::print_tracker(&pipeline.harvester().gate().tracker().summary());
    let report = result?;
    output::print_report(&report);
    Ok(())
}
