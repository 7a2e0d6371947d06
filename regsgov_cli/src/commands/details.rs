//! The `details` subcommand: expand a list of IDs into detail records.

use anyhow::Result;
use clap::Args;
use regsgov_lib::types::ResourceKind;
use regsgov_lib::{
    validation, CancelFlag, CommentDetail, DetailKey, DetailRecord, Destinations, DocketDetail,
    DocumentDetail, Pipeline, Sink,
};

use super::ApiArgs;
use crate::output::{self, DestinationArgs};

#[derive(Args)]
pub struct DetailsArgs {
    /// Resource kind: dockets, documents or comments
    pub kind: ResourceKind,

    /// Public IDs to fetch
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Also print the detail records to stdout as CSV
    #[arg(long)]
    pub stdout: bool,

    #[command(flatten)]
    pub dest: DestinationArgs,
}

pub async fn run(args: &DetailsArgs, api: &ApiArgs, cancel: CancelFlag) -> Result<()> {
    let keys = args
        .ids
        .iter()
        .map(|id| -> Result<DetailKey> {
            let id = match args.kind {
                ResourceKind::Docket => validation::validate_docket_id(id)?,
                ResourceKind::Document => validation::validate_document_id(id)?,
                ResourceKind::Comment => validation::validate_comment_id(id)?,
            };
            Ok(DetailKey::new(id))
        })
        .collect::<Result<Vec<_>>>()?;
    let mut dest = args.dest.open("regsgov")?;

    let spinner = output::new_spinner()?;
    let pipeline = api.pipeline(cancel, &spinner)?;
    let result = match args.kind {
        ResourceKind::Docket => expand::<DocketDetail>(&pipeline, &keys, args, &mut dest).await,
        ResourceKind::Document => {
            expand::<DocumentDetail>(&pipeline, &keys, args, &mut dest).await
        }
        ResourceKind::Comment => expand::<CommentDetail>(&pipeline, &keys, args, &mut dest).await,
    };
    spinner.finish_and_clear();

    output::print_tracker(&pipeline.harvester().gate().tracker().summary());
    result
}

async fn expand<D: DetailRecord>(
    pipeline: &Pipeline,
    keys: &[DetailKey],
    args: &DetailsArgs,
    dest: &mut Destinations,
) -> Result<()> {
    let batch = pipeline.fetch_details::<D>(keys).await?;
    let written = dest.upsert(&batch.records)?;
    eprintln!(
        "{} of {} {} details retrieved, {} new rows written",
        batch.records.len(),
        keys.len(),
        args.kind,
        written
    );
    for item in &batch.skipped {
        eprintln!("  skipped {}: {}", item.id, item.reason);
    }
    if args.stdout {
        output::print_csv(&batch.records)?;
    }
    Ok(())
}
