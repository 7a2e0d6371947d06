//! The `headers` subcommand: harvest list records for any resource kind.

use anyhow::{bail, Result};
use clap::Args;
use regsgov_lib::types::ResourceKind;
use regsgov_lib::{
    validation, CancelFlag, CommentHeader, CommentQuery, Destinations, DocketHeader, DocketQuery,
    DocumentHeader, DocumentQuery, HeaderRecord, Pipeline, Query, Sink,
};

use super::ApiArgs;
use crate::output::{self, DestinationArgs};

#[derive(Args)]
pub struct HeadersArgs {
    /// Resource kind: dockets, documents or comments
    pub kind: ResourceKind,

    /// Full-text search term
    #[arg(long)]
    pub search: Option<String>,

    /// Agency acronym (e.g. EPA)
    #[arg(long)]
    pub agency: Option<String>,

    /// Posted on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub posted_from: Option<String>,

    /// Posted on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub posted_to: Option<String>,

    /// Last modified at or after this Eastern time (YYYY-MM-DD[ HH:MM:SS]); resumes an interrupted run
    #[arg(long)]
    pub modified_since: Option<String>,

    /// Last modified at or before this Eastern time (YYYY-MM-DD[ HH:MM:SS])
    #[arg(long)]
    pub modified_until: Option<String>,

    /// Docket type filter (dockets only): Rulemaking or Nonrulemaking
    #[arg(long)]
    pub docket_type: Option<String>,

    /// Docket ID filter (documents only)
    #[arg(long)]
    pub docket_id: Option<String>,

    /// Document type filter (documents only), repeatable
    #[arg(long)]
    pub document_type: Vec<String>,

    /// Object ID of the commented-on document (comments only)
    #[arg(long)]
    pub comment_on: Option<String>,

    /// Also print the harvested headers to stdout as CSV
    #[arg(long)]
    pub stdout: bool,

    #[command(flatten)]
    pub dest: DestinationArgs,
}

pub async fn run(args: &HeadersArgs, api: &ApiArgs, cancel: CancelFlag) -> Result<()> {
    check_kind_filters(args)?;
    let mut dest = args.dest.open("regsgov")?;

    let spinner = output::new_spinner()?;
    let pipeline = api.pipeline(cancel, &spinner)?;

    let result = match args.kind {
        ResourceKind::Docket => {
            let mut query = apply_common(DocketQuery::default(), args)?;
            if let Some(docket_type) = &args.docket_type {
                query = query.with_docket_type(docket_type);
            }
            harvest::<DocketHeader>(&pipeline, &query, args, &mut dest).await
        }
        ResourceKind::Document => {
            let mut query = apply_common(DocumentQuery::default(), args)?;
            if let Some(docket_id) = &args.docket_id {
                query = query.with_docket_id(&validation::validate_docket_id(docket_id)?);
            }
            if !args.document_type.is_empty() {
                query = query.with_document_types(&args.document_type);
            }
            harvest::<DocumentHeader>(&pipeline, &query, args, &mut dest).await
        }
        ResourceKind::Comment => {
            let mut query = apply_common(CommentQuery::default(), args)?;
            if let Some(object_id) = &args.comment_on {
                query = query.with_comment_on(&validation::validate_object_id(object_id)?);
            }
            harvest::<CommentHeader>(&pipeline, &query, args, &mut dest).await
        }
    };
    spinner.finish_and_clear();

    output::print_tracker(&pipeline.harvester().gate().tracker().summary());
    result
}

async fn harvest<H: HeaderRecord>(
    pipeline: &Pipeline,
    query: &H::Query,
    args: &HeadersArgs,
    dest: &mut Destinations,
) -> Result<()> {
    let deduped = pipeline.fetch_headers::<H>(query).await?;
    let written = dest.upsert(&deduped.records)?;
    eprintln!(
        "{} {} headers retrieved, {} duplicates removed, {} new rows written",
        deduped.records.len(),
        args.kind,
        deduped.removed,
        written
    );
    if args.stdout {
        output::print_csv(&deduped.records)?;
    }
    Ok(())
}

fn check_kind_filters(args: &HeadersArgs) -> Result<()> {
    let misplaced = match args.kind {
        ResourceKind::Docket => {
            (args.docket_id.is_some() || !args.document_type.is_empty() || args.comment_on.is_some())
                .then_some("--docket-id, --document-type and --comment-on")
        }
        ResourceKind::Document => (args.docket_type.is_some() || args.comment_on.is_some())
            .then_some("--docket-type and --comment-on"),
        ResourceKind::Comment => {
            (args.docket_type.is_some() || args.docket_id.is_some() || !args.document_type.is_empty())
                .then_some("--docket-type, --docket-id and --document-type")
        }
    };
    if let Some(flags) = misplaced {
        bail!("{} do not apply to {} queries", flags, args.kind);
    }
    Ok(())
}

fn apply_common<Q: Query>(mut query: Q, args: &HeadersArgs) -> Result<Q> {
    if let Some(term) = &args.search {
        query = query.with_search_term(&validation::validate_search(term)?);
    }
    if let Some(agency) = &args.agency {
        query = query.with_agency_id(&validation::validate_search(agency)?.to_uppercase());
    }
    if let Some(date) = &args.posted_from {
        query = query.with_posted_from(validation::validate_date(date)?);
    }
    if let Some(date) = &args.posted_to {
        query = query.with_posted_to(validation::validate_date(date)?);
    }
    if let Some(at) = &args.modified_since {
        query = query.with_modified_from(validation::validate_modified(at)?);
    }
    if let Some(at) = &args.modified_until {
        query = query.with_modified_to(validation::validate_modified(at)?);
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: HeadersArgs,
    }

    fn parse(argv: &[&str]) -> HeadersArgs {
        let mut full = vec!["test"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args
    }

    #[test]
    fn kind_parses_plural() {
        assert_eq!(parse(&["comments"]).kind, ResourceKind::Comment);
        assert_eq!(parse(&["Dockets"]).kind, ResourceKind::Docket);
    }

    #[test]
    fn comment_on_rejected_for_documents() {
        let args = parse(&["documents", "--comment-on", "0900006484b3c8a2"]);
        assert!(check_kind_filters(&args).is_err());
    }

    #[test]
    fn docket_id_allowed_for_documents() {
        let args = parse(&["documents", "--docket-id", "FDA-2021-N-0270"]);
        assert!(check_kind_filters(&args).is_ok());
    }

    #[test]
    fn common_filters_applied() {
        let args = parse(&[
            "comments",
            "--agency",
            "fda",
            "--posted-from",
            "2021-04-01",
            "--modified-since",
            "2021-05-01 10:00:00",
        ]);
        let query = apply_common(CommentQuery::default(), &args).unwrap();
        let common = query.common();
        assert_eq!(common.agency_id.as_deref(), Some("FDA"));
        assert_eq!(
            common.posted_from.map(|d| d.to_string()).as_deref(),
            Some("2021-04-01")
        );
        assert!(common.modified_from.is_some());
    }

    #[test]
    fn bad_date_rejected() {
        let args = parse(&["documents", "--posted-to", "April 1"]);
        assert!(apply_common(DocumentQuery::default(), &args).is_err());
    }
}
