//! subjectify: retrieve DDC/LCC subject classifiers from OCLC's Classify API
//! for the records of a CSV file and write the enriched data to a new file.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subjectify::client::ClassifyClient;
use subjectify::csvio::{self, HeaderMode};
use subjectify::errors::SubjectifyError;
use subjectify::processor::{run_batch, Pacing, ProcessOptions};
use subjectify::record::FieldMapping;

#[derive(Parser, Debug)]
#[command(
    name = "subjectify",
    about = "Retrieve DDC/LCC identifiers from OCLC's Classify API\n\n\
             Expects an input CSV of 4 columns: ISBN,ISSN,Author,Title.\n\
             Use -f to determine the columns from the file's header row, or\n\
             -c to supply column numbers explicitly."
)]
struct Args {
    /// Display extra messages (search details etc)
    #[arg(short, long)]
    verbose: bool,

    /// Read field names from the first line of the CSV file and determine
    /// the right columns automatically
    #[arg(short = 'f', long = "fields", conflicts_with = "columns")]
    fields: bool,

    /// 0-based column numbers for ISBN, ISSN, Author and Title. If
    /// particular data is not present, use 'none'
    #[arg(short = 'c', long = "columns", num_args = 4, value_name = "COL")]
    columns: Option<Vec<String>>,

    /// Skip the first row of the input file (for use with -c when the file
    /// has a header)
    #[arg(long = "skip-header", requires = "columns")]
    skip_header: bool,

    /// Send title/author values unquoted, asking the service for fuzzy
    /// rather than exact matching
    #[arg(long = "no-exact")]
    no_exact: bool,

    /// Comma-separated field names; rows where any of these already holds a
    /// value are written through without a lookup
    #[arg(long = "skip-columns", value_delimiter = ',', value_name = "FIELD")]
    skip_columns: Vec<String>,

    /// Input CSV file
    infile: PathBuf,

    /// Output CSV file
    outfile: PathBuf,
}

fn parse_column(value: &str) -> Result<Option<usize>, SubjectifyError> {
    if value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    value.parse::<usize>().map(Some).map_err(|_| {
        SubjectifyError::Validation(format!(
            "column number must be a 0-based integer or 'none', got '{}'",
            value
        ))
    })
}

async fn run(args: Args) -> Result<(), SubjectifyError> {
    if !args.infile.is_file() {
        return Err(SubjectifyError::Validation(format!(
            "input file {} does not exist",
            args.infile.display()
        )));
    }

    let mode = if args.fields {
        HeaderMode::File
    } else if args.columns.is_some() {
        HeaderMode::Headerless {
            skip_first_row: args.skip_header,
        }
    } else {
        HeaderMode::Default
    };

    tracing::info!("loading data from {}", args.infile.display());
    let (names, mut records) = csvio::load_records(&args.infile, mode)?;
    tracing::info!("loaded {} records", records.len());

    let mapping = if let Some(cols) = &args.columns {
        let parsed: Vec<Option<usize>> = cols
            .iter()
            .map(|c| parse_column(c))
            .collect::<Result<_, _>>()?;
        FieldMapping::from_indices(parsed[0], parsed[1], parsed[2], parsed[3], &names)?
    } else if args.fields {
        let mapping = FieldMapping::infer(&names);
        tracing::info!(
            isbn = ?mapping.isbn, issn = ?mapping.issn,
            author = ?mapping.author, title = ?mapping.title,
            "detected columns from header"
        );
        mapping
    } else {
        FieldMapping::default_columns()
    };

    if mapping.is_unmapped() {
        return Err(SubjectifyError::Validation(
            "no usable columns mapped; nothing to search with".to_string(),
        ));
    }

    for skip in &args.skip_columns {
        if !names.iter().any(|n| n == skip) {
            return Err(SubjectifyError::Validation(format!(
                "skip column '{}' is not a field of the input file",
                skip
            )));
        }
    }

    let client = ClassifyClient::new(!args.no_exact)
        .map_err(|e| SubjectifyError::External(e.to_string()))?;
    let options = ProcessOptions {
        skip_fields: args.skip_columns.clone(),
    };

    let summary = run_batch(&client, &mut records, &mapping, &options, Pacing::polite()).await;
    tracing::info!(
        resolved = summary.resolved,
        unresolved = summary.unresolved,
        skipped = summary.skipped,
        no_search_key = summary.no_search_key,
        "finished processing"
    );

    tracing::info!("writing to {}", args.outfile.display());
    csvio::write_records(&args.outfile, &names, &records, args.fields)?;
    tracing::info!("done, goodbye!");
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "subjectify=debug"
    } else {
        "subjectify=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args).await {
        eprintln!("Fatal error: {}", e);
        std::process::exit(1);
    }
}
