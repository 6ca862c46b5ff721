use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use agency_pdf::{
    AssetSource, AssetSources, Config, Error, InvoiceExportInput, ProposalInput, TimesheetExportInput,
};

#[derive(Parser)]
#[command(name = "agency-pdf")]
#[command(version)]
#[command(about = "Generate offer proposals, timesheets and invoices as PDF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Common {
    /// Input JSON file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Brand configuration (JSON); defaults to $AGENCY_PDF_CONFIG
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Logo (SVG, PNG or JPEG, or a data: URI)
    #[arg(long, value_name = "SRC")]
    logo: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an offer proposal
    Proposal {
        #[command(flatten)]
        common: Common,

        /// Cover background image
        #[arg(long, value_name = "SRC")]
        background: Option<String>,

        /// Issue date (YYYY-MM-DD), overrides the input
        #[arg(long, value_name = "DATE")]
        date: Option<NaiveDate>,
    },

    /// Export one timesheet project, or every project in a JSON array
    Timesheet {
        #[command(flatten)]
        common: Common,
    },

    /// Export an invoice
    Invoice {
        #[command(flatten)]
        common: Common,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// A single project object or an array of them.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn run(cli: Cli) -> Result<Vec<PathBuf>, Error> {
    match cli.command {
        Commands::Proposal {
            common,
            background,
            date,
        } => {
            let config = Config::load(common.config.as_deref())?;
            let mut input: ProposalInput = read_json(&common.input)?;
            if date.is_some() {
                input.date = date;
            }
            let sources = AssetSources {
                logo: common.logo.map(AssetSource::Reference),
                background: background.map(AssetSource::Reference),
            };
            let path = agency_pdf::generate_offer_proposal_pdf(&input, &sources, &config, &common.output)?;
            Ok(vec![path])
        }
        Commands::Timesheet { common } => {
            let config = Config::load(common.config.as_deref())?;
            let logo = agency_pdf::load_export_logo(common.logo.map(AssetSource::Reference).as_ref())?;
            match read_json::<OneOrMany<TimesheetExportInput>>(&common.input)? {
                OneOrMany::One(input) => {
                    let path = agency_pdf::export_timesheet_pdf(&input, logo.as_ref(), &config, &common.output)?;
                    Ok(vec![path])
                }
                OneOrMany::Many(inputs) => {
                    let results = agency_pdf::export_all_timesheets(&inputs, logo.as_ref(), &config, &common.output);
                    let total = results.len();
                    let mut written = Vec::new();
                    for (input, result) in inputs.iter().zip(results) {
                        match result {
                            Ok(path) => written.push(path),
                            Err(e) => eprintln!("Error: {}: {e}", input.project_name),
                        }
                    }
                    if written.len() < total {
                        for path in &written {
                            println!("{}", path.display());
                        }
                        return Err(Error::Generation(format!(
                            "{} of {total} timesheet exports failed",
                            total - written.len()
                        )));
                    }
                    Ok(written)
                }
            }
        }
        Commands::Invoice { common } => {
            let config = Config::load(common.config.as_deref())?;
            let logo = agency_pdf::load_export_logo(common.logo.map(AssetSource::Reference).as_ref())?;
            let input: InvoiceExportInput = read_json(&common.input)?;
            let path = agency_pdf::export_invoice_pdf(&input, logo.as_ref(), &config, &common.output)?;
            Ok(vec![path])
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(paths) => {
            for path in paths {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
