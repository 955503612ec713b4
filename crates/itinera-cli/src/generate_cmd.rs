//! `itinera generate`: build a plan from the command line without a server.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use itinera_core::extract::{APPLICATION_PDF, OCTET_STREAM, TEXT_PLAIN};
use itinera_core::model::parse_date;
use itinera_core::{Plan, TripRequest, Upload};

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// First day of the trip (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: String,
    /// Last day of the trip (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: String,
    #[arg(long, default_value = TripRequest::DEFAULT_CLIENT)]
    pub client_name: String,
    #[arg(long, default_value = TripRequest::DEFAULT_DESTINATION)]
    pub destination: String,
    #[arg(long, default_value = TripRequest::DEFAULT_STYLE)]
    pub travel_style: String,
    #[arg(long, default_value = "")]
    pub special_requests: String,
    /// Supporting document (.txt or .pdf); may be repeated
    #[arg(long = "attachment", value_name = "PATH")]
    pub attachments: Vec<PathBuf>,
    /// Where to write the PDF (defaults to itinerario_<client>.pdf)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Print the plan as JSON instead of writing a PDF
    #[arg(long)]
    pub json: bool,
}

/// Content type for an attachment, guessed from its extension.
fn guess_content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("txt") | Some("md") => TEXT_PLAIN,
        Some("pdf") => APPLICATION_PDF,
        _ => OCTET_STREAM,
    }
}

fn load_upload(path: &Path) -> Result<Upload> {
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read attachment {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    Ok(Upload::new(
        filename,
        Some(guess_content_type(path).to_owned()),
        data,
    ))
}

/// Validate the arguments, read attachments and build the plan.
pub fn build_plan(args: &GenerateArgs) -> Result<Plan> {
    let start = parse_date("start_date", &args.start_date)?;
    let end = parse_date("end_date", &args.end_date)?;
    let request = TripRequest::new(args.client_name.as_str(), start, end)?
        .destination(args.destination.as_str())
        .travel_style(args.travel_style.as_str())
        .special_requests(args.special_requests.as_str());

    let mut uploads = args
        .attachments
        .iter()
        .map(|path| load_upload(path))
        .collect::<Result<Vec<_>>>()?;

    let (text, summaries) = itinera_core::extract(&mut uploads);
    Ok(itinera_core::build(&request, &text, summaries))
}

/// Execute `itinera generate`.
pub fn run_generate(args: &GenerateArgs) -> Result<()> {
    let plan = build_plan(args)?;

    if args.json {
        let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
        println!("{json}");
        return Ok(());
    }

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(plan.download_filename()));
    let bytes = itinera_core::render(&plan).context("failed to render itinerary")?;
    std::fs::write(&path, &bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "Itinerary for {} written to {} ({} days, {} bytes)",
        plan.client.name,
        path.display(),
        plan.days.len(),
        bytes.len()
    );
    Ok(())
}
