mod error;
mod fetch;
mod html;
mod okh;
mod output;
mod parser;
mod pipeline;
mod projects;
mod sanitize;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use fetch::{CachedFetcher, HttpClient};
use pipeline::RunStats;
use projects::Project;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "appropedia_okh",
    version,
    about = "Convert Appropedia project infoboxes into OKH v2 manifests"
)]
struct Cli {
    /// Directory for cached pages and written manifests
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,
    /// Download pages again even if cached
    #[arg(short, long, global = true)]
    redownload: bool,
    /// Max projects to process (default: all)
    #[arg(short = 'n', long, global = true)]
    limit: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the project list and write one manifest per project
    Run,
    /// Write manifests for the given page titles only
    Project {
        #[arg(required = true)]
        titles: Vec<String>,
    },
    /// Print the project titles found on the project list
    List,
    /// Print the manifest of one project as JSON, without writing it
    Show { title: String },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(dir) = cli.storage_dir {
        settings.storage_dir = dir;
    }
    settings.force_refresh |= cli.redownload;
    tracing::debug!(?settings, "settings loaded");

    std::fs::create_dir_all(&settings.storage_dir)
        .with_context(|| format!("Failed to create storage dir {:?}", settings.storage_dir))?;
    let client = HttpClient::new(&settings).context("Failed to build HTTP client")?;
    let fetcher = CachedFetcher::new(client, settings.storage_dir.clone(), settings.force_refresh);

    match cli.command {
        Commands::Run => {
            let mut titles = projects::fetch_titles(&fetcher, &settings)
                .context("Failed to fetch the project list")?;
            if let Some(n) = cli.limit {
                titles.truncate(n);
            }
            if titles.is_empty() {
                println!("No projects found.");
                return Ok(());
            }
            println!("Scraping {} projects into {:?}...", titles.len(), settings.storage_dir);
            let stats = pipeline::run(&fetcher, &settings, &titles);
            print_stats(&stats, fetcher.downloads());
        }
        Commands::Project { mut titles } => {
            if let Some(n) = cli.limit {
                titles.truncate(n);
            }
            let stats = pipeline::run(&fetcher, &settings, &titles);
            print_stats(&stats, fetcher.downloads());
        }
        Commands::List => {
            let mut titles = projects::fetch_titles(&fetcher, &settings)
                .context("Failed to fetch the project list")?;
            if let Some(n) = cli.limit {
                titles.truncate(n);
            }
            for title in &titles {
                println!("{}", title);
            }
        }
        Commands::Show { title } => {
            let project = Project::new(&title, &settings);
            match pipeline::map_project(&fetcher, &settings, &project)? {
                Some((infobox, mapped)) => {
                    for (name, value) in infobox.iter() {
                        tracing::debug!("{} = {:?}", name, value);
                    }
                    eprintln!("{} infobox fields", infobox.len());
                    for e in infobox.malformed() {
                        eprintln!("skipped: {}", e);
                    }
                    println!("{}", serde_json::to_string_pretty(&mapped.record)?);
                }
                None => println!("{} has no project infobox.", title),
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

fn print_stats(stats: &RunStats, downloads: usize) {
    println!("Projects:           {}", stats.total);
    println!("Manifests written:  {}", stats.written);
    println!("Without infobox:    {}", stats.no_infobox);
    println!("Failed:             {}", stats.failed);
    println!("Images unresolved:  {}", stats.images_unresolved);
    println!("Lines skipped:      {}", stats.malformed_lines);
    println!("Pages downloaded:   {}", downloads);
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
