use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use page_mirror::report::{self, PageReport};
use page_mirror::{logging, FileManager, MirrorCommand, MirrorError, PageMirror};

#[tokio::main]
async fn main() -> Result<()> {
    let args = MirrorCommand::parse();
    logging::init_logging(args.verbose)?;

    let mut stdout = io::stdout().lock();
    report::write_header(&mut stdout, &args.urls)?;

    let file_manager = FileManager::new(&args.output_dir)
        .with_context(|| format!("Failed to prepare output directory {:?}", args.output_dir))?;
    let mirror = PageMirror::new(args.fetch_options())?;

    let spinner_style = ProgressStyle::default_spinner().template("{spinner} {msg}")?;
    let mut failed = 0;

    for url in &args.urls {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style.clone());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("Downloading: {}", url));

        let result = mirror.mirror_page(url, &file_manager).await;
        spinner.finish_and_clear();

        let (path, page_data) = match result {
            Ok(saved) => saved,
            Err(MirrorError::InvalidUrl { .. }) => {
                writeln!(stdout, "Invalid URL: {}. Skipping...", url)?;
                failed += 1;
                continue;
            }
            Err(e) => {
                eprintln!("{} {}", "❌".red(), e);
                failed += 1;
                continue;
            }
        };

        report::write_saved(&mut stdout, url, &path)?;

        if args.metadata || args.json {
            let site = url::Url::parse(url)
                .map(|u| report::site(&u))
                .unwrap_or_default();
            let page_report = PageReport::new(url, &site, &path, &page_data);
            if args.json {
                report::write_json(&mut stdout, &page_report)?;
            } else {
                report::write_metadata(&mut stdout, &page_report)?;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} URLs could not be mirrored", failed, args.urls.len());
    }
    Ok(())
}
