use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Local};
use colored::*;
use serde::Serialize;
use url::Url;

use crate::page_data::PageData;

/// What gets shown for one mirrored page.
#[derive(Debug, Serialize)]
pub struct PageReport<'a> {
    pub url: &'a str,
    pub path: String,
    pub site: String,
    pub last_fetch: DateTime<Local>,
    #[serde(flatten)]
    pub data: &'a PageData,
}

impl<'a> PageReport<'a> {
    pub fn new(url: &'a str, site: &str, path: &Path, data: &'a PageData) -> Self {
        Self {
            url,
            path: path.display().to_string(),
            site: site.to_string(),
            last_fetch: Local::now(),
            data,
        }
    }
}

/// Host as given in the URL, with the port when one is spelled out.
pub fn site(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

pub fn write_header(out: &mut impl Write, urls: &[String]) -> io::Result<()> {
    writeln!(out, "Retrieving the following URLs:")?;
    writeln!(out, "{:?}", urls)
}

pub fn write_saved(out: &mut impl Write, url: &str, path: &Path) -> io::Result<()> {
    writeln!(out, "----------------------------------------------------")?;
    writeln!(out, "{} to {}", url.blue(), path.display())
}

pub fn write_metadata(out: &mut impl Write, report: &PageReport) -> io::Result<()> {
    let data = report.data;
    writeln!(out, "site: {}", report.site)?;
    writeln!(out, "images: {}", data.images.len())?;
    writeln!(out, "javascript: {}", data.javascripts.len())?;
    writeln!(out, "stylesheet: {}", data.stylesheets.len())?;
    writeln!(out, "num_links: {}", data.links.len())?;
    writeln!(out, "last_fetch: {}", report.last_fetch)?;
    if !data.failed_assets.is_empty() {
        writeln!(out, "{} {}", "failed_assets:".yellow(), data.failed_assets.len())?;
    }
    Ok(())
}

pub fn write_json(out: &mut impl Write, report: &PageReport) -> io::Result<()> {
    serde_json::to_writer(&mut *out, report)?;
    writeln!(out)
}
