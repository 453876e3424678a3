//! WWWLite - Headless document driver
//!
//! Loads a local document through the page engine, lays it out for a
//! viewport, and prints the resulting box tree.

mod fetch;
mod markup;
mod report;
mod settings;

use clap::Parser;
use page::{Page, StatusMessage};
use settings::AppSettings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// WWWLite - lightweight document layout engine
#[derive(Parser, Debug)]
#[command(name = "wwwlite")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Document to open: a file: URI or a local path
    #[arg(value_name = "URI")]
    uri: Option<String>,

    /// Viewport width in pixels (overrides the settings file)
    #[arg(long)]
    width: Option<f32>,

    /// Settings file (JSON)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Highlight the first match of a pattern and report where it is
    #[arg(long, value_name = "PATTERN")]
    find: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = cli
        .settings
        .as_deref()
        .map(AppSettings::load)
        .unwrap_or_default();
    let width = cli.width.unwrap_or(settings.viewport_width);

    let Some(uri) = cli.uri else {
        tracing::info!("No start URI given, nothing to load");
        return Ok(());
    };
    let url = fetch::resolve_start_uri(&uri)?;

    let mut page = Page::new(settings.page_config()).with_cache(settings.text_run_cache());
    let request = page.navigate(url.as_str())?;
    let loaded = fetch::load_document(&mut page, &request, settings.chunk_size);
    log_status(&mut page);
    loaded?;

    let mut pass = page.layout(width)?;
    if fetch::load_images(&mut page) > 0 && page.needs_layout() {
        let scroll_to = pass.scroll_to;
        pass = page.layout(width)?;
        pass.scroll_to = pass.scroll_to.or(scroll_to);
    }
    log_status(&mut page);

    if let Some(pattern) = cli.find.as_deref() {
        match page.find(pattern) {
            Some(found) => println!(
                "Found {:?} in {} at {}..{}",
                pattern, found.container, found.range.start, found.range.end
            ),
            None => println!("No match for {:?}", pattern),
        }
    }

    if let Some(tree) = page.tree() {
        println!(
            "=== Layout (viewport {}; document {}x{}) ===",
            width, pass.width, pass.height
        );
        if let Some(y) = pass.scroll_to {
            println!("Scrolled to y={}", y);
        }
        print!("{}", report::layout_report(tree));
    }
    Ok(())
}

fn log_status(page: &mut Page) {
    for message in page.take_status() {
        match message {
            StatusMessage::LoadFailed | StatusMessage::ImageFailed(_) => {
                tracing::warn!(status = %message)
            }
            _ => tracing::info!(status = %message),
        }
    }
}
