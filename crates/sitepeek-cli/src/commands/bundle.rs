use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use sitepeek_core::{
    BundleCaps, BundleEvent, BundleRequest, Config, SitePeek, parse_page_url, write_bundle_with,
};
use tracing::debug;

use crate::cli::BundleArgs;
use crate::error::CliError;
use crate::output::render::render_bundle;
use crate::output::shapes::BundleOutput;
use crate::output::{OutputFormat, progress};

/// Bundle a page and its capped assets into a zip archive.
pub async fn execute(args: &BundleArgs, config: Config, quiet: bool) -> Result<()> {
    let caps = caps_from_args(args, config.bundle.caps);
    let peek = SitePeek::new(config)?;
    let mut builder = peek.bundle_builder();
    if let Some(concurrency) = args.concurrency {
        builder = builder.with_concurrency(concurrency);
    }
    debug!(?caps, concurrency = builder.concurrency(), "bundle settings");

    let page_url = parse_page_url(&args.url)?;
    let hidden = quiet || matches!(args.format, OutputFormat::Json);
    let spinner = progress::spinner(&format!("Analyzing {page_url}"), hidden);
    let stream = builder.stream(BundleRequest::new(page_url, caps)).await;
    spinner.finish_and_clear();
    let stream = stream.with_context(|| format!("Failed to bundle {}", args.url))?;

    // Only create the archive once the page is known to be good
    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))
        .map_err(CliError::usage)?;

    // +1 for index.html
    let bar = progress::bundle_bar(stream.planned() + 1, hidden);
    let (mut writer, report) = write_bundle_with(stream, BufWriter::new(file), |event| {
        if let BundleEvent::Skipped(skip) = event {
            bar.set_message(format!("skipped {}", skip.reference.url));
        }
        bar.inc(1);
    })
    .await
    .with_context(|| format!("Failed to write {}", args.output.display()))?;
    bar.finish_and_clear();

    writer
        .flush()
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let output = BundleOutput::new(&args.output, &report);
    if !quiet || matches!(args.format, OutputFormat::Json) {
        render_bundle(&output, args.format, &mut std::io::stdout().lock())?;
    }
    Ok(())
}

fn caps_from_args(args: &BundleArgs, defaults: BundleCaps) -> BundleCaps {
    BundleCaps {
        css: args.css_cap.unwrap_or(defaults.css),
        js: args.js_cap.unwrap_or(defaults.js),
        images: args.image_cap.unwrap_or(defaults.images),
        others: args.other_cap.unwrap_or(defaults.others),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn bundle_args(extra: &[&str]) -> BundleArgs {
        let mut argv = vec!["sitepeek", "bundle", "example.com"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Bundle(args) => args,
            other => panic!("expected bundle, got {other:?}"),
        }
    }

    #[test]
    fn test_caps_default_to_config() {
        let caps = caps_from_args(&bundle_args(&[]), BundleCaps::default());
        assert_eq!(caps, BundleCaps::default());
    }

    #[test]
    fn test_caps_overrides() {
        let caps = caps_from_args(
            &bundle_args(&["--image-cap", "5", "--other-cap", "0"]),
            BundleCaps::default(),
        );
        assert_eq!(caps.images, 5);
        assert_eq!(caps.others, 0);
        assert_eq!(caps.css, BundleCaps::default().css);
    }
}
