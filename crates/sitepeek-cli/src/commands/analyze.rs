use anyhow::{Context, Result};
use sitepeek_core::{Config, SitePeek};

use crate::cli::AnalyzeArgs;
use crate::output::render::render_analysis;
use crate::output::{OutputFormat, progress};

/// Analyze a page and print the inventory.
pub async fn execute(args: &AnalyzeArgs, mut config: Config, quiet: bool) -> Result<()> {
    if args.no_enrich {
        config.analysis.enrich_stylesheets = false;
    }
    let palette = args.palette.unwrap_or(config.analysis.palette_size);
    let peek = SitePeek::new(config)?;

    let hidden = quiet || matches!(args.format, OutputFormat::Json);
    let spinner = progress::spinner(&format!("Analyzing {}", args.url), hidden);
    let result = peek.analyze(&args.url).await;
    spinner.finish_and_clear();
    let result = result.with_context(|| format!("Failed to analyze {}", args.url))?;

    let mut stdout = std::io::stdout().lock();
    render_analysis(&result, args.format, palette, &mut stdout)
}
