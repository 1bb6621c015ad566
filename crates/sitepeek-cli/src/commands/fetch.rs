use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sitepeek_core::{Config, SitePeek};

use crate::cli::FetchArgs;
use crate::output::render::render_download;
use crate::output::shapes::DownloadOutput;
use crate::utils::fetch_with_retries;

const RETRY_BASE_DELAY_MS: u64 = 250;

/// Download one asset to a file or stdout.
pub async fn execute(args: &FetchArgs, config: Config, quiet: bool) -> Result<()> {
    let peek = SitePeek::new(config)?;
    let asset = fetch_with_retries(&peek, &args.url, args.retries, RETRY_BASE_DELAY_MS)
        .await
        .with_context(|| format!("Failed to fetch {}", args.url))?;

    let destination = match &args.output {
        Some(path) if path.as_os_str() == "-" => None,
        Some(path) => Some(path.clone()),
        None => Some(local_filename(&asset.suggested_filename)),
    };

    let report = DownloadOutput::new(&asset, destination.as_deref());
    if let Some(path) = &destination {
        tokio::fs::write(path, &asset.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !quiet {
            render_download(&report, args.format, &mut std::io::stdout().lock())?;
        }
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&asset.bytes)?;
        stdout.flush()?;
        // stdout carries the asset; the summary goes to stderr
        if !quiet {
            render_download(&report, args.format, &mut std::io::stderr().lock())?;
        }
    }
    Ok(())
}

/// Keep only the final component of a URL-derived name so it cannot escape
/// the working directory.
fn local_filename(suggested: &str) -> PathBuf {
    Path::new(suggested)
        .file_name()
        .filter(|_| !suggested.contains(['/', '\\']))
        .map_or_else(|| PathBuf::from("file"), PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_filename() {
        assert_eq!(local_filename("logo.png"), PathBuf::from("logo.png"));
        assert_eq!(local_filename(".."), PathBuf::from("file"));
        assert_eq!(local_filename("../../etc/passwd"), PathBuf::from("file"));
        assert_eq!(local_filename("a\\b.txt"), PathBuf::from("file"));
    }
}
