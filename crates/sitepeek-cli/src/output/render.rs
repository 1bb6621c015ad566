//! Renderers for command results.
//!
//! Each function takes the target writer so tests can render into a buffer.

use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use sitepeek_core::{AnalysisResult, AssetCategory, PathNode, PathTree};

use super::OutputFormat;
use super::shapes::{BundleOutput, DownloadOutput};

/// Render an analysis.
///
/// Text output lists every reference by category, the first `palette` colors,
/// the fonts and the path tree. JSON output is the full wire record.
///
/// # Errors
///
/// Returns an error if writing to the output fails or if serialization fails.
pub fn render_analysis(
    result: &AnalysisResult,
    format: OutputFormat,
    palette: usize,
    writer: &mut impl Write,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(result)?;
            writeln!(writer, "{json}")?;
            Ok(())
        },
        OutputFormat::Text => render_analysis_text(result, palette, writer),
    }
}

fn render_analysis_text(
    result: &AnalysisResult,
    palette: usize,
    writer: &mut impl Write,
) -> Result<()> {
    writeln!(writer, "{}", result.page_url.as_str().bold())?;

    for category in AssetCategory::ALL {
        let references = result.assets(category);
        writeln!(writer)?;
        writeln!(
            writer,
            "{} ({})",
            category_heading(category).bold(),
            references.len().to_string().cyan()
        )?;
        if references.is_empty() {
            writeln!(writer, "  {}", "none".bright_black())?;
        }
        for reference in references {
            writeln!(writer, "  {}", reference.url)?;
        }
    }

    let shown = result.palette(palette);
    writeln!(writer)?;
    if shown.len() < result.colors.len() {
        writeln!(
            writer,
            "{} ({} of {})",
            "Colors".bold(),
            shown.len().to_string().cyan(),
            result.colors.len()
        )?;
    } else {
        writeln!(writer, "{} ({})", "Colors".bold(), shown.len().to_string().cyan())?;
    }
    for color in shown {
        writeln!(writer, "  {color}")?;
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "{} ({})",
        "Fonts".bold(),
        result.fonts.len().to_string().cyan()
    )?;
    for font in &result.fonts {
        writeln!(writer, "  {font}")?;
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "{} ({} files)",
        "Structure".bold(),
        result.structure.file_count().to_string().cyan()
    )?;
    write_tree(&result.structure, 1, writer)?;

    let summary = result.summary;
    writeln!(writer)?;
    writeln!(
        writer,
        "{} css, {} js, {} images, {} others",
        summary.total_css, summary.total_js, summary.total_images, summary.total_others
    )?;
    Ok(())
}

const fn category_heading(category: AssetCategory) -> &'static str {
    match category {
        AssetCategory::Css => "CSS files",
        AssetCategory::Js => "JavaScript files",
        AssetCategory::Image => "Images",
        AssetCategory::Other => "Other files",
    }
}

/// Write `tree` as an indented listing; directories end in `/`.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn write_tree(tree: &PathTree, depth: usize, writer: &mut impl Write) -> Result<()> {
    let indent = "  ".repeat(depth);
    for (name, node) in tree.children() {
        match node {
            PathNode::Directory(children) => {
                writeln!(writer, "{indent}{}", format!("{name}/").blue())?;
                write_tree(children, depth + 1, writer)?;
            },
            PathNode::File => writeln!(writer, "{indent}{name}")?,
        }
    }
    Ok(())
}

/// Render the outcome of `sitepeek fetch`.
///
/// # Errors
///
/// Returns an error if writing to the output fails or if serialization fails.
pub fn render_download(
    output: &DownloadOutput,
    format: OutputFormat,
    writer: &mut impl Write,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            writeln!(writer, "{}", serde_json::to_string_pretty(output)?)?;
        },
        OutputFormat::Text => {
            let destination = output.saved_to.as_deref().unwrap_or("stdout");
            writeln!(
                writer,
                "{} {} ({}, {}) to {}",
                "Saved".green(),
                output.url,
                output.content_type,
                format_bytes(output.bytes),
                destination
            )?;
        },
    }
    Ok(())
}

/// Render the outcome of `sitepeek bundle`.
///
/// # Errors
///
/// Returns an error if writing to the output fails or if serialization fails.
pub fn render_bundle(
    output: &BundleOutput,
    format: OutputFormat,
    writer: &mut impl Write,
) -> Result<()> {
    if matches!(format, OutputFormat::Json) {
        writeln!(writer, "{}", serde_json::to_string_pretty(output)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "{} {} ({} entries)",
        "Wrote".green(),
        output.archive,
        output.written.len()
    )?;
    if !output.skipped.is_empty() {
        writeln!(writer, "{} {} assets:", "Skipped".yellow(), output.skipped.len())?;
        for skip in &output.skipped {
            writeln!(writer, "  [{}] {}: {}", skip.category, skip.url, skip.reason)?;
        }
    }
    if output.timed_out {
        writeln!(
            writer,
            "{} deadline reached; remaining downloads were abandoned",
            "Note:".yellow()
        )?;
    }
    Ok(())
}

/// Human-readable byte count.
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::output::shapes::SkippedOutput;

    fn render_text(tree: &PathTree) -> String {
        let mut buffer = Vec::new();
        write_tree(tree, 0, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_tree_indents_nested_directories() {
        let mut tree = PathTree::new();
        tree.insert_path("/a/b.css");
        tree.insert_path("/a/c/d.js");

        let text = render_text(&tree);

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("a/"));
        assert_eq!(lines[1], "  b.css");
        assert!(lines[2].starts_with("  ") && lines[2].contains("c/"));
        assert_eq!(lines[3], "    d.js");
    }

    #[test]
    fn test_bundle_text_lists_skips() {
        let output = BundleOutput {
            archive: "out.zip".to_string(),
            written: vec!["index.html".to_string(), "css/a.css".to_string()],
            skipped: vec![SkippedOutput {
                url: "https://a.test/b.css".to_string(),
                category: "css",
                reason: "'https://a.test/b.css' returned HTTP 404".to_string(),
            }],
            timed_out: false,
        };

        let mut buffer = Vec::new();
        render_bundle(&output, OutputFormat::Text, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("out.zip (2 entries)"));
        assert!(text.contains("[css] https://a.test/b.css"));
        assert!(!text.contains("deadline"));
    }

    #[test]
    fn test_bundle_json_is_parseable() {
        let output = BundleOutput {
            archive: "out.zip".to_string(),
            written: vec!["index.html".to_string()],
            skipped: Vec::new(),
            timed_out: true,
        };

        let mut buffer = Vec::new();
        render_bundle(&output, OutputFormat::Json, &mut buffer).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(json["written"][0], "index.html");
        assert_eq!(json["timed_out"], true);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
