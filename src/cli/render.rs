//! Render command - converts markdown-lite text to safe HTML.

use crate::config::WidgetConfig;
use crate::{render, view};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Render `file` (stdin when absent). `page` wraps the fragment in a full
/// document; `open` also writes that document to a temp file and opens it.
pub async fn execute(
    config: &WidgetConfig,
    file: Option<&Path>,
    page: bool,
    open: bool,
) -> Result<()> {
    let source = match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read stdin")?;
            buf
        }
    };

    let markup = render::render(&source);
    if !page && !open {
        println!("{}", markup);
        return Ok(());
    }

    let document = view::render_markup_page(config.title(), &markup);
    if !open {
        print!("{}", document);
        return Ok(());
    }

    let path = write_preview(&document)?;
    tracing::debug!("Opening preview {:?}", path);
    if let Err(e) = open::that(&path) {
        tracing::warn!("Failed to open browser: {}", e);
    }
    println!("{}", path.display());
    Ok(())
}

/// Persist `document` to a temp file that outlives the process.
fn write_preview(document: &str) -> Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix("chat-widget-")
        .suffix(".html")
        .tempfile()
        .context("Failed to create preview file")?;
    file.write_all(document.as_bytes())
        .context("Failed to write preview file")?;
    let (_, path) = file.keep().context("Failed to keep preview file")?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_preview() {
        let path = write_preview("<p>hi</p>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>hi</p>");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("html"));
        std::fs::remove_file(path).unwrap();
    }
}
