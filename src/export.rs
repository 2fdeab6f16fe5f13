use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::HarvestError;
use crate::results::CrawlResult;

/// Writes every non-absent text of `result` to `path`, one page per line, in
/// discovery order. Returns the number of lines written.
pub fn write_export(path: &Path, result: &CrawlResult) -> Result<usize, HarvestError> {
    let export_error = |source| HarvestError::Export {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(export_error)?;
    }

    let file = File::create(path).map_err(export_error)?;
    write_lines(BufWriter::new(file), result.texts()).map_err(export_error)
}

/// Writes each text followed by a newline
pub fn write_lines<'a, W: Write>(
    mut writer: W,
    texts: impl IntoIterator<Item = &'a str>,
) -> io::Result<usize> {
    let mut written = 0;
    for text in texts {
        writeln!(writer, "{}", text)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Logs every extracted page in order, then the summary statistics
pub fn log_result(result: &CrawlResult) {
    if result.contents.is_empty() {
        ::log::info!("Content list is empty.");
    }

    for text in result.texts() {
        ::log::info!("{}", text);
    }

    ::log::info!("Total character count: {}", result.stats.total_characters);
    ::log::info!("First sentence: {}", result.stats.first_sentence_or_na());
    ::log::info!("Last sentence: {}", result.stats.last_sentence_or_na());
}
