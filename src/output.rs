use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append one feedback entry:
///
/// ```text
/// @path/to/file:42
/// the comment, possibly
/// over several lines
///
/// ```
///
/// The `:line` suffix is omitted when there is no line. Parent directories
/// are created on demand.
pub fn append_feedback(output: &Path, file: &str, line: Option<usize>, comment: &str) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(output)
        .with_context(|| format!("failed to open output file {}", output.display()))?;

    f.write_all(format_entry(file, line, comment).as_bytes())
        .context("failed to write feedback")?;
    log::info!("feedback written to {} for {}", output.display(), file);
    Ok(())
}

fn format_entry(file: &str, line: Option<usize>, comment: &str) -> String {
    let comment = comment.trim();
    match line {
        Some(n) if n > 0 => format!("@{}:{}\n{}\n\n", file, n, comment),
        _ => format!("@{}\n{}\n\n", file, comment),
    }
}

/// Check an output path before the UI starts. The parent directory may be
/// missing (it is created on first write) but must not be a file.
pub fn validate_output_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        anyhow::bail!("output path is required");
    }

    let is_md = path
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("md"))
        .unwrap_or(false);
    if !is_md {
        anyhow::bail!("output file must have .md extension");
    }

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => anyhow::bail!("{} is not a directory", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("cannot access directory {}", dir.display())),
    }
}

/// `<tmp>/tcr-<16 hex>.md`
pub fn default_output_path() -> PathBuf {
    let id = uuid::Uuid::new_v4().simple().to_string();
    std::env::temp_dir().join(format!("tcr-{}.md", &id[..16]))
}
