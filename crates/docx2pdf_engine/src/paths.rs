use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use docx2pdf_logging::{app_debug, app_warn};
use thiserror::Error;

const DEFAULT_STEM: &str = "output";

/// Where LibreOffice writes the PDF for `input`: `{dir}/{stem}.pdf`, with
/// `dir` falling back to the input's own directory.
pub fn resolve_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| source_dir(input));
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_STEM.to_string());
    dir.join(format!("{stem}.pdf"))
}

pub(crate) fn source_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn is_docx(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"))
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot resolve {path:?}: {source}")]
    Resolve { path: PathBuf, source: io::Error },
    #[error("cannot list directory {path:?}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },
}

/// Turns command-line arguments into absolute source paths.
///
/// Directories contribute their `.docx` files sorted by name; `recursive`
/// also descends into subdirectories. Files are passed through even when
/// missing or not `.docx`, so the converter reports them per file.
pub fn expand_inputs(args: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>, InputError> {
    let mut files = Vec::new();
    for arg in args {
        let path = std::path::absolute(arg).map_err(|source| InputError::Resolve {
            path: arg.clone(),
            source,
        })?;
        if path.is_dir() {
            collect_dir(&path, recursive, &mut files)?;
        } else {
            if !is_docx(&path) {
                app_warn!("{:?} does not look like a .docx file", path);
            }
            files.push(path);
        }
    }
    Ok(files)
}

fn collect_dir(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<(), InputError> {
    let read_err = |source| InputError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(read_err)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| Some((entry.path(), entry.file_type().ok()?)))
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (path, file_type) in entries {
        if file_type.is_dir() {
            if recursive {
                collect_dir(&path, recursive, out)?;
            }
        } else if file_type.is_symlink() && path.is_dir() {
            // Linked directories can point back at an ancestor.
            app_debug!("Skipping linked directory {:?}", path);
        } else if is_docx(&path) && !is_lock_file(&path) {
            out.push(path);
        }
    }
    Ok(())
}

/// Word and LibreOffice leave `~$name.docx` owner files next to open documents.
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("~$"))
}
