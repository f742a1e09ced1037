use docx2pdf_core::{AppViewModel, ConverterAvailability, EntryRowView, FileStatus};

/// Lines describing what changed between two views.
///
/// Only transitions are reported, so re-rendering an unchanged view prints nothing.
pub fn render_changes(prev: &AppViewModel, next: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if prev.availability != next.availability {
        match next.availability {
            ConverterAvailability::Available => lines.push("LibreOffice found".to_string()),
            ConverterAvailability::Missing => lines.push("LibreOffice not found".to_string()),
            ConverterAvailability::Unknown => {
                lines.push("Looking for LibreOffice...".to_string())
            }
        }
    }

    if prev.output_dir != next.output_dir {
        match &next.output_dir {
            Some(dir) => lines.push(format!("Output folder: {dir}")),
            None => lines.push("Output folder: next to each source file".to_string()),
        }
    }

    let total = next.entries.len();
    for entry in &next.entries {
        let before = prev
            .entries
            .get(entry.index)
            .filter(|old| old.path == entry.path);
        let changed = before.map_or(true, |old| {
            old.status != entry.status || old.output_path != entry.output_path
        });
        if changed {
            if let Some(line) = entry_line(entry, total, next.overall_progress) {
                lines.push(line);
            }
        }
    }

    if prev.available_update != next.available_update {
        if let Some(version) = &next.available_update {
            lines.push(format!("A newer release is available: {version}"));
        }
    }

    if prev.dispatch_error != next.dispatch_error {
        if let Some(message) = &next.dispatch_error {
            lines.push(format!("Conversion could not start: {message}"));
        }
    }

    lines
}

fn entry_line(entry: &EntryRowView, total: usize, overall: f64) -> Option<String> {
    let counter = format!("[{:>width$}/{}]", entry.index + 1, total, width = digits(total));
    match entry.status {
        FileStatus::Pending => None,
        FileStatus::Converting => Some(format!("{counter} converting {}", entry.name)),
        FileStatus::Completed => Some(format!(
            "{counter} done {} -> {} (overall {:.0}%)",
            entry.name,
            entry.output_path.as_deref().unwrap_or("?"),
            overall
        )),
        FileStatus::Error => Some(format!(
            "{counter} failed {}: {}",
            entry.name,
            entry.error.as_deref().unwrap_or("unknown error")
        )),
    }
}

fn digits(mut n: usize) -> usize {
    let mut width = 1;
    while n >= 10 {
        n /= 10;
        width += 1;
    }
    width
}

pub fn summary_line(view: &AppViewModel) -> String {
    let mut line = format!(
        "{} of {} converted",
        view.completed_count,
        view.entries.len()
    );
    if view.error_count > 0 {
        line.push_str(&format!(", {} failed", view.error_count));
    }
    line
}

pub fn install_instructions() -> &'static str {
    if cfg!(target_os = "windows") {
        "LibreOffice is required. Install it from https://www.libreoffice.org/download/ \
         or run: winget install TheDocumentFoundation.LibreOffice"
    } else if cfg!(target_os = "macos") {
        "LibreOffice is required. Install it from https://www.libreoffice.org/download/ \
         or run: brew install --cask libreoffice"
    } else {
        "LibreOffice is required. Install it with your package manager, \
         e.g. sudo apt install libreoffice-writer"
    }
}
