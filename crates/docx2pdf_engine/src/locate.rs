//! Lookup of the LibreOffice `soffice` binary.
//!
//! Order: an explicitly configured path, then every `PATH` entry, then a
//! short list of install locations per platform. The first existing file wins.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use docx2pdf_logging::app_debug;

/// Name of the LibreOffice launcher on this platform.
pub fn soffice_binary_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "soffice.exe"
    } else {
        "soffice"
    }
}

pub fn locate_soffice(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        app_debug!("Configured soffice path {:?} does not exist", path);
    }

    let name = soffice_binary_name();
    if let Some(found) = env::var_os("PATH").and_then(|paths| search_path_list(&paths, name)) {
        return Some(found);
    }

    well_known_locations()
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.is_file())
}

/// Finds `name` in a `PATH`-style list of directories.
pub fn search_path_list(paths: &OsStr, name: &str) -> Option<PathBuf> {
    env::split_paths(paths)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

fn well_known_locations() -> &'static [&'static str] {
    if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\LibreOffice\program\soffice.exe",
            r"C:\Program Files (x86)\LibreOffice\program\soffice.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &["/Applications/LibreOffice.app/Contents/MacOS/soffice"]
    } else {
        &[
            "/usr/bin/soffice",
            "/usr/local/bin/soffice",
            "/opt/libreoffice/program/soffice",
            "/usr/lib/libreoffice/program/soffice",
        ]
    }
}
