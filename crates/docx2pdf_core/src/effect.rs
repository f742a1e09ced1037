use crate::RunId;

/// Side effects requested by [`crate::update`]; executed by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ResolveDefaultOutputDir,
    CheckConverter,
    CheckForUpdates,
    ConvertBatch {
        run_id: RunId,
        files: Vec<String>,
        output_dir: Option<String>,
    },
    OpenPdf { path: String },
}
