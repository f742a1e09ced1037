//! docx2pdf engine: LibreOffice discovery, subprocess conversion and effect execution.
mod batch;
mod convert;
mod engine;
mod locate;
mod paths;
mod persist;
mod release;
mod types;

pub use batch::{run_batch, ChannelProgressSink, ProgressSink};
pub use convert::{Converter, ConverterSettings, LibreOfficeConverter};
pub use engine::{EngineHandle, EngineSettings};
pub use locate::{locate_soffice, search_path_list, soffice_binary_name};
pub use paths::{expand_inputs, is_docx, resolve_output_path, InputError};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use release::{ReleaseChecker, ReleaseSettings, UpdateError};
pub use types::{
    BatchRequest, BatchSummary, ConversionProgress, ConvertError, DispatchError, EngineEvent,
    FailureKind, FileStatus, RunId,
};
