use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

pub const USAGE: &str = "\
Usage: docx2pdf [OPTIONS] <PATH>...

Converts DOCX files to PDF with LibreOffice. Directories contribute the
.docx files they contain.

Options:
  -o, --output-dir <DIR>  Write every PDF into DIR
      --same-dir          Write each PDF next to its source file
  -r, --recursive         Descend into subdirectories
      --open              Open each produced PDF when the batch is done
      --json              Print progress events as JSON lines on stdout
      --wait              Keep retrying until LibreOffice is installed
      --no-update-check   Skip the release check
      --config <FILE>     Use FILE instead of the default config.ron
  -v, --verbose           Log debug output to stderr
  -h, --help              Print this help
  -V, --version           Print the version";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Run(CliArgs),
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub inputs: Vec<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub same_dir: bool,
    pub recursive: bool,
    pub open: bool,
    pub json: bool,
    pub wait: bool,
    pub check_updates: bool,
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output_dir: None,
            same_dir: false,
            recursive: false,
            open: false,
            json: false,
            wait: false,
            check_updates: true,
            config: None,
            verbose: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("option {0} requires a value")]
    MissingValue(String),
    #[error("unknown option {0}")]
    UnknownOption(String),
    #[error("--output-dir and --same-dir cannot be combined")]
    ConflictingOutput,
    #[error("no input files given")]
    NoInputs,
}

pub fn parse<I>(args: I) -> Result<CliCommand, CliError>
where
    I: IntoIterator<Item = OsString>,
{
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();
    let mut positional_only = false;

    while let Some(arg) = args.next() {
        let text = arg.to_string_lossy().into_owned();
        if positional_only || !text.starts_with('-') || text == "-" {
            parsed.inputs.push(PathBuf::from(arg));
            continue;
        }

        let (flag, inline) = match text.split_once('=') {
            Some((flag, value)) if text.starts_with("--") => {
                (flag.to_string(), Some(OsString::from(value)))
            }
            _ => (text.to_string(), None),
        };
        let mut value = |name: &str| {
            inline
                .clone()
                .or_else(|| args.next())
                .map(PathBuf::from)
                .ok_or_else(|| CliError::MissingValue(name.to_string()))
        };

        match flag.as_str() {
            "--" => positional_only = true,
            "-h" | "--help" => return Ok(CliCommand::Help),
            "-V" | "--version" => return Ok(CliCommand::Version),
            "-o" | "--output-dir" => parsed.output_dir = Some(value(&flag)?),
            "--config" => parsed.config = Some(value(&flag)?),
            "--same-dir" => parsed.same_dir = true,
            "-r" | "--recursive" => parsed.recursive = true,
            "--open" => parsed.open = true,
            "--json" => parsed.json = true,
            "--wait" => parsed.wait = true,
            "--no-update-check" => parsed.check_updates = false,
            "-v" | "--verbose" => parsed.verbose = true,
            _ => return Err(CliError::UnknownOption(flag)),
        }
    }

    if parsed.output_dir.is_some() && parsed.same_dir {
        return Err(CliError::ConflictingOutput);
    }
    if parsed.inputs.is_empty() {
        return Err(CliError::NoInputs);
    }
    Ok(CliCommand::Run(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(args: &[&str]) -> Result<CliCommand, CliError> {
        parse(args.iter().map(OsString::from))
    }

    #[test]
    fn parses_paths_and_flags() {
        let parsed = run(&["-o", "/out", "--open", "a.docx", "--json", "docs"]).unwrap();
        assert_eq!(
            parsed,
            CliCommand::Run(CliArgs {
                inputs: vec![PathBuf::from("a.docx"), PathBuf::from("docs")],
                output_dir: Some(PathBuf::from("/out")),
                open: true,
                json: true,
                ..CliArgs::default()
            })
        );
    }

    #[test]
    fn accepts_inline_values_and_double_dash() {
        let parsed = run(&["--output-dir=/pdf", "--", "-odd-name.docx"]).unwrap();
        let CliCommand::Run(args) = parsed else {
            panic!("expected run command");
        };
        assert_eq!(args.output_dir, Some(PathBuf::from("/pdf")));
        assert_eq!(args.inputs, vec![PathBuf::from("-odd-name.docx")]);
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(run(&["a.docx", "--help"]), Ok(CliCommand::Help));
        assert_eq!(run(&["-V"]), Ok(CliCommand::Version));
    }

    #[test]
    fn reports_usage_errors() {
        assert_eq!(run(&[]), Err(CliError::NoInputs));
        assert_eq!(
            run(&["a.docx", "--output-dir"]),
            Err(CliError::MissingValue("--output-dir".into()))
        );
        assert_eq!(
            run(&["--frobnicate", "a.docx"]),
            Err(CliError::UnknownOption("--frobnicate".into()))
        );
        assert_eq!(
            run(&["-o", "/x", "--same-dir", "a.docx"]),
            Err(CliError::ConflictingOutput)
        );
    }

    #[test]
    fn update_check_can_be_disabled() {
        let CliCommand::Run(args) = run(&["--no-update-check", "a.docx"]).unwrap() else {
            panic!("expected run command");
        };
        assert!(!args.check_updates);
    }
}
