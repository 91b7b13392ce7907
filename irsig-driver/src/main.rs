//! IR Signature Lister Driver
//!
//! Entry point for the `irsig` binary. Loads one textual IR module and
//! prints every non-intrinsic function signature to stdout, one per
//! line. Any failure prints a single diagnostic to stderr, prefixed by
//! the program name, and exits with code 1.

use clap::error::ErrorKind;
use clap::Parser;
use irsig_common::IrError;
use irsig_frontend::{render_signatures, Loader};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "irsig")]
#[command(about = "Print the signatures of all non-intrinsic functions in a textual IR module")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the IR text file to load
    input: PathBuf,
}

fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(usage_exit_code(&e));
        }
    };

    if let Err(e) = run(&cli.input) {
        eprintln!("{}: {}", program_name(), e);
        std::process::exit(1);
    }
}

/// Load the module and render its signatures to stdout
fn run(input: &Path) -> Result<(), IrError> {
    let module = Loader::load_file(input)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_signatures(&module, &mut out)?;

    Ok(())
}

/// Exit code for an argument-parsing outcome. `--help`/`--version` are
/// successful invocations; genuine usage errors (such as a missing
/// input path) exit 1 rather than clap's default 2.
fn usage_exit_code(e: &clap::Error) -> i32 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Basename the process was invoked as, for diagnostic prefixes
fn program_name() -> String {
    std::env::args()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .unwrap_or_else(|| "irsig".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("irsig-driver-test-{}-{}", std::process::id(), name));
        path
    }

    #[test]
    fn test_run_renders_signatures() {
        let path = temp_path("ok.ll");
        fs::write(
            &path,
            "define i32 @foo(i32, i8*) {\n  ret i32 0\n}\ndeclare void @llvm.dbg.value(metadata, metadata, metadata)\n",
        )
        .unwrap();

        let result = run(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn test_run_missing_file() {
        let path = temp_path("missing.ll");
        let err = run(&path).unwrap_err();
        assert!(matches!(err, IrError::IoError { .. }));
        assert!(err.to_string().contains("missing.ll"));
    }

    #[test]
    fn test_run_malformed_module() {
        let path = temp_path("broken.ll");
        fs::write(&path, "define void @broken() {\n  ret void\n").unwrap();

        let err = run(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(matches!(err, IrError::ParseError { .. }));
        assert!(err.to_string().contains("broken.ll"));
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["irsig"]).is_err());
        assert!(Cli::try_parse_from(["irsig", "input.ll"]).is_ok());
    }

    #[test]
    fn test_usage_exit_codes() {
        let help = Cli::try_parse_from(["irsig", "--help"]).unwrap_err();
        assert_eq!(usage_exit_code(&help), 0);

        let version = Cli::try_parse_from(["irsig", "--version"]).unwrap_err();
        assert_eq!(usage_exit_code(&version), 0);

        let missing = Cli::try_parse_from(["irsig"]).unwrap_err();
        assert_eq!(usage_exit_code(&missing), 1);
    }
}
