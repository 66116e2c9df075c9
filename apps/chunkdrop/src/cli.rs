//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// chunkdrop - upload files to an HTTP endpoint in sequential chunks.
#[derive(Debug, Parser)]
#[command(
    name = "chunkdrop",
    version,
    about = "Upload files to an HTTP endpoint in sequential chunks"
)]
pub struct Cli {
    /// Files to upload
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Upload endpoint (overrides the config file and CHUNKDROP_ENDPOINT)
    #[arg(short = 'e', long = "endpoint", value_name = "URL")]
    pub endpoint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_files() {
        let cli = Cli::try_parse_from(["chunkdrop", "a.bin", "dir/b.iso"]).unwrap();
        assert_eq!(
            cli.files,
            vec![PathBuf::from("a.bin"), PathBuf::from("dir/b.iso")]
        );
        assert!(cli.endpoint.is_none());
    }

    #[test]
    fn files_are_required() {
        let err = Cli::try_parse_from(["chunkdrop"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn help_is_not_a_file() {
        let err = Cli::try_parse_from(["chunkdrop", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn endpoint_flag() {
        let cli = Cli::try_parse_from([
            "chunkdrop",
            "--endpoint",
            "http://10.0.0.2:9000/upload",
            "a.bin",
        ])
        .unwrap();
        assert_eq!(cli.endpoint.as_deref(), Some("http://10.0.0.2:9000/upload"));
        assert_eq!(cli.files, vec![PathBuf::from("a.bin")]);
    }
}
