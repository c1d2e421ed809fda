use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vrt_lib::{CONFIG_FILE_PATH, DEFAULT_RETRY_LIMIT};

#[derive(Parser)]
#[command(name = "vrt")]
#[command(
    version,
    about = "Visual Regression Tracker client - submit screenshots to a VRT service",
    long_about = "Visual Regression Tracker client\n\nConfiguration is read from vrt.json in the working directory and the VRT_* environment variables (VRT_APIURL, VRT_APIKEY, VRT_PROJECT, VRT_BRANCHNAME, ...); values in the file win over the environment.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose (debug) logging on stderr")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        default_value = CONFIG_FILE_PATH,
        help = "Config file (JSON); skipped when missing"
    )]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a build, track every screenshot of a manifest, then stop the build
    Run {
        #[arg(
            value_name = "MANIFEST",
            help = "JSON array of submissions: {\"name\": ..., \"imagePath\"|\"imageBase64\"|\"imageBuffer\": ...}"
        )]
        manifest: PathBuf,

        #[arg(
            long,
            default_value_t = DEFAULT_RETRY_LIMIT,
            help = "Resubmissions while the service reports an unresolved diff"
        )]
        retry_limit: u32,

        #[arg(
            long,
            help = "Report failed verdicts on stderr instead of failing the run"
        )]
        soft_assert: bool,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults() {
        let cli = Cli::try_parse_from(["vrt", "run", "manifest.json"]).expect("parse");

        assert!(!cli.verbose);
        assert_eq!(cli.config, PathBuf::from("vrt.json"));
        match cli.command {
            Commands::Run {
                manifest,
                retry_limit,
                soft_assert,
                format,
                output,
            } => {
                assert_eq!(manifest, PathBuf::from("manifest.json"));
                assert_eq!(retry_limit, 2);
                assert!(!soft_assert);
                assert_eq!(format, OutputFormat::Json);
                assert!(output.is_none());
            }
        }
    }

    #[test]
    fn run_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "vrt",
            "--verbose",
            "run",
            "m.json",
            "--retry-limit",
            "5",
            "--soft-assert",
            "--format",
            "pretty",
        ])
        .expect("parse");

        assert!(cli.verbose);
        let Commands::Run {
            retry_limit,
            soft_assert,
            format,
            ..
        } = cli.command;
        assert_eq!(retry_limit, 5);
        assert!(soft_assert);
        assert_eq!(format, OutputFormat::Pretty);
    }
}
