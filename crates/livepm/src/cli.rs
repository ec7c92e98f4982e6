//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use livepm_packages::DEFAULT_SERVER_URL;

/// livepm - deploy and install livekeys packages
#[derive(Parser, Debug)]
#[command(name = "livepm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version(VersionArgs),

    /// Deploy and pack a live package
    Deploy(DeployArgs),

    /// Install a package and its dependencies from the registry
    Install(InstallArgs),
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Deploy command
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Path to a livekeys package or package file
    pub package_path: Utf8PathBuf,

    /// Id of the release to deploy
    pub release_id: String,

    /// Source directory (defaults to the package directory)
    #[arg(short, long)]
    pub source: Option<Utf8PathBuf>,

    /// Build directory (defaults to <source>/build)
    #[arg(short, long)]
    pub build: Option<Utf8PathBuf>,

    /// Extra path variables as key=value[,key=value]
    #[arg(short, long)]
    pub options: Option<String>,

    /// Documentation generator script, run with node
    #[arg(long)]
    pub makedoc: Option<Utf8PathBuf>,
}

// Install command
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Package name
    #[arg(short, long)]
    pub name: String,

    /// Release id, e.g. msvc2013_64
    #[arg(short, long)]
    pub release: String,

    /// Registry server
    #[arg(long, env = "LIVEPM_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Install into $LIVEKEYS_DIR/plugins instead of ./packages
    #[arg(short = 'g', long)]
    pub install_globally: bool,

    /// Extract the root archive into every dependency directory instead of
    /// downloading each dependency
    #[arg(long)]
    pub reuse_root_archive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_install() {
        let cli = Cli::parse_from([
            "livepm",
            "install",
            "-n",
            "lcvcore",
            "-r",
            "gcc_64",
            "--server-url",
            "http://localhost:8080/api",
            "-g",
        ]);
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.name, "lcvcore");
                assert_eq!(args.release, "gcc_64");
                assert_eq!(args.server_url, "http://localhost:8080/api");
                assert!(args.install_globally);
                assert!(!args.reuse_root_archive);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_deploy() {
        let cli = Cli::parse_from([
            "livepm",
            "-v",
            "deploy",
            "../livecv",
            "msvc2013_64",
            "--build",
            "/tmp/build",
            "-o",
            "opencv=/opt/opencv",
        ]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Deploy(args) => {
                assert_eq!(args.package_path, Utf8PathBuf::from("../livecv"));
                assert_eq!(args.release_id, "msvc2013_64");
                assert_eq!(args.build, Some(Utf8PathBuf::from("/tmp/build")));
                assert_eq!(args.options.as_deref(), Some("opencv=/opt/opencv"));
                assert!(args.makedoc.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
