use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "pom-inventory",
    about = "Build a dependency inventory from Maven POM files and enrich it with license data",
    version
)]
pub struct Cli {
    /// Root directory to scan for pom.xml files
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Directory the CSV files are written to
    #[arg(short = 'r', long = "result-dir", value_name = "DIR")]
    pub result_dir: Option<PathBuf>,

    /// Prefix for the CSV file names
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// CSV separator (single character)
    #[arg(short, long)]
    pub separator: Option<String>,

    /// Group id of your own artifacts; matching dependencies are reported as internal
    #[arg(short = 'g', long = "group-id", value_name = "GROUP_ID")]
    pub group_id: Option<String>,

    /// Maven redirect service URI; enables license enrichment
    #[arg(short = 'm', long = "maven-uri", value_name = "URI")]
    pub maven_uri: Option<String>,

    /// Repository name passed to the redirect service [default: central-proxy]
    #[arg(long = "maven-repository", value_name = "NAME")]
    pub maven_repository: Option<String>,

    /// User for basic authentication against the repository
    #[arg(long = "maven-user", value_name = "USER")]
    pub maven_user: Option<String>,

    /// Password for basic authentication against the repository
    #[arg(long = "maven-password", value_name = "PASSWORD")]
    pub maven_password: Option<String>,

    /// Skip enrichment even if a repository is configured
    #[arg(long)]
    pub offline: bool,

    /// Config file [default: ./.pom-inventory/config.toml, fallback ~/.config/pom-inventory/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "csv", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Debug logging and full dependency tables
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only warnings and a summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Csv,
    Terminal,
    Json,
}
