use clap::{Args, Parser, Subcommand};
use statlab_rs::client::{API_BASE_ENV, DEFAULT_API_BASE};
use statlab_rs::params::{
    DEFAULT_DESIGN_LABEL, DEFAULT_FDR_THRESHOLD, DEFAULT_NUM_PCS, DEFAULT_PLOT_OPTION,
};
use statlab_rs::ScalingMethod;

#[derive(Parser)]
#[command(
    name = "statlab",
    version,
    about = "ANOVA and PCA analysis client",
    long_about = "Upload a CSV/Excel dataset to an analysis service and render the ANOVA or PCA results.\n\
                  The service address is read from $STATLAB_API_URL or --api-url."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a one-way ANOVA on a dataset
    Anova(AnovaArgs),
    /// Run a principal component analysis on a dataset
    Pca(PcaArgs),
    /// Check whether a file would be accepted for upload
    Validate(ValidateArgs),
    /// Check that the analysis service is reachable
    Health(HealthArgs),
}

/// Options shared by both analysis commands
#[derive(Args, Clone)]
pub struct SubmitArgs {
    /// Dataset file (CSV, XLSX or XLS)
    #[arg(long)]
    pub file: String,

    /// Declared media type of the file (default: inferred from extension)
    #[arg(long)]
    pub media_type: Option<String>,

    /// Name of the grouping factor column
    #[arg(long, default_value = DEFAULT_DESIGN_LABEL)]
    pub design_label: String,

    /// Analysis service base URL
    #[arg(long, env = API_BASE_ENV, default_value = DEFAULT_API_BASE)]
    pub api_url: String,

    /// Print the result as JSON instead of tables
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Export the result report as JSON to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct AnovaArgs {
    #[command(flatten)]
    pub submit: SubmitArgs,

    /// False discovery rate threshold in [0, 1]
    #[arg(long, default_value_t = DEFAULT_FDR_THRESHOLD, allow_negative_numbers = true)]
    pub fdr_threshold: f64,

    /// Server-side plot detail option (0-4)
    #[arg(long, default_value_t = DEFAULT_PLOT_OPTION)]
    pub plot_option: u8,
}

#[derive(Args)]
pub struct PcaArgs {
    #[command(flatten)]
    pub submit: SubmitArgs,

    /// Number of principal components (2-10)
    #[arg(long, default_value_t = DEFAULT_NUM_PCS, allow_negative_numbers = true)]
    pub num_pcs: i32,

    /// Scaling method: auto, mean or pareto
    #[arg(long, default_value = "auto", value_parser = parse_scaling)]
    pub scaling: ScalingMethod,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// File to check
    #[arg(long)]
    pub file: String,

    /// Declared media type of the file (default: inferred from extension)
    #[arg(long)]
    pub media_type: Option<String>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct HealthArgs {
    /// Analysis service base URL
    #[arg(long, env = API_BASE_ENV, default_value = DEFAULT_API_BASE)]
    pub api_url: String,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn parse_scaling(s: &str) -> Result<ScalingMethod, String> {
    s.parse()
}
