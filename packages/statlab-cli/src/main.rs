use clap::Parser;

mod cli;
mod commands;
mod exit_codes;
mod output;
mod render;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let exit_code = match cli.command {
        cli::Command::Anova(args) => commands::analyze::execute_anova(args).await,
        cli::Command::Pca(args) => commands::analyze::execute_pca(args).await,
        cli::Command::Validate(args) => commands::validate::execute(args).await,
        cli::Command::Health(args) => commands::health::execute(args).await,
    };

    std::process::exit(exit_code);
}
