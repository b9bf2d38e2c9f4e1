use clap::{Parser, Subcommand};

mod cmd;
mod core;
mod input;
mod store;

#[derive(Parser, Debug)]
#[command(name = "pitc", version)]
#[command(about = "Calculate personal income tax under a progressive bracket schedule")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate tax for a single JSON request
    Calculate(cmd::calculate::CalculateCommand),
    /// Calculate tax for every row of a CSV upload
    Batch(cmd::batch::BatchCommand),
    /// View and update the configurable deduction caps
    Deductions(cmd::deductions::DeductionsCommand),
    /// Print the expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Calculate(command) => command.exec(),
        Command::Batch(command) => command.exec(),
        Command::Deductions(command) => command.exec(),
        Command::Schema(command) => command.exec(),
    }
}
