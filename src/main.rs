use clap::Parser;
use workarea::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    workarea::init_logging(cli.log_level(), cli.log_format)?;
    tracing::debug!("workarea {} (built {})", workarea::VERSION, workarea::BUILD_DATE);

    cli.run()
}
