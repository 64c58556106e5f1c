mod cli;
mod executor;

use std::process::ExitCode;

use clap::Parser;
use env_logger::Builder;
use log::{error, trace};

use domainconnect_apply::{discovery::HttpDiscovery, filler::RandomFiller};

use cli::Cli;
use executor::{Executor, ExecutorError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    Builder::new().filter_level(cli.loglevel.into()).init();

    let discovery = match HttpDiscovery::try_new() {
        Ok(d) => d,
        Err(e) => return report(e.into()),
    };
    trace!("Created discovery client");

    match Executor::new(&discovery, &RandomFiller).run(&cli).await {
        Ok(apply) => {
            println!("{}", apply.url);
            ExitCode::SUCCESS
        }
        Err(e) => report(e),
    }
}

// Nothing is printed on stdout for a failed run, a partial URL is never useful
fn report(e: ExecutorError) -> ExitCode {
    error!("{}", e);
    ExitCode::from(e.exit_code())
}
