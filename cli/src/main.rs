mod commands;
mod inventory;
mod terminal;

use commands::{CommandLine, Commands, classify, scan};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init();

    match commands.command {
        Commands::Scan(args) => {
            print::header("starting device discovery");
            scan::scan(args).await
        }
        Commands::Classify { descr } => {
            print::header("fingerprint classification");
            Ok(classify::classify(&descr))
        }
    }
}
