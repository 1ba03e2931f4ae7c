use clap::Parser;

use cine_harvest_lib::{Cli, run};

#[tokio::main]
async fn main() {
    // Exit status is always 0; failures are reported through the log.
    run(Cli::parse()).await
}
