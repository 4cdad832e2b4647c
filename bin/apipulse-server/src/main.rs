use apipulse_server::{server::run_server, Result, ServerArgs};
use clap::Parser;
use common::init_logger;

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    init_logger(&args.log_level).expect("Logger should initialize");

    run_server(args).await
}
