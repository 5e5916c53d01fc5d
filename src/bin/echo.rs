//! WebSocket echo peer for exercising the load tester

use clap::Parser;
use ws_load_tester::echo::EchoServer;
use ws_load_tester::logging::{LogLevel, Logger};

/// Mirrors every WebSocket text or binary frame back to its sender
#[derive(Parser, Debug)]
#[command(name = "wslt-echo")]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = ws_load_tester::defaults::DEFAULT_ECHO_ADDR)]
    addr: String,

    /// Log every received frame
    #[arg(long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut logger = Logger::new("ECHO".to_string());
    logger.set_color(!args.no_color && ws_load_tester::cli::supports_color());
    if args.verbose {
        logger.set_level(LogLevel::Debug);
    }

    let server = EchoServer::bind(args.addr.as_str()).await?.with_logger(logger);
    server.run().await?;

    Ok(())
}
