mod cli;
mod config;
mod model;
mod providers;
mod util;

use anyhow::{bail, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays pipeable JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("fetch") => cli::handle_fetch(&args[1..]).await,
        Some("send") => cli::handle_send(&args[1..]).await,
        None | Some("help" | "--help" | "-h") => {
            cli::print_help();
            Ok(())
        }
        Some(other) => bail!("Unknown command `{other}`. Run `bugsync help` for usage."),
    }
}
