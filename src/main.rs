use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = hostguard::cli::Cli::parse();
    if let Err(e) = hostguard::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
