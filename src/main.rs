use clap::Parser;

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = retire::api::Cli::parse();
    if let Err(e) = retire::api::run(cli).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
