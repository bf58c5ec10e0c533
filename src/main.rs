use clap::Parser;
use lectern::cli::{Args, build_config, init_logging, load_token_secrets, open_database};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some((access_secret, refresh_secret)) = load_token_secrets() else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let local_addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "Failed to get local address");
            std::process::exit(1);
        }
    };

    let config = build_config(&args, db, access_secret, refresh_secret);

    info!(address = %local_addr, "Listening");

    if let Err(e) = lectern::run_server(config, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
