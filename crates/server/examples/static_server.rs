//! Serves a directory over HTTP.
//!
//! ```text
//! cargo run --example static_server -- ./public 127.0.0.1:8080
//! ```

use std::net::SocketAddr;

use hearth_server::Server;
use hearth_server::static_files::{MimeTable, StaticFiles};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut args = std::env::args().skip(1);
    let root = args.next().unwrap_or_else(|| ".".to_string());
    let address: SocketAddr = match args.next().unwrap_or_else(|| "127.0.0.1:8080".to_string()).parse() {
        Ok(address) => address,
        Err(e) => {
            error!(cause = %e, "invalid listen address");
            return;
        }
    };

    let files = match StaticFiles::new(&root, MimeTable::default()) {
        Ok(files) => files,
        Err(e) => {
            error!(cause = %e, "invalid root");
            return;
        }
    };

    let server = match files.bind(Server::builder(), "/").bind(address).build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "build server error");
            return;
        }
    };

    info!(root = %root, %address, "serving static files");
    if let Err(e) = server.run().await {
        error!(cause = %e, "server stopped");
    }
}
