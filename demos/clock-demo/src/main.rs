//! Loopback demonstration: one server, one client, a few request cycles.
//!
//! Stands in for a real shell around the actors - it only owns their
//! lifetimes and calls `listen()`/`connect()`/`shutdown()`. The causal logs
//! land in `server.log` and `client.log` next to the working directory.

use std::error::Error;
use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use chrona_core::ActorId;
use chrona_runtime::{Client, ClientConfig, EventLog, Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let server_log = Arc::new(EventLog::new(Box::new(File::create("server.log")?))?);
    let client_log = Arc::new(EventLog::new(Box::new(File::create("client.log")?))?);

    let mut server = Server::new(ActorId::new(0), ServerConfig::default(), server_log);
    let addr = server.listen().await?;
    println!("server listening on {addr}");

    let mut client = Client::new(
        ActorId::new(1),
        ClientConfig {
            server_addr: addr,
            ..ClientConfig::default()
        },
        client_log,
    );
    client.connect().await?;
    println!("client connected, requesting the time every second");

    tokio::time::sleep(Duration::from_secs(5)).await;

    client.shutdown();
    server.shutdown();
    println!("done - causal logs written to server.log and client.log");

    Ok(())
}
