use futures::{SinkExt, StreamExt};
use log::{error, info};
use xchannel::net::TcpDuplex;
use xchannel::{Config, Listener, Result};

const LISTEN_ADDR: &str = "127.0.0.1:9000";

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let listener = Listener::bind(LISTEN_ADDR, Config::default())
        .await
        .expect("Failed to bind listener");
    info!("Echo server listening on {}", LISTEN_ADDR);

    let mut incoming = listener.incoming();
    while let Some(accepted) = incoming.next().await {
        match accepted {
            Ok((conn, peer)) => {
                info!("Accepted connection from {}", peer);
                // Each connection runs independently; its errors never
                // touch the listener or the other connections.
                tokio::spawn(async move {
                    if let Err(e) = echo_connection(conn).await {
                        error!("Connection error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Accept failed: {}", e);
            }
        }
    }
}

/// Echoes every received chunk back to the peer until end-of-stream.
async fn echo_connection(conn: TcpDuplex) -> Result<()> {
    let (mut source, mut sink) = conn.split();
    let mut total = 0usize;

    while let Some(chunk) = source.next().await {
        let chunk = chunk?;
        total += chunk.len();
        sink.send(chunk).await?;
    }

    info!("=== Connection Complete ===");
    info!("Total echoed: {} KB", total / 1024);
    Ok(())
}
