use futures::{SinkExt, StreamExt};
use log::info;
use std::time::Instant;
use xchannel::{connect_duplex, Config};

const SERVER_ADDR: &str = "127.0.0.1:9000";
const DATA_SIZE: usize = 10 * 1024 * 1024; // 10 MB
const CHUNK_SIZE: usize = 64 * 1024;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Connecting to server at {}...", SERVER_ADDR);
    let client = connect_duplex(SERVER_ADDR, &Config::default())
        .await
        .expect("Failed to connect");
    info!("Connected!");

    let (mut source, mut sink) = client.split();

    // Drive the write direction concurrently with the reads so the echo
    // never backs up the connection.
    let sender = tokio::spawn(async move {
        let start = Instant::now();
        let mut sent = 0usize;
        while sent < DATA_SIZE {
            let len = CHUNK_SIZE.min(DATA_SIZE - sent);
            sink.send(vec![0xAB; len]).await.expect("Failed to send chunk");
            sent += len;
        }
        let elapsed = start.elapsed();
        let speed = (sent as f64 / 1024.0 / 1024.0) / elapsed.as_secs_f64();
        info!("=== Send Complete ===");
        info!("Total sent: {} MB", sent / 1024 / 1024);
        info!("Time: {:.2} seconds", elapsed.as_secs_f64());
        info!("Speed: {:.2} MB/s", speed);
    });

    // Read the echoed bytes back
    let start = Instant::now();
    let mut received = 0usize;
    while received < DATA_SIZE {
        let chunk = source
            .next()
            .await
            .expect("Server closed before echoing everything")
            .expect("Failed to read echo");
        received += chunk.len();
    }
    let elapsed = start.elapsed();
    let speed = (received as f64 / 1024.0 / 1024.0) / elapsed.as_secs_f64();
    info!("=== Receive Complete ===");
    info!("Total received: {} MB", received / 1024 / 1024);
    info!("Time: {:.2} seconds", elapsed.as_secs_f64());
    info!("Speed: {:.2} MB/s", speed);

    sender.await.expect("Sender task failed");

    // The reader owns teardown; cancelling closes the connection.
    source.cancel();
}
