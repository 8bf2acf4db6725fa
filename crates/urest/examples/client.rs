//! Demo urest client cycling through a fixed set of requests.
//!
//! Run the server first:
//! - cargo run -p urest --example server
//!
//! Then run the client:
//! - cargo run -p urest --example client -- 127.0.0.1 4677

use std::{sync::Arc, thread, time::Duration};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use urest::{base32, prelude::*, DEFAULT_PORT};

#[derive(Parser)]
#[command(name = "urest-client")]
#[command(about = "Sends a scripted GET/PUT loop to a urest server")]
struct Args {
    /// Server host name or IP address
    #[arg(default_value = "127.0.0.1")]
    host: String,

    /// Server UDP port
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Pause between requests, in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
}

fn report(label: &str, result: urest::Result<StatusCode>, response: &[u8]) {
    match result {
        Ok(status) => info!("{} -> status: {}, resp: {}", label, status, String::from_utf8_lossy(response)),
        Err(err) => warn!("{} -> failed: {}", label, err),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::default();

    // both sessions share one socket
    let transport = Arc::new(UdpClientTransport::bind_any(&config)?);
    let mut large = Session::link_with_config(
        transport.clone(),
        &args.host,
        args.port,
        FragmentSize::Bytes128,
        config.clone(),
    )?;
    let mut small =
        Session::link_with_config(transport, &args.host, args.port, FragmentSize::Bytes32, config)?;
    info!("linked to {} with 128 and 32 byte frames", large.remote_addr());

    let blob = base32::encode("hello world!\n".repeat(40).as_bytes());
    let long_query = format!("/lights/light2?value:{}", blob);

    let interval = Duration::from_millis(args.interval_ms);
    let mut response = Vec::new();
    loop {
        let result = large.get(b"/lights/light1", &mut response);
        report("GET /lights/light1", result, &response);
        thread::sleep(interval);

        let result = large.put(b"/lights/light1", &mut response);
        report("PUT /lights/light1", result, &response);
        thread::sleep(interval);

        let result = small.get(b"/lights/light2?value:1", &mut response);
        report("GET /lights/light2?value:1", result, &response);
        thread::sleep(interval);

        let result = small.get(b"/lights/light2?value:1:status:444", &mut response);
        report("GET /lights/light2?value:1:status:444", result, &response);
        thread::sleep(interval);

        let result = small.get(long_query.as_bytes(), &mut response);
        report(&format!("GET /lights/light2 with {} byte query", long_query.len()), result, &response);
        thread::sleep(interval);

        let result = small.ping();
        report("PING", result, &[]);
        thread::sleep(interval);
    }
}
