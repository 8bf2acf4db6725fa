//! Demo urest server exposing two lights.
//!
//! Run:
//! - cargo run -p urest --example server
//! - RUST_LOG=urest_server=trace cargo run -p urest --example server -- 4677

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use urest::{base32, prelude::*, DEFAULT_PORT};

#[derive(Parser)]
#[command(name = "urest-server")]
#[command(about = "Serves /lights/light1 and /lights/light2 over urest")]
struct Args {
    /// UDP port to listen on
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn light1_get(body: &mut Body) {
    info!("light1 GET {}", body.as_str().unwrap_or("<binary>"));
}

fn light1_put(body: &mut Body) {
    info!("light1 PUT {}", body.as_str().unwrap_or("<binary>"));
    if let Err(err) = body.replace(b"value updated!") {
        warn!("light1 PUT: {}", err);
    }
}

/// Logs the `value:` parameter, decoding it when it is a base32 blob.
fn light2(body: &mut Body) {
    let Some(query) = body.query().and_then(|query| std::str::from_utf8(query).ok()) else {
        info!("light2 {} without query", String::from_utf8_lossy(body.path()));
        return;
    };
    let value = query.strip_prefix("value:").unwrap_or(query);
    match base32::decode(value) {
        Ok(decoded) if value.len() > 8 => info!("light2 value: {} bytes of base32 data", decoded.len()),
        _ => info!("light2 value: {}", value),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut registry = Registry::new();
    registry
        .register(
            Resource::new("light1", "/lights/light1")
                .with_handler(Verb::Get, light1_get)?
                .with_handler(Verb::Put, light1_put)?,
        )
        .register(
            Resource::new("light2", "/lights/light2")
                .with_handler(Verb::Get, light2)?
                .with_handler(Verb::Put, light2)?,
        );

    let mut server = Server::bind(("0.0.0.0", args.port), registry, Config::default())?;
    info!("urest server listening on {}", server.local_addr()?);
    for resource in server.registry().iter() {
        info!("  {:?}", resource);
    }

    server.serve()
}
