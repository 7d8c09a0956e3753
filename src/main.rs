//! LED Matrix Effects Server
//!
//! Runs a web server on the Pi that plays animated effects on the LED
//! matrix. Any device on the LAN can list the effects and switch between
//! them via simple HTTP requests.
//!
//! ## Architecture
//! - **Render thread** (std::thread): owns the LED matrix, runs the active effect
//! - **HTTP server** (tokio/axum): accepts API requests, sends commands via channel
//!
//! ## Rust concepts
//! - `#[tokio::main]` async entry point
//! - `std::thread::spawn` for the render thread
//! - `std::sync::mpsc` channel between async and sync worlds
//! - `Arc<Mutex<T>>` for shared status
//!
//! ## Usage
//! ```sh
//! sudo ./target/release/led-matrix-fx --rows 8 --cols 32 --effect Snake
//! ./target/release/led-matrix-fx --list-effects
//! ```

use clap::Parser;
use led_matrix_fx::registry::Registry;

/// LED Matrix Effects Server
#[derive(Parser)]
#[cfg_attr(not(feature = "hardware"), allow(dead_code))]
#[command(name = "led-matrix-fx")]
#[command(about = "HTTP server playing animated effects on an RGB LED matrix")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Number of rows on the LED panel
    #[arg(long, default_value = "64")]
    rows: u32,

    /// Number of columns on the LED panel
    #[arg(long, default_value = "64")]
    cols: u32,

    /// Effect to start playing at boot
    #[arg(long, value_name = "NAME")]
    effect: Option<String>,

    /// Pause between frames while an effect plays, in milliseconds
    #[arg(long, default_value = "10")]
    frame_interval_ms: u64,

    /// Initial brightness (0-100)
    #[arg(long, default_value = "75", value_parser = clap::value_parser!(u8).range(0..=100))]
    brightness: u8,

    /// Print the registered effects and exit
    #[arg(long)]
    list_effects: bool,
}

fn main() {
    let args = Args::parse();

    if args.list_effects {
        for (index, name) in Registry::builtin().iter() {
            println!("{index:>2}  {name}");
        }
        return;
    }

    run(args);
}

#[cfg(not(feature = "hardware"))]
fn run(_args: Args) {
    eprintln!("This binary requires the 'hardware' feature (rpi-led-matrix).");
    eprintln!("Build with: cargo build --release");
    eprintln!("Tests can run without it: cargo test --no-default-features");
    std::process::exit(1);
}

#[cfg(feature = "hardware")]
fn run(args: Args) {
    init_tracing();
    if let Err(e) = serve(args) {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "hardware")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    // RUST_LOG overrides the default level, e.g. RUST_LOG=led_matrix_fx=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false) // Disable ANSI color codes for systemd/journald
        .compact()
        .init();
}

#[cfg(feature = "hardware")]
#[tokio::main(flavor = "current_thread")]
async fn serve(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    use led_matrix_fx::PanelConfig;
    use led_matrix_fx::render::{
        DisplayStatus, MatrixSink, RenderCommand, RenderSettings, render_loop,
    };
    use led_matrix_fx::server::{self, AppState};
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    let panel = PanelConfig::new(args.rows, args.cols);
    let settings = RenderSettings {
        panel,
        frame_interval: Duration::from_millis(args.frame_interval_ms),
        brightness: args.brightness,
    };
    let registry = Arc::new(Registry::builtin());

    tracing::info!("LED Matrix Effects Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Panel: {}x{} ({} pixels)", panel.cols, panel.rows, panel.pixel_count());
    tracing::info!("Effects: {}", registry.len());
    tracing::info!("Frame interval: {}ms", args.frame_interval_ms);
    tracing::info!("Port: {}", args.port);

    // Create the channel for sending commands to the render thread.
    let (tx, rx) = mpsc::channel();

    // Shared display status: render thread writes, HTTP handlers read.
    let status = Arc::new(Mutex::new(DisplayStatus::new()));

    // Spawn the render thread. The matrix is created on that thread
    // because the C library must only be touched from one thread.
    let render_status = status.clone();
    let render_registry = registry.clone();
    let render_handle = std::thread::spawn(move || match MatrixSink::new(panel) {
        Ok(sink) => render_loop(rx, render_status, render_registry, sink, settings),
        Err(e) => tracing::error!("Failed to initialize LED matrix: {}", e),
    });

    if let Some(name) = &args.effect {
        match registry.lookup_index(name) {
            Some(index) => tx.send(RenderCommand::PlayEffect(index))?,
            None => tracing::warn!("Unknown effect '{}', starting idle (see --list-effects)", name),
        }
    }

    let app_state = AppState {
        command_tx: tx,
        status,
        registry,
    };
    let app = server::create_router(app_state);

    // Start listening
    let addr = format!("0.0.0.0:{}", args.port);
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("API Documentation: http://localhost:{}/docs", args.port);
    tracing::info!("Try: curl http://localhost:{}/api/v1/effects", args.port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Run the server: this blocks until the process is killed
    axum::serve(listener, app).await?;

    drop(render_handle);
    Ok(())
}
