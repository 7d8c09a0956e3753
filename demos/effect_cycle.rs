//! # Effect Cycle Demo
//!
//! Plays every registered effect in turn, a few seconds each, straight
//! from a [`Dispatcher`] without the HTTP server. Effects keep their state
//! between rounds, so the second pass resumes where the first one stopped.
//!
//! ## Run it
//! ```sh
//! cargo build --release --example effect_cycle
//! sudo ./target/release/examples/effect_cycle
//! ```

#[cfg(not(feature = "hardware"))]
fn main() {
    eprintln!("This example requires the 'hardware' feature.");
}

#[cfg(feature = "hardware")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use led_matrix_fx::canvas::{Canvas, FrameBuffer, Point};
    use led_matrix_fx::registry::{Dispatcher, Registry};
    use led_matrix_fx::render::{FrameSink, MatrixSink};
    use led_matrix_fx::{Color, PanelConfig, is_running, setup_signal_handler};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    const SECONDS_PER_EFFECT: u64 = 8;
    const BRIGHTNESS: u8 = 60;

    let panel = PanelConfig::default();
    let mut sink = MatrixSink::new(panel)?;
    let running = setup_signal_handler()?;
    let registry = Arc::new(Registry::builtin());
    let mut dispatcher = Dispatcher::new(registry.clone());
    let mut frame = FrameBuffer::new(panel.cols, panel.rows);

    'cycle: loop {
        for (index, name) in registry.iter() {
            println!("{index:>2}  {name}");
            let started = Instant::now();
            while started.elapsed() < Duration::from_secs(SECONDS_PER_EFFECT) {
                if !is_running(&running) {
                    break 'cycle;
                }
                frame.clear(Color::BLACK);
                dispatcher.dispatch(index, &mut frame, Point::ORIGIN);
                sink.present(&frame, BRIGHTNESS);
                thread::sleep(Duration::from_millis(10));
            }
        }
    }

    Ok(())
}
