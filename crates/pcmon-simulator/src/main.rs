//! Desktop simulator for the pcmon telemetry display.
//!
//! Runs the real `pcmon_core::Monitor` against an SDL2 window via
//! `embedded-graphics-simulator`. A synthetic host feeds the wired link once
//! a second; a background thread plays a wireless host sending UDP-style
//! packets through a `PacketChannel`. Echo lines are logged.
//!
//! # Key bindings
//!
//! | Key   | Action                                        |
//! |-------|-----------------------------------------------|
//! | Space | Pause / resume the wired feed                 |
//! | W     | Toggle the wireless host                      |
//! | G     | Toggle "GPU unavailable" on both hosts        |
//! | M     | Inject a malformed record on the wired link   |
//! | O     | Inject an oversized line on the wired link    |
//! | Q     | Quit                                          |
//!
//! Pausing both feeds for longer than the sleep timeout blanks the panel;
//! resuming wakes it.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{info, warn};

use pcmon_core::display::{Backlight, GraphicsSurface, SCREEN_HEIGHT_PX, SCREEN_WIDTH_PX};
use pcmon_core::transport::{ByteSource, LineSink, LinkError, PacketChannel};
use pcmon_core::{Clock, Monitor, MonitorConfig, WirelessMode};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

const WIRED_INTERVAL: Duration = Duration::from_secs(1);
const WIRELESS_INTERVAL: Duration = Duration::from_millis(1500);

/// Short enough to watch the panel go to sleep.
const SIM_SLEEP_AFTER_MS: u64 = 15_000;

static WIRELESS: PacketChannel = PacketChannel::new();

// ---------------------------------------------------------------------------
// Synthetic host
// ---------------------------------------------------------------------------

/// Produces telemetry records that wander like a busy desktop.
struct MockHost {
    elapsed_secs: f64,
    phase: f64,
}

impl MockHost {
    fn new(phase: f64) -> Self {
        Self {
            elapsed_secs: 0.0,
            phase,
        }
    }

    /// Advance the internal clock and return one newline-terminated record.
    fn next_record(&mut self, dt_secs: f64, gpu_available: bool) -> String {
        self.elapsed_secs += dt_secs;
        let t = self.elapsed_secs + self.phase;

        let cpu = 35.0 + 25.0 * (t / 7.0).sin() + 8.0 * (t / 3.0).cos();
        let temp = 52.0 + 12.0 * (t / 11.0).sin();
        let ram = 55.0 + 10.0 * (t / 40.0).sin();
        let (gpu, gpu_temp) = if gpu_available {
            (45.0 + 35.0 * (t / 13.0).sin(), 58.0 + 10.0 * (t / 17.0).sin())
        } else {
            (-1.0, -1.0)
        };

        let mut record = String::new();
        let _ = writeln!(
            record,
            "{cpu:.1},{temp:.1},{ram:.1},{gpu:.1},{gpu_temp:.1}"
        );
        record
    }
}

// ---------------------------------------------------------------------------
// Simulated collaborators
// ---------------------------------------------------------------------------

/// Wall clock relative to simulator start.
struct StdClock(Instant);

impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        self.0.elapsed().as_millis() as u64
    }
}

/// Stand-in for the USB/UART link: a byte queue in, a log out.
#[derive(Default)]
struct SimSerial {
    rx: VecDeque<u8>,
}

impl SimSerial {
    fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }
}

impl ByteSource for SimSerial {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}

impl LineSink for SimSerial {
    fn is_connected(&self) -> bool {
        true
    }

    fn write_line(&mut self, line: &str) -> Result<(), LinkError> {
        info!("serial echo <- {}", line);
        Ok(())
    }
}

struct LoggedBacklight;

impl Backlight for LoggedBacklight {
    fn set_enabled(&mut self, on: bool) {
        info!("Backlight {}", if on { "on" } else { "off" });
    }
}

/// Flags shared with the wireless host thread.
struct HostControls {
    wireless_enabled: AtomicBool,
    gpu_available: AtomicBool,
    quit: AtomicBool,
}

/// Plays a remote host sending one record per packet and reading echoes.
fn spawn_wireless_host(controls: Arc<HostControls>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut host = MockHost::new(100.0);
        while !controls.quit.load(Ordering::Relaxed) {
            if controls.wireless_enabled.load(Ordering::Relaxed) {
                WIRELESS.set_peer_connected(true);
                let gpu = controls.gpu_available.load(Ordering::Relaxed);
                let record = host.next_record(WIRELESS_INTERVAL.as_secs_f64(), gpu);
                // Packets carry no terminator, like datagrams from a host script.
                if let Err(e) = WIRELESS.inbound().offer(record.trim_end().as_bytes()) {
                    warn!("wireless host: {}", e);
                }
            } else {
                WIRELESS.set_peer_connected(false);
            }

            if let Some(echo) = WIRELESS.outbound().take() {
                info!("wireless echo <- {}", String::from_utf8_lossy(&echo));
            }
            thread::sleep(WIRELESS_INTERVAL);
        }
    })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting pcmon simulator");
    info!(
        "Display: {}×{} (scale {}×)",
        SCREEN_WIDTH_PX, SCREEN_HEIGHT_PX, WINDOW_SCALE
    );
    info!("Keys: Space=pause wired  W=wireless  G=GPU  M=malformed  O=oversized  Q=Quit");

    let display = SimulatorDisplay::<Rgb565>::new(Size::new(SCREEN_WIDTH_PX, SCREEN_HEIGHT_PX));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("pcmon Simulator", &output_settings);

    let config = MonitorConfig::default()
        .with_wireless(WirelessMode::Duplex)
        .with_sleep_after_ms(Some(SIM_SLEEP_AFTER_MS));

    let mut monitor = Monitor::new(
        GraphicsSurface::with_backlight(display, LoggedBacklight),
        StdClock(Instant::now()),
        SimSerial::default(),
        WIRELESS.link(),
        config,
    );
    monitor.start();

    let controls = Arc::new(HostControls {
        wireless_enabled: AtomicBool::new(false),
        gpu_available: AtomicBool::new(true),
        quit: AtomicBool::new(false),
    });
    let wireless_host = spawn_wireless_host(Arc::clone(&controls));

    let mut wired_host = MockHost::new(0.0);
    let mut wired_paused = false;
    let mut last_wired = Instant::now();

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    window.update(monitor.surface().target());

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. } => match keycode {
                    Keycode::Q | Keycode::Escape => break 'running,
                    Keycode::Space => {
                        wired_paused = !wired_paused;
                        info!("Wired feed {}", if wired_paused { "paused" } else { "resumed" });
                    }
                    Keycode::W => {
                        let enabled = !controls.wireless_enabled.load(Ordering::Relaxed);
                        controls.wireless_enabled.store(enabled, Ordering::Relaxed);
                        info!("Wireless host {}", if enabled { "on" } else { "off" });
                    }
                    Keycode::G => {
                        let available = !controls.gpu_available.load(Ordering::Relaxed);
                        controls.gpu_available.store(available, Ordering::Relaxed);
                        info!("GPU {}", if available { "available" } else { "unavailable" });
                    }
                    Keycode::M => {
                        info!("Injecting malformed record");
                        monitor.wired_mut().inject(b"abc,def\n");
                    }
                    Keycode::O => {
                        info!("Injecting oversized line");
                        let mut line = vec![b'9'; 200];
                        line.push(b'\n');
                        monitor.wired_mut().inject(&line);
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // --- Wired host ---------------------------------------------------
        if !wired_paused && last_wired.elapsed() >= WIRED_INTERVAL {
            let gpu = controls.gpu_available.load(Ordering::Relaxed);
            let record = wired_host.next_record(WIRED_INTERVAL.as_secs_f64(), gpu);
            monitor.wired_mut().inject(record.as_bytes());
            last_wired = Instant::now();
        }

        // --- Monitor ------------------------------------------------------
        monitor.poll();
        window.update(monitor.surface().target());

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    controls.quit.store(true, Ordering::Relaxed);
    if wireless_host.join().is_err() {
        warn!("Wireless host thread panicked");
    }

    let echo = monitor.echo_stats();
    info!(
        "Simulator exiting: {} dropped, {} overflowed, echo {}/{}/{} sent/skipped/failed",
        monitor.dropped_records(),
        monitor.overflows(),
        echo.sent,
        echo.skipped,
        echo.failed
    );
}
