//! Top-level controller
//!
//! [`Monitor`] owns every piece of state in the pipeline and is driven by a
//! single cooperative loop calling [`Monitor::poll`]. Each poll drains the
//! wired link, then the wireless link (if it is configured for input),
//! feeding each through its own [`LineAssembler`]. Every valid record is
//! stored, rendered, reflected in the status row and echoed out of the other
//! link before the next byte is read.

use log::{debug, error, info};

use crate::Clock;
use crate::config::MonitorConfig;
use crate::display::{
    DrawCache, Layout, RenderEngine, StatusIndicator, Surface, WirelessStatus, theme,
};
use crate::echo::{Echo, EchoOutcome, EchoStats};
use crate::metrics::Metrics;
use crate::power::{PowerController, PowerState, PowerTransition};
use crate::protocol::{Line, LineAssembler, parse_line};
use crate::state::CurrentState;
use crate::transport::{ByteSource, LineSink, Link, LinkKind};

/// Upper bound on bytes taken from one link per poll, so a flooding link
/// cannot starve the status refresh or the other link.
pub const MAX_BYTES_PER_POLL: usize = 512;

/// Upper bound on stale bytes discarded at start-up.
const MAX_STALE_BYTES: usize = 4096;

enum Intake {
    Idle,
    Partial,
    Line(Line),
}

/// One link plus its framing state.
struct Port<L> {
    link: L,
    assembler: LineAssembler,
    reads_input: bool,
    writes_output: bool,
}

impl<L: ByteSource> Port<L> {
    fn new(link: L, reads_input: bool, writes_output: bool) -> Self {
        Self {
            link,
            assembler: LineAssembler::new(),
            reads_input,
            writes_output,
        }
    }

    fn intake(&mut self) -> Intake {
        let Some(byte) = self.link.read_byte() else {
            return Intake::Idle;
        };
        match self.assembler.push(byte) {
            Some(line) => Intake::Line(line),
            None => Intake::Partial,
        }
    }
}

pub struct Monitor<S, C, W, R> {
    surface: S,
    clock: C,
    wired: Port<W>,
    wireless: Port<R>,
    config: MonitorConfig,
    state: CurrentState,
    render: RenderEngine,
    status: StatusIndicator,
    power: PowerController,
    echo: Echo,
    boot_ms: u64,
    dropped_records: u32,
    /// The static screen must be redrawn before the next update.
    chrome_pending: bool,
}

impl<S, C, W, R> Monitor<S, C, W, R>
where
    S: Surface,
    C: Clock,
    W: Link,
    R: Link,
{
    /// Build a monitor for a panel with the default 320x240 layout.
    ///
    /// The wired link always takes input and echo output. The wireless link
    /// is used as `config.wireless` allows.
    pub fn new(surface: S, clock: C, wired: W, wireless: R, config: MonitorConfig) -> Self {
        let layout = Layout::default();
        let boot_ms = clock.now_ms();
        Self {
            surface,
            clock,
            wired: Port::new(wired, true, true),
            wireless: Port::new(
                wireless,
                config.wireless.accepts_input(),
                config.wireless.accepts_output(),
            ),
            state: CurrentState::new(),
            render: RenderEngine::new(layout),
            status: StatusIndicator::new(layout, config.status_interval_ms, config.freshness_ms),
            power: PowerController::new(config.sleep_after_ms),
            echo: Echo::new(),
            config,
            boot_ms,
            dropped_records: 0,
            chrome_pending: true,
        }
    }

    /// Use a different screen geometry. Call before [`start`](Self::start).
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.render = RenderEngine::new(layout);
        self.status = StatusIndicator::new(
            layout,
            self.config.status_interval_ms,
            self.config.freshness_ms,
        );
        self
    }

    /// Discard stale wired input, light the panel and draw the static
    /// screen with a "waiting" status. Inactivity is counted from here.
    pub fn start(&mut self) {
        self.boot_ms = self.clock.now_ms();

        let mut stale = 0;
        while stale < MAX_STALE_BYTES && self.wired.link.read_byte().is_some() {
            stale += 1;
        }
        self.wired.assembler.reset();
        if stale > 0 {
            debug!("Discarded {} stale bytes from the wired link", stale);
        }

        if let Err(e) = self.repaint(self.boot_ms) {
            error!(" Initial draw failed: {:?}", e);
        }
        info!(
            "Monitor started (wireless {}, sleep after {:?} ms)",
            self.config.wireless.label(),
            self.config.sleep_after_ms
        );
    }

    /// One iteration of the control loop. Returns the number of records
    /// accepted.
    pub fn poll(&mut self) -> usize {
        let mut accepted = self.drain(LinkKind::Wired);
        if self.wireless.reads_input {
            accepted += self.drain(LinkKind::Wireless);
        }

        let now = self.clock.now_ms();
        if let Err(e) = self.tick(now) {
            error!(" Status update failed: {:?}", e);
        }
        accepted
    }

    fn drain(&mut self, kind: LinkKind) -> usize {
        let mut accepted = 0;
        for _ in 0..MAX_BYTES_PER_POLL {
            let intake = match kind {
                LinkKind::Wired => self.wired.intake(),
                LinkKind::Wireless => self.wireless.intake(),
            };
            match intake {
                Intake::Idle => break,
                Intake::Partial => {}
                Intake::Line(line) => {
                    if self.handle_line(kind, &line) {
                        accepted += 1;
                    }
                }
            }
        }
        accepted
    }

    fn handle_line(&mut self, kind: LinkKind, line: &[u8]) -> bool {
        if line.is_empty() {
            return false;
        }
        match parse_line(line) {
            Ok(metrics) => {
                self.apply(kind, metrics);
                true
            }
            Err(e) => {
                self.dropped_records = self.dropped_records.saturating_add(1);
                debug!("Dropped {:?} record: {}", kind, e);
                false
            }
        }
    }

    fn apply(&mut self, source: LinkKind, metrics: Metrics) {
        let now = self.clock.now_ms();
        self.state.record(metrics, now);

        if let Err(e) = self.present(now) {
            error!(" Display update failed: {:?}", e);
            self.render.invalidate();
            self.chrome_pending = true;
        }

        self.relay(source.opposite());
    }

    /// Render the current state, waking the panel first if needed.
    fn present(&mut self, now_ms: u64) -> Result<(), S::Error> {
        if let Some(PowerTransition::Wake) = self.power.on_telemetry() {
            self.chrome_pending = true;
        }
        if self.chrome_pending {
            self.surface.set_backlight(true)?;
            self.render.draw_chrome(&mut self.surface)?;
            self.chrome_pending = false;
        }
        self.render.update(&mut self.surface, self.state.metrics())?;

        let wireless = self.wireless_status();
        self.status
            .draw(&mut self.surface, now_ms, &self.state, wireless)
    }

    fn relay(&mut self, target: LinkKind) {
        let metrics = *self.state.metrics();
        let outcome = match target {
            LinkKind::Wired if self.wired.writes_output => {
                self.echo.relay(&metrics, &mut self.wired.link)
            }
            LinkKind::Wireless if self.wireless.writes_output => {
                self.echo.relay(&metrics, &mut self.wireless.link)
            }
            _ => return,
        };
        if outcome == EchoOutcome::Sent {
            debug!("Echoed record to {:?}", target);
        }
    }

    fn tick(&mut self, now_ms: u64) -> Result<(), S::Error> {
        let last_activity = self.state.received_at_ms().unwrap_or(self.boot_ms);
        if let Some(PowerTransition::Sleep) = self.power.evaluate(now_ms, last_activity) {
            return self.blank();
        }

        if self.power.is_awake() && self.status.due(now_ms) {
            let wireless = self.wireless_status();
            self.status
                .draw(&mut self.surface, now_ms, &self.state, wireless)?;
        }
        Ok(())
    }

    fn repaint(&mut self, now_ms: u64) -> Result<(), S::Error> {
        self.surface.set_backlight(true)?;
        self.render.draw_chrome(&mut self.surface)?;
        self.chrome_pending = false;
        if self.state.received_once() {
            self.render.update(&mut self.surface, self.state.metrics())?;
        }
        let wireless = self.wireless_status();
        self.status
            .draw(&mut self.surface, now_ms, &self.state, wireless)
    }

    fn blank(&mut self) -> Result<(), S::Error> {
        self.render.invalidate();
        let screen = self.render.layout().screen_area();
        self.surface.fill_region(screen, theme::BACKGROUND)?;
        self.surface.set_backlight(false)
    }

    fn wireless_status(&self) -> WirelessStatus {
        if !self.wireless.reads_input && !self.wireless.writes_output {
            WirelessStatus::Off
        } else if self.wireless.link.is_connected() {
            WirelessStatus::Linked
        } else {
            WirelessStatus::Ready
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn state(&self) -> &CurrentState {
        &self.state
    }

    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    pub fn render_cache(&self) -> &DrawCache {
        self.render.cache()
    }

    pub fn echo_stats(&self) -> EchoStats {
        self.echo.stats()
    }

    /// Lines rejected by the parser.
    pub fn dropped_records(&self) -> u32 {
        self.dropped_records
    }

    /// Lines discarded for exceeding the length ceiling, both links.
    pub fn overflows(&self) -> u32 {
        self.wired
            .assembler
            .overflows()
            .saturating_add(self.wireless.assembler.overflows())
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn wired_mut(&mut self) -> &mut W {
        &mut self.wired.link
    }

    pub fn wireless_mut(&mut self) -> &mut R {
        &mut self.wireless.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WirelessMode;
    use crate::display::Row;
    use crate::testing::{ManualClock, Op, RecordingSurface, ScriptedLink};
    use crate::transport::NoLink;

    type TestMonitor = Monitor<RecordingSurface, ManualClock, ScriptedLink, ScriptedLink>;

    fn monitor(config: MonitorConfig) -> (TestMonitor, ManualClock) {
        let clock = ManualClock::new(1_000);
        let mut monitor = Monitor::new(
            RecordingSurface::new(),
            clock.clone(),
            ScriptedLink::connected(),
            ScriptedLink::connected(),
            config,
        );
        monitor.start();
        monitor.surface_mut().take_ops();
        (monitor, clock)
    }

    fn duplex() -> MonitorConfig {
        MonitorConfig::default().with_wireless(WirelessMode::Duplex)
    }

    #[test]
    fn start_flushes_stale_input_and_draws_the_waiting_screen() {
        let clock = ManualClock::new(0);
        let mut wired = ScriptedLink::connected();
        wired.push_input(b"99,99,99,99,99\n");
        let mut monitor = Monitor::new(
            RecordingSurface::new(),
            clock,
            wired,
            NoLink,
            MonitorConfig::default(),
        );

        monitor.start();
        monitor.poll();

        assert!(!monitor.state().received_once());
        assert!(monitor.surface().backlight());
        assert!(
            monitor
                .surface()
                .texts()
                .contains(&"Waiting for data...".into())
        );
    }

    #[test]
    fn wired_record_updates_state_and_screen() {
        let (mut monitor, clock) = monitor(duplex());
        clock.set(5_000);
        monitor.wired_mut().push_input(b"12,3,4,5,6\n");

        assert_eq!(monitor.poll(), 1);
        assert_eq!(
            *monitor.state().metrics(),
            Metrics::new(12.0, 3.0, 4.0, 5.0, 6.0)
        );
        assert_eq!(monitor.state().received_at_ms(), Some(5_000));
        assert_eq!(monitor.render_cache().cpu.shown, Some(12));

        let texts = monitor.surface().texts();
        assert!(texts.contains(&"12%".into()));
        assert!(texts.contains(&"RX: fresh".into()));
    }

    #[test]
    fn malformed_record_changes_nothing() {
        let (mut monitor, _clock) = monitor(duplex());
        monitor.wired_mut().push_input(b"abc,def\n");

        assert_eq!(monitor.poll(), 0);
        assert!(!monitor.state().received_once());
        assert_eq!(monitor.dropped_records(), 1);
        assert!(monitor.render_cache().is_empty());
    }

    #[test]
    fn links_are_framed_independently() {
        let (mut monitor, _clock) = monitor(duplex());
        monitor.wired_mut().push_input(b"10,20,");
        monitor.wireless_mut().push_input(b"70,80,90,1,2\n");

        assert_eq!(monitor.poll(), 1);
        assert_eq!(monitor.state().metrics().cpu, 70.0);

        monitor.wired_mut().push_input(b"30,40,50\n");
        assert_eq!(monitor.poll(), 1);
        assert_eq!(monitor.state().metrics().cpu, 10.0);
    }

    #[test]
    fn wired_is_read_before_wireless() {
        let (mut monitor, _clock) = monitor(duplex());
        monitor.wireless_mut().push_input(b"70,1,1,1,1\n");
        monitor.wired_mut().push_input(b"20,1,1,1,1\n");

        assert_eq!(monitor.poll(), 2);
        assert_eq!(monitor.state().metrics().cpu, 70.0);
    }

    #[test]
    fn echo_goes_to_the_opposite_link() {
        let (mut monitor, _clock) = monitor(duplex());
        monitor.wired_mut().push_input(b"12,3,4,-1,6\n");
        monitor.poll();

        assert_eq!(
            monitor.wireless_mut().sent(),
            ["CPU:12.00,TEMP:3.00,RAM:4.00,GPU:-1.00,G-TEMP:6.00"]
        );
        assert!(monitor.wired_mut().sent().is_empty());

        monitor.wireless_mut().push_input(b"1,2,3,4,5\n");
        monitor.poll();
        assert_eq!(
            monitor.wired_mut().sent(),
            ["CPU:1.00,TEMP:2.00,RAM:3.00,GPU:4.00,G-TEMP:5.00"]
        );
        assert_eq!(monitor.echo_stats().sent, 2);
    }

    #[test]
    fn echo_only_ignores_wireless_input() {
        let config = MonitorConfig::default().with_wireless(WirelessMode::EchoOnly);
        let (mut monitor, _clock) = monitor(config);
        monitor.wireless_mut().push_input(b"70,1,1,1,1\n");

        assert_eq!(monitor.poll(), 0);
        assert!(!monitor.state().received_once());
        assert_eq!(monitor.wireless_mut().pending_input(), 11);

        monitor.wired_mut().push_input(b"20,1,1,1,1\n");
        monitor.poll();
        assert_eq!(monitor.wireless_mut().sent().len(), 1);
    }

    #[test]
    fn disabled_wireless_never_sees_traffic() {
        let config = MonitorConfig::default().with_wireless(WirelessMode::Disabled);
        let (mut monitor, _clock) = monitor(config);
        monitor.wired_mut().push_input(b"20,1,1,1,1\n");
        monitor.poll();

        assert_eq!(monitor.wireless_mut().write_attempts(), 0);
        assert_eq!(monitor.echo_stats(), EchoStats::default());
        assert!(monitor.surface().texts().contains(&"WL: off".into()));
    }

    #[test]
    fn echo_failure_is_counted_not_fatal() {
        let clock = ManualClock::new(0);
        let mut monitor = Monitor::new(
            RecordingSurface::new(),
            clock,
            ScriptedLink::connected(),
            ScriptedLink::connected().failing_with(crate::transport::LinkError::Busy),
            duplex(),
        );
        monitor.start();
        monitor.wired_mut().push_input(b"20,1,1,1,1\n20,1,1,1,1\n");

        assert_eq!(monitor.poll(), 2);
        assert_eq!(monitor.echo_stats().failed, 2);
        assert!(monitor.wired_mut().sent().is_empty());
    }

    #[test]
    fn display_errors_do_not_stop_the_pipeline() {
        let mut monitor = Monitor::new(
            RecordingSurface::failing(),
            ManualClock::new(0),
            ScriptedLink::connected(),
            ScriptedLink::connected(),
            duplex(),
        );
        monitor.start();
        monitor.wired_mut().push_input(b"20,1,1,1,1\n");

        assert_eq!(monitor.poll(), 1);
        assert!(monitor.state().received_once());
        assert_eq!(monitor.wireless_mut().sent().len(), 1);
    }

    #[test]
    fn idle_panel_sleeps_then_wakes_with_a_full_repaint() {
        let config = duplex().with_sleep_after_ms(Some(60_000));
        let (mut monitor, clock) = monitor(config);
        monitor.wired_mut().push_input(b"40,50,60,70,80\n");
        monitor.poll();

        clock.advance(60_001);
        monitor.poll();
        assert_eq!(monitor.power_state(), PowerState::Asleep);
        assert!(!monitor.surface().backlight());
        assert!(monitor.render_cache().is_empty());

        // No status refresh while asleep.
        monitor.surface_mut().take_ops();
        clock.advance(5_000);
        monitor.poll();
        assert!(monitor.surface().ops().is_empty());

        monitor.wired_mut().push_input(b"40,50,60,70,80\n");
        monitor.poll();
        assert_eq!(monitor.power_state(), PowerState::Awake);
        assert!(monitor.surface().backlight());

        let texts = monitor.surface().texts();
        assert!(texts.contains(&"PC Monitor".into()));
        assert!(texts.contains(&"40%".into()));
        assert_eq!(monitor.render_cache().cpu.shown, Some(40));
    }

    #[test]
    fn failed_wake_repaints_the_chrome_on_the_next_record() {
        let config = duplex().with_sleep_after_ms(Some(60_000));
        let (mut monitor, clock) = monitor(config);
        clock.advance(60_001);
        monitor.poll();
        assert_eq!(monitor.power_state(), PowerState::Asleep);

        monitor.surface_mut().set_failing(true);
        monitor.wired_mut().push_input(b"40,50,60,70,80\n");
        assert_eq!(monitor.poll(), 1);
        assert_eq!(monitor.power_state(), PowerState::Awake);
        assert!(monitor.render_cache().is_empty());

        monitor.surface_mut().set_failing(false);
        monitor.surface_mut().take_ops();
        monitor.wired_mut().push_input(b"40,50,60,70,80\n");
        assert_eq!(monitor.poll(), 1);

        let texts = monitor.surface().texts();
        assert!(texts.contains(&"PC Monitor".into()));
        assert!(texts.contains(&"40%".into()));
        assert!(monitor.surface().backlight());
        assert_eq!(monitor.render_cache().cpu.shown, Some(40));
    }

    #[test]
    fn sleep_counts_from_boot_without_data() {
        let (mut monitor, clock) = monitor(duplex());
        clock.advance(60_000);
        monitor.poll();
        assert_eq!(monitor.power_state(), PowerState::Awake);

        clock.advance(1);
        monitor.poll();
        assert_eq!(monitor.power_state(), PowerState::Asleep);
    }

    #[test]
    fn sleep_can_be_disabled() {
        let (mut monitor, clock) = monitor(duplex().with_sleep_after_ms(None));
        clock.advance(10 * 60_000);
        monitor.poll();
        assert_eq!(monitor.power_state(), PowerState::Awake);
    }

    #[test]
    fn status_row_refreshes_once_per_interval() {
        let (mut monitor, clock) = monitor(duplex());

        clock.advance(500);
        monitor.poll();
        assert!(monitor.surface_mut().take_ops().is_empty());

        clock.advance(500);
        monitor.poll();
        let ops = monitor.surface_mut().take_ops();
        assert!(ops.iter().any(|op| matches!(op, Op::Circle { .. })));
    }

    #[test]
    fn oversized_line_is_discarded_whole() {
        let (mut monitor, _clock) = monitor(duplex());
        let mut flood = [b'1'; 200];
        flood[150] = b',';
        monitor.wired_mut().push_input(&flood);
        monitor.wired_mut().push_input(b",2,3,4,5\n");
        monitor.wired_mut().push_input(b"9,9,9,9,9\n");

        assert_eq!(monitor.poll(), 1);
        assert_eq!(monitor.overflows(), 1);
        assert_eq!(monitor.state().metrics().cpu, 9.0);
    }

    #[test]
    fn unavailable_gpu_renders_na() {
        let (mut monitor, _clock) = monitor(duplex());
        monitor.wired_mut().push_input(b"10,20,30,-1,-1\n");
        monitor.poll();

        assert_eq!(monitor.render_cache().gpu.width, Some(0));
        assert_eq!(monitor.render_cache().gpu.shown, Some(-1));
        let track = Layout::default().track(Row::Gpu);
        assert!(
            !monitor
                .surface()
                .fills()
                .iter()
                .any(|(area, color)| area.top_left == track.top_left && *color == theme::GPU_BAR)
        );
    }
}
