#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_time::{Duration, Timer};
use embedded_graphics::prelude::*;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::uart::{Config as UartConfig, Uart};
use log::{LevelFilter, error, info};
use static_cell::StaticCell;

// Display-LCD panel specific imports
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use mipidsi::interface::SpiInterface;
use mipidsi::{Builder as MipidsiBuilder, models::ILI9342CRgb565};

use pcmon_core::display::{FrameBuffer, GraphicsSurface, SCREEN_HEIGHT_PX, SCREEN_WIDTH_PX};
use pcmon_core::{Monitor, WirelessMode};
use pcmon_firmware::backlight::{self, SignalBacklight};
use pcmon_firmware::links::{self, SerialLink, WIRELESS};
use pcmon_firmware::{EmbassyClock, settings};

/// Pause between loop iterations, bounds both latency and idle CPU use.
const POLL_INTERVAL: Duration = Duration::from_millis(5);
const SERIAL_BAUD: u32 = 115_200;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

/// Bring-up failed in a way the display cannot work around.
fn halt(what: &str, err: impl core::fmt::Debug) -> ! {
    error!(" {} failed: {:?}", what, err);
    loop {}
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!(LevelFilter::Info);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);
    // The framebuffer lives in PSRAM.
    esp_alloc::psram_allocator!(peripherals.PSRAM, esp_hal::psram);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized");

    let monitor_config = settings::monitor_config();

    // Power rails and backlight
    let i2c = match backlight::create_i2c_bus(peripherals.I2C0, peripherals.GPIO12, peripherals.GPIO11)
    {
        Ok(i2c) => i2c,
        Err(e) => halt("I2C bus", e),
    };
    let pmic = backlight::init_power(i2c).await;
    if let Err(e) = spawner.spawn(backlight::backlight_task(pmic)) {
        error!(" Backlight task not started: {:?}", e);
    }

    // Wireless link
    if monitor_config.wireless != WirelessMode::Disabled {
        static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
        static NET_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

        let radio = match esp_radio::init() {
            Ok(radio) => RADIO.init(radio),
            Err(e) => halt("Radio init", e),
        };
        let (controller, interfaces) =
            match esp_radio::wifi::new(radio, peripherals.WIFI, Default::default()) {
                Ok(wifi) => wifi,
                Err(e) => halt("Wi-Fi init", e),
            };

        let rng = Rng::new();
        let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());
        let (stack, runner) = embassy_net::new(
            interfaces.sta,
            embassy_net::Config::dhcpv4(Default::default()),
            NET_RESOURCES.init(StackResources::new()),
            seed,
        );

        for spawned in [
            spawner.spawn(links::connection_task(controller)),
            spawner.spawn(links::net_task(runner)),
            spawner.spawn(links::udp_task(stack, settings::udp_port())),
        ] {
            if let Err(e) = spawned {
                error!(" Network task not started: {:?}", e);
            }
        }
    } else {
        info!("Wireless disabled, wired input only");
    }

    // 1. Configure SPI bus
    let spi_bus = match Spi::new(peripherals.SPI2, SpiConfig::default()) {
        Ok(spi) => spi
            .with_sck(peripherals.GPIO36)
            .with_mosi(peripherals.GPIO37),
        Err(e) => halt("SPI bus", e),
    };

    // 2. Dummy CS pin (the panel has no hardware CS)
    let cs = Output::new(peripherals.GPIO35, Level::High, OutputConfig::default());

    // 3. Wrap the SPI bus as a SPI device (required by embedded-hal traits)
    let spi_device = match ExclusiveDevice::new_no_delay(spi_bus, cs) {
        Ok(device) => device,
        Err(e) => halt("SPI device", e),
    };

    // 4. DC (Data/Command) pin
    let dc = Output::new(peripherals.GPIO34, Level::Low, OutputConfig::default());

    // 5. Buffer for SPI batching (larger = faster, uses more RAM)
    let mut spi_buffer = [0u8; 512];

    let di = SpiInterface::new(spi_device, dc, &mut spi_buffer);
    let mut display = match MipidsiBuilder::new(ILI9342CRgb565, di)
        .display_size(SCREEN_WIDTH_PX as u16, SCREEN_HEIGHT_PX as u16)
        .init(&mut embassy_time::Delay)
    {
        Ok(display) => display,
        Err(e) => halt("Display init", e),
    };
    info!("Display initialized");

    // Wired link on UART0
    let uart = match Uart::new(
        peripherals.UART0,
        UartConfig::default().with_baudrate(SERIAL_BAUD),
    ) {
        Ok(uart) => uart.with_rx(peripherals.GPIO44).with_tx(peripherals.GPIO43),
        Err(e) => halt("UART", e),
    };

    let surface = GraphicsSurface::with_backlight(
        FrameBuffer::new(Size::new(SCREEN_WIDTH_PX, SCREEN_HEIGHT_PX)),
        SignalBacklight,
    );

    // With wireless disabled the monitor never touches this link.
    let mut monitor = Monitor::new(
        surface,
        EmbassyClock,
        SerialLink::new(uart),
        WIRELESS.link(),
        monitor_config,
    );
    monitor.start();
    loop {
        monitor.poll();
        if let Err(e) = monitor.surface_mut().target_mut().flush(&mut display) {
            error!(" Display flush failed: {:?}", e);
        }
        Timer::after(POLL_INTERVAL).await;
    }
}
