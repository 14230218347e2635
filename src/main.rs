//! BLE Sensor Node - nRF52840 firmware
//!
//! Samples an analog input every 10 ms and streams 512-sample batches to
//! a BLE central over a single 20-byte characteristic.  Payloads larger
//! than the small-payload threshold go out as START / CHUNK / END packets;
//! anything else the characteristic carries is an application command or
//! its response.
//!
//! # Task layout
//!
//! | Task         | Role                                                    |
//! |--------------|---------------------------------------------------------|
//! | softdevice   | Runs the SoftDevice event loop                          |
//! | peripheral   | Advertises, runs the GATT server, posts link events     |
//! | dispatch     | Sole consumer of the BLE queue, owns the transfer       |
//! | sampler      | Periodic and on-demand SAADC conversions                |
//! | button       | Times presses and posts their classification            |
//! | led          | Blink feedback and SET_OUTPUT                           |
//!
//! Pins (Adafruit Feather nRF52840): button P0.11, LED P0.13 (active-low),
//! analog input P0.03 / AIN1.

#![no_std]
#![no_main]

mod adc;
mod ble;
mod button;
mod led;

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive, Pin};
use embassy_nrf::interrupt::{self, InterruptExt};
use embassy_nrf::{bind_interrupts, saadc};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use ble_sensor_node::config::LED_ACTIVE_LOW;
use ble_sensor_node::led_logic::level_for;
use ble_sensor_node::samples::SampleBuffer;
use ble_sensor_node::EventQueue;

use crate::adc::SampleStore;
use crate::ble::dispatch::DispatchContext;
use crate::ble::server::{self, Server};
use crate::ble::{BleEventQueue, LinkState};
use crate::button::ButtonQueue;
use crate::led::Led;

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
});

// ── Shared state ─────────────────────────────────────────────────────────

static BLE_EVENTS: BleEventQueue = EventQueue::new();
static BUTTON_EVENTS: ButtonQueue = EventQueue::new();
static SAMPLES: SampleStore = Mutex::new(SampleBuffer::new());
static SAMPLE_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static LED_OUTPUT: Signal<CriticalSectionRawMutex, bool> = Signal::new();
static LINK: LinkState = LinkState::new();
static SERVER: StaticCell<Server> = StaticCell::new();

// ── Tasks ────────────────────────────────────────────────────────────────

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn peripheral_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    server::run_peripheral(sd, server, &BLE_EVENTS, &LINK).await
}

#[embassy_executor::task]
async fn dispatch_task(ctx: DispatchContext) -> ! {
    ble::dispatch::run(ctx).await
}

#[embassy_executor::task]
async fn sampler_task(saadc: saadc::Saadc<'static, 1>) -> ! {
    adc::run(saadc, &SAMPLES, &SAMPLE_REQUEST, &BLE_EVENTS, &LINK).await
}

#[embassy_executor::task]
async fn button_task(pin: AnyPin) -> ! {
    button::run(pin, &BUTTON_EVENTS).await
}

#[embassy_executor::task]
async fn led_task(led: Led<Output<'static>>) -> ! {
    led::run(led, &BUTTON_EVENTS, &LED_OUTPUT).await
}

// ── Entry point ──────────────────────────────────────────────────────────

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("BLE sensor node starting...");

    // Priorities 0, 1 and 4 belong to the SoftDevice.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = interrupt::Priority::P2;
    config.time_interrupt_priority = interrupt::Priority::P2;
    let p = embassy_nrf::init(config);

    interrupt::SAADC.set_priority(interrupt::Priority::P3);
    let mut adc_config = saadc::Config::default();
    adc_config.resolution = saadc::Resolution::_12BIT;
    let adc = saadc::Saadc::new(
        p.SAADC,
        Irqs,
        adc_config,
        [saadc::ChannelConfig::single_ended(p.P0_03)],
    );

    let led_pin = Output::new(
        p.P0_13.degrade(),
        Level::from(level_for(false, LED_ACTIVE_LOW)),
        OutputDrive::Standard,
    );
    let led = Led::new(led_pin, LED_ACTIVE_LOW);

    let sd = server::enable_softdevice();
    let server = SERVER.init(unwrap!(Server::new(sd), "GATT server registration failed"));
    let sd: &'static Softdevice = sd;

    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(peripheral_task(sd, server)));
    unwrap!(spawner.spawn(dispatch_task(DispatchContext {
        server,
        events: &BLE_EVENTS,
        samples: &SAMPLES,
        sample_request: &SAMPLE_REQUEST,
        led_output: &LED_OUTPUT,
    })));
    unwrap!(spawner.spawn(sampler_task(adc)));
    unwrap!(spawner.spawn(button_task(p.P0_11.degrade())));
    unwrap!(spawner.spawn(led_task(led)));

    info!("All tasks spawned");
}
