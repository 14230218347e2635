//! Periodic analog sampling.
//!
//! The sampler reads AIN1 every `SAMPLE_PERIOD_MS` into the shared
//! [`SampleBuffer`].  A completed batch is announced to the BLE dispatcher
//! only while a central is connected; otherwise it just sits in the ready
//! slot until the next one replaces it.
//!
//! GET_SAMPLE requests arrive on a signal and are answered with one extra
//! single-shot conversion outside the periodic schedule.

use ble_sensor_node::config::SAMPLE_PERIOD_MS;
use ble_sensor_node::samples::{sample_from_raw, SampleBuffer};
use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_nrf::saadc::Saadc;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};

use crate::ble::{BleEvent, BleEventQueue, LinkState, PayloadKind};

/// Sample batches shared between the sampler and the BLE dispatcher.
pub type SampleStore = Mutex<CriticalSectionRawMutex, SampleBuffer>;

async fn read(saadc: &mut Saadc<'static, 1>) -> u16 {
    let mut buf = [0i16; 1];
    saadc.sample(&mut buf).await;
    sample_from_raw(buf[0])
}

pub async fn run(
    mut saadc: Saadc<'static, 1>,
    samples: &'static SampleStore,
    request: &'static Signal<CriticalSectionRawMutex, ()>,
    events: &'static BleEventQueue,
    link: &'static LinkState,
) -> ! {
    saadc.calibrate().await;
    info!("Sampler started ({} ms period)", SAMPLE_PERIOD_MS);

    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_PERIOD_MS));

    loop {
        match select(ticker.next(), request.wait()).await {
            Either::First(()) => {
                let sample = read(&mut saadc).await;
                let Some(batch) = samples.lock().await.push(sample) else {
                    continue;
                };

                if !link.is_connected() {
                    debug!("Batch {} recycled - no central", batch);
                    continue;
                }
                if events.post(BleEvent::DataSend(PayloadKind::Samples)).is_err() {
                    warn!("BLE event queue full - batch {} not sent", batch);
                }
            }
            Either::Second(()) => {
                let sample = read(&mut saadc).await;
                if events.post(BleEvent::AdcDone(sample)).is_err() {
                    warn!("BLE event queue full - sample reply dropped");
                }
            }
        }
    }
}
