//! SoftDevice bring-up, advertising and the GATT server.
//!
//! The data service exposes one characteristic that the central writes
//! commands to and subscribes to for notifications.  Writes are never
//! processed here: they are posted to the BLE event queue and handled
//! by the dispatcher.

use core::mem;

use ble_sensor_node::config::{
    ATT_MTU, BLE_ADV_INTERVAL, BLE_ADV_RETRY_MS, BLE_CONN_INTERVAL_MAX, BLE_CONN_INTERVAL_MIN,
    BLE_SLAVE_LATENCY, BLE_SUP_TIMEOUT, DATA_SERVICE_UUID16, DEVICE_NAME, FRAME_SIZE,
    SMALL_PAYLOAD_THRESHOLD,
};
use ble_sensor_node::Error;
use defmt::{info, warn};
use embassy_time::{Duration, Timer};
use heapless::Vec;
use nrf_softdevice::ble::advertisement_builder::{
    Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList, ServiceUuid16,
};
use nrf_softdevice::ble::gatt_server::{self, notify_value};
use nrf_softdevice::ble::{peripheral, Connection, TxPower};
use nrf_softdevice::{raw, Softdevice};

use crate::ble::{BleEvent, BleEventQueue, LinkState};

#[nrf_softdevice::gatt_service(uuid = "180f")]
pub struct SensorService {
    /// Commands in, responses and link packets out.
    #[characteristic(uuid = "2a19", read, write, notify)]
    pub data: Vec<u8, SMALL_PAYLOAD_THRESHOLD>,
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub sensor: SensorService,
}

impl Server {
    /// Notify `data` on the data characteristic.
    pub fn notify(&self, conn: &Connection, data: &[u8]) -> Result<(), Error> {
        notify_value(conn, self.sensor.data_value_handle, data).map_err(|e| {
            warn!("Notify failed: {:?}", e);
            Error::Notify
        })
    }

    fn handle_event(&self, event: ServerEvent, events: &BleEventQueue) {
        match event {
            ServerEvent::Sensor(SensorServiceEvent::DataWrite(data)) => {
                let mut command: Vec<u8, FRAME_SIZE> = Vec::new();
                let _ = command.extend_from_slice(&data[..data.len().min(FRAME_SIZE)]);
                if events.post(BleEvent::Command(command)).is_err() {
                    warn!("BLE event queue full - dropping command");
                }
            }
            ServerEvent::Sensor(SensorServiceEvent::DataCccdWrite { notifications }) => {
                info!("Notifications enabled: {}", notifications);
            }
        }
    }
}

pub fn enable_softdevice() -> &'static mut Softdevice {
    let config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: ATT_MTU }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    };

    Softdevice::enable(&config)
}

/// Advertise, serve one connection, repeat.
///
/// Connection and disconnection are reported through `events`; the
/// connection handle travels inside [`BleEvent::Connected`].
pub async fn run_peripheral(
    sd: &'static Softdevice,
    server: &'static Server,
    events: &'static BleEventQueue,
    link: &'static LinkState,
) -> ! {
    static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
        .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
        .services_16(
            ServiceList::Complete,
            &[ServiceUuid16::from_u16(DATA_SERVICE_UUID16)],
        )
        .full_name(DEVICE_NAME)
        .build();

    static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new().build();

    loop {
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };
        let config = peripheral::Config {
            interval: BLE_ADV_INTERVAL,
            tx_power: TxPower::Plus4dBm,
            ..Default::default()
        };

        info!("Advertising as \"{}\"", DEVICE_NAME);
        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Advertising failed: {:?}", e);
                Timer::after(Duration::from_millis(BLE_ADV_RETRY_MS)).await;
                continue;
            }
        };

        let handle = conn.handle();
        info!("Central connected (handle {:?})", handle);

        let params = raw::ble_gap_conn_params_t {
            min_conn_interval: BLE_CONN_INTERVAL_MIN,
            max_conn_interval: BLE_CONN_INTERVAL_MAX,
            slave_latency: BLE_SLAVE_LATENCY,
            conn_sup_timeout: BLE_SUP_TIMEOUT,
        };
        if let Err(e) = conn.set_conn_params(params) {
            warn!("set_conn_params error - {:?}", e);
        }

        link.set_connected(true);
        if events.post(BleEvent::Connected(conn.clone())).is_err() {
            warn!("BLE event queue full - connect event dropped");
        }

        let reason = gatt_server::run(&conn, server, |e| server.handle_event(e, events)).await;
        info!("GATT server exited: {:?}", reason);

        link.set_connected(false);
        if events.post(BleEvent::Disconnected { handle }).is_err() {
            warn!("BLE event queue full - disconnect event dropped");
        }
    }
}
