//! BLE dispatcher - the single consumer of the BLE event queue.
//!
//! Owns the connection handle and the transfer session, so the "one
//! session at a time" rule needs no locking.  While a framed transfer is
//! running the dispatcher waits on both the queue and the pacing timer:
//! each timer expiry emits exactly one packet, and events that arrive in
//! between (commands, diagnostics, new send requests) are handled
//! without interrupting the transfer.

use ble_sensor_node::command::{self, CommandAction};
use ble_sensor_node::config::PACKET_PACING_MS;
use ble_sensor_node::link_logic::{rejection_reply, LinkController, Outgoing};
use ble_sensor_node::Error;
use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use nrf_softdevice::ble::Connection;

use crate::adc::SampleStore;
use crate::ble::server::Server;
use crate::ble::{BleEvent, BleEventQueue, PayloadKind};

/// Shared resources the dispatcher needs, passed in at spawn time.
#[derive(Clone, Copy)]
pub struct DispatchContext {
    pub server: &'static Server,
    pub events: &'static BleEventQueue,
    pub samples: &'static SampleStore,
    /// Asks the sampler for one immediate reading.
    pub sample_request: &'static Signal<CriticalSectionRawMutex, ()>,
    /// SET_OUTPUT requests for the LED task.
    pub led_output: &'static Signal<CriticalSectionRawMutex, bool>,
}

struct Dispatcher {
    ctx: DispatchContext,
    link: LinkController<Connection>,
    next_frame_at: Instant,
}

pub async fn run(ctx: DispatchContext) -> ! {
    info!("BLE dispatcher started");

    let mut dispatcher = Dispatcher {
        ctx,
        link: LinkController::new(),
        next_frame_at: Instant::now(),
    };

    loop {
        if dispatcher.link.is_sending() {
            match select(ctx.events.next(), Timer::at(dispatcher.next_frame_at)).await {
                Either::First(event) => dispatcher.handle(event).await,
                Either::Second(()) => dispatcher.send_next_frame(),
            }
        } else {
            let event = ctx.events.next().await;
            dispatcher.handle(event).await;
        }
    }
}

impl Dispatcher {
    async fn handle(&mut self, event: BleEvent) {
        match event {
            BleEvent::Connected(conn) => {
                info!("BLE connected (handle {:?})", conn.handle());
                self.link.on_connected(conn);
            }
            BleEvent::Disconnected { handle } => {
                info!("BLE disconnected (handle {:?})", handle);
                if self.link.on_disconnected() {
                    warn!("Transfer aborted - link lost");
                }
                let dropped = self.ctx.events.dropped();
                if dropped > 0 {
                    warn!("BLE events dropped since boot: {}", dropped);
                }
            }
            BleEvent::DataSend(kind) => {
                if let Err(e) = self.send_payload(kind).await {
                    warn!("{} payload not sent: {}", kind, e);
                    if let Some(reply) = rejection_reply(kind, &e) {
                        self.reply(&reply);
                    }
                }
            }
            BleEvent::AdcDone(sample) => {
                debug!("ADC done: {}", sample);
                self.reply(&command::sample_response(sample));
            }
            BleEvent::Command(data) => self.on_command(&data),
        }
    }

    fn on_command(&mut self, data: &[u8]) {
        debug!("Command received: {=[u8]:x}", data);

        match command::process(data, &self.link.diagnostics()) {
            CommandAction::SetOutput(on) => self.ctx.led_output.signal(on),
            CommandAction::Reply(frame) => self.reply(&frame),
            CommandAction::StartBulkTransfer => {
                if let Err(e) = self.request_bulk_transfer() {
                    warn!("Bulk request dropped: {}", e);
                }
            }
            CommandAction::ReadSample => self.ctx.sample_request.signal(()),
            CommandAction::Ignore => {}
        }
    }

    /// Queue the bulk test pattern behind any events already waiting.
    fn request_bulk_transfer(&self) -> Result<(), Error> {
        self.ctx
            .events
            .post(BleEvent::DataSend(PayloadKind::TestPattern))?;
        Ok(())
    }

    async fn send_payload(&mut self, kind: PayloadKind) -> Result<(), Error> {
        match kind {
            PayloadKind::Samples => {
                let store = self.ctx.samples;
                let samples = store.lock().await;
                let outgoing = self.link.send(samples.latest_batch())?;
                self.start(outgoing)
            }
            PayloadKind::TestPattern => {
                let pattern = command::test_pattern();
                let outgoing = self.link.send(Some(&pattern[..]))?;
                self.start(outgoing)
            }
        }
    }

    fn start(&mut self, outgoing: Outgoing<'_>) -> Result<(), Error> {
        match outgoing {
            Outgoing::Nothing => Ok(()),
            Outgoing::Direct(payload) => self.notify(payload),
            Outgoing::Framed => {
                info!("Chunked transfer of {} bytes", self.link.diagnostics().total_len);
                self.next_frame_at = Instant::now();
                Ok(())
            }
        }
    }

    fn send_next_frame(&mut self) {
        let Some(frame) = self.link.next_frame() else {
            return;
        };
        // Packets lost to a notify error are not resent; the receiver
        // sees the gap in the sequence numbers.
        let _ = self.notify(&frame);
        self.next_frame_at = Instant::now() + Duration::from_millis(PACKET_PACING_MS);

        if !self.link.is_sending() {
            info!("Chunked transfer complete");
        }
    }

    fn reply(&self, frame: &[u8]) {
        if let Err(e) = self.notify(frame) {
            warn!("Reply not sent: {}", e);
        }
    }

    fn notify(&self, data: &[u8]) -> Result<(), Error> {
        let conn = self.link.connection().ok_or(Error::NotConnected)?;
        self.ctx.server.notify(conn, data)
    }
}
