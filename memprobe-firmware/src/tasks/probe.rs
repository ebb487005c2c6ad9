//! Probe task
//!
//! Waits for the host to open the serial port, then runs pipeline cycles:
//! receive at most one packet, interpret, flush one packet back. A hangup or
//! endpoint error drops everything buffered and waits for the next
//! connection. The interpreter session survives reconnects.

use defmt::*;
use embassy_time::Duration;
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use memprobe_core::{CommandInterpreter, Pipeline};
use memprobe_hal_rp2040::{LinkError, RpBankedSram, RpUsbSerialLink};

/// Host to interpreter queue size
const INBOUND_CAPACITY: usize = 64;

/// Interpreter to host queue size
const OUTBOUND_CAPACITY: usize = 256;

/// Completed pipeline cycles since boot
pub static PROBE_CYCLES: AtomicU32 = AtomicU32::new(0);

/// Set while the host has the serial port open
pub static HOST_CONNECTED: AtomicBool = AtomicBool::new(false);

#[embassy_executor::task]
pub async fn probe_task(
    mut link: RpUsbSerialLink,
    mut sram: RpBankedSram,
    mut interpreter: CommandInterpreter,
    poll_interval_ms: u16,
) -> ! {
    info!("Probe task started");

    let poll = Duration::from_millis(poll_interval_ms as u64);
    let mut pipeline = Pipeline::<INBOUND_CAPACITY, OUTBOUND_CAPACITY>::new();

    loop {
        link.wait_connection().await;
        info!("Host connected");
        HOST_CONNECTED.store(true, Ordering::Relaxed);

        let reason = serve(&mut link, &mut pipeline, &mut interpreter, &mut sram, poll).await;
        HOST_CONNECTED.store(false, Ordering::Relaxed);
        pipeline.reset();
        match reason {
            LinkError::Disconnected => info!("Host disconnected"),
            LinkError::Overflow => warn!("Oversized packet from host, dropping session buffers"),
        }
    }
}

/// Run cycles until the link fails or the host drops DTR
async fn serve(
    link: &mut RpUsbSerialLink,
    pipeline: &mut Pipeline<INBOUND_CAPACITY, OUTBOUND_CAPACITY>,
    interpreter: &mut CommandInterpreter,
    sram: &mut RpBankedSram,
    poll: Duration,
) -> LinkError {
    loop {
        if let Err(e) = link.poll_rx(poll).await {
            return e;
        }

        let report = pipeline.run_once(link, interpreter, sram);
        PROBE_CYCLES.fetch_add(1, Ordering::Relaxed);

        if !report.is_idle() {
            trace!(
                "cycle: rx={} tx={} executed={} stop={:?}",
                report.received,
                report.sent,
                report.pass.executed,
                report.pass.stop
            );
        }
        if report.pass.unrecognized > 0 {
            debug!("{} unrecognized command byte(s)", report.pass.unrecognized);
        }
        if report.pass.truncated > 0 {
            warn!("{} response(s) truncated", report.pass.truncated);
        }

        if let Err(e) = link.flush_tx().await {
            return e;
        }

        if link.take_hangup() {
            return LinkError::Disconnected;
        }
    }
}
