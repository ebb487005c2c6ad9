//! memprobe - Banked SRAM Tester Firmware
//!
//! Main firmware binary for RP2040-based boards. Runs the memory pattern
//! tests on both banks at boot, then serves the single-character debug
//! protocol over a USB virtual serial port.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::{Driver, InterruptHandler as UsbInterruptHandler};
use embassy_time::{Duration, Ticker};
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::Builder;
use portable_atomic::Ordering;
use static_cell::{ConstStaticCell, StaticCell};
use {defmt_rtt as _, panic_probe as _};

use memprobe_core::config::ProbeConfig;
use memprobe_core::{
    Bank, BankResults, CommandInterpreter, DeviceStatus, MemoryTester, SelfTestResult,
};
use memprobe_hal_rp2040::{BankedSram, RpBankedSram, SramStorage, UsbSerialLink, MAX_PACKET_SIZE};

mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => UsbInterruptHandler<USB>;
});

/// Status LED update period
const LED_TICK_MS: u64 = 100;

/// Heartbeat log interval in LED ticks
const HEARTBEAT_TICKS: u32 = 600;

// Configuration must live forever: USB string descriptors borrow from it
static PROBE_CONFIG: StaticCell<ProbeConfig> = StaticCell::new();

// Backing RAM for the banked window
static SRAM_STORAGE: ConstStaticCell<SramStorage> = ConstStaticCell::new(SramStorage::new());

// Static cells for USB descriptor and control buffers (must live forever)
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static CDC_STATE: StaticCell<State> = StaticCell::new();
static USB_HANDLER: StaticCell<tasks::UsbStateHandler> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("memprobe firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut probe_config = config::load_config();
    let window = config::resolve_window(&mut probe_config);
    let config: &'static ProbeConfig = PROBE_CONFIG.init(probe_config);

    // Bank select on GPIO15, low = bank 0
    let bank_pin = Output::new(p.PIN_15, Level::Low);
    let mut sram: RpBankedSram = BankedSram::new(window, SRAM_STORAGE.take(), bank_pin);
    info!(
        "Window {:#06x}..={:#06x}, size {} bytes",
        sram.region().start,
        sram.region().end,
        sram.region().size()
    );

    let results = run_self_test(config, &mut sram);
    info!("Bank {} mapped", sram.selected().id());
    let all_passed = Bank::ALL
        .iter()
        .all(|&bank| results.get(bank).map_or(true, |r| r.is_passed()));

    // USB CDC-ACM device
    let driver = Driver::new(p.USB, Irqs);

    let mut usb_config = embassy_usb::Config::new(config.usb.vid, config.usb.pid);
    usb_config.manufacturer = Some(config.usb.manufacturer.as_str());
    usb_config.product = Some(config.usb.product.as_str());
    usb_config.serial_number = Some(config.usb.serial.as_str());
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = MAX_PACKET_SIZE as u8;

    let mut builder = Builder::new(
        driver,
        usb_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUF.init([0; 64]),
    );

    builder.handler(USB_HANDLER.init(tasks::UsbStateHandler));

    let class = CdcAcmClass::new(&mut builder, CDC_STATE.init(State::new()), MAX_PACKET_SIZE as u16);
    let usb = builder.build();
    let link = UsbSerialLink::new(class);

    info!(
        "USB initialized ({:04x}:{:04x})",
        config.usb.vid, config.usb.pid
    );

    let interpreter = CommandInterpreter::new(config.region, results);

    // Spawn tasks
    spawn_or_reset(spawner.spawn(tasks::usb_task(usb)), "USB");
    spawn_or_reset(
        spawner.spawn(tasks::probe_task(
            link,
            sram,
            interpreter,
            config.probe.poll_interval_ms,
        )),
        "probe",
    );

    info!("All tasks spawned, firmware running");

    // Status LED follows self-test verdict and USB state
    let mut led = Output::new(p.PIN_25, Level::Low);
    let mut ticker = Ticker::every(Duration::from_millis(LED_TICK_MS));
    let mut tick: u32 = 0;
    let mut last_status = None;

    loop {
        ticker.next().await;

        let status = DeviceStatus::from_state(
            all_passed,
            tasks::USB_CONFIGURED.load(Ordering::Relaxed),
            tasks::HOST_CONNECTED.load(Ordering::Relaxed),
        );
        if last_status != Some(status) {
            debug!("Status: {:?}", status);
            last_status = Some(status);
        }
        led.set_level(if status.is_lit(tick) { Level::High } else { Level::Low });

        tick = tick.wrapping_add(1);
        if tick % HEARTBEAT_TICKS == 0 {
            trace!(
                "Main loop heartbeat, {} probe cycles",
                tasks::PROBE_CYCLES.load(Ordering::Relaxed)
            );
        }
    }
}

/// Spawn a task, resetting the chip if the executor has no room for it
fn spawn_or_reset<E: defmt::Format>(result: Result<(), E>, task: &str) {
    if let Err(e) = result {
        error!("Failed to spawn {} task: {}", task, e);
        cortex_m::peripheral::SCB::sys_reset();
    }
}

/// Run the pattern tests on every bank if enabled
///
/// Leaves bank 0 mapped, matching the interpreter's initial session.
fn run_self_test(config: &ProbeConfig, sram: &mut RpBankedSram) -> BankResults {
    let mut results = BankResults::new();

    if !config.self_test.run_at_boot {
        info!("Self-test disabled, banks not tested");
        return results;
    }

    info!("Running pattern tests on {} banks", Bank::ALL.len());
    MemoryTester::new(config.region)
        .with_descending_sweep(config.self_test.descending_sweep)
        .run_all_banks(sram, &mut results);

    for bank in Bank::ALL {
        match results.get(bank) {
            Some(SelfTestResult::Passed) => info!("Bank {}: passed", bank.id()),
            Some(SelfTestResult::Failed { test, offset }) => warn!(
                "Bank {}: failed test {} at {:#06x}",
                bank.id(),
                test.id(),
                config.region.addr(offset)
            ),
            None => warn!("Bank {}: not tested", bank.id()),
        }
    }

    results
}
