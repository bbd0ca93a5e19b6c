use anyhow::{Context, Result};
use ch34x_usb::cancel::Cancellation;
use ch34x_usb::commands::Register;
use ch34x_usb::configure::configure;
use ch34x_usb::devices::SUPPORTED_DEVICES;
use ch34x_usb::linecontrol::LineControl;
use ch34x_usb::throughput::{BenchmarkConfig, ThroughputRunner, ThroughputSummary};
use ch34x_usb::{Ch34xCommands, DeviceSession};
use clap::Parser;
use log::{debug, info, warn};
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode};
use tokio::{signal, task};

use crate::cli::Cli;
use crate::report::{progress_line, summary_lines};

mod cli;
mod report;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Mixed mode keeps progress on stdout, and warnings / errors on stderr
    CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .context("Could not configure the logger")?;

    info!("Target baud rate: {}", args.baud_rate);

    let cancellation = Cancellation::new();
    tokio::spawn(await_ctrl_c(cancellation.clone()));

    let config = BenchmarkConfig::default();
    let ceiling = config.packet_ceiling;

    // All the USB work blocks, so keep it off the runtime's workers.
    let summary = task::spawn_blocking(move || run(args.baud_rate, config, cancellation))
        .await
        .context("Benchmark thread failed")??;

    for line in summary_lines(&summary, ceiling) {
        info!("{}", line);
    }
    info!("Finished sending data.");
    Ok(())
}

fn run(
    baud_rate: u32,
    config: BenchmarkConfig,
    cancellation: Cancellation,
) -> Result<ThroughputSummary> {
    let mut session =
        DeviceSession::open(SUPPORTED_DEVICES).context("Unable to open a CH34x device")?;
    info!("Device found: {}", session.identity());
    debug!("Claimed interfaces: {:?}", session.claimed_interfaces());

    let registers = configure(&mut session, baud_rate, LineControl::default())
        .context("Unable to configure the device")?;
    info!(
        "Actual baud rate: {:.0} (error {:.2}%), prescaler {}, divisor {}",
        registers.actual_baud_rate,
        registers.error_percent(),
        registers.prescaler,
        registers.divisor
    );

    let clock = Register::pair(Register::Divisor, Register::Prescaler);
    match session.read_register(clock) {
        Ok(value) => debug!("Prescaler / divisor readback: {:02x?}", value),
        Err(error) => warn!("Unable to read back the baud registers: {}", error),
    }

    info!(
        "Device ready, streaming {} byte packets to endpoint 0x{:02x}. Press Ctrl+C to stop..",
        config.packet_size,
        session.endpoint_out()
    );

    let mut runner = ThroughputRunner::new(config);
    let summary = runner.run(&mut session, &cancellation, |sample| {
        info!("{}", progress_line(sample))
    });
    Ok(summary)
}

async fn await_ctrl_c(cancellation: Cancellation) {
    if signal::ctrl_c().await.is_ok() {
        info!("Interrupt received, stopping after the current transfer..");
        cancellation.trigger();
    }
}
