use std::process;

use sniffer_capture::{filters, get_interface, list_interfaces, PcapSource};
use sniffer_cli::{banner, bullet, message, Cli, Tone};
use sniffer_core::{Error, Result};
use sniffer_session::{SessionController, SessionReport};
use tracing::{info, warn};

fn main() {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            report_error(&e, cli.color());
            e.exit_code()
        }
    };
    process::exit(code);
}

fn run(cli: &Cli) -> Result<i32> {
    let color = cli.color();

    if cli.list_interfaces {
        println!("{}", message(Tone::Info, "Available interfaces:", color));
        print_interfaces();
        return Ok(0);
    }

    if !cli.no_banner {
        println!("{}", banner(color));
    }

    let session = cli.to_session()?;
    let config = cli.capture_config()?;

    let interface = get_interface(session.interface())?;
    if !interface.is_up {
        warn!(interface = %interface.name, "interface is down");
    }

    // Catch syntax errors before privileges come into play
    if let Some(filter) = session.filter() {
        filters::check_syntax(filter)?;
    }

    let mut controller = SessionController::with_default_sinks(session, color);
    let stop = controller.stop_handle();
    ctrlc::set_handler(move || stop.stop())
        .map_err(|e| Error::capture(format!("cannot install Ctrl-C handler: {}", e)))?;

    println!(
        "{}\n",
        message(
            Tone::Info,
            &format!("Starting capture on interface: {}", interface.name),
            color
        )
    );
    info!(session = %controller.session(), "starting session");

    let report = controller.run(|session, stop| PcapSource::open(session, &config, stop))?;

    println!(
        "\n{}",
        message(
            Tone::Success,
            &format!(
                "Saved captured packets to: {}",
                report.artifact.path.display()
            ),
            color
        )
    );
    print_report(&report, color);

    Ok(report.exit_code())
}

fn print_report(report: &SessionReport, color: bool) {
    let protocols = &report.protocols;
    let summary = format!(
        "{} packets captured: TCP {}, UDP {}, OTHER {}, non-IP {}",
        report.packets_delivered,
        protocols.tcp,
        protocols.udp,
        protocols.other,
        report.packets_unclassified()
    );
    println!("{}", message(Tone::Info, &summary, color));

    if let Some(stats) = &report.capture_stats {
        println!("{}", message(Tone::Info, &stats.to_string(), color));
    }
    if report.sink_failures > 0 {
        let text = format!("{} sink writes failed (see warnings above)", report.sink_failures);
        println!("{}", message(Tone::Warning, &text, color));
    }
}

fn report_error(error: &Error, color: bool) {
    eprintln!("{}", message(Tone::Failure, &error.to_string(), color));

    match error {
        Error::InterfaceNotFound(_) => {
            eprintln!("{}", message(Tone::Warning, "Available interfaces:", color));
            print_interfaces();
        }
        Error::PermissionDenied(_) => {
            eprintln!(
                "{}",
                message(
                    Tone::Failure,
                    "Run this program with sudo or as administrator.",
                    color
                )
            );
        }
        _ => {}
    }
}

fn print_interfaces() {
    for iface in list_interfaces() {
        println!("{}", bullet(&iface.to_string()));
    }
}
