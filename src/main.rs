use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser};
use g29_mode::commands::{Command, selector_help};
use g29_mode::protocol::{Pass, Status, run_with};
use g29_mode::transport::HidApiTransport;
use std::process::ExitCode;

/// Send a mode command to every attached Logitech G29 wheel
#[derive(Parser, Debug)]
#[command(name = "g29-mode", version)]
struct Opt {
    /// Index of the command to send (see list below)
    #[arg(default_value_t = 0, allow_negative_numbers = true)]
    selector: i64,
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(
        env_logger::Env::new()
            .filter_or("G29_MODE_LOG", "warn")
            .write_style("G29_MODE_LOG_STYLE"),
    )
    .init();

    let matches = Opt::command().after_help(selector_help()).get_matches();
    let opt = Opt::from_arg_matches(&matches)?;

    println!("------------------- G29 -------------------");

    // Checked before the HID library is even initialized.
    let command = match Command::from_selector(opt.selector) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::from(Status::of(Err(&e)).exit_code()));
        }
    };

    let transport = HidApiTransport::new()?;
    let pass = run_with(&transport, command);
    report(&pass);

    let status = Status::of(Ok(&pass));
    if status == Status::NoDeviceFound {
        eprintln!("No Logitech G29 device found.");
    }

    Ok(ExitCode::from(status.exit_code()))
}

fn report(pass: &Pass) {
    for outcome in &pass.outcomes {
        println!("[{}] Initialised Logitech G29", outcome.device);
        println!("{}", outcome.identity);
        println!("{outcome}");
        if let Some(e) = &outcome.failure {
            print_causes(e);
        }
        println!();
    }
}

/// Print the chain of underlying errors, most specific last.
fn print_causes(e: &(dyn std::error::Error + 'static)) {
    let mut source = e.source();
    while let Some(cause) = source {
        println!("  caused by: {cause}");
        source = cause.source();
    }
}
