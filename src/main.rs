use std::process::ExitCode;

use bx1_servo::cli::Args;
use bx1_servo::instance::OsProcesses;
use bx1_servo::launcher::{self, Launch};
use bx1_servo::Request;
use clap::error::ErrorKind;
use clap::Parser;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            println!("{}", Args::usage());
            return ExitCode::from(1);
        }
    };

    bx1_servo::init();
    let config = args.config();

    let result = if args.worker {
        match args.request() {
            Request::Hold(angle) => bx1_servo::worker::run(&config, angle).map(|_| ()),
            Request::Stop => Ok(()),
        }
    } else {
        launcher::launch(&config, args.request(), &mut OsProcesses, launcher::spawn_worker).map(
            |launch| {
                if let Launch::Spawned { angle, pid } = launch {
                    log::debug!("Holding {} in worker {}", angle, pid);
                }
            },
        )
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}
