use mcuwire_engine::{Notification, SensorReading};

use crate::cmd::SensorArgs;
use crate::exit::{engine_error, CliResult, SUCCESS};
use crate::output::{print_notification, OutputFormat};

pub fn run(args: SensorArgs, format: OutputFormat) -> CliResult<i32> {
    let reading = SensorReading::from_hex(&args.hex, args.layout.into())
        .map_err(|err| engine_error("sensor decode failed", err))?;
    print_notification(&Notification::SensorReading(reading), format);
    Ok(SUCCESS)
}
