use std::fs;
use std::io::{self, Read};

use mcuwire_engine::{Notification, ProtocolEngine};
use mcuwire_transport::StreamTransport;

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_notification, OutputFormat};

/// Offline decoding: no link is ever attached.
type OfflineEngine = ProtocolEngine<StreamTransport<io::Sink>, Vec<Notification>>;

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = read_input(&args)?;

    let mut engine: OfflineEngine = ProtocolEngine::new(args.engine.config(), Vec::new());
    let frames = engine.on_bytes(&bytes);
    tracing::debug!(bytes = bytes.len(), frames, "decoded input");

    for notification in engine.sink() {
        print_notification(notification, format);
    }

    if frames == 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("no valid frames in {} input bytes", bytes.len()),
        ));
    }
    Ok(SUCCESS)
}

fn read_input(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return Ok(hex.0.clone());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    let mut buf = Vec::new();
    io::stdin()
        .lock()
        .read_to_end(&mut buf)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(buf)
}
