use mcuwire_frame::Command;

use crate::cmd::EncodeArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = args.payload.map(|bytes| bytes.0).unwrap_or_default();
    let command = Command::from_wide(args.frame_type, args.id, payload);
    let wire = command.encode();
    print_encoded(&command, &wire, format);
    Ok(SUCCESS)
}
