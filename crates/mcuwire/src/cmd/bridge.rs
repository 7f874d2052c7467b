use std::io::{self, BufRead, ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use mcuwire_engine::{Notification, NotificationSink, ProtocolEngine};
use mcuwire_frame::{Command as FrameCommand, FrameConfig};
use mcuwire_transport::{open_device, LinkStream, StreamTransport};
use tracing::{debug, info, warn};

use crate::cmd::BridgeArgs;
use crate::exit::{io_error, transport_error, CliError, CliResult, SUCCESS};
use crate::output::{print_notification, OutputFormat};
use crate::parse::{parse_hex, parse_wide};

type LinkEngine = ProtocolEngine<StreamTransport<LinkStream>, Sender<Notification>>;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// One line typed on the bridge's stdin.
#[derive(Debug, PartialEq, Eq)]
enum BridgeCommand {
    /// Type and id keep only their low byte, as on the wire.
    Send(FrameCommand),
    RequestSensor,
    Raw(Vec<u8>),
    Status,
    Quit,
}

pub fn run(args: BridgeArgs, format: OutputFormat) -> CliResult<i32> {
    let frame_config = FrameConfig {
        read_timeout: Some(POLL_INTERVAL),
        write_timeout: Some(WRITE_TIMEOUT),
        read_chunk_size: args.chunk_size.max(1),
    };

    let link = open_link(&args)?;
    link.set_read_timeout(frame_config.read_timeout)
        .map_err(|err| transport_error("link setup failed", err))?;
    link.set_write_timeout(frame_config.write_timeout)
        .map_err(|err| transport_error("link setup failed", err))?;
    let writer = link
        .try_clone()
        .map_err(|err| transport_error("link setup failed", err))?;
    info!(path = %args.path.display(), kind = link.kind(), "bridge attached");

    let (notices, rx) = mpsc::channel();
    let engine = Arc::new(Mutex::new(ProtocolEngine::new(
        args.engine.config(),
        notices.clone(),
    )));
    lock(&engine).attach(StreamTransport::new(writer));

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let reader = {
        let engine = engine.clone();
        let running = running.clone();
        thread::spawn(move || read_loop(link, frame_config.read_chunk_size, &engine, &running))
    };
    {
        let engine = engine.clone();
        let running = running.clone();
        thread::spawn(move || command_loop(&engine, notices, &running));
    }

    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(notification) => print_notification(&notification, format),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    // A reader blocked on a device without timeouts is left behind.
    let outcome = if reader.is_finished() {
        reader.join().unwrap_or_else(|_| {
            Err(CliError::new(crate::exit::INTERNAL, "link reader panicked"))
        })
    } else {
        Ok(())
    };

    detach(&engine);
    while let Ok(notification) = rx.try_recv() {
        print_notification(&notification, format);
    }

    outcome.map(|()| SUCCESS)
}

fn open_link(args: &BridgeArgs) -> CliResult<LinkStream> {
    if args.uds {
        #[cfg(unix)]
        return mcuwire_transport::UnixDomainSocket::connect(&args.path)
            .map_err(|err| transport_error("connect failed", err));
        #[cfg(not(unix))]
        return Err(CliError::new(
            crate::exit::USAGE,
            "--uds is only supported on unix platforms",
        ));
    }
    open_device(&args.path).map_err(|err| transport_error("open failed", err))
}

fn lock(engine: &Mutex<LinkEngine>) -> MutexGuard<'_, LinkEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_loop(
    mut link: LinkStream,
    chunk_size: usize,
    engine: &Mutex<LinkEngine>,
    running: &AtomicBool,
) -> CliResult<()> {
    let mut chunk = vec![0u8; chunk_size];
    let result = loop {
        if !running.load(Ordering::SeqCst) {
            break Ok(());
        }
        match link.read(&mut chunk) {
            Ok(0) => {
                info!("link closed by peer");
                break Ok(());
            }
            Ok(n) => {
                lock(engine).on_bytes(&chunk[..n]);
            }
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
                ) =>
            {
                continue
            }
            Err(err) => break Err(io_error("link read failed", err)),
        }
    };

    detach(engine);
    running.store(false, Ordering::SeqCst);
    result
}

/// Detach unless the other side of the bridge already did.
fn detach(engine: &Mutex<LinkEngine>) {
    let mut engine = lock(engine);
    if engine.transport().is_some() {
        engine.detach();
    }
}

fn command_loop(
    engine: &Mutex<LinkEngine>,
    mut notices: Sender<Notification>,
    running: &AtomicBool,
) {
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        if !running.load(Ordering::SeqCst) {
            break;
        }
        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(BridgeCommand::Quit)) => {
                running.store(false, Ordering::SeqCst);
                break;
            }
            Ok(Some(command)) => execute(command, engine, &mut notices),
            Err(message) => warn!(input = %line.trim(), "{message}"),
        }
    }
    debug!("command input closed");
}

fn execute(
    command: BridgeCommand,
    engine: &Mutex<LinkEngine>,
    notices: &mut Sender<Notification>,
) {
    let mut engine = lock(engine);
    let accepted = match command {
        BridgeCommand::Send(command) => {
            engine.send_command(command.frame_type, command.id, command.payload)
        }
        BridgeCommand::RequestSensor => engine.request_sensor(),
        BridgeCommand::Raw(bytes) => engine.send_raw(&bytes),
        BridgeCommand::Status => {
            for notification in engine.snapshot() {
                notices.notify(notification);
            }
            true
        }
        BridgeCommand::Quit => true,
    };
    if !accepted {
        warn!("command not sent: link unavailable");
    }
}

fn parse_command(line: &str) -> Result<Option<BridgeCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match (verb, rest.as_slice()) {
        ("send", [frame_type, id, payload @ ..]) => BridgeCommand::Send(FrameCommand::from_wide(
            parse_wide(frame_type)?,
            parse_wide(id)?,
            parse_hex(&payload.concat())?.0,
        )),
        ("send", _) => return Err("usage: send <type> <id> [hex]".to_string()),
        ("request-sensor", []) => BridgeCommand::RequestSensor,
        ("raw", [_, ..]) => BridgeCommand::Raw(parse_hex(&rest.concat())?.0),
        ("raw", []) => return Err("usage: raw <hex>".to_string()),
        ("status", []) => BridgeCommand::Status,
        ("quit" | "exit", []) => BridgeCommand::Quit,
        _ => return Err(format!("unknown command: {verb}")),
    };
    Ok(Some(command))
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
