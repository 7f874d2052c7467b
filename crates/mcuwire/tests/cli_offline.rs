#![cfg(feature = "cli")]

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn mcuwire(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mcuwire"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("mcuwire should run")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line should be json"))
        .collect()
}

#[test]
fn encode_reference_sensor_request() {
    let output = mcuwire(&[
        "--format", "json", "encode", "--type", "0x10", "--id", "0x0A", "--payload", "1A2B",
    ]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["hex"], "AA5501100A021A2B62");
    assert_eq!(lines[0]["checksum"], 0x62);
    assert_eq!(lines[0]["typeName"], "CMD_DHT20");
}

#[test]
fn encode_truncates_wide_values_and_prints_pretty() {
    let output = mcuwire(&[
        "--format", "pretty", "encode", "--type", "0x110", "--id", "0x20A",
    ]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "AA 55 01 10 0A 00 1B"
    );
}

#[test]
fn encode_raw_writes_wire_bytes() {
    let output = mcuwire(&[
        "--format", "raw", "encode", "--type", "0x23", "--id", "5",
    ]);
    assert!(output.status.success());
    assert_eq!(output.stdout, vec![0xAA, 0x55, 0x01, 0x23, 0x05, 0x00, 0x29]);
}

#[test]
fn decode_hex_reports_frame_then_reading() {
    // noise, then RESP_DHT20 id 0x0A with a mid-scale reading
    let output = mcuwire(&[
        "--format",
        "json",
        "decode",
        "--hex",
        "00 AA 13 AA55 01 21 0A 06 800008000000 BA",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["type"], "packet");
    assert_eq!(lines[0]["packetType"], 0x21);
    assert_eq!(lines[0]["packetId"], 0x0A);
    assert_eq!(lines[0]["payloadHex"], "800008000000");
    assert_eq!(lines[1]["type"], "sensor");
    assert_eq!(lines[1]["humidity"], "50.00");
    assert_eq!(lines[1]["temperature"], "50.00");
    assert_eq!(lines[1]["status"], "0x00");
}

#[test]
fn decode_reports_checksum_mismatch_and_fails_without_frames() {
    let output = mcuwire(&["--format", "json", "decode", "--hex", "AA5501230100FF"]);
    assert_eq!(output.status.code(), Some(60));

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["type"], "checksum_mismatch");
    assert_eq!(lines[0]["expected"], 0x25);
    assert_eq!(lines[0]["received"], 0xFF);
}

#[test]
fn decode_reads_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_mcuwire"))
        .args(["--log-level", "error", "--format", "json", "decode"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("decode should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(&[0xAA, 0x55, 0x01, 0x22, 0x03, 0x01, 0x07, 0x2E])
        .expect("stdin write should succeed");

    let output = child.wait_with_output().expect("decode should finish");
    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["packetType"], 0x22);
    assert_eq!(lines[0]["payloadHex"], "07");
}

#[test]
fn sensor_decodes_both_layouts() {
    let output = mcuwire(&["--format", "json", "sensor", "800008000a1c"]);
    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines[0]["status"], "0x1c");

    let output = mcuwire(&[
        "--format",
        "json",
        "sensor",
        "1c800008000a",
        "--layout",
        "status-first",
    ]);
    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines[0]["humidity"], "50.00");
    assert_eq!(lines[0]["status"], "0x1c");
}

#[test]
fn sensor_short_payload_is_data_invalid() {
    let output = mcuwire(&["sensor", "0102"]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("too short"));
}

#[test]
fn version_prints_package_version() {
    let output = mcuwire(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("mcuwire {}", env!("CARGO_PKG_VERSION"))
    );
}
