// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Device operations behind the `scan`, `scan-stop`, `last-scan`, `read-tag`
//! and `write-tag` commands.
//!
//! A reported device status is printed but does not fail the command.

use std::time::Duration;

use rfu_opcua::{
    DeviceClient, LastScanData, OpcUaTransport, OperationError, ReadTagRequest, ReportedStatus,
    ScanSettings, WriteTagRequest,
};

use crate::cli::{LastScanArgs, OutputFormat, ReadTagArgs, ScanArgs, WriteTagArgs};
use crate::error::BinResult;

/// Extra wait after the scan duration before LastScanData is read.
const SCAN_SETTLE: Duration = Duration::from_millis(100);

// =============================================================================
// Scanning
// =============================================================================

/// Executes the `scan` command.
pub async fn scan<T: OpcUaTransport>(device: &DeviceClient<T>, args: &ScanArgs) -> BinResult<()> {
    let settings = ScanSettings::new(args.duration_ms, args.cycles, args.data_available);
    let outcome = device.try_scan_start(&settings).await?;
    println!("ScanStart: {}", status_text(outcome.status().as_ref()));

    if args.wait {
        let duration = Duration::try_from_secs_f64(args.duration_ms / 1000.0).unwrap_or_default();
        tokio::time::sleep(duration + SCAN_SETTLE).await;

        let data = device.try_get_last_scan_data().await?;
        print_last_scan(&data, OutputFormat::Text);
    }

    Ok(())
}

/// Executes the `scan-stop` command.
pub async fn scan_stop<T: OpcUaTransport>(device: &DeviceClient<T>) -> BinResult<()> {
    let outcome = device.try_scan_stop().await?;
    println!("ScanStop: {}", status_text(outcome.status().as_ref()));
    Ok(())
}

/// Executes the `last-scan` command.
pub async fn last_scan<T: OpcUaTransport>(
    device: &DeviceClient<T>,
    args: &LastScanArgs,
) -> BinResult<()> {
    let data = device.try_get_last_scan_data().await?;
    print_last_scan(&data, args.format);
    Ok(())
}

fn print_last_scan(data: &LastScanData, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("{}", data.text);
            if data.status_code != 0 {
                println!(
                    "  status: {}",
                    OperationError::status_code_name(data.status_code)
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "text": data.text,
                "kind": data.tag.as_ref().map(|tag| tag.kind().to_string()),
                "status": OperationError::status_code_name(data.status_code),
                "status_code": data.status_code,
                "source_timestamp": data.source_timestamp,
                "server_timestamp": data.server_timestamp,
            });
            println!("{}", output);
        }
    }
}

// =============================================================================
// Tag memory
// =============================================================================

/// Executes the `read-tag` command.
pub async fn read_tag<T: OpcUaTransport>(
    device: &DeviceClient<T>,
    args: &ReadTagArgs,
) -> BinResult<()> {
    let tag = args.tag.identifier()?;
    let request = ReadTagRequest {
        codetype: args.tag.codetype.clone(),
        region: args.tag.region,
        offset: args.tag.offset,
        length: args.length,
        password: args.tag.password_bytes()?,
    };

    let result = device.try_read_tag(&tag, &request).await?;

    match args.format {
        OutputFormat::Text => {
            println!("{}", result.text);
            println!("  hex:    {}", to_hex(&result.data));
            println!("  status: {}", status_text(result.status.as_ref()));
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "tag": tag.display_text(),
                "text": result.text,
                "hex": to_hex(&result.data),
                "status": result.status.as_ref().map(ToString::to_string),
                "success": result.status.as_ref().map(ReportedStatus::is_success),
            });
            println!("{}", output);
        }
    }

    Ok(())
}

/// Executes the `write-tag` command.
pub async fn write_tag<T: OpcUaTransport>(
    device: &DeviceClient<T>,
    args: &WriteTagArgs,
) -> BinResult<()> {
    let tag = args.tag.identifier()?;
    let request = WriteTagRequest {
        codetype: args.tag.codetype.clone(),
        region: args.tag.region,
        offset: args.tag.offset,
        data: args.data_bytes()?,
        password: args.tag.password_bytes()?,
    };

    let result = device.try_write_tag(&tag, &request).await?;
    println!(
        "WriteTag ({} bytes): {}",
        request.data.len(),
        status_text(result.status.as_ref())
    );
    Ok(())
}

// =============================================================================
// Formatting
// =============================================================================

fn status_text(status: Option<&ReportedStatus>) -> String {
    status
        .map(ToString::to_string)
        .unwrap_or_else(|| "(no status)".to_string())
}

/// Formats bytes as lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use rfu_opcua::AutoIdOperationStatus;

    use super::*;

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[]), "");
        assert_eq!(to_hex(&[0x00, 0xAB, 0x7F]), "00ab7f");
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(None), "(no status)");
        let status = ReportedStatus::Operation(AutoIdOperationStatus::Success);
        assert_eq!(status_text(Some(&status)), status.to_string());
    }
}
