// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! Device commands connect, run one operation and disconnect. The operation
//! itself is generic over the transport so it can run against any
//! [`DeviceClient`].
//!
//! - `scan`, `scan-stop`: ScanStart and ScanStop
//! - `last-scan`: LastScanData
//! - `read-tag`, `write-tag`: tag memory access
//! - `validate`: Validate configuration file
//! - `version`: Show version information

mod operations;
mod validate;
mod version;

pub use operations::{last_scan, read_tag, scan, scan_stop, to_hex, write_tag};
pub use validate::validate;
pub use version::version;

use rfu_opcua::{DeviceClient, OpcUaTransport};

use crate::cli::{Cli, Commands};
use crate::config::{self, LoadedConfig};
use crate::error::{BinError, BinResult};

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match &cli.command {
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
        command => {
            let loaded = load_config(&cli)?;
            run_on_device(loaded, command).await
        }
    }
}

/// Loads the configuration named on the command line.
pub fn load_config(cli: &Cli) -> BinResult<LoadedConfig> {
    let loaded = config::load(cli.config.as_deref(), cli.endpoint.as_deref())?;
    loaded.config.validate()?;
    Ok(loaded)
}

/// Runs one device command against a connected device.
pub async fn dispatch<T: OpcUaTransport>(
    device: &DeviceClient<T>,
    command: &Commands,
) -> BinResult<()> {
    match command {
        Commands::Scan(args) => operations::scan(device, args).await,
        Commands::ScanStop => operations::scan_stop(device).await,
        Commands::LastScan(args) => operations::last_scan(device, args).await,
        Commands::ReadTag(args) => operations::read_tag(device, args).await,
        Commands::WriteTag(args) => operations::write_tag(device, args).await,
        Commands::Validate(_) | Commands::Version => Err(BinError::usage(
            "not a device command",
        )),
    }
}

/// Connects, dispatches and always disconnects.
pub async fn run_with<T: OpcUaTransport>(
    mut device: DeviceClient<T>,
    endpoint: &str,
    command: &Commands,
) -> BinResult<()> {
    device
        .try_connect(endpoint)
        .await
        .map_err(|e| BinError::from(e).with_context(format!("connect to {}", endpoint)))?;

    let result = dispatch(&device, command).await;
    device.disconnect().await;
    result
}

#[cfg(feature = "real-transport")]
async fn run_on_device(loaded: LoadedConfig, command: &Commands) -> BinResult<()> {
    use rfu_opcua::RealOpcUaTransport;

    let LoadedConfig { config, .. } = loaded;
    let endpoint = config.client.endpoint.clone();
    let policy = config.trust.into_policy()?;

    let device = DeviceClient::new(
        RealOpcUaTransport::new(config.client.clone()),
        config.client,
        config.device,
    )
    .with_trust_policy(policy);

    run_with(device, &endpoint, command).await
}

#[cfg(not(feature = "real-transport"))]
async fn run_on_device(_loaded: LoadedConfig, _command: &Commands) -> BinResult<()> {
    Err(BinError::config(
        "rfu-client was built without the real-transport feature",
    ))
}
