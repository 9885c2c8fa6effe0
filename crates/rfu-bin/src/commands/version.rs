// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("rfu-client - OPC UA client for SICK RFU6xx RFID interrogators");
    println!();
    println!("Version Information:");
    println!("  rfu-bin:   {}", crate::VERSION);
    println!("  rfu-opcua: {}", rfu_opcua::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target:    {}", std::env::consts::ARCH);
    println!("  OS:        {}", std::env::consts::OS);
    println!();
    println!("Features:");
    println!(
        "  Real transport: {}",
        if cfg!(feature = "real-transport") { "enabled" } else { "disabled" }
    );
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
