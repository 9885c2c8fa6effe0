// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::commands::load_config;
use crate::error::BinResult;

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: &ValidateArgs) -> BinResult<()> {
    let loaded = load_config(cli)?;
    let config = &loaded.config;
    let warnings = config.warnings();
    let source = loaded
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(built-in defaults)".to_string());

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", source);
            println!();
            println!("Summary:");
            println!("  Endpoint:  {}", config.client.endpoint);
            println!("  Selection: {}", config.client.endpoint_selection);
            println!("  Session:   {}", config.client.effective_session_name());
            println!("  Device ns: {}", config.device.device_namespace);

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!(
                    "{}",
                    serde_yaml::to_string(config)
                        .unwrap_or_else(|_| "(serialization error)".to_string())
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": source,
                "summary": {
                    "endpoint": config.client.endpoint,
                    "endpoint_selection": config.client.endpoint_selection.to_string(),
                    "session_name": config.client.effective_session_name(),
                    "device_namespace": config.device.device_namespace,
                },
                "warnings": warnings,
                "config": if args.show_config { Some(config) } else { None },
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
            );
        }
    }

    Ok(())
}
