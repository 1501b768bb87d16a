//! CLI command implementations

pub mod account;
pub mod add;
pub mod auth;
pub mod lookup;
pub mod update;

use crate::OutputFormat;
use adbridge_core::types::UserRecord;
use adbridge_directory::UserService;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Context passed to all commands
pub struct CommandContext {
    pub service: UserService,
    pub output_format: OutputFormat,
    pub quiet: bool,
}

impl CommandContext {
    /// Check if output should be JSON
    pub fn is_json(&self) -> bool {
        matches!(self.output_format, OutputFormat::Json)
    }

    /// Print info message if not quiet
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Report a completed write
    pub fn done(&self, action: &str, user: &str) -> Result<()> {
        if self.is_json() {
            self.print_json(&serde_json::json!({ "success": true, "action": action, "user": user }))
        } else {
            self.info(&format!("{}: {}", action.green(), user));
            Ok(())
        }
    }

    pub fn print_record(&self, record: &UserRecord) -> Result<()> {
        if self.is_json() {
            return self.print_json(record);
        }

        match record.dn() {
            Some(dn) => println!("{}", dn.blue().bold()),
            None => {
                println!("{}", "(not found)".yellow());
                return Ok(());
            }
        }
        for (name, values) in record.iter() {
            if name.eq_ignore_ascii_case("dn") {
                continue;
            }
            println!("  {}: {}", name.cyan(), values.join(", "));
        }
        Ok(())
    }
}

/// Parse repeated `name=value` arguments
pub fn parse_attributes(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => anyhow::bail!("Expected name=value, got: {}", pair),
        })
        .collect()
}
