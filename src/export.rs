// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::fs::File;
use std::io::Write;

use csv::Writer;
use serde::Serialize;

use crate::error::Result;
use crate::yal::Module;

#[derive(Debug, Serialize)]
pub struct ModuleCsvRecord {
    #[serde(rename = "Module")]
    pub module_name: String,
    #[serde(rename = "Type")]
    pub module_type: String,
    #[serde(rename = "Width")]
    pub width: i64,
    #[serde(rename = "Height")]
    pub height: i64,
    #[serde(rename = "Terminals")]
    pub terminals: usize,
    #[serde(rename = "Instances")]
    pub instances: usize,
    #[serde(rename = "Placements")]
    pub placements: usize,
    #[serde(rename = "CriticalNets")]
    pub critical_nets: usize,
    #[serde(rename = "Signals")]
    pub signals: String,
}

#[derive(Serialize)]
struct ModuleDocument<'a> {
    module: &'a Module,
}

/// Format terminals into a comma-separated string of "TYPE:NAME" format
fn format_signals(module: &Module) -> String {
    module
        .terminals
        .iter()
        .map(|t| format!("{}:{}", t.terminal_type, t.signal_name))
        .collect::<Vec<String>>()
        .join(",")
}

/// Convert a Module to a ModuleCsvRecord
fn module_to_csv_record(module: &Module) -> Result<ModuleCsvRecord> {
    Ok(ModuleCsvRecord {
        module_name: module.name.clone(),
        module_type: module.module_type.to_string(),
        width: module.width()?,
        height: module.height()?,
        terminals: module.terminals.len(),
        instances: module.network.len(),
        placements: module.placement.len(),
        critical_nets: module.critical_nets.len(),
        signals: format_signals(module),
    })
}

/// Write a per-module summary table as CSV
pub fn write_modules_csv<W: Write>(modules: &[Module], out: W) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    for module in modules {
        writer.serialize(module_to_csv_record(module)?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Export the module summary to a CSV file
pub fn export_modules_to_csv(modules: &[Module], file_path: &str) -> Result<()> {
    let file = File::create(file_path)?;
    write_modules_csv(modules, file)
}

/// Render modules as a YAML list of `{module: ...}` documents
pub fn modules_to_yaml(modules: &[Module]) -> Result<String> {
    let docs: Vec<ModuleDocument<'_>> = modules.iter().map(|module| ModuleDocument { module }).collect();
    Ok(serde_yaml::to_string(&docs)?)
}

/// Render any serializable value (modules, participants) as YAML
pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Render any serializable value (modules, participants) as pretty JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
