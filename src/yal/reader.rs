// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::fs;
use std::io::Read;
use std::path::Path;

use log::{debug, error, info};

use super::Module;
use crate::error::Result;

pub struct YalReader;

impl YalReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Module>> {
        let path_str = path.as_ref().display().to_string();
        info!("[LOAD] Loading YAL file: {path_str}");

        let content = fs::read_to_string(path)?;
        self.read_str(&content)
    }

    /// Read a whole document from any reader, e.g. standard input
    pub fn read_from<R: Read>(&self, mut source: R) -> Result<Vec<Module>> {
        let mut content = String::new();
        source.read_to_string(&mut content)?;
        self.read_str(&content)
    }

    pub fn read_str(&self, content: &str) -> Result<Vec<Module>> {
        debug!("[FILE] YAL input size: {} bytes", content.len());

        match super::parse(content) {
            Ok(modules) => {
                let terminals: usize = modules.iter().map(|m| m.terminals.len()).sum();
                let instances: usize = modules.iter().map(|m| m.network.len()).sum();
                info!("[PASS] YAL parsed successfully!");
                info!(
                    "[INFO] Statistics: {} modules, {terminals} terminals, {instances} instances",
                    modules.len()
                );
                Ok(modules)
            }
            Err(e) => {
                error!("[FAIL] Failed to parse YAL input: {e}");
                Err(e)
            }
        }
    }
}

impl Default for YalReader {
    fn default() -> Self {
        Self::new()
    }
}
