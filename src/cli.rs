//! Command-line interface.

use clap::Parser;
use std::path::PathBuf;

use crate::columns::ColumnSelection;
use crate::config::EngineConfig;
use crate::docker::{Docker, ImageLister};
use crate::errors::*;
use crate::export::{export_from, output_file_name};

/// Export the local Docker image list to a CSV file.
#[derive(Debug, Parser)]
#[command(name = "image-csv", version)]
pub struct Cli {
    /// Comma-separated list of columns to export (e.g., Repository,Tag)
    #[arg(short = 'c', long = "column", value_name = "LIST")]
    pub column: Option<String>,

    /// Write to this file instead of docker_images[_<columns>].csv
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Docker daemon address, overriding DOCKER_HOST
    #[arg(short = 'H', long = "host", value_name = "HOST")]
    pub host: Option<String>,
}

/// `err` and everything that caused it, one per line, for stderr.
pub fn error_report(err: &Error) -> String {
    let mut report = String::from("Error: ");
    for e in err.iter() {
        report.push_str(&e.to_string());
        report.push('\n');
    }
    report
}

/// What a successful export did.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub images: usize,
    pub path: PathBuf,
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        match self.output {
            Some(ref path) => path.clone(),
            None => output_file_name(self.column.as_deref()),
        }
    }

    /// Apply our flags on top of `base`.
    pub fn engine_config(&self, base: EngineConfig) -> EngineConfig {
        match self.host {
            Some(ref host) => base.with_host(host.as_str()),
            None => base,
        }
    }

    /// Validate the columns, connect to Docker and export.
    pub async fn run(&self, config: EngineConfig) -> Result<Summary> {
        let selection = ColumnSelection::parse(self.column.as_deref())?;
        let docker = Docker::connect(&self.engine_config(config)).await?;
        self.export(&docker, &selection).await
    }

    /// Export using an already-constructed lister.
    pub async fn run_with<L: ImageLister>(&self, lister: &L) -> Result<Summary> {
        let selection = ColumnSelection::parse(self.column.as_deref())?;
        self.export(lister, &selection).await
    }

    async fn export<L: ImageLister>(
        &self,
        lister: &L,
        selection: &ColumnSelection,
    ) -> Result<Summary> {
        let path = self.output_path();
        let images = export_from(lister, selection, &path).await?;
        Ok(Summary { images, path })
    }
}
