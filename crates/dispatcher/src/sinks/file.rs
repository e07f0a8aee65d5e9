//! FileSink - appends snapshots to a JSONL file

use chrono::{SecondsFormat, Utc};
use contracts::{ContractError, OutputSink, PipelineOutput};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output directory
    pub base_path: PathBuf,
    /// File name inside `base_path`; defaults to `<sink name>.jsonl`
    pub file_name: Option<String>,
}

impl FileSinkConfig {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        Self {
            base_path,
            file_name: params.get("file_name").cloned(),
        }
    }
}

/// One line of the output file
#[derive(Serialize)]
struct FileRecord<'a> {
    /// Wall-clock time the line was written (RFC 3339, UTC)
    written_at: String,
    #[serde(flatten)]
    output: &'a PipelineOutput,
}

/// Sink that appends one JSON object per snapshot
pub struct FileSink {
    name: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        fs::create_dir_all(&config.base_path)?;

        let file_name = config
            .file_name
            .unwrap_or_else(|| format!("{}.jsonl", name));
        let path = config.base_path.join(file_name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        debug!(sink = %name, path = %path.display(), "file sink opened");

        Ok(Self {
            name,
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, output: &PipelineOutput) -> std::io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "file sink closed")
        })?;

        let record = FileRecord {
            written_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            output,
        };
        serde_json::to_writer(&mut *writer, &record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(b"\n")
    }

    fn persist(&mut self, output: &PipelineOutput) -> Result<(), ContractError> {
        self.append(output).map_err(|e| {
            error!(sink = %self.name, sequence = output.sequence, error = %e, "write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }
}

impl OutputSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, output),
        fields(sink = %self.name, sequence = output.sequence)
    )]
    async fn write(&mut self, output: &PipelineOutput) -> Result<(), ContractError> {
        self.persist(output)
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        if let Some(writer) = self.writer.as_mut() {
            writer
                .flush()
                .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        }
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush().await?;
        self.writer = None;
        debug!(sink = %self.name, "file sink closed");
        Ok(())
    }
}
