use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn read_from<T: DeserializeOwned>(reader: impl Read) -> Result<T, CheckpointError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn write_to<T: Serialize + ?Sized>(
    value: &T,
    mut writer: impl Write,
) -> Result<(), CheckpointError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Loads a JSON document from `path`.
pub fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, CheckpointError> {
    let file = File::open(path)?;
    read_from(BufReader::new(file))
}

/// Stores `value` as pretty-printed JSON at `path`, creating parent directories.
pub fn store<T: Serialize + ?Sized>(
    value: &T,
    path: impl AsRef<Path>,
) -> Result<(), CheckpointError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_to(value, BufWriter::new(file))
}
