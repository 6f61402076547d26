pub mod filter;
pub mod formulas;
pub mod perturb;

use crate::error::{CliError, Result};
use assyst::core::io::checkpoint;
use assyst::core::models::structure::Structure;
use serde::Serialize;
use std::path::Path;

fn read_structures(path: &Path) -> Result<Vec<Structure>> {
    checkpoint::load(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    checkpoint::store(value, path).map_err(|source| CliError::FileWriting {
        path: path.to_path_buf(),
        source,
    })
}
