//! JSON export of particle bunches.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::bunch::ParticleBunch;
use crate::error::Result;

/// Write `bunch` to `<folder>/<file_name>.json`, creating `folder` if needed.
///
/// # Returns
///
/// * The path of the written file
pub fn write_bunch_json(
    bunch: &ParticleBunch,
    folder: impl AsRef<Path>,
    file_name: &str,
) -> Result<PathBuf> {
    let folder = folder.as_ref();
    fs::create_dir_all(folder)?;

    let path = folder.join(file_name).with_extension("json");
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(&mut writer, bunch)?;
    writer.flush()?;
    log::info!("Saved bunch '{}' ({} particles) to {:?}", bunch.name, bunch.len(), path);
    Ok(path)
}

/// Read a bunch previously written with [`write_bunch_json`].
pub fn read_bunch_json(path: impl AsRef<Path>) -> Result<ParticleBunch> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}
