use std::{
    fs::{self, File},
    io::{self, BufWriter, Error as IoError, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use displaydoc::Display;
use flate2::read::GzDecoder;
use log::info;
use tar::Archive;
use thiserror::Error;

use crate::paths::IMDB_DIR_NAME;

/// The potential errors of the download.
#[derive(Debug, Display, Error)]
pub enum DownloadError {
    /// Failed to request the dataset: {0}
    Request(#[from] Box<ureq::Error>),
    /// Failed to write or unpack the dataset: {0}
    Io(#[from] IoError),
    /// The unpacked archive doesn't contain the dataset directory {0}
    MissingDataset(String),
}

const TIMEOUT: Duration = Duration::from_secs(600);

/// Downloads the file at the url to the path.
///
/// Returns the number of downloaded bytes.
pub fn download(url: &str, path: impl AsRef<Path>) -> Result<u64, DownloadError> {
    let path = path.as_ref();
    info!("Downloading {} to {}", url, path.display());
    let response = ureq::get(url).timeout(TIMEOUT).call().map_err(Box::new)?;

    let mut file = BufWriter::new(File::create(path)?);
    let bytes = io::copy(&mut response.into_reader(), &mut file)?;
    file.flush()?;
    info!("Downloaded {} bytes", bytes);

    Ok(bytes)
}

/// Unpacks the gzipped tar archive into the directory.
pub fn unpack(archive: impl AsRef<Path>, dir: impl AsRef<Path>) -> Result<(), DownloadError> {
    let (archive, dir) = (archive.as_ref(), dir.as_ref());
    info!("Unpacking {} into {}", archive.display(), dir.display());
    Archive::new(GzDecoder::new(File::open(archive)?)).unpack(dir)?;

    Ok(())
}

/// Downloads and unpacks the dataset archive into the local directory.
///
/// Returns the path of the unpacked dataset directory.
pub fn download_and_unpack(
    url: &str,
    local_dir: impl AsRef<Path>,
    archive_name: &str,
) -> Result<PathBuf, DownloadError> {
    let local_dir = local_dir.as_ref();
    fs::create_dir_all(local_dir)?;
    let archive = local_dir.join(archive_name);
    download(url, &archive)?;
    unpack(&archive, local_dir)?;

    let imdb_dir = local_dir.join(IMDB_DIR_NAME);
    if imdb_dir.is_dir() {
        Ok(imdb_dir)
    } else {
        Err(DownloadError::MissingDataset(imdb_dir.display().to_string()))
    }
}
