use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, io::AsyncWriteExt};

use crate::error::Result;

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Reads a JSON array document. A missing file is an empty collection.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Writes the full document next to `path` and fsyncs it. The target is untouched.
pub async fn write_temp<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = tmp_path(path);

    let mut file = fs::File::create(&tmp).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    file.sync_all().await?;

    Ok(tmp)
}

/// Temp file + rename, so a crash leaves either the old or the new document.
pub async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).await?;
    }

    let tmp = write_temp(path, value).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
