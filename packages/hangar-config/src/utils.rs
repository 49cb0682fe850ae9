use std::{env, io, path::PathBuf};

pub const DATA_DIR_ENV: &str = "DATA_DIR";

#[cfg(all(target_family = "unix", not(target_os = "macos")))]
pub fn default_data_dir() -> Result<PathBuf, io::Error> {
    let home_dir = home_from("HOME")?;
    Ok(home_dir.join(".local/share/hangar/"))
}

#[cfg(target_os = "macos")]
pub fn default_data_dir() -> Result<PathBuf, io::Error> {
    let home_dir = home_from("HOME")?;
    Ok(home_dir.join("Library/Application Support/hangar/"))
}

#[cfg(target_family = "windows")]
pub fn default_data_dir() -> Result<PathBuf, io::Error> {
    let home_dir = home_from("APPDATA")?;
    Ok(home_dir.join("hangar/data/"))
}

fn home_from(var: &str) -> Result<PathBuf, io::Error> {
    env::var(var)
        .map(PathBuf::from)
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, format!("{} not found", var)))
}

/// Data directory, `DATA_DIR` taking precedence over the per-OS default.
pub fn data_dir() -> Result<PathBuf, io::Error> {
    match env::var(DATA_DIR_ENV) {
        Ok(dir) => Ok(PathBuf::from(dir)),
        Err(_) => default_data_dir(),
    }
}

pub fn get_data_path(sub: &str) -> Result<PathBuf, io::Error> {
    data_dir().map(|dir| dir.join(sub))
}
