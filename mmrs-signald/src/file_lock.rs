use fs2::FileExt;
use std::fs::File;

/// Takes the single-instance lock for the daemon serving `object_path`.
pub fn acquire_daemon_lock(object_path: &str) -> Result<File, String> {
    let mut lock_path = dirs::runtime_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or(std::env::temp_dir());
    let name = object_path.trim_start_matches('/').replace('/', "-");
    lock_path.push(format!("mmrs-signald-{name}.lock"));

    let file = File::create(&lock_path).map_err(|e| format!("Failed to create lock file: {e}"))?;

    // Exclusive lock; fails if another instance holds it
    file.try_lock_exclusive()
        .map_err(|_| format!("Another instance is already serving {object_path}"))?;

    Ok(file)
}
