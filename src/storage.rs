// File: ./src/storage.rs
// Locked, atomic file writes for the config file.
use anyhow::Result;
use fs2::FileExt;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FileStore;

impl FileStore {
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        match lock_path.extension() {
            Some(ext) => {
                let mut new_ext = ext.to_os_string();
                new_ext.push(".lock");
                lock_path.set_extension(new_ext);
            }
            None => {
                lock_path.set_extension("lock");
            }
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive lock on `<file>.lock`.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Writes to `<file>.tmp` then renames over the target.
    ///
    /// On Unix the temp file is created with mode 0600 since the config holds
    /// the API token.
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        {
            let mut options = fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut file = options.open(&tmp_path)?;
            std::io::Write::write_all(&mut file, contents.as_ref())?;
            file.sync_all()?;
        }
        fs::rename(tmp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_path_appends_to_extension() {
        assert_eq!(
            FileStore::get_lock_path(Path::new("/x/config.toml")),
            PathBuf::from("/x/config.toml.lock")
        );
        assert_eq!(
            FileStore::get_lock_path(Path::new("/x/config")),
            PathBuf::from("/x/config.lock")
        );
    }
}
