//! File names inside the playground directory

use std::path::{Path, PathBuf};

/// Replace characters that would escape the playground (`.` and `/`)
pub fn regularize(name: &str) -> String {
    name.chars()
        .map(|c| if c == '.' || c == '/' { '_' } else { c })
        .collect()
}

/// Base name shared by a player's lock and level files: `<uid><name>`
pub fn lock_name(uid: u32, plname: &str) -> String {
    format!("{uid}{}", regularize(plname))
}

/// The single-instance lock for one player
pub fn game_lock_path(playground: &Path, lockname: &str) -> PathBuf {
    playground.join(format!("{lockname}.lock"))
}

/// `<data dir>/restohack`, if the platform has a data directory
pub fn default_playground() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("restohack"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regularize() {
        assert_eq!(regularize("../etc/passwd"), "___etc_passwd");
        assert_eq!(regularize("plain"), "plain");
    }

    #[test]
    fn test_lock_name() {
        assert_eq!(lock_name(1000, "a.b"), "1000a_b");
        assert_eq!(
            game_lock_path(Path::new("/pg"), "1000a_b"),
            PathBuf::from("/pg/1000a_b.lock")
        );
    }
}
