use std::path::PathBuf;

/// Detects the Victoria 2 installation path.
///
/// Checks common Steam installation directories on Windows, Linux, and macOS.
pub fn detect_game_path() -> Option<PathBuf> {
    let candidates = [
        // Windows
        r"C:\Program Files (x86)\Steam\steamapps\common\Victoria 2",
        // Linux
        ".local/share/Steam/steamapps/common/Victoria 2",
        // macOS
        "Library/Application Support/Steam/steamapps/common/Victoria 2",
    ];

    candidates
        .iter()
        .filter_map(|candidate| {
            if candidate.starts_with("C:") {
                Some(PathBuf::from(candidate))
            } else {
                dirs::home_dir().map(|home| home.join(candidate))
            }
        })
        .find(|path| path.join("common").is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detected_path_has_common_dir() {
        if let Some(path) = detect_game_path() {
            assert!(path.join("common").is_dir());
        }
    }
}
