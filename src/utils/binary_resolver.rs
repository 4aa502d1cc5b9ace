use anyhow::Result;
use std::path::PathBuf;

/// Locate an external binary: environment override, then the install
/// directory (`~/.adb-tools/<subdir>/`), then next to our own
/// executable, then the system PATH.
pub fn find_binary(name: &str, env_override: &str, subdir: &str) -> Result<PathBuf> {
    let mut checked_paths = Vec::new();

    if let Ok(path) = std::env::var(env_override) {
        let path = PathBuf::from(path);
        checked_paths.push(format!("Env ({}): {:?}", env_override, path));
        if path.exists() {
            return Ok(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let install_path = home.join(".adb-tools").join(subdir).join(name);
        checked_paths.push(format!("Install Dir: {:?}", install_path));
        if install_path.exists() {
            return Ok(install_path);
        }
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let sibling_path = exe_dir.join(name);
            checked_paths.push(format!("Sibling: {:?}", sibling_path));
            if sibling_path.exists() {
                return Ok(sibling_path);
            }
        }
    }

    if let Ok(path) = which::which(name) {
        return Ok(path);
    }

    Err(anyhow::anyhow!(
        "Could not find binary '{}'. Checked paths:\n{}",
        name,
        checked_paths.join("\n")
    ))
}

/// Find the ADB binary
pub fn find_adb() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        find_binary("adb.exe", "ADB_TOOLS_ADB", "platform-tools")
            .or_else(|_| find_binary("adb", "ADB_TOOLS_ADB", "platform-tools"))
    }
    #[cfg(not(windows))]
    {
        find_binary("adb", "ADB_TOOLS_ADB", "platform-tools")
    }
}

/// Find the scrcpy binary
pub fn find_scrcpy() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        find_binary("scrcpy.exe", "ADB_TOOLS_SCRCPY", "scrcpy")
            .or_else(|_| find_binary("scrcpy", "ADB_TOOLS_SCRCPY", "scrcpy"))
    }
    #[cfg(not(windows))]
    {
        find_binary("scrcpy", "ADB_TOOLS_SCRCPY", "scrcpy")
    }
}
