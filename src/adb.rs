use crate::utils::binary_resolver;
use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Stdio;
use tokio::process::Command;

/// One row of the `adb devices` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub serial: String,
    pub state: String,
}

impl Device {
    /// Ready for commands (state column reads `device`)
    pub fn is_online(&self) -> bool {
        self.state == "device"
    }

    /// Stale wireless connection (state column reads `offline`)
    pub fn is_offline(&self) -> bool {
        self.state == "offline"
    }
}

/// Parse the output of `adb devices`: skip the header line, then take
/// the serial and state columns of every remaining row.
pub fn parse_devices(output: &str) -> Vec<Device> {
    let mut devices = Vec::new();
    for line in output.lines().skip(1) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 2 {
            devices.push(Device {
                serial: parts[0].to_string(),
                state: parts[1].to_string(),
            });
        }
    }
    devices
}

/// Get the list of connected Android devices
pub async fn devices() -> Result<Vec<Device>> {
    Ok(parse_devices(&devices_raw().await?))
}

/// Get the raw `adb devices` table for display
pub async fn devices_raw() -> Result<String> {
    let output = exec(None, &["devices"]).await?;
    Ok(output.trim_end_matches('\n').to_string())
}

/// Print the connected devices, one line per serial
pub async fn list_devices() -> Result<()> {
    let devices = devices().await?;

    if devices.is_empty() {
        println!("  No Android devices connected");
    } else {
        println!("  Found {} device(s):", devices.len());
        for device in devices {
            println!(
                "    {} {} ({})",
                "•".green(),
                device.serial.white().bold(),
                device.state.dimmed()
            );
        }
    }

    Ok(())
}

/// Execute a raw ADB command and capture stdout
pub async fn exec(serial: Option<&str>, args: &[&str]) -> Result<String> {
    let mut full_args = Vec::new();

    if let Some(s) = serial {
        full_args.push("-s");
        full_args.push(s);
    }

    full_args.extend_from_slice(args);

    let adb_path = binary_resolver::find_adb()?;
    let output = Command::new(adb_path)
        .args(&full_args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .with_context(|| format!("Failed to execute: adb {:?}", full_args))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("ADB command failed: {}", stderr);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        log::debug!("adb {:?} stderr:\n{}", full_args, stderr);
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Execute an ADB shell command
pub async fn shell(serial: Option<&str>, cmd: &str) -> Result<String> {
    let mut args = Vec::new();

    if let Some(s) = serial {
        args.push("-s");
        args.push(s);
    }

    args.push("shell");
    args.push(cmd);

    let adb_path = binary_resolver::find_adb()?;
    let output = Command::new(adb_path)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .with_context(|| format!("Failed to execute: adb shell {}", cmd))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("ADB shell command failed: {}", stderr);
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Look up the device's wireless IP address. Tries the DHCP property
/// first, then falls back to parsing `ip addr` for the wlan0
/// interface. Returns `None` when neither source yields an address.
pub async fn device_ip(serial: &str) -> Option<String> {
    if let Ok(output) = shell(Some(serial), "getprop dhcp.wlan0.ipaddress").await {
        let prop = output.trim();
        if !prop.is_empty() {
            return Some(prop.to_string());
        }
    }

    if let Ok(output) = shell(Some(serial), "ip -f inet addr show wlan0").await {
        return parse_inet_addr(&output);
    }

    None
}

/// Extract the first `inet a.b.c.d/nn` address from `ip addr` output
pub fn parse_inet_addr(output: &str) -> Option<String> {
    for line in output.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("inet ") {
            let addr = rest.split_whitespace().next()?;
            return Some(addr.split('/').next().unwrap_or(addr).to_string());
        }
    }
    None
}

/// Restart adbd on the device listening on a TCP port
pub async fn tcpip(serial: &str, port: u16) -> Result<()> {
    exec(Some(serial), &["tcpip", &port.to_string()]).await?;
    Ok(())
}

/// Connect to a device over TCP (`host:port`)
pub async fn connect(endpoint: &str) -> Result<String> {
    exec(None, &["connect", endpoint]).await
}

/// Disconnect one TCP endpoint, or all of them when `target` is None.
///
/// adb exits non-zero when the target was never connected; that is not
/// an error for us, so the status is only logged.
pub async fn disconnect(target: Option<&str>) -> Result<String> {
    let mut args = vec!["disconnect"];
    if let Some(t) = target {
        args.push(t);
    }

    let adb_path = binary_resolver::find_adb()?;
    let output = Command::new(adb_path)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .with_context(|| format!("Failed to execute: adb {:?}", args))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::debug!("adb {:?} exited with {}: {}", args, output.status, stderr);
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Stop the local ADB server
pub async fn kill_server() -> Result<()> {
    exec(None, &["kill-server"]).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_devices_skips_header_and_blank_lines() {
        let output = "List of devices attached\n\
                      emulator-5554\tdevice\n\
                      192.168.1.5:5555\toffline\n\
                      ABC123\tunauthorized\n\n";
        let devices = parse_devices(output);
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].serial, "emulator-5554");
        assert!(devices[0].is_online());
        assert!(devices[1].is_offline());
        assert_eq!(devices[2].state, "unauthorized");
        assert!(!devices[2].is_online());
    }

    #[test]
    fn parse_devices_handles_empty_table() {
        assert!(parse_devices("List of devices attached\n\n").is_empty());
    }

    #[test]
    fn parse_inet_addr_extracts_first_address() {
        let output = "\
24: wlan0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc mq state UP
    inet 192.168.1.7/24 brd 192.168.1.255 scope global wlan0
    inet 10.0.0.3/8 scope global secondary wlan0
";
        assert_eq!(parse_inet_addr(output), Some("192.168.1.7".to_string()));
    }

    #[test]
    fn parse_inet_addr_returns_none_without_inet_line() {
        let output = "24: wlan0: <BROADCAST,MULTICAST> mtu 1500 state DOWN\n";
        assert_eq!(parse_inet_addr(output), None);
    }
}
