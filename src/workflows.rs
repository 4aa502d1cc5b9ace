//! Interactive console flows: the main menu and the wireless-connect,
//! disconnect, and mirror workflows behind it.
//!
//! Menus resolve to plain tag values; every adb/scrcpy effect happens
//! afterwards in the workflow body, so no choice closure touches
//! shared mutable state.

use crate::adb;
use crate::menu::{self, MenuOption, MenuOutcome, NumberInput, NumberOutcome, OptionMenu};
use crate::scrcpy::{self, MirrorOptions};
use crate::utils::config::Config;
use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};

enum MainAction {
    Connect,
    Disconnect,
    Mirror,
}

enum DisconnectChoice {
    AllWireless,
    Offline,
    Device(String),
    KillServer,
}

enum AudioChoice {
    Enabled,
    Disabled,
}

/// Clear the screen, greet, then loop the top-level menu (with a
/// refreshed device table) until the user exits.
pub async fn main_menu() -> Result<()> {
    let config = Config::load();

    clear_terminal();
    println!("{}", "Welcome to ADB tools!".bold());
    println!();

    loop {
        match adb::devices_raw().await {
            Ok(table) => println!("{}", table),
            Err(e) => println!("{} {}", "!".yellow(), e),
        }
        println!();

        let menu = OptionMenu::new(
            "ADB Menu",
            vec![
                MenuOption::new("Enable wireless connection to a device", || {
                    MainAction::Connect
                }),
                MenuOption::new("Disconnect device(s)", || MainAction::Disconnect),
                MenuOption::new("Launch scrcpy on a device", || MainAction::Mirror),
            ],
        )
        .on_exit(|| println!("Goodbye!"));

        let action = match menu.prompt() {
            MenuOutcome::Selected(action) => action,
            MenuOutcome::Exit => return Ok(()),
        };
        println!();

        match action {
            MainAction::Connect => connect_wirelessly().await?,
            MainAction::Disconnect => disconnect_menu().await?,
            MainAction::Mirror => launch_mirror(&config).await?,
        }
        println!();
    }
}

/// Wait until at least one device is ready, then let the user pick one
/// by serial. `None` when the user backs out.
pub async fn select_device(title: &str) -> Result<Option<String>> {
    let devices = loop {
        let online: Vec<String> = adb::devices()
            .await?
            .into_iter()
            .filter(|d| d.is_online())
            .map(|d| d.serial)
            .collect();
        if !online.is_empty() {
            break online;
        }
        println!("No connected ADB devices detected. Please connect a device and try again.");
        if !pause("Press Enter to scan for devices again.") {
            return Ok(None);
        }
    };

    // One owned serial per closure; every entry resolves to its own
    // device, not the last one scanned.
    let options = devices
        .into_iter()
        .map(|serial| {
            let label = serial.clone();
            MenuOption::new(label, move || serial)
        })
        .collect();

    let menu = OptionMenu::new(title, options)
        .on_exit(|| println!("No device selected. Exiting the menu."));
    match menu.prompt() {
        MenuOutcome::Selected(serial) => {
            println!();
            Ok(Some(serial))
        }
        MenuOutcome::Exit => Ok(None),
    }
}

/// Switch a USB-attached device to wireless ADB and connect to it.
pub async fn connect_wirelessly() -> Result<()> {
    let serial = match select_device("Select an ADB device").await? {
        Some(serial) => serial,
        None => return Ok(()),
    };

    let port = match NumberInput::new("Enter port number", || ())
        .default(5555.0)?
        .min(1024.0)?
        .max(65535.0)?
        .prompt()
    {
        NumberOutcome::Value(port) => port as u16,
        NumberOutcome::Exit(()) => return Ok(()),
    };

    let ip = match adb::device_ip(&serial).await {
        Some(ip) => ip,
        None => {
            println!("Could not retrieve IP. Check your device's Wi-Fi interface name.");
            return Ok(());
        }
    };

    adb::tcpip(&serial, port).await?;

    // Drop any stale connection for this endpoint before reconnecting
    let endpoint = format!("{}:{}", ip, port);
    adb::disconnect(Some(&endpoint)).await?;
    let result = adb::connect(&endpoint).await?;
    println!("{}", result.trim());

    Ok(())
}

/// Disconnect all wireless devices, prune offline connections, drop a
/// single device, or stop the ADB server.
pub async fn disconnect_menu() -> Result<()> {
    let mut options = vec![
        MenuOption::new("Wireless devices", || DisconnectChoice::AllWireless),
        MenuOption::new("Offline devices", || DisconnectChoice::Offline),
    ];

    for device in adb::devices().await? {
        if device.is_online() {
            let serial = device.serial;
            options.push(MenuOption::new(format!("Device: {}", serial), move || {
                DisconnectChoice::Device(serial)
            }));
        }
    }

    options.push(MenuOption::new("Kill ADB server", || {
        DisconnectChoice::KillServer
    }));

    let menu = OptionMenu::new("Disconnect Menu", options)
        .on_exit(|| println!("Exiting disconnect menu without action."));
    let choice = match menu.prompt() {
        MenuOutcome::Selected(choice) => choice,
        MenuOutcome::Exit => return Ok(()),
    };
    println!();

    match choice {
        DisconnectChoice::AllWireless => {
            adb::disconnect(None).await?;
            println!("Disconnected all wireless devices.");
        }
        DisconnectChoice::Offline => remove_offline_connections().await?,
        DisconnectChoice::Device(serial) => {
            adb::disconnect(Some(&serial)).await?;
            println!("Disconnected {}.", serial);
        }
        DisconnectChoice::KillServer => {
            adb::kill_server().await?;
            println!("ADB server stopped.");
        }
    }

    Ok(())
}

/// Disconnect every connection whose state is `offline`.
pub async fn remove_offline_connections() -> Result<()> {
    let offline: Vec<String> = adb::devices()
        .await?
        .into_iter()
        .filter(|d| d.is_offline())
        .map(|d| d.serial)
        .collect();

    if offline.is_empty() {
        println!("No offline connections found.");
        return Ok(());
    }

    for serial in offline {
        adb::disconnect(Some(&serial)).await?;
    }
    println!("All offline connections removed.");

    Ok(())
}

/// Pick a device and mirror it with scrcpy, prompting for frame rate,
/// audio capture, and a preset.
pub async fn launch_mirror(config: &Config) -> Result<()> {
    let serial = match select_device("Select a device to mirror with scrcpy").await? {
        Some(serial) => serial,
        None => return Ok(()),
    };

    let fps = match NumberInput::new("Enter max fps", || ())
        .default(60.0)?
        .min(1.0)?
        .prompt()
    {
        NumberOutcome::Value(fps) => fps as u32,
        NumberOutcome::Exit(()) => return Ok(()),
    };
    println!();

    let audio_menu = OptionMenu::new(
        "Audio capture",
        vec![
            MenuOption::new(
                "Enable audio capture (disables audio on the headset)",
                || AudioChoice::Enabled,
            ),
            MenuOption::new("Disable audio capture", || AudioChoice::Disabled),
        ],
    )
    .default_index(2)?;
    let audio = match audio_menu.prompt() {
        MenuOutcome::Selected(audio) => audio,
        MenuOutcome::Exit => return Ok(()),
    };
    println!();

    let presets = config.presets();
    let preset_options = presets
        .iter()
        .map(|preset| {
            let preset = preset.clone();
            MenuOption::new(preset.name.clone(), move || preset)
        })
        .collect();
    let preset_menu = OptionMenu::new("Select a preset", preset_options).default_index(1)?;
    let preset = match preset_menu.prompt() {
        MenuOutcome::Selected(preset) => preset,
        MenuOutcome::Exit => return Ok(()),
    };
    println!();

    let mut options = MirrorOptions::new(config.video_bit_rate.as_str())
        .max_fps(fps)
        .preset(&preset);
    if matches!(audio, AudioChoice::Disabled) {
        options = options.audio(false);
    }

    println!(
        "{} Mirroring {}...",
        "▶".green().bold(),
        serial.as_str().cyan()
    );
    let status = scrcpy::launch(&serial, &options).await?;
    if !status.success() {
        println!("{} scrcpy exited with {}", "!".yellow(), status);
    }

    Ok(())
}

fn clear_terminal() {
    print!("\x1b[2J\x1b[H");
    io::stdout().flush().ok();
}

/// Show `message` and wait for Enter. False when stdin is closed or
/// the wait is interrupted, so callers can back out instead of
/// spinning.
fn pause(message: &str) -> bool {
    print!("{}", message);
    io::stdout().flush().ok();
    menu::read_console_line().is_some()
}
