use clap::{Parser, Subcommand};
use colored::Colorize;

use adb_tools::{adb, menu, utils::config::Config, workflows};

#[derive(Parser)]
#[command(name = "adb-tools")]
#[command(version = "0.1.0")]
#[command(about = "Interactive console for Android device connections and scrcpy mirroring", long_about = None)]
struct Cli {
    /// Without a subcommand the interactive main menu runs.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List connected devices
    Devices,

    /// Enable a wireless connection to a device
    Connect,

    /// Disconnect devices or stop the ADB server
    Disconnect,

    /// Mirror a device with scrcpy
    Mirror,

    /// Stop the local ADB server
    KillServer,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    menu::install_interrupt_handler()?;

    let cli = Cli::parse();

    match cli.command {
        None => workflows::main_menu().await?,

        Some(Commands::Devices) => {
            println!("{} Listing Android devices...", "🔍".to_string().blue());
            adb::list_devices().await?;
        }

        Some(Commands::Connect) => workflows::connect_wirelessly().await?,

        Some(Commands::Disconnect) => workflows::disconnect_menu().await?,

        Some(Commands::Mirror) => {
            let config = Config::load();
            workflows::launch_mirror(&config).await?;
        }

        Some(Commands::KillServer) => {
            adb::kill_server().await?;
            println!("{} ADB server stopped.", "✓".green());
        }
    }

    Ok(())
}
