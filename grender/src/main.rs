//! Point d'entrée du renderer.
//!
//! Parse la ligne de commande, initialise le logging puis lance le cycle
//! de vie complet. Code de sortie : 0 pour un arrêt propre, 1 pour tout
//! échec d'initialisation avant la boucle d'événements.

use clap::Parser;
use grmediarenderer::RendererOptions;
use grplayer::PlayerOptions;
use grserver::logs::{LoggingOptions, init_logging};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "grender")]
#[command(version, about = "UPnP/DLNA audio MediaRenderer", long_about = None)]
struct Cli {
    /// Renderer friendly name
    #[arg(long, value_name = "NAME", default_value = "DLNA MediaRenderer")]
    name: String,

    /// The local interface name the service is running and advertised
    #[arg(long = "interface-name", value_name = "IF")]
    interface_name: Option<String>,

    /// Port number for the device webserver (0 = ephemeral)
    #[arg(long, value_name = "N", default_value_t = 49494)]
    port: u16,

    /// Custom device UUID
    #[arg(long, value_name = "UUID")]
    uuid: Option<String>,

    /// ALSA sound card (e.g., hw:0)
    #[arg(long, value_name = "CARD", default_value = "hw:0")]
    card: String,

    /// ALSA mixer element name (e.g., DAC volume)
    #[arg(long = "selem-name", value_name = "NAME", default_value = "DAC volume")]
    selem_name: String,

    /// Sink buffer time in microseconds
    #[arg(long = "buffer-time", value_name = "MICROS", default_value_t = 200_000)]
    buffer_time: i64,

    /// Sink latency time in microseconds
    #[arg(long = "latency-time", value_name = "MICROS", default_value_t = 10_000)]
    latency_time: i64,

    /// Initial volume level 0..100 (0 = seed from hardware mixer)
    #[arg(long, value_name = "N", default_value_t = 0)]
    volume: u32,
}

impl Cli {
    fn into_options(self) -> RendererOptions {
        RendererOptions {
            friendly_name: self.name,
            interface_name: self.interface_name,
            port: self.port,
            uuid: self.uuid,
            icons_dir: PathBuf::from("./icons"),
            service_dir: PathBuf::from("./service"),
            player: PlayerOptions {
                card: self.card,
                selem_name: self.selem_name,
                buffer_time_us: self.buffer_time,
                latency_time_us: self.latency_time,
                initial_volume: self.volume,
            },
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging(&LoggingOptions::default());

    let cli = Cli::parse();

    match grmediarenderer::run(cli.into_options()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
