use anyhow::Result;
use env_logger::Env;
use log::info;

use midiplayer::{MidiInputHandler, Player, PlayerSettings};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting application");

    let settings = PlayerSettings::load_or_create()?;
    info!(
        "{} waveform, amplitude {}, master volume {}",
        settings.waveform, settings.amplitude, settings.master_volume
    );

    for port in MidiInputHandler::list_ports()? {
        info!("MIDI input available: {}", port);
    }

    let player = Player::start(&settings)?;
    player.run()
}
