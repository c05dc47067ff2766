//! `AppleMIDI` participant printing the MIDI data it receives
//!
//! Usage: `cargo run --example participant -- [name] [control port]`

use applemidi::{Participant, ParticipantConfig, ParticipantEvent};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "Rust AppleMIDI".to_string());
    let port = match args.next() {
        Some(port) => port.parse()?,
        None => 5004,
    };

    let config = ParticipantConfig::with_name(name).control_port(port);
    let mut participant = Participant::bind(config, |data: &[u8]| {
        println!("MIDI {:02x?}", data);
    })
    .await?;

    // Handle events
    let mut events = participant.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ParticipantEvent::SessionEstablished { name, address } => {
                    println!("Session with {} ({}) established", name, address);
                }
                ParticipantEvent::SessionEnded { reason } => {
                    println!("Session ended: {}", reason);
                }
                ParticipantEvent::ClockSynchronized { offset } => {
                    println!("Clock offset: {:.1} ms", offset as f64 / 10.0);
                }
            }
        }
    });

    let (control, midi) = participant.local_ports()?;
    println!("Listening on ports {} and {}. Press Ctrl+C to stop.", control, midi);

    tokio::select! {
        result = participant.run() => result?,
        _ = tokio::signal::ctrl_c() => println!("Stopped."),
    }

    Ok(())
}
