
use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use rand::RngCore;
use tokio::sync::broadcast;

use super::*;
use crate::protocol::applemidi::{Command, Invitation};
use crate::testing::{ManualClock, MockTransport, seeded_rng};

const INITIATOR_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));
const INITIATOR_CONTROL: SocketAddr = SocketAddr::new(INITIATOR_IP, 5004);
const INITIATOR_MIDI: SocketAddr = SocketAddr::new(INITIATOR_IP, 5005);
const INITIATOR_TOKEN: u32 = 0x0102_0304;
const INITIATOR_SSRC: u32 = 0xAABB_CCDD;

fn local(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}

fn invitation_bytes() -> Vec<u8> {
    Invitation {
        command: Command::Invitation,
        initiator_token: INITIATOR_TOKEN,
        ssrc: INITIATOR_SSRC,
        name: "initiator".to_string(),
    }
    .encode()
    .to_vec()
}

/// RNG replaying a fixed list of values
struct ReplayRng(VecDeque<u32>);

impl RngCore for ReplayRng {
    fn next_u32(&mut self) -> u32 {
        self.0.pop_front().unwrap_or(1)
    }

    fn next_u64(&mut self) -> u64 {
        u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

struct Harness {
    participant: Participant,
    control: MockTransport,
    midi: MockTransport,
    clock: ManualClock,
    received: Arc<Mutex<Vec<Vec<u8>>>>,
    events: broadcast::Receiver<ParticipantEvent>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(ParticipantConfig::default())
    }

    fn with_config(config: ParticipantConfig) -> Self {
        Self::build(config, seeded_rng(7))
    }

    fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self::build(ParticipantConfig::default(), rng)
    }

    fn build(config: ParticipantConfig, rng: impl RngCore + Send + 'static) -> Self {
        let control = MockTransport::new(local(5000));
        let midi = MockTransport::new(local(5001));
        let clock = ManualClock::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let sink = received.clone();
        let participant = Participant::with_transports(
            config,
            control.clone(),
            midi.clone(),
            clock.clone(),
            rng,
            move |data: &[u8]| sink.lock().unwrap().push(data.to_vec()),
        );
        let events = participant.subscribe();

        Self {
            participant,
            control,
            midi,
            clock,
            received,
            events,
        }
    }

    fn poll(&mut self) -> PollStatus {
        self.participant.poll()
    }

    /// Accept the control invitation only
    fn invite_control(&mut self) {
        self.control.push(invitation_bytes(), INITIATOR_CONTROL);
        assert!(matches!(self.poll(), PollStatus::Busy));
        assert_eq!(self.participant.state(), SessionState::AwaitingMidiInvitation);
        let _ = self.control.take_sent();
    }

    /// Walk the session to `Connected` and forget what was sent on the way
    fn connect(&mut self) {
        self.invite_control();
        self.midi.push(invitation_bytes(), INITIATOR_MIDI);
        assert!(matches!(self.poll(), PollStatus::Busy));
        assert_eq!(self.participant.state(), SessionState::Connected);
        let _ = self.midi.take_sent();
        self.drain_events();
    }

    fn received(&self) -> Vec<Vec<u8>> {
        self.received.lock().unwrap().clone()
    }

    fn drain_events(&mut self) -> Vec<ParticipantEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
