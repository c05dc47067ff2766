//! Session state machine

use std::net::SocketAddr;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tokio::sync::broadcast;

use super::config::ParticipantConfig;
use super::events::{EndReason, ParticipantEvent};
use super::handler::MidiHandler;
use super::session::{Session, SessionState};
use crate::clock::{Clock, SyncClock};
use crate::error::{AppleMidiError, Port, Result};
use crate::net::{DatagramTransport, bind_udp};
use crate::protocol::applemidi::{
    Command, EndSession, Invitation, ReceiverFeedback, SyncPacket, peek_command,
};
use crate::protocol::rtp::MidiPacket;

/// Largest datagram read from either socket
pub const RECV_BUFFER_SIZE: usize = 1600;

/// Outcome of one [`Participant::poll`] step
#[derive(Debug)]
pub enum PollStatus {
    /// Nothing was received
    Idle,
    /// At least one datagram was processed
    Busy,
    /// A socket failed; the participant must not be polled again
    Terminated(AppleMidiError),
}

impl PollStatus {
    /// Check if the participant stopped
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated(_))
    }
}

type Datagram<'a> = Option<(&'a [u8], SocketAddr)>;

/// `AppleMIDI` session participant
///
/// Answers one initiator at a time: accepts its control and MIDI
/// invitations, answers clock synchronization, forwards MIDI data to the
/// registered [`MidiHandler`] and reports the last received sequence number.
pub struct Participant {
    config: ParticipantConfig,
    control: Box<dyn DatagramTransport>,
    midi: Box<dyn DatagramTransport>,
    clock: Box<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
    handler: Box<dyn MidiHandler>,
    session: Session,
    event_tx: broadcast::Sender<ParticipantEvent>,
    sync_timeout: u64,
    feedback_period: u64,
}

impl Participant {
    /// Bind the control and MIDI sockets and create a participant
    ///
    /// # Errors
    ///
    /// Returns `AppleMidiError::InvalidPort` if there is no port after the
    /// control port, or `AppleMidiError::Bind` if either socket cannot be
    /// bound.
    pub async fn bind(
        config: ParticipantConfig,
        handler: impl MidiHandler + 'static,
    ) -> Result<Self> {
        let control_port = config.control_port;
        let midi_port = config
            .midi_port()
            .ok_or(AppleMidiError::InvalidPort(control_port))?;

        let control = bind_udp(config.bind_address, control_port)
            .await
            .map_err(|source| AppleMidiError::Bind {
                port: control_port,
                source,
            })?;
        let midi = bind_udp(config.bind_address, midi_port)
            .await
            .map_err(|source| AppleMidiError::Bind {
                port: midi_port,
                source,
            })?;

        let participant = Self::with_transports(
            config,
            control,
            midi,
            SyncClock::new(),
            StdRng::from_entropy(),
            handler,
        );

        if let Ok((control_port, midi_port)) = participant.local_ports() {
            tracing::info!(
                "AppleMIDI participant '{}' listening on ports {} and {}",
                participant.config.name,
                control_port,
                midi_port
            );
        }

        Ok(participant)
    }

    /// Create a participant over already bound transports
    pub fn with_transports<C, M, K, R, H>(
        config: ParticipantConfig,
        control: C,
        midi: M,
        clock: K,
        rng: R,
        handler: H,
    ) -> Self
    where
        C: DatagramTransport + 'static,
        M: DatagramTransport + 'static,
        K: Clock + 'static,
        R: RngCore + Send + 'static,
        H: MidiHandler + 'static,
    {
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let sync_timeout = config.sync_timeout_ticks();
        let feedback_period = config.feedback_period_ticks();

        Self {
            config,
            control: Box::new(control),
            midi: Box::new(midi),
            clock: Box::new(clock),
            rng: Box::new(rng),
            handler: Box::new(handler),
            session: Session::new(),
            event_tx,
            sync_timeout,
            feedback_period,
        }
    }

    /// Replace the MIDI receive handler
    pub fn set_handler(&mut self, handler: impl MidiHandler + 'static) {
        self.handler = Box::new(handler);
    }

    /// Subscribe to events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ParticipantEvent> {
        self.event_tx.subscribe()
    }

    /// Current session
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current session state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session.state
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &ParticipantConfig {
        &self.config
    }

    /// Local control and MIDI ports
    ///
    /// # Errors
    ///
    /// Returns an error if a transport has no local address.
    pub fn local_ports(&self) -> Result<(u16, u16)> {
        Ok((
            self.control.local_addr()?.port(),
            self.midi.local_addr()?.port(),
        ))
    }

    /// Drive the participant until a socket fails
    ///
    /// # Errors
    ///
    /// Returns the receive error that stopped the participant.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            if let PollStatus::Terminated(e) = self.poll() {
                return Err(e);
            }

            if self.config.poll_interval.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }
    }

    /// Run one non-blocking step
    ///
    /// Reads at most one datagram from each socket, feeds them to the current
    /// state and checks the session timers.
    pub fn poll(&mut self) -> PollStatus {
        let mut control_buf = [0u8; RECV_BUFFER_SIZE];
        let mut midi_buf = [0u8; RECV_BUFFER_SIZE];

        let control = match receive(&*self.control, &mut control_buf, Port::Control) {
            Ok(received) => received,
            Err(e) => return terminate(e),
        };
        let midi = match receive(&*self.midi, &mut midi_buf, Port::Midi) {
            Ok(received) => received,
            Err(e) => return terminate(e),
        };

        let status = if control.is_some() || midi.is_some() {
            PollStatus::Busy
        } else {
            PollStatus::Idle
        };

        let control = control.map(|(len, from)| (&control_buf[..len], from));
        let midi = midi.map(|(len, from)| (&midi_buf[..len], from));

        match self.session.state {
            SessionState::AwaitingControlInvitation => self.on_control_invitation(control),
            SessionState::AwaitingMidiInvitation => self.on_midi_invitation(midi),
            SessionState::Connected => self.on_connected(control, midi),
        }

        status
    }

    fn on_control_invitation(&mut self, control: Datagram<'_>) {
        let Some((data, from)) = control else {
            return;
        };

        let invitation = match Invitation::decode(data) {
            Ok(invitation) => invitation,
            Err(e) => {
                tracing::warn!("Unexpected packet on control port from {}: {}", from, e);
                return;
            }
        };

        tracing::debug!(
            "<-- Control invitation from {} ({}), token {:08x}, SSRC {:08x}",
            invitation.name,
            from,
            invitation.initiator_token,
            invitation.ssrc
        );

        let local_ssrc = self.generate_ssrc(invitation.ssrc);
        let accept = Invitation::accept(invitation.initiator_token, local_ssrc, &self.config.name);

        if let Err(e) = send(&*self.control, &accept.encode(), from) {
            tracing::error!("Couldn't accept control invitation: {}", e);
            return;
        }
        tracing::debug!("--> Accept control invitation");

        self.session = Session {
            initiator_token: invitation.initiator_token,
            initiator_ssrc: invitation.ssrc,
            local_ssrc,
            remote_address: Some(from.ip()),
            remote_control_port: from.port(),
            peer_name: invitation.name,
            last_sync_time: self.clock.now(),
            ..Session::new()
        };
        self.session.advance(SessionState::AwaitingMidiInvitation);
    }

    fn on_midi_invitation(&mut self, midi: Datagram<'_>) {
        let Some((data, from)) = midi else {
            let now = self.clock.now();
            if now.saturating_sub(self.session.last_sync_time) >= self.sync_timeout {
                tracing::error!("MIDI port invitation timed out");
                self.end_session(EndReason::TimedOut);
            }
            return;
        };

        let invitation = match Invitation::decode(data) {
            Ok(invitation) => invitation,
            Err(e) => {
                tracing::warn!("Unexpected packet on MIDI port from {}: {}", from, e);
                return;
            }
        };
        tracing::debug!("<-- MIDI invitation from {} ({})", invitation.name, from);

        let accept = Invitation::accept(
            self.session.initiator_token,
            self.session.local_ssrc,
            &self.config.name,
        );

        if let Err(e) = send(&*self.midi, &accept.encode(), from) {
            tracing::error!("Couldn't accept MIDI invitation: {}", e);
            self.end_session(EndReason::InvitationFailed);
            return;
        }
        tracing::debug!("--> Accept MIDI invitation");

        self.session.remote_midi_port = from.port();
        self.session.last_sync_time = self.clock.now();
        self.session.advance(SessionState::Connected);

        tracing::info!(
            "Connection to {} ({}) established",
            self.session.peer_name,
            from.ip()
        );
        self.emit(ParticipantEvent::SessionEstablished {
            name: self.session.peer_name.clone(),
            address: from.ip(),
        });
    }

    fn on_connected(&mut self, control: Datagram<'_>, midi: Datagram<'_>) {
        if let Some((data, from)) = control {
            match EndSession::decode(data) {
                Ok(end) if end.ssrc == self.session.initiator_ssrc => {
                    tracing::info!("Initiator ended session");
                    self.end_session(EndReason::PeerEnded);
                    return;
                }
                Ok(end) => {
                    tracing::warn!("Ignoring end of session from unknown SSRC {:08x}", end.ssrc);
                }
                Err(e) => tracing::debug!("Ignoring control packet from {}: {}", from, e),
            }
        }

        if let Some((data, from)) = midi {
            self.on_midi_data(data, from);
        }

        let now = self.clock.now();
        self.check_feedback(now);

        if now.saturating_sub(self.session.last_sync_time) >= self.sync_timeout {
            tracing::error!("Initiator timed out");
            self.end_session(EndReason::TimedOut);
        }
    }

    fn on_midi_data(&mut self, data: &[u8], from: SocketAddr) {
        match peek_command(data) {
            Some(Command::Sync) => match SyncPacket::decode(data) {
                Ok(sync) => self.on_sync(&sync),
                Err(e) => tracing::warn!("Unexpected packet on MIDI port from {}: {}", from, e),
            },
            Some(command) => tracing::debug!("Ignoring {} on MIDI port", command),
            None => match MidiPacket::decode(data) {
                Ok(packet) => {
                    self.session.last_midi_sequence = packet.header.sequence;
                    let payload = packet.payload();
                    tracing::trace!(
                        "<-- MIDI sequence {}, {} bytes",
                        packet.header.sequence,
                        payload.len()
                    );
                    if !payload.is_empty() {
                        self.handler.on_midi(payload);
                    }
                }
                Err(e) => tracing::warn!("Unexpected packet on MIDI port from {}: {}", from, e),
            },
        }
    }

    fn on_sync(&mut self, sync: &SyncPacket) {
        tracing::debug!("<-- Sync {}", sync.count);

        if sync.ssrc != self.session.initiator_ssrc {
            tracing::warn!("Unexpected sync packet from SSRC {:08x}", sync.ssrc);
            return;
        }

        match sync.count {
            0 => {
                let reply = SyncPacket::reply(
                    self.session.local_ssrc,
                    sync.timestamps[0],
                    self.clock.now(),
                );
                match self.send_to_peer(Port::Midi, &reply.encode()) {
                    Ok(()) => tracing::debug!("--> Sync 1"),
                    Err(e) => tracing::error!("Couldn't answer sync: {}", e),
                }
            }
            2 => {
                let offset = sync.offset_estimate();
                self.session.clock_offset_estimate = offset;
                tracing::info!("Offset estimate: {}", offset);
                self.emit(ParticipantEvent::ClockSynchronized { offset });
            }
            count => {
                tracing::warn!("Unexpected sync packet with count {}", count);
                return;
            }
        }

        self.session.last_sync_time = self.clock.now();
    }

    fn check_feedback(&mut self, now: u64) {
        if now.saturating_sub(self.session.last_feedback_time) < self.feedback_period {
            return;
        }

        let sequence = self.session.last_midi_sequence;
        if sequence != self.session.last_feedback_sequence {
            let feedback = ReceiverFeedback {
                ssrc: self.session.local_ssrc,
                sequence,
            };
            match self.send_to_peer(Port::Control, &feedback.encode()) {
                Ok(()) => tracing::trace!("--> Feedback {}", sequence),
                Err(e) => tracing::error!("Couldn't send receiver feedback: {}", e),
            }
            self.session.last_feedback_sequence = sequence;
        }
        self.session.last_feedback_time = now;
    }

    fn send_to_peer(&self, port: Port, data: &[u8]) -> Result<()> {
        let (transport, remote_port) = match port {
            Port::Control => (&self.control, self.session.remote_control_port),
            Port::Midi => (&self.midi, self.session.remote_midi_port),
        };
        let address = self
            .session
            .remote_address
            .filter(|_| remote_port != 0)
            .ok_or(AppleMidiError::NoPeer(port))?;

        send(&**transport, data, SocketAddr::new(address, remote_port))
    }

    fn generate_ssrc(&mut self, initiator_ssrc: u32) -> u32 {
        loop {
            let ssrc = self.rng.next_u32();
            if ssrc != 0 && ssrc != initiator_ssrc {
                return ssrc;
            }
        }
    }

    fn end_session(&mut self, reason: EndReason) {
        self.session.reset();
        self.emit(ParticipantEvent::SessionEnded { reason });
    }

    fn emit(&self, event: ParticipantEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

impl std::fmt::Debug for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participant")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

fn receive(
    transport: &dyn DatagramTransport,
    buf: &mut [u8],
    port: Port,
) -> Result<Option<(usize, SocketAddr)>> {
    let received = transport
        .recv_nonblocking(buf)
        .map_err(|source| AppleMidiError::Receive { port, source })?;

    // An empty datagram carries nothing to act on
    Ok(received.filter(|&(len, _)| len > 0))
}

fn send(transport: &dyn DatagramTransport, data: &[u8], target: SocketAddr) -> Result<()> {
    let sent = transport
        .send_nonblocking(data, target)
        .map_err(|source| AppleMidiError::Send { target, source })?;

    if sent != data.len() {
        return Err(AppleMidiError::ShortWrite {
            sent,
            expected: data.len(),
        });
    }

    tracing::trace!("Sent {} bytes to {}", sent, target);
    Ok(())
}

fn terminate(e: AppleMidiError) -> PollStatus {
    match std::error::Error::source(&e) {
        Some(source) => tracing::error!("{}: {}", e, source),
        None => tracing::error!("{}", e),
    }
    PollStatus::Terminated(e)
}
