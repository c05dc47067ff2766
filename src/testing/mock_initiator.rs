//! Mock `AppleMIDI` initiator for testing the participant
//!
//! Plays the session initiator's side over real UDP sockets: invites the
//! participant on both ports, drives clock synchronization, sends MIDI and
//! ends the session.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;

use crate::protocol::DecodeError;
use crate::protocol::applemidi::{Command, EndSession, Invitation, ReceiverFeedback, SyncPacket};
use crate::protocol::rtp::MidiPacket;

/// Mock initiator configuration
#[derive(Debug, Clone)]
pub struct MockInitiatorConfig {
    /// Participant control address
    pub participant_control: SocketAddr,
    /// Participant MIDI address
    pub participant_midi: SocketAddr,
    /// Session name sent in invitations
    pub name: String,
    /// Initiator token
    pub token: u32,
    /// Initiator SSRC
    pub ssrc: u32,
    /// How long to wait for each answer
    pub reply_timeout: Duration,
}

impl MockInitiatorConfig {
    /// Configuration for a participant listening on `control` and `midi`
    #[must_use]
    pub fn new(control: SocketAddr, midi: SocketAddr) -> Self {
        Self {
            participant_control: control,
            participant_midi: midi,
            name: "mock-initiator".to_string(),
            token: 0x1234_5678,
            ssrc: 0xCAFE_F00D,
            reply_timeout: Duration::from_secs(2),
        }
    }
}

/// Mock `AppleMIDI` initiator
#[derive(Debug)]
pub struct MockInitiator {
    config: MockInitiatorConfig,
    control: UdpSocket,
    midi: UdpSocket,
    sequence: u16,
}

impl MockInitiator {
    /// Bind the initiator's control and MIDI sockets on loopback
    ///
    /// # Errors
    /// Returns `MockInitiatorError` if a socket cannot be bound.
    pub async fn bind(config: MockInitiatorConfig) -> Result<Self, MockInitiatorError> {
        let any = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        Ok(Self {
            config,
            control: UdpSocket::bind(any).await?,
            midi: UdpSocket::bind(any).await?,
            sequence: 0,
        })
    }

    /// Local control and MIDI addresses
    ///
    /// # Errors
    /// Returns `MockInitiatorError` if a socket has no local address.
    pub fn local_addrs(&self) -> Result<(SocketAddr, SocketAddr), MockInitiatorError> {
        Ok((self.control.local_addr()?, self.midi.local_addr()?))
    }

    /// Send an invitation on the control port and wait for the answer
    ///
    /// # Errors
    /// Returns `MockInitiatorError` on timeout or if the answer is not `OK`.
    pub async fn invite_control(&self) -> Result<Invitation, MockInitiatorError> {
        self.invite(&self.control, self.config.participant_control)
            .await
    }

    /// Send an invitation on the MIDI port and wait for the answer
    ///
    /// # Errors
    /// Returns `MockInitiatorError` on timeout or if the answer is not `OK`.
    pub async fn invite_midi(&self) -> Result<Invitation, MockInitiatorError> {
        self.invite(&self.midi, self.config.participant_midi).await
    }

    async fn invite(
        &self,
        socket: &UdpSocket,
        target: SocketAddr,
    ) -> Result<Invitation, MockInitiatorError> {
        let invitation = Invitation {
            command: Command::Invitation,
            initiator_token: self.config.token,
            ssrc: self.config.ssrc,
            name: self.config.name.clone(),
        };
        socket.send_to(&invitation.encode(), target).await?;

        let reply = self.receive(socket).await?;
        Ok(Invitation::decode_with_command(
            &reply,
            Command::InvitationAccepted,
        )?)
    }

    /// Run a full three-step clock synchronization
    ///
    /// Sends count 0 with `t0`, waits for the answer and closes the exchange
    /// with count 2 carrying `t2`. Returns the participant's answer.
    ///
    /// # Errors
    /// Returns `MockInitiatorError` on timeout or if the answer is not a
    /// count 1 `CK`.
    pub async fn synchronize(&self, t0: u64, t2: u64) -> Result<SyncPacket, MockInitiatorError> {
        self.send_sync(0, [t0, 0, 0]).await?;

        let reply = SyncPacket::decode(&self.receive(&self.midi).await?)?;
        if reply.count != 1 {
            return Err(MockInitiatorError::UnexpectedReply(Command::Sync));
        }

        self.send_sync(2, [t0, reply.timestamps[1], t2]).await?;
        Ok(reply)
    }

    /// Send a `CK` packet on the MIDI port
    ///
    /// # Errors
    /// Returns `MockInitiatorError` if the send fails.
    pub async fn send_sync(
        &self,
        count: u8,
        timestamps: [u64; 3],
    ) -> Result<(), MockInitiatorError> {
        let packet = SyncPacket {
            ssrc: self.config.ssrc,
            count,
            timestamps,
        };
        self.midi
            .send_to(&packet.encode(), self.config.participant_midi)
            .await?;
        Ok(())
    }

    /// Send a MIDI command list, returning its sequence number
    ///
    /// # Errors
    /// Returns `MockInitiatorError` if the send fails.
    pub async fn send_midi(&mut self, commands: &[u8]) -> Result<u16, MockInitiatorError> {
        self.sequence = self.sequence.wrapping_add(1);
        let packet = MidiPacket::new(
            self.sequence,
            u32::from(self.sequence) * 10,
            self.config.ssrc,
            commands.to_vec(),
        );
        self.midi
            .send_to(&packet.encode(), self.config.participant_midi)
            .await?;
        Ok(self.sequence)
    }

    /// Wait for a receiver feedback packet on the control port
    ///
    /// # Errors
    /// Returns `MockInitiatorError` on timeout or if the packet is not `RS`.
    pub async fn receive_feedback(&self) -> Result<ReceiverFeedback, MockInitiatorError> {
        let data = self.receive(&self.control).await?;
        Ok(ReceiverFeedback::decode(&data)?)
    }

    /// Send `BY` on the control port
    ///
    /// # Errors
    /// Returns `MockInitiatorError` if the send fails.
    pub async fn end_session(&self) -> Result<(), MockInitiatorError> {
        let packet = EndSession {
            initiator_token: self.config.token,
            ssrc: self.config.ssrc,
        };
        self.control
            .send_to(&packet.encode(), self.config.participant_control)
            .await?;
        Ok(())
    }

    /// Send raw bytes on the control port
    ///
    /// # Errors
    /// Returns `MockInitiatorError` if the send fails.
    pub async fn send_control_raw(&self, data: &[u8]) -> Result<(), MockInitiatorError> {
        self.control
            .send_to(data, self.config.participant_control)
            .await?;
        Ok(())
    }

    async fn receive(&self, socket: &UdpSocket) -> Result<Vec<u8>, MockInitiatorError> {
        let mut buf = vec![0u8; 1600];
        let (len, _) = tokio::time::timeout(self.config.reply_timeout, socket.recv_from(&mut buf))
            .await
            .map_err(|_| MockInitiatorError::Timeout)??;
        buf.truncate(len);
        Ok(buf)
    }
}

/// Errors from mock initiator
#[derive(Debug, thiserror::Error)]
pub enum MockInitiatorError {
    /// No answer in time
    #[error("timed out waiting for the participant")]
    Timeout,

    /// Answer was a different packet
    #[error("unexpected reply to {0}")]
    UnexpectedReply(Command),

    /// Answer did not decode
    #[error("invalid reply: {0}")]
    Decode(#[from] DecodeError),

    /// Socket error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
