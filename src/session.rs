//! A single peer connection and the conversations it carries.
//!
//! [`Session`] owns its stream for the lifetime of the connection; dropping
//! the session closes the socket. It is generic over any `Read + Write`
//! stream so the handshake and header sync logic can run against scripted
//! byte streams in tests; [`Session::connect`] produces the real TCP
//! flavor with explicit read/write deadlines.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::{ConnectionError, Result, ValidationError};
use crate::header::BlockHeader;
use crate::network::Network;
use crate::wire::{Command, GetHeadersMessage, Message, NetworkEnvelope};

/// Maximum headers a peer sends per `headers` message; a shorter batch
/// means the peer has no more to give.
const HEADERS_BATCH: usize = 2000;

/// Where the connection stands in the version/verack exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Connected,
    VersionSent,
    Established,
}

pub struct Session<S> {
    stream: S,
    network: Network,
    state: HandshakeState,
}

impl Session<TcpStream> {
    /// Opens a TCP connection to `host` with `timeout` applied to the
    /// connect itself and to every subsequent read and write.
    ///
    /// A deadline that expires surfaces as [`ConnectionError::Timeout`];
    /// nothing here retries or reconnects.
    pub fn connect(host: &str, network: Network, timeout: Duration) -> Result<Self> {
        let addr = (host, network.default_port())
            .to_socket_addrs()
            .map_err(ConnectionError::from_io)?
            .next()
            .ok_or_else(|| {
                ConnectionError::Io(std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    format!("no address for {host}"),
                ))
            })?;

        let stream =
            TcpStream::connect_timeout(&addr, timeout).map_err(ConnectionError::from_io)?;
        stream
            .set_read_timeout(Some(timeout))
            .map_err(ConnectionError::from_io)?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(ConnectionError::from_io)?;

        info!("connected to {addr} ({network:?})");
        Ok(Session::over(stream, network))
    }
}

impl<S: Read + Write> Session<S> {
    /// Wraps an already-open stream. The session takes ownership; there is
    /// no way to get the stream back.
    pub fn over(stream: S, network: Network) -> Self {
        Session {
            stream,
            network,
            state: HandshakeState::Connected,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Sends one message, framed for this session's network.
    pub fn send(&mut self, message: &Message) -> Result<()> {
        debug!("send {}", message.command().name());
        message.envelope(self.network).write_to(&mut self.stream)
    }

    /// Reads and decodes the next message, whatever it is.
    pub fn read(&mut self) -> Result<Message> {
        let envelope = NetworkEnvelope::parse(&mut self.stream, self.network)?;
        debug!(
            "recv {} ({} bytes)",
            envelope.command.name(),
            envelope.payload.len()
        );
        Message::decode(&envelope)
    }

    /// Reads until a message with one of the wanted commands arrives.
    ///
    /// Housekeeping happens along the way: an incoming `version` is
    /// acknowledged with `verack`, a `ping` is answered with a `pong`
    /// echoing its nonce. Anything else is logged and skipped.
    pub fn wait_for(&mut self, wanted: &[Command]) -> Result<Message> {
        loop {
            let message = self.read()?;
            if wanted.contains(&message.command()) {
                return Ok(message);
            }
            match message {
                Message::Version(_) => self.send(&Message::Verack)?,
                Message::Ping(nonce) => self.send(&Message::Pong(nonce))?,
                other => warn!("ignoring {}", other.command().name()),
            }
        }
    }

    /// Runs the version/verack exchange.
    ///
    /// Sends our `version`, then waits for the peer's `verack`; the peer's
    /// own `version` is acknowledged inside [`Session::wait_for`].
    pub fn handshake(&mut self) -> Result<()> {
        let version = Message::Version(crate::wire::VersionMessage::new(self.network));
        self.send(&version)?;
        self.state = HandshakeState::VersionSent;

        self.wait_for(&[Command::Verack])?;
        self.state = HandshakeState::Established;
        info!("handshake complete");
        Ok(())
    }

    /// Downloads headers forward from `start` (a block hash in display
    /// order) until the peer sends a short batch.
    ///
    /// Every received header must satisfy its own proof of work; the first
    /// one that does not aborts the sync with
    /// [`ValidationError::HeaderPow`].
    pub fn sync_headers(&mut self, start: [u8; 32]) -> Result<Vec<BlockHeader>> {
        let mut chain = Vec::new();
        let mut cursor = start;

        loop {
            let request = Message::GetHeaders(GetHeadersMessage::new(cursor));
            self.send(&request)?;

            let Message::Headers(batch) = self.wait_for(&[Command::Headers])? else {
                // wait_for only returns the wanted command.
                unreachable!()
            };
            let batch_len = batch.len();
            debug!("received {batch_len} headers");

            for header in batch {
                if !header.check_pow() {
                    return Err(ValidationError::HeaderPow(header.id()).into());
                }
                cursor = header.hash();
                chain.push(header);
            }

            if batch_len < HEADERS_BATCH {
                return Ok(chain);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::error::Error;
    use crate::network::GENESIS_BLOCK;
    use crate::wire::VersionMessage;

    /// Routes log output through the test harness; `RUST_LOG=debug` shows
    /// the per-message trace.
    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// In-memory stand-in for a peer: reads come from a pre-recorded
    /// script, writes are captured for inspection.
    struct ScriptedStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl ScriptedStream {
        fn speaking(messages: &[Message], network: Network) -> Self {
            let mut input = Vec::new();
            for message in messages {
                input.extend(message.envelope(network).serialize());
            }
            ScriptedStream {
                input: Cursor::new(input),
                output: Vec::new(),
            }
        }

        /// Commands of every frame the session wrote, in order.
        fn sent_commands(&self, network: Network) -> Vec<Command> {
            let mut reader = Cursor::new(&self.output);
            let mut commands = Vec::new();
            while (reader.position() as usize) < self.output.len() {
                let envelope = NetworkEnvelope::parse(&mut reader, network).unwrap();
                commands.push(envelope.command);
            }
            commands
        }
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for ScriptedStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn genesis() -> BlockHeader {
        BlockHeader::parse(&mut Cursor::new(GENESIS_BLOCK)).unwrap()
    }

    #[test]
    fn handshake_sends_version_and_acknowledges_peer() {
        init_logs();
        let peer = ScriptedStream::speaking(
            &[
                Message::Version(VersionMessage::new(Network::Mainnet)),
                Message::Verack,
            ],
            Network::Mainnet,
        );
        let mut session = Session::over(peer, Network::Mainnet);
        assert_eq!(session.state(), HandshakeState::Connected);

        session.handshake().unwrap();
        assert_eq!(session.state(), HandshakeState::Established);
        assert_eq!(
            session.stream.sent_commands(Network::Mainnet),
            vec![Command::Version, Command::Verack]
        );
    }

    #[test]
    fn handshake_fails_if_peer_hangs_up() {
        let peer = ScriptedStream::speaking(&[], Network::Mainnet);
        let mut session = Session::over(peer, Network::Mainnet);
        assert!(session.handshake().is_err());
        assert_eq!(session.state(), HandshakeState::VersionSent);
    }

    #[test]
    fn wait_for_answers_pings_along_the_way() {
        let nonce = [1, 2, 3, 4, 5, 6, 7, 8];
        let peer = ScriptedStream::speaking(
            &[Message::Ping(nonce), Message::Verack],
            Network::Testnet,
        );
        let mut session = Session::over(peer, Network::Testnet);

        let got = session.wait_for(&[Command::Verack]).unwrap();
        assert_eq!(got, Message::Verack);

        let sent = session.stream.output.clone();
        let mut reader = Cursor::new(&sent);
        let pong = NetworkEnvelope::parse(&mut reader, Network::Testnet).unwrap();
        assert_eq!(pong.command, Command::Pong);
        assert_eq!(pong.payload, nonce);
    }

    #[test]
    fn wait_for_skips_unrelated_messages() {
        let mut raw = [0u8; 12];
        raw[..4].copy_from_slice(b"addr");
        let peer = ScriptedStream::speaking(
            &[
                Message::Unknown {
                    command: raw,
                    payload: vec![0x00],
                },
                Message::Verack,
            ],
            Network::Mainnet,
        );
        let mut session = Session::over(peer, Network::Mainnet);
        assert_eq!(
            session.wait_for(&[Command::Verack]).unwrap(),
            Message::Verack
        );
    }

    #[test]
    fn sync_headers_stops_after_a_short_batch() {
        init_logs();
        let peer = ScriptedStream::speaking(
            &[Message::Headers(vec![genesis()])],
            Network::Mainnet,
        );
        let mut session = Session::over(peer, Network::Mainnet);

        let chain = session.sync_headers([0u8; 32]).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].hash(), genesis().hash());

        // Exactly one request went out, anchored at the zero hash.
        assert_eq!(
            session.stream.sent_commands(Network::Mainnet),
            vec![Command::GetHeaders]
        );
    }

    #[test]
    fn sync_headers_rejects_a_header_without_proof_of_work() {
        let mut bogus = genesis();
        bogus.nonce = [0, 0, 0, 0];
        let peer =
            ScriptedStream::speaking(&[Message::Headers(vec![bogus])], Network::Mainnet);
        let mut session = Session::over(peer, Network::Mainnet);

        let err = session.sync_headers([0u8; 32]).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::HeaderPow(_))
        ));
    }
}
