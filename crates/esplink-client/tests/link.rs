use std::io::{ErrorKind, Read, Write};

use esplink_client::{
    Client, ClientConfig, ClientError, SyncOutcome, SyncState, Timeout, SYNC_MARKER,
};
use esplink_frame::{check_packet, Command, FrameAssembler, OwnedPacket, Push, RequestWriter, END};
use esplink_transport::{IoTransport, MemoryTransport, Transport, TransportError};

/// Firmware stand-in: decodes everything the client writes and answers SYNC
/// requests from a script.
#[derive(Default)]
struct ScriptedPeer {
    to_client: MemoryTransport,
    assembler: FrameAssembler<256>,
    requests: Vec<OwnedPacket>,
    raw: Vec<u8>,
    answer_sync: bool,
    before_answer: Vec<Vec<u8>>,
}

impl ScriptedPeer {
    fn answering() -> Self {
        Self {
            answer_sync: true,
            ..Self::default()
        }
    }

    fn silent() -> Self {
        Self::default()
    }

    fn sync_requests(&self) -> usize {
        self.requests
            .iter()
            .filter(|p| p.as_packet().command() == Command::Sync)
            .count()
    }

    fn markers_sent(&self) -> usize {
        self.raw
            .windows(SYNC_MARKER.len())
            .filter(|w| *w == SYNC_MARKER.as_bytes())
            .count()
    }

    fn on_request(&mut self, packet: OwnedPacket) {
        if packet.as_packet().command() == Command::Sync {
            for frame in std::mem::take(&mut self.before_answer) {
                self.to_client.push_inbound(&frame);
            }
            if self.answer_sync {
                self.to_client.push_inbound(&encode(Command::ResponseValue, 0, &[]));
            }
        }
        self.requests.push(packet);
    }
}

impl Transport for ScriptedPeer {
    fn is_byte_available(&mut self) -> bool {
        self.to_client.is_byte_available()
    }

    fn read_byte(&mut self) -> esplink_transport::Result<u8> {
        self.to_client.read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> esplink_transport::Result<()> {
        self.raw.push(byte);
        if let Push::Complete(len) = self.assembler.push(byte) {
            if len > 0 {
                if let Ok(packet) = check_packet(self.assembler.frame()) {
                    let owned = packet.to_owned_packet();
                    self.on_request(owned);
                }
            }
        }
        Ok(())
    }
}

fn encode(command: Command, value: u32, params: &[&[u8]]) -> Vec<u8> {
    let mut wire = MemoryTransport::new();
    let mut writer = RequestWriter::new();
    writer
        .begin(&mut wire, command.id(), value, params.len() as u16)
        .unwrap();
    for param in params {
        writer.add_parameter(&mut wire, param).unwrap();
    }
    writer.finish(&mut wire).unwrap();
    wire.take_outbound().to_vec()
}

fn client_for(peer: ScriptedPeer) -> Client<ScriptedPeer> {
    let config = ClientConfig {
        receive_timeout: Timeout::Iterations(50),
        ..ClientConfig::default()
    };
    Client::with_config(peer, config)
}

#[test]
fn sync_succeeds_against_responsive_peer() {
    let mut client = client_for(ScriptedPeer::answering());

    let outcome = client.sync().unwrap();
    assert_eq!(outcome, SyncOutcome::Synchronized);
    assert!(outcome.is_synchronized());
    assert_eq!(client.sync_state(), SyncState::Idle);

    let peer = client.get_ref();
    assert_eq!(peer.sync_requests(), 1);
    assert!(peer.raw.starts_with(b"sync\n"));
    assert_eq!(peer.raw[SYNC_MARKER.len()], END);

    let request = peer.requests[0].as_packet();
    assert_eq!(request.value(), 0);
    assert_eq!(request.argc(), 0);
}

#[test]
fn sync_reports_silent_peer() {
    let mut client = client_for(ScriptedPeer::silent());

    assert_eq!(client.sync().unwrap(), SyncOutcome::NoResponse);
    assert_eq!(client.sync_state(), SyncState::Idle);
    assert_eq!(client.get_ref().sync_requests(), 1);
}

#[test]
fn unrelated_packets_are_discarded_while_syncing() {
    let mut peer = ScriptedPeer::answering();
    peer.before_answer = vec![
        encode(Command::Other(40), 1, &[]),
        encode(Command::ResponseCallback, 2, &[&b"cb"[..]]),
    ];
    let mut client = client_for(peer);

    assert_eq!(client.sync().unwrap(), SyncOutcome::Synchronized);
    assert!(client.try_receive().unwrap().is_none());
}

#[test]
fn sync_during_sync_is_not_reentered() {
    let mut peer = ScriptedPeer::answering();
    peer.before_answer = vec![encode(Command::Sync, 0, &[])];
    let mut client = client_for(peer);

    assert_eq!(client.sync().unwrap(), SyncOutcome::Synchronized);
    assert_eq!(client.get_ref().markers_sent(), 1);
    assert_eq!(client.get_ref().sync_requests(), 1);
}

#[test]
fn peer_initiated_sync_is_never_surfaced() {
    let mut peer = ScriptedPeer::answering();
    peer.to_client.push_inbound(&encode(Command::Sync, 0, &[]));
    let mut client = client_for(peer);

    assert!(client.try_receive().unwrap().is_none());
    assert_eq!(client.get_ref().sync_requests(), 1);
    assert_eq!(client.sync_state(), SyncState::Idle);

    client
        .get_mut()
        .to_client
        .push_inbound(&encode(Command::Other(41), 9, &[]));
    let packet = client.try_receive().unwrap().unwrap();
    assert_eq!(packet.command(), Command::Other(41));
    assert_eq!(packet.value(), 9);
}

#[test]
fn request_reaches_peer_intact() {
    let mut client = client_for(ScriptedPeer::silent());
    client.send_request(0x0005u16, 0, &[&b"A"[..]]).unwrap();

    let peer = client.get_ref();
    assert_eq!(
        peer.raw,
        vec![
            END, 0x05, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, b'A', 0x00, 0x00,
            0x00, 0x21, 0x06, END
        ]
    );

    assert_eq!(peer.requests.len(), 1);
    let request = peer.requests[0].as_packet();
    assert_eq!(request.command(), Command::Other(5));
    assert_eq!(request.argc(), 1);
    assert_eq!(request.value(), 0);
    let args: Vec<&[u8]> = request.arguments().map(|a| a.unwrap()).collect();
    assert_eq!(args, vec![&b"A"[..]]);
}

#[test]
fn reserved_bytes_survive_the_round_trip() {
    let mut client = client_for(ScriptedPeer::silent());
    let awkward = [END, 0xDB, 0xDC, 0xDD, 0x00, END];
    client
        .send_request(0x00C0u16, 0xC0DB_C0DB, &[&awkward[..], &b""[..]])
        .unwrap();

    let request = client.get_ref().requests[0].as_packet();
    assert_eq!(request.command_id(), 0x00C0);
    assert_eq!(request.value(), 0xC0DB_C0DB);
    let args: Vec<&[u8]> = request.arguments().map(|a| a.unwrap()).collect();
    assert_eq!(args, vec![&awkward[..], &b""[..]]);
}

#[test]
fn received_packet_can_be_kept_across_calls() {
    let mut peer = ScriptedPeer::silent();
    peer.to_client.push_inbound(&encode(Command::ResponseCallback, 3, &[&b"first"[..]]));
    peer.to_client.push_inbound(&encode(Command::ResponseCallback, 4, &[&b"second"[..]]));
    let mut client = client_for(peer);

    let first = client.receive_default().unwrap().unwrap().to_owned_packet();
    let second = client.receive_default().unwrap().unwrap();

    assert_eq!(second.value(), 4);
    assert_eq!(first.as_packet().value(), 3);
    let arg = first.as_packet().arguments().next().unwrap().unwrap();
    assert_eq!(arg, b"first");
}

/// Serial device that was unplugged: every read fails, writes vanish.
struct Unplugged;

impl Read for Unplugged {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        Err(std::io::Error::from(ErrorKind::BrokenPipe))
    }
}

impl Write for Unplugged {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn is_broken_pipe(err: &ClientError) -> bool {
    matches!(
        err,
        ClientError::Transport(TransportError::Io(io)) if io.kind() == ErrorKind::BrokenPipe
    )
}

#[test]
fn dead_device_fails_receive() {
    let mut client = Client::new(IoTransport::new(Unplugged));

    let err = client.try_receive().unwrap_err();
    assert!(is_broken_pipe(&err), "{err:?}");

    let err = client.receive(Timeout::Iterations(5)).unwrap_err();
    assert!(is_broken_pipe(&err), "{err:?}");
}

#[test]
fn dead_device_fails_byte_reads() {
    let mut client = Client::new(IoTransport::new(Unplugged));

    let err = client.receive_byte(Timeout::Iterations(5)).unwrap_err();
    assert!(is_broken_pipe(&err), "{err:?}");

    let err = client.receive_byte_blocking().unwrap_err();
    assert!(is_broken_pipe(&err), "{err:?}");
}

#[test]
fn dead_device_fails_sync() {
    let mut client = Client::new(IoTransport::new(Unplugged));

    let err = client.sync().unwrap_err();
    assert!(is_broken_pipe(&err), "{err:?}");
    assert_eq!(client.sync_state(), SyncState::Idle);
}
