//! Talks to an in-process peer that answers SYNC and echoes requests back as
//! callbacks.
//!
//! Run with:
//!   cargo run -p esplink --example loopback

use esplink::client::Client;
use esplink::frame::{
    check_packet, Command, FrameAssembler, FrameError, Packet, Push, RequestWriter,
};
use esplink::transport::{self, MemoryTransport, Transport};

/// Peer side of the link. Bytes the client writes are decoded here; replies
/// are queued for the client to read.
#[derive(Default)]
struct EchoPeer {
    to_client: MemoryTransport,
    assembler: FrameAssembler<256>,
}

impl EchoPeer {
    fn reply(&mut self, request: Packet<'_>) -> Result<(), FrameError> {
        let mut wire = MemoryTransport::new();
        let mut writer = RequestWriter::new();

        if request.command() == Command::Sync {
            writer.begin(&mut wire, Command::ResponseValue.id(), 0, 0)?;
        } else {
            writer.begin(&mut wire, Command::ResponseCallback.id(), request.value(), request.argc())?;
            for arg in request.arguments() {
                writer.add_parameter(&mut wire, arg?)?;
            }
        }
        writer.finish(&mut wire)?;

        self.to_client.push_inbound(&wire.take_outbound());
        Ok(())
    }
}

impl Transport for EchoPeer {
    fn is_byte_available(&mut self) -> bool {
        self.to_client.is_byte_available()
    }

    fn read_byte(&mut self) -> transport::Result<u8> {
        self.to_client.read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> transport::Result<()> {
        let Push::Complete(len) = self.assembler.push(byte) else {
            return Ok(());
        };
        if len == 0 {
            return Ok(());
        }

        let request = match check_packet(self.assembler.frame()) {
            Ok(packet) => packet.to_owned_packet(),
            Err(err) => {
                tracing::debug!(error = %err, "peer ignoring frame");
                return Ok(());
            }
        };
        if let Err(err) = self.reply(request.as_packet()) {
            tracing::warn!(error = %err, "peer failed to reply");
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let mut client = Client::new(EchoPeer::default());

    let outcome = client.sync()?;
    eprintln!("sync: {outcome:?}");

    client.send_request(0x0030u16, 7, &[&b"hello"[..], &b"esplink"[..]])?;
    match client.receive_default()? {
        Some(packet) => {
            eprintln!("reply: {packet:?}");
            for arg in packet.arguments() {
                eprintln!("  arg: {}", String::from_utf8_lossy(arg?));
            }
        }
        None => eprintln!("no reply"),
    }

    Ok(())
}
