use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::models::packet::{DecodedPacket, LinkKind};
use crate::utils::error::AppResult;

const PCAP_MAGIC: u32 = 0xa1b2_c3d4;
const VERSION_MAJOR: u16 = 2;
const VERSION_MINOR: u16 = 4;
const SNAPLEN: u32 = 65535;

/// Write the session history as a classic libpcap capture file.
///
/// Each record carries the original frame bytes unchanged, so the output can
/// be replayed or analyzed elsewhere byte-for-byte.
pub fn write_pcap_file(
    path: &Path,
    link: LinkKind,
    packets: &[DecodedPacket],
) -> AppResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_pcap(&mut writer, link, packets)?;
    writer.flush()?;
    Ok(())
}

/// Format-only writer over any sink; consumes the decoded-record stream.
pub fn write_pcap<W: Write>(
    out: &mut W,
    link: LinkKind,
    packets: &[DecodedPacket],
) -> AppResult<()> {
    // Global header
    out.write_all(&PCAP_MAGIC.to_le_bytes())?;
    out.write_all(&VERSION_MAJOR.to_le_bytes())?;
    out.write_all(&VERSION_MINOR.to_le_bytes())?;
    out.write_all(&0i32.to_le_bytes())?; // thiszone
    out.write_all(&0u32.to_le_bytes())?; // sigfigs
    out.write_all(&SNAPLEN.to_le_bytes())?;
    out.write_all(&(link.dlt() as u32).to_le_bytes())?;

    for packet in packets {
        let ts_sec = packet.timestamp.timestamp() as u32;
        let ts_usec = packet.timestamp.timestamp_subsec_micros();
        let len = packet.raw_data.len() as u32;
        out.write_all(&ts_sec.to_le_bytes())?;
        out.write_all(&ts_usec.to_le_bytes())?;
        out.write_all(&len.to_le_bytes())?; // captured length
        out.write_all(&len.to_le_bytes())?; // original length
        out.write_all(&packet.raw_data)?;
    }
    Ok(())
}
