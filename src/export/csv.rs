use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::models::packet::DecodedPacket;
use crate::utils::error::AppResult;

const HEADER: &str = "no,time,delta_ms,src_mac,dst_mac,src_ip,dst_ip,protocol,src_port,dst_port,length,risk";

/// Write the session history as CSV, one row per packet in capture order.
pub fn write_csv_file(path: &Path, packets: &[DecodedPacket]) -> AppResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_csv(&mut writer, packets)?;
    writer.flush()?;
    Ok(())
}

pub fn write_csv<W: Write>(out: &mut W, packets: &[DecodedPacket]) -> AppResult<()> {
    writeln!(out, "{}", HEADER)?;
    for p in packets {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{:.2}",
            p.seq,
            p.timestamp.format("%H:%M:%S%.3f"),
            p.delta_ms,
            p.src_mac,
            p.dst_mac,
            p.src_addr,
            p.dst_addr,
            p.protocol,
            p.src_port,
            p.dst_port,
            p.length,
            p.risk_score,
        )?;
    }
    Ok(())
}
