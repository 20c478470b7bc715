//! Reading flow-log blobs from disk.

use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::{Error, Result};

/// Read a flow-log blob, decompressing it if it is gzip encoded.
pub fn read_flow_log(path: &Path) -> Result<String> {
    let raw = fs::read(path)?;
    decode_flow_log(raw)
}

/// Turn raw blob bytes into text, decompressing gzip content.
pub fn decode_flow_log(raw: Vec<u8>) -> Result<String> {
    let data = if is_gzip(&raw) {
        let mut decoder = GzDecoder::new(&raw[..]);
        let mut data = Vec::new();
        decoder
            .read_to_end(&mut data)
            .map_err(|e| Error::Config(format!("Gzip decompression failed: {}", e)))?;
        data
    } else {
        raw
    };

    String::from_utf8(data)
        .map_err(|e| Error::Config(format!("Flow log is not valid UTF-8: {}", e)))
}

fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}
