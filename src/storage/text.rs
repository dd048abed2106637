//! Decoding of stored text.

/// Marker that starts a compressed Jet 4 string.
const COMPRESSED_MARKER: [u8; 2] = [0xFF, 0xFE];

/// Decodes text as stored by the given format family.
///
/// Jet 3 stores single-byte text, read here as Latin-1. Jet 4 stores
/// UCS-2LE, optionally compressed: after the `FF FE` marker characters are
/// one byte wide, and each `0x00` byte toggles between one- and two-byte
/// characters.
pub fn decode_text(bytes: &[u8], unicode: bool) -> String {
    if !unicode {
        return bytes.iter().map(|&b| char::from(b)).collect();
    }

    let units = if bytes.starts_with(&COMPRESSED_MARKER) {
        expand_compressed(&bytes[2..])
    } else {
        bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    };

    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn expand_compressed(bytes: &[u8]) -> Vec<u16> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut compressed = true;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == 0 {
            compressed = !compressed;
            i += 1;
        } else if compressed {
            units.push(u16::from(bytes[i]));
            i += 1;
        } else if i + 1 < bytes.len() {
            units.push(u16::from_le_bytes([bytes[i], bytes[i + 1]]));
            i += 2;
        } else {
            break;
        }
    }

    units
}

/// Encodes text as uncompressed UCS-2LE.
#[cfg(test)]
pub(crate) fn encode_ucs2(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}
