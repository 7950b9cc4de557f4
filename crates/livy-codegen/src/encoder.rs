//! The `.livy` file header and the run-length compression pass (`spec.md` §4.9, §6.3).

const ENCODING_NAME_WIDTH: usize = 16;

/// The fixed-width header preceding a bytecode file's instruction stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub lib_mode: bool,
    pub func_pool_size: u32,
    pub string_pool_size: u32,
    pub stream_size: u32,
    pub encoding: String,
}

/// Maps a handful of common spellings to the normalized alias the header
/// stores, e.g. `"utf8"` → `"utf-8"`, `"Latin-1"` → `"iso8859-1"`. Anything
/// else is lowercased as-is; this is a display normalization, not a claim
/// that the name is a registered charset.
#[must_use]
pub fn normalize_encoding_name(name: &str) -> String {
    match name.to_ascii_lowercase().as_str() {
        "utf8" | "utf-8" => "utf-8".to_string(),
        "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => "iso8859-1".to_string(),
        other => other.to_string(),
    }
}

/// Encodes a [`Header`] to its fixed-width byte form.
///
/// # Panics
///
/// Panics if the normalized encoding name is wider than
/// [`ENCODING_NAME_WIDTH`] bytes; none of the names [`normalize_encoding_name`]
/// produces are.
#[must_use]
pub fn encode_header(header: &Header) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"M:");
    out.push(if header.lib_mode { 0xFF } else { 0x00 });
    out.push(b';');

    out.extend_from_slice(b"F:");
    out.extend_from_slice(&header.func_pool_size.to_be_bytes());
    out.push(b';');

    out.extend_from_slice(b"S:");
    out.extend_from_slice(&header.string_pool_size.to_be_bytes());
    out.push(b';');

    out.extend_from_slice(b"C:");
    out.extend_from_slice(&header.stream_size.to_be_bytes());
    out.push(b';');

    out.extend_from_slice(b"E:");
    let normalized = normalize_encoding_name(&header.encoding);
    assert!(normalized.len() <= ENCODING_NAME_WIDTH, "encoding name {normalized:?} too wide for the header field");
    let mut padded = [0u8; ENCODING_NAME_WIDTH];
    padded[..normalized.len()].copy_from_slice(normalized.as_bytes());
    out.extend_from_slice(&padded);
    out.push(b';');

    out
}

/// Failure parsing a header back from bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeaderDecodeError {
    #[error("header is truncated or malformed")]
    Malformed,
}

/// Decodes a [`Header`] from its fixed-width byte form.
///
/// # Errors
///
/// Returns [`HeaderDecodeError::Malformed`] if any field tag or separator
/// does not match the expected layout.
pub fn decode_header(bytes: &[u8]) -> Result<Header, HeaderDecodeError> {
    const EXPECTED_LEN: usize = 2 + 1 + 1 + 2 + 4 + 1 + 2 + 4 + 1 + 2 + 4 + 1 + 2 + ENCODING_NAME_WIDTH + 1;
    if bytes.len() != EXPECTED_LEN {
        return Err(HeaderDecodeError::Malformed);
    }
    let err = || HeaderDecodeError::Malformed;

    let mut pos = 0;
    let mut tag = |expected: &[u8], bytes: &[u8], pos: &mut usize| -> Result<(), HeaderDecodeError> {
        if &bytes[*pos..*pos + expected.len()] != expected {
            return Err(err());
        }
        *pos += expected.len();
        Ok(())
    };

    tag(b"M:", bytes, &mut pos)?;
    let lib_mode = match bytes[pos] {
        0xFF => true,
        0x00 => false,
        _ => return Err(err()),
    };
    pos += 1;
    if bytes[pos] != b';' {
        return Err(err());
    }
    pos += 1;

    tag(b"F:", bytes, &mut pos)?;
    let func_pool_size = u32::from_be_bytes(bytes[pos..pos + 4].try_into().expect("4 bytes"));
    pos += 4;
    if bytes[pos] != b';' {
        return Err(err());
    }
    pos += 1;

    tag(b"S:", bytes, &mut pos)?;
    let string_pool_size = u32::from_be_bytes(bytes[pos..pos + 4].try_into().expect("4 bytes"));
    pos += 4;
    if bytes[pos] != b';' {
        return Err(err());
    }
    pos += 1;

    tag(b"C:", bytes, &mut pos)?;
    let stream_size = u32::from_be_bytes(bytes[pos..pos + 4].try_into().expect("4 bytes"));
    pos += 4;
    if bytes[pos] != b';' {
        return Err(err());
    }
    pos += 1;

    tag(b"E:", bytes, &mut pos)?;
    let encoding_bytes = &bytes[pos..pos + ENCODING_NAME_WIDTH];
    let nul = encoding_bytes.iter().position(|&b| b == 0).unwrap_or(ENCODING_NAME_WIDTH);
    let encoding = std::str::from_utf8(&encoding_bytes[..nul]).map_err(|_| err())?.to_string();
    pos += ENCODING_NAME_WIDTH;
    if bytes[pos] != b';' {
        return Err(err());
    }

    Ok(Header { lib_mode, func_pool_size, string_pool_size, stream_size, encoding })
}

/// Run-length-encodes `bytes`: every maximal run of identical bytes (up to
/// 255 long) becomes `<count:u8><byte>`.
#[must_use]
pub fn compress(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        let mut run = 1usize;
        while run < 255 && i + run < bytes.len() && bytes[i + run] == byte {
            run += 1;
        }
        out.push(u8::try_from(run).expect("run capped at 255"));
        out.push(byte);
        i += run;
    }
    out
}

/// Failure decompressing a run-length-encoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RleError {
    #[error("run-length stream has an odd length")]
    OddLength,
}

/// Inverts [`compress`].
///
/// # Errors
///
/// Returns [`RleError::OddLength`] if `bytes` is not `(count, byte)` pairs.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, RleError> {
    if bytes.len() % 2 != 0 {
        return Err(RleError::OddLength);
    }
    let mut out = Vec::new();
    for pair in bytes.chunks_exact(2) {
        out.extend(std::iter::repeat(pair[1]).take(pair[0] as usize));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s2_rle_reference_scenario() {
        let input = b"aaaabbcccccdeeeeeeeeee";
        let compressed = compress(input);
        assert_eq!(compressed, b"\x04a\x02b\x05c\x01d\x0ae");
        assert_eq!(decompress(&compressed).unwrap(), input);
    }

    #[test]
    fn runs_longer_than_255_split_into_chunks() {
        let input = vec![b'z'; 300];
        let compressed = compress(&input);
        assert_eq!(compressed, [&[255u8, b'z'][..], &[45u8, b'z'][..]].concat());
        assert_eq!(decompress(&compressed).unwrap(), input);
    }

    #[test]
    fn s6_header_reference_scenario() {
        let header = Header {
            lib_mode: false,
            func_pool_size: 0x12,
            string_pool_size: 0x35,
            stream_size: 0x6f,
            encoding: "UTF8".to_string(),
        };
        let encoded = encode_header(&header);
        let mut expected = Vec::new();
        expected.extend_from_slice(b"M:\x00;");
        expected.extend_from_slice(b"F:\x00\x00\x00\x12;");
        expected.extend_from_slice(b"S:\x00\x00\x00\x35;");
        expected.extend_from_slice(b"C:\x00\x00\x00\x6f;");
        expected.extend_from_slice(b"E:utf-8\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00;");
        assert_eq!(encoded, expected);
    }

    #[test]
    fn header_round_trips() {
        let header = Header {
            lib_mode: true,
            func_pool_size: 7,
            string_pool_size: 42,
            stream_size: 1000,
            encoding: "utf-8".to_string(),
        };
        let encoded = encode_header(&header);
        assert_eq!(decode_header(&encoded).unwrap(), header);
    }

    #[test]
    fn latin_1_normalizes_to_iso8859_1() {
        assert_eq!(normalize_encoding_name("Latin-1"), "iso8859-1");
    }

    proptest::proptest! {
        #[test]
        fn rle_round_trips_any_byte_string(bytes: Vec<u8>) {
            let compressed = compress(&bytes);
            proptest::prop_assert_eq!(decompress(&compressed).unwrap(), bytes);
        }
    }
}
