//! Wire encoding for the function and string pools (`spec.md` §4.9).

use crate::instruction::{DecodeError, Instruction, INSTRUCTION_WIDTH};

/// Encodes a single instruction stream (a function pool entry, or the
/// top-level stream) with a `u32_be` length prefix and a `;` terminator,
/// per §4.9's "`<length><bytes>;`" framing.
#[must_use]
pub fn encode_stream(stream: &[Instruction]) -> Vec<u8> {
    let body: Vec<u8> = stream.iter().flat_map(|instruction| instruction.encode()).collect();
    let len = u32::try_from(body.len()).expect("fewer than u32::MAX bytes of instructions");
    let mut out = Vec::with_capacity(body.len() + 5);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend(body);
    out.push(b';');
    out
}

/// Encodes the function pool as a concatenation of length-prefixed,
/// `;`-terminated entries, each itself an encoded instruction stream.
#[must_use]
pub fn encode_function_pool(pool: &[Vec<Instruction>]) -> Vec<u8> {
    pool.iter().flat_map(|stream| encode_stream(stream)).collect()
}

/// Encodes a single string pool entry: `<length:u16_be><utf8 bytes>;`.
#[must_use]
pub fn encode_string(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let len = u16::try_from(bytes.len()).expect("string literal shorter than 2^16 bytes");
    let mut out = Vec::with_capacity(bytes.len() + 3);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(bytes);
    out.push(b';');
    out
}

/// Encodes the whole string pool as a concatenation of its entries.
#[must_use]
pub fn encode_string_pool(pool: &[String]) -> Vec<u8> {
    pool.iter().flat_map(|s| encode_string(s)).collect()
}

/// Failure decoding a pool or instruction stream back from bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolDecodeError {
    #[error("truncated pool: expected {expected} more bytes, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("entry is missing its ';' terminator")]
    MissingTerminator,
    #[error("instruction stream is not a multiple of {INSTRUCTION_WIDTH} bytes")]
    Misaligned,
    #[error("invalid utf-8 in string pool entry")]
    InvalidUtf8,
    #[error(transparent)]
    Instruction(#[from] DecodeError),
}

/// Decodes one length-prefixed, `;`-terminated instruction stream starting
/// at `bytes[0]`, returning it and the number of bytes consumed.
///
/// # Errors
///
/// See [`PoolDecodeError`].
pub fn decode_stream(bytes: &[u8]) -> Result<(Vec<Instruction>, usize), PoolDecodeError> {
    if bytes.len() < 4 {
        return Err(PoolDecodeError::Truncated { expected: 4, found: bytes.len() });
    }
    let len = u32::from_be_bytes(bytes[..4].try_into().expect("4 bytes")) as usize;
    let body_end = 4 + len;
    if bytes.len() < body_end + 1 {
        return Err(PoolDecodeError::Truncated { expected: body_end + 1, found: bytes.len() });
    }
    if bytes[body_end] != b';' {
        return Err(PoolDecodeError::MissingTerminator);
    }
    if len % INSTRUCTION_WIDTH != 0 {
        return Err(PoolDecodeError::Misaligned);
    }
    let body = &bytes[4..body_end];
    let mut instructions = Vec::with_capacity(len / INSTRUCTION_WIDTH);
    for chunk in body.chunks_exact(INSTRUCTION_WIDTH) {
        let array: [u8; INSTRUCTION_WIDTH] = chunk.try_into().expect("chunks_exact yields INSTRUCTION_WIDTH");
        instructions.push(Instruction::decode(&array)?);
    }
    Ok((instructions, body_end + 1))
}

/// Decodes a whole function pool occupying exactly `bytes`.
///
/// # Errors
///
/// See [`PoolDecodeError`].
pub fn decode_function_pool(mut bytes: &[u8]) -> Result<Vec<Vec<Instruction>>, PoolDecodeError> {
    let mut pool = Vec::new();
    while !bytes.is_empty() {
        let (stream, consumed) = decode_stream(bytes)?;
        pool.push(stream);
        bytes = &bytes[consumed..];
    }
    Ok(pool)
}

/// Decodes one length-prefixed, `;`-terminated string entry, returning it
/// and the number of bytes consumed.
///
/// # Errors
///
/// See [`PoolDecodeError`].
pub fn decode_string(bytes: &[u8]) -> Result<(String, usize), PoolDecodeError> {
    if bytes.len() < 2 {
        return Err(PoolDecodeError::Truncated { expected: 2, found: bytes.len() });
    }
    let len = u16::from_be_bytes(bytes[..2].try_into().expect("2 bytes")) as usize;
    let body_end = 2 + len;
    if bytes.len() < body_end + 1 {
        return Err(PoolDecodeError::Truncated { expected: body_end + 1, found: bytes.len() });
    }
    if bytes[body_end] != b';' {
        return Err(PoolDecodeError::MissingTerminator);
    }
    let text = std::str::from_utf8(&bytes[2..body_end]).map_err(|_| PoolDecodeError::InvalidUtf8)?.to_string();
    Ok((text, body_end + 1))
}

/// Decodes a whole string pool occupying exactly `bytes`.
///
/// # Errors
///
/// See [`PoolDecodeError`].
pub fn decode_string_pool(mut bytes: &[u8]) -> Result<Vec<String>, PoolDecodeError> {
    let mut pool = Vec::new();
    while !bytes.is_empty() {
        let (s, consumed) = decode_string(bytes)?;
        pool.push(s);
        bytes = &bytes[consumed..];
    }
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_pool_round_trips() {
        let pool = vec!["hi".to_string(), String::new(), "a longer one".to_string()];
        let encoded = encode_string_pool(&pool);
        assert_eq!(decode_string_pool(&encoded).unwrap(), pool);
    }

    #[test]
    fn function_pool_round_trips() {
        let pool = vec![vec![Instruction::LoadInt(1), Instruction::Native(1)], vec![Instruction::LoadBool(true)]];
        let encoded = encode_function_pool(&pool);
        assert_eq!(decode_function_pool(&encoded).unwrap(), pool);
    }

    #[test]
    fn empty_stream_round_trips() {
        let encoded = encode_stream(&[]);
        let (decoded, consumed) = decode_stream(&encoded).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let encoded = encode_stream(&[Instruction::LoadBool(true)]);
        assert!(matches!(decode_stream(&encoded[..encoded.len() - 2]), Err(PoolDecodeError::Truncated { .. })));
    }
}
