//! Bytecode generation for the Livy compiler: lowered-AST walking, pool
//! encoding, and the binary wire format (`spec.md` §4.8–§4.9).

mod encoder;
mod generator;
mod instruction;
mod pool;
mod scope;

pub use encoder::{
    compress, decode_header, decompress, encode_header, normalize_encoding_name, Header, HeaderDecodeError, RleError,
};
pub use generator::{GeneratedProgram, InstructionGenerator};
pub use instruction::{DecodeError, Instruction, INSTRUCTION_WIDTH};
pub use pool::{
    decode_function_pool, decode_stream, decode_string, decode_string_pool, encode_function_pool, encode_stream,
    encode_string, encode_string_pool, PoolDecodeError,
};
pub use scope::Scopes;

/// Assembles a [`GeneratedProgram`] and a [`Header`] into the final `.livy`
/// byte layout (`spec.md` §6.3): header, then stream, then string pool, then
/// function pool, optionally run-length compressed end-to-end.
#[must_use]
pub fn assemble(program: &GeneratedProgram, lib_mode: bool, encoding: &str, compress_output: bool) -> Vec<u8> {
    let stream_bytes: Vec<u8> = program.stream.iter().flat_map(|i| i.encode()).collect();
    let string_pool_bytes = encode_string_pool(&program.string_pool);
    let function_pool_bytes = encode_function_pool(&program.function_pool);

    let header = Header {
        lib_mode,
        func_pool_size: u32::try_from(function_pool_bytes.len()).expect("function pool fits in u32 bytes"),
        string_pool_size: u32::try_from(string_pool_bytes.len()).expect("string pool fits in u32 bytes"),
        stream_size: u32::try_from(stream_bytes.len()).expect("instruction stream fits in u32 bytes"),
        encoding: encoding.to_string(),
    };

    let mut out = encode_header(&header);
    out.extend(stream_bytes);
    out.extend(string_pool_bytes);
    out.extend(function_pool_bytes);

    if compress_output {
        compress(&out)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use livy_ast::{LExpr, Literal};
    use livy_source::Span;

    use super::*;

    #[test]
    fn assemble_lays_out_header_then_stream_then_pools() {
        let program = InstructionGenerator::new().generate(&LExpr::Scalar(Span::new(0, 1), Literal::Int(1)));
        let bytes = assemble(&program, false, "utf-8", false);

        let header_len = 2 + 1 + 1 + 2 + 4 + 1 + 2 + 4 + 1 + 2 + 4 + 1 + 2 + 16 + 1;
        let header = decode_header(&bytes[..header_len]).unwrap();
        assert_eq!(header.stream_size, INSTRUCTION_WIDTH as u32);
        assert_eq!(header.string_pool_size, 0);
        assert_eq!(header.func_pool_size, 0);

        let stream_bytes = &bytes[header_len..header_len + header.stream_size as usize];
        let decoded: [u8; INSTRUCTION_WIDTH] = stream_bytes.try_into().unwrap();
        assert_eq!(Instruction::decode(&decoded).unwrap(), Instruction::LoadInt(1));
        assert_eq!(bytes.len(), header_len + header.stream_size as usize);
    }

    #[test]
    fn compression_round_trips_through_assemble() {
        let program = InstructionGenerator::new().generate(&LExpr::Scalar(Span::new(0, 1), Literal::Bool(true)));
        let compressed = assemble(&program, false, "utf-8", true);
        let plain = assemble(&program, false, "utf-8", false);
        assert_eq!(decompress(&compressed).unwrap(), plain);
    }
}
