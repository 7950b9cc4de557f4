//! The instruction set and its fixed 8-byte wire encoding (`spec.md` §4.8–§4.9).

/// A single instruction the generator emits (`spec.md` §4.8). `STORE_NAME`
/// only has the single-operand `(slot)` form — the two-operand `(depth,
/// slot)` form is part of the wire contract but this compiler never emits an
/// assignment into an outer scope (see `SPEC_FULL.md`'s Open Question
/// decisions), so it has no variant here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    LoadBool(bool),
    /// 4-byte signed big-endian, per the wire contract in §4.9.
    LoadInt(i32),
    /// No width is pinned by `spec.md`; 4 bytes (an `f32`) is the largest
    /// that still fits the 7-byte operand budget alongside every other
    /// fixed-width opcode.
    LoadFloat(f32),
    /// String pool index.
    LoadString(u64),
    /// Function pool index.
    LoadFunc(u64),
    LoadName { depth: u16, slot: u32 },
    StoreName { slot: u32 },
    BuildList(u32),
    BuildTuple(u32),
    Call(u32),
    /// Operand is the fixed `NativeOp` code table (`spec.md` §9 "Native
    /// operator codes").
    Native(u8),
    /// Relative jump, signed instruction count.
    Jump(i32),
    /// Pops a boolean; relative skip if false.
    Branch(i32),
}

/// Every encoded instruction is exactly this many bytes: one opcode byte
/// plus a fixed 7-byte operand payload, zero-padded on the right when the
/// operand itself is narrower (`spec.md` §4.9).
pub const INSTRUCTION_WIDTH: usize = 8;

const OP_LOAD_BOOL: u8 = 1;
const OP_LOAD_INT: u8 = 2;
const OP_LOAD_FLOAT: u8 = 3;
const OP_LOAD_STRING: u8 = 4;
const OP_LOAD_FUNC: u8 = 5;
const OP_LOAD_NAME: u8 = 6;
const OP_STORE_NAME: u8 = 7;
const OP_BUILD_LIST: u8 = 8;
const OP_BUILD_TUPLE: u8 = 9;
const OP_CALL: u8 = 10;
const OP_NATIVE: u8 = 11;
const OP_JUMP: u8 = 12;
const OP_BRANCH: u8 = 13;

/// A 56-bit pool index truncated from a `u64`, big-endian. Pool sizes never
/// approach 2^56 in practice; this is the format §4.9 specifies ("`u64_be`
/// pool indices but encoded to 7 bytes").
fn encode_pool_index(index: u64) -> [u8; 7] {
    let bytes = index.to_be_bytes();
    bytes[1..8].try_into().expect("8 - 1 == 7")
}

fn decode_pool_index(payload: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes[1..8].copy_from_slice(&payload[..7]);
    u64::from_be_bytes(bytes)
}

impl Instruction {
    /// Encodes this instruction to its fixed 8-byte wire form.
    #[must_use]
    pub fn encode(self) -> [u8; INSTRUCTION_WIDTH] {
        let mut out = [0u8; INSTRUCTION_WIDTH];
        let payload = &mut out[1..];
        match self {
            Self::LoadBool(b) => {
                out[0] = OP_LOAD_BOOL;
                payload[0] = u8::from(b);
            }
            Self::LoadInt(i) => {
                out[0] = OP_LOAD_INT;
                payload[..4].copy_from_slice(&i.to_be_bytes());
            }
            Self::LoadFloat(f) => {
                out[0] = OP_LOAD_FLOAT;
                payload[..4].copy_from_slice(&f.to_be_bytes());
            }
            Self::LoadString(index) => {
                out[0] = OP_LOAD_STRING;
                payload[..7].copy_from_slice(&encode_pool_index(index));
            }
            Self::LoadFunc(index) => {
                out[0] = OP_LOAD_FUNC;
                payload[..7].copy_from_slice(&encode_pool_index(index));
            }
            Self::LoadName { depth, slot } => {
                out[0] = OP_LOAD_NAME;
                payload[..2].copy_from_slice(&depth.to_be_bytes());
                payload[2..6].copy_from_slice(&slot.to_be_bytes());
            }
            Self::StoreName { slot } => {
                out[0] = OP_STORE_NAME;
                payload[..4].copy_from_slice(&slot.to_be_bytes());
            }
            Self::BuildList(n) => {
                out[0] = OP_BUILD_LIST;
                payload[..4].copy_from_slice(&n.to_be_bytes());
            }
            Self::BuildTuple(n) => {
                out[0] = OP_BUILD_TUPLE;
                payload[..4].copy_from_slice(&n.to_be_bytes());
            }
            Self::Call(n) => {
                out[0] = OP_CALL;
                payload[..4].copy_from_slice(&n.to_be_bytes());
            }
            Self::Native(k) => {
                out[0] = OP_NATIVE;
                payload[0] = k;
            }
            Self::Jump(n) => {
                out[0] = OP_JUMP;
                payload[..4].copy_from_slice(&n.to_be_bytes());
            }
            Self::Branch(n) => {
                out[0] = OP_BRANCH;
                payload[..4].copy_from_slice(&n.to_be_bytes());
            }
        }
        out
    }

    /// Decodes a single instruction from an exact 8-byte slice.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownOpcode`] for an opcode byte outside the
    /// defined set.
    pub fn decode(bytes: &[u8; INSTRUCTION_WIDTH]) -> Result<Self, DecodeError> {
        let payload = &bytes[1..];
        let instruction = match bytes[0] {
            OP_LOAD_BOOL => Self::LoadBool(payload[0] != 0),
            OP_LOAD_INT => Self::LoadInt(i32::from_be_bytes(payload[..4].try_into().expect("4 bytes"))),
            OP_LOAD_FLOAT => Self::LoadFloat(f32::from_be_bytes(payload[..4].try_into().expect("4 bytes"))),
            OP_LOAD_STRING => Self::LoadString(decode_pool_index(payload)),
            OP_LOAD_FUNC => Self::LoadFunc(decode_pool_index(payload)),
            OP_LOAD_NAME => Self::LoadName {
                depth: u16::from_be_bytes(payload[..2].try_into().expect("2 bytes")),
                slot: u32::from_be_bytes(payload[2..6].try_into().expect("4 bytes")),
            },
            OP_STORE_NAME => Self::StoreName { slot: u32::from_be_bytes(payload[..4].try_into().expect("4 bytes")) },
            OP_BUILD_LIST => Self::BuildList(u32::from_be_bytes(payload[..4].try_into().expect("4 bytes"))),
            OP_BUILD_TUPLE => Self::BuildTuple(u32::from_be_bytes(payload[..4].try_into().expect("4 bytes"))),
            OP_CALL => Self::Call(u32::from_be_bytes(payload[..4].try_into().expect("4 bytes"))),
            OP_NATIVE => Self::Native(payload[0]),
            OP_JUMP => Self::Jump(i32::from_be_bytes(payload[..4].try_into().expect("4 bytes"))),
            OP_BRANCH => Self::Branch(i32::from_be_bytes(payload[..4].try_into().expect("4 bytes"))),
            other => return Err(DecodeError::UnknownOpcode(other)),
        };
        Ok(instruction)
    }
}

/// Failure decoding a byte stream back into instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown opcode byte {0:#04x}")]
    UnknownOpcode(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(instruction: Instruction) {
        let encoded = instruction.encode();
        assert_eq!(encoded.len(), INSTRUCTION_WIDTH);
        assert_eq!(Instruction::decode(&encoded).unwrap(), instruction);
    }

    #[test]
    fn every_instruction_kind_round_trips() {
        roundtrip(Instruction::LoadBool(true));
        roundtrip(Instruction::LoadInt(-42));
        roundtrip(Instruction::LoadFloat(3.5));
        roundtrip(Instruction::LoadString(7));
        roundtrip(Instruction::LoadFunc(0));
        roundtrip(Instruction::LoadName { depth: 1, slot: 0 });
        roundtrip(Instruction::StoreName { slot: 3 });
        roundtrip(Instruction::BuildList(2));
        roundtrip(Instruction::BuildTuple(3));
        roundtrip(Instruction::Call(1));
        roundtrip(Instruction::Native(8));
        roundtrip(Instruction::Jump(-3));
        roundtrip(Instruction::Branch(2));
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        let bytes = [0u8; INSTRUCTION_WIDTH];
        assert_eq!(Instruction::decode(&bytes), Err(DecodeError::UnknownOpcode(0)));
    }

    fn arbitrary_instruction() -> impl proptest::strategy::Strategy<Value = Instruction> {
        use proptest::prelude::*;
        prop_oneof![
            any::<bool>().prop_map(Instruction::LoadBool),
            any::<i32>().prop_map(Instruction::LoadInt),
            any::<f32>().prop_filter("NaN never compares equal to itself", |f| !f.is_nan()).prop_map(Instruction::LoadFloat),
            (0u64..(1u64 << 56)).prop_map(Instruction::LoadString),
            (0u64..(1u64 << 56)).prop_map(Instruction::LoadFunc),
            (any::<u16>(), any::<u32>()).prop_map(|(depth, slot)| Instruction::LoadName { depth, slot }),
            any::<u32>().prop_map(|slot| Instruction::StoreName { slot }),
            any::<u32>().prop_map(Instruction::BuildList),
            any::<u32>().prop_map(Instruction::BuildTuple),
            any::<u32>().prop_map(Instruction::Call),
            any::<u8>().prop_map(Instruction::Native),
            any::<i32>().prop_map(Instruction::Jump),
            any::<i32>().prop_map(Instruction::Branch),
        ]
    }

    proptest::proptest! {
        #[test]
        fn every_instruction_round_trips_through_encoding(instruction in arbitrary_instruction()) {
            let encoded = instruction.encode();
            proptest::prop_assert_eq!(Instruction::decode(&encoded).unwrap(), instruction);
        }
    }
}
