use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    UnknownBlockId {
        target: String,
        id: String,
    },
    MalformedInput {
        block: String,
        slot: String,
        detail: String,
    },
    MalformedField {
        block: String,
        slot: String,
        detail: String,
    },
    MissingField {
        block: String,
        slot: String,
    },
    MalformedProject(String),
    DuplicateStage {
        first: String,
        second: String,
    },
    CyclicChain {
        target: String,
        id: String,
    },
    UnknownMathOp(String),
    UnknownKey(String),
    InvalidMenuValue {
        opcode: String,
        field: String,
        value: String,
    },
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::UnknownBlockId { target, id } => {
                write!(f, "Block '{}' referenced in target '{}' does not exist.", id, target)
            }
            CompileError::MalformedInput {
                block,
                slot,
                detail,
            } => write!(f, "Malformed input '{}' on block '{}': {}.", slot, block, detail),
            CompileError::MalformedField {
                block,
                slot,
                detail,
            } => write!(f, "Malformed field '{}' on block '{}': {}.", slot, block, detail),
            CompileError::MissingField { block, slot } => {
                write!(f, "Block '{}' is missing field '{}'.", block, slot)
            }
            CompileError::MalformedProject(message) => write!(f, "Invalid project.json: {}", message),
            CompileError::DuplicateStage { first, second } => write!(
                f,
                "Duplicate stage target: '{}' and '{}' are both marked as stage.",
                first, second
            ),
            CompileError::CyclicChain { target, id } => {
                write!(f, "Cyclic block chain at '{}' in target '{}'.", id, target)
            }
            CompileError::UnknownMathOp(op) => write!(f, "Unimplemented mathop \"{}\".", op),
            CompileError::UnknownKey(key) => write!(f, "Unknown key: \"{}\".", key),
            CompileError::InvalidMenuValue {
                opcode,
                field,
                value,
            } => write!(
                f,
                "Invalid {} field on '{}': \"{}\".",
                field, opcode, value
            ),
        }
    }
}

impl Error for CompileError {}

pub type CompileResult<T> = Result<T, CompileError>;
