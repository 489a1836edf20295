use super::TargetCompiler;
use crate::error::CompileResult;
use crate::project::{Block, Input, LiteralKind};
use crate::sanitize::{is_numeric_text, js_number, parse_float, quoted};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Any,
    Numeric,
}

impl TargetCompiler<'_, '_> {
    pub(crate) fn input_value(
        &mut self,
        block: &Block,
        slot: &str,
        coercion: Coercion,
    ) -> CompileResult<String> {
        match block.input(slot) {
            Some(input) => self.resolve(block, slot, input, coercion),
            None => {
                self.diagnostics.debug(format!(
                    "Input '{}' missing on '{}' ({}), using null",
                    slot, block.opcode, block.id
                ));
                Ok("null".to_string())
            }
        }
    }

    pub(crate) fn resolve(
        &mut self,
        owner: &Block,
        slot: &str,
        input: &Input,
        coercion: Coercion,
    ) -> CompileResult<String> {
        match input {
            Input::Empty => {
                self.diagnostics.debug(format!(
                    "Input '{}' empty on '{}' ({}), using null",
                    slot, owner.opcode, owner.id
                ));
                Ok("null".to_string())
            }
            Input::Literal { kind, raw } => Ok(self.literal(owner, slot, *kind, raw, coercion)),
            Input::Variable { name, id } => {
                let key = id.as_deref().unwrap_or(name);
                let read = format!("this.getVariable({})", quoted(key));
                Ok(numeric_wrap(read, coercion))
            }
            Input::List { name, id } => {
                let key = id.as_deref().unwrap_or(name);
                let read = format!("this.getListReference({}).join(\" \")", quoted(key));
                Ok(numeric_wrap(read, coercion))
            }
            Input::Block { id, .. } => {
                let block = self.block(id)?;
                self.compile_value(block)
            }
        }
    }

    fn literal(
        &mut self,
        owner: &Block,
        slot: &str,
        kind: LiteralKind,
        raw: &str,
        coercion: Coercion,
    ) -> String {
        match coercion {
            Coercion::Any => quoted(raw),
            Coercion::Numeric if kind.is_numeric() => js_number(parse_float(raw)),
            Coercion::Numeric if kind == LiteralKind::String && is_numeric_text(raw) => {
                js_number(parse_float(raw))
            }
            Coercion::Numeric => {
                self.diagnostics.error(format!(
                    "Non-numeric {:?} literal {} in numeric slot '{}' of '{}' ({})",
                    kind,
                    quoted(raw),
                    slot,
                    owner.opcode,
                    owner.id
                ));
                quoted(raw)
            }
        }
    }
}

fn numeric_wrap(read: String, coercion: Coercion) -> String {
    match coercion {
        Coercion::Any => read,
        Coercion::Numeric => format!("parseFloat({})", read),
    }
}
