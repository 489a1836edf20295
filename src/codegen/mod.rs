mod expr;
mod literal;
mod script;
mod stmt;
mod target;

pub use literal::Coercion;
pub use target::{compile_target, runtime_direction, TargetDescriptor};

use crate::diagnostics::Diagnostics;
use crate::error::{CompileError, CompileResult};
use crate::opcode::{HatOp, Opcode};
use crate::project::{Block, BlockId, ProcMeta, Project, Target};
use std::collections::HashSet;

/// Compiles every target into the code that replaces `##code##` in the template.
/// The stage comes first, then sprites in project order.
pub fn compile_project(project: &Project, diagnostics: &mut Diagnostics) -> CompileResult<String> {
    let ordered = project
        .targets
        .iter()
        .filter(|t| t.is_stage)
        .chain(project.targets.iter().filter(|t| !t.is_stage));
    let mut code = String::new();
    for target in ordered {
        tracing::debug!(target = %target.name, blocks = target.blocks.len(), "compiling target");
        let descriptor = compile_target(target, diagnostics)?;
        code.push_str(&descriptor.render());
    }
    Ok(code)
}

pub(crate) struct TargetCompiler<'p, 'd> {
    target: &'p Target,
    diagnostics: &'d mut Diagnostics,
    procedures: HashSet<&'p str>,
    scope: Option<&'p ProcMeta>,
    // Blocks currently being compiled, innermost last.
    active: HashSet<BlockId>,
}

impl<'p, 'd> TargetCompiler<'p, 'd> {
    pub(crate) fn new(target: &'p Target, diagnostics: &'d mut Diagnostics) -> CompileResult<Self> {
        let mut procedures = HashSet::new();
        for block in target.blocks.top_level() {
            if block.opcode == Opcode::Hat(HatOp::ProcedureDefinition) {
                let meta = definition_meta(target, block)?;
                procedures.insert(meta.proc_code.as_str());
            }
        }
        Ok(Self {
            target,
            diagnostics,
            procedures,
            scope: None,
            active: HashSet::new(),
        })
    }

    fn block(&self, id: &BlockId) -> CompileResult<&'p Block> {
        self.target.blocks.get(id)
    }

    fn nested<T>(
        &mut self,
        block: &Block,
        compile: impl FnOnce(&mut Self) -> CompileResult<T>,
    ) -> CompileResult<T> {
        if !self.active.insert(block.id.clone()) {
            return Err(CompileError::CyclicChain {
                target: self.target.name.clone(),
                id: block.id.to_string(),
            });
        }
        let result = compile(self);
        self.active.remove(&block.id);
        result
    }
}

pub(crate) fn definition_meta<'p>(target: &'p Target, definition: &Block) -> CompileResult<&'p ProcMeta> {
    let malformed = |detail: &str| CompileError::MalformedInput {
        block: definition.id.to_string(),
        slot: "custom_block".to_string(),
        detail: detail.to_string(),
    };
    let proto_id = definition
        .input("custom_block")
        .and_then(|input| input.block_id())
        .ok_or_else(|| malformed("procedure definition without a prototype"))?;
    let proto = target.blocks.get(proto_id)?;
    proto
        .mutation
        .as_ref()
        .ok_or_else(|| malformed("prototype carries no proccode"))
}

pub(crate) struct CodeWriter {
    lines: Vec<String>,
    indent: usize,
}

impl CodeWriter {
    pub(crate) fn new(indent: usize) -> Self {
        Self {
            lines: Vec::new(),
            indent,
        }
    }

    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}", spaces(self.indent), text.as_ref()));
    }

    pub(crate) fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.indent += 1;
    }

    pub(crate) fn close(&mut self, text: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    pub(crate) fn reopen(&mut self, text: impl AsRef<str>) {
        self.close(text);
        self.indent += 1;
    }

    pub(crate) fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }
}

fn spaces(level: usize) -> String {
    "    ".repeat(level)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use serde_json::{json, Value};

    pub(crate) fn sprite_project(blocks: Value) -> Project {
        Project::from_value(&json!({
            "targets": [
                {"isStage": true, "name": "Stage", "blocks": {}},
                {
                    "isStage": false, "name": "Sprite1", "x": 10, "y": -20,
                    "size": 50, "direction": 90, "rotationStyle": "left-right",
                    "visible": true, "currentCostume": 0,
                    "variables": {"v1": ["score", 0]},
                    "lists": {"l1": ["items", [1, 2]]},
                    "costumes": [],
                    "blocks": blocks
                }
            ]
        }))
        .unwrap()
    }

    pub(crate) fn compile_sprite(blocks: Value) -> (String, Diagnostics) {
        let project = sprite_project(blocks);
        let mut diagnostics = Diagnostics::new();
        let descriptor = compile_target(&project.targets[1], &mut diagnostics).unwrap();
        (descriptor.scripts, diagnostics)
    }

    pub(crate) fn compile_reporter(blocks: Value, id: &str) -> CompileResult<(String, Diagnostics)> {
        let project = sprite_project(blocks);
        let target = &project.targets[1];
        let mut diagnostics = Diagnostics::new();
        let mut compiler = TargetCompiler::new(target, &mut diagnostics)?;
        let block = target.blocks.get(&crate::project::BlockId::new(id))?;
        let code = compiler.compile_value(block)?;
        Ok((code, diagnostics))
    }

    pub(crate) fn compile_statement(blocks: Value, id: &str) -> CompileResult<(String, Diagnostics)> {
        let project = sprite_project(blocks);
        let target = &project.targets[1];
        let mut diagnostics = Diagnostics::new();
        let mut compiler = TargetCompiler::new(target, &mut diagnostics)?;
        let block = target.blocks.get(&crate::project::BlockId::new(id))?;
        let mut writer = CodeWriter::new(0);
        compiler.compile_statement(block, &mut writer)?;
        Ok((writer.finish(), diagnostics))
    }
}
