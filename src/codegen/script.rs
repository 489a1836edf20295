use super::stmt::string_array;
use super::{definition_meta, CodeWriter, TargetCompiler};
use crate::error::CompileResult;
use crate::opcode::{HatOp, Opcode};
use crate::project::Block;
use crate::sanitize::quoted;

impl TargetCompiler<'_, '_> {
    pub(crate) fn compile_scripts(&mut self, w: &mut CodeWriter) -> CompileResult<()> {
        let target = self.target;
        for hat in target.blocks.top_level() {
            self.compile_script(hat, w)?;
        }
        Ok(())
    }

    fn compile_script(&mut self, hat: &Block, w: &mut CodeWriter) -> CompileResult<()> {
        let op = match &hat.opcode {
            Opcode::Hat(op) => *op,
            other if other.is_stray_block_family() => {
                self.diagnostics
                    .debug(format!("Skipping loose top-level block '{}'", other));
                return Ok(());
            }
            other => {
                self.diagnostics
                    .warn(format!("Unknown or unimplemented toplevel block '{}'", other));
                return Ok(());
            }
        };

        match op {
            HatOp::WhenFlagClicked => {
                w.open("onStartListeners.push((async function() {");
                w.open("if (!isClone) {");
                self.compile_chain(hat.next.as_ref(), w)?;
                w.line("await this.screenRefresh();");
                w.close("}");
                w.close("}).bind(this));");
            }
            HatOp::WhenBroadcastReceived => {
                let name = hat.require_field("BROADCAST_OPTION")?;
                w.open("broadcastListeners.push({");
                w.line(format!("\"name\": {},", quoted(&name.value)));
                w.open("\"callback\": (async function() {");
                self.compile_chain(hat.next.as_ref(), w)?;
                w.line("await this.screenRefresh();");
                w.close("}).bind(this)");
                w.close("});");
            }
            HatOp::StartAsClone => {
                w.open("this.onStartAsClone.push((async function() {");
                self.compile_chain(hat.next.as_ref(), w)?;
                w.line("await this.screenRefresh();");
                w.close("}).bind(this));");
            }
            HatOp::ProcedureDefinition => {
                let meta = definition_meta(self.target, hat)?;
                if meta.warp {
                    self.diagnostics.debug(format!(
                        "Procedure {} runs without screen refresh in the editor; compiled with normal yields",
                        quoted(&meta.proc_code)
                    ));
                }
                w.open(format!(
                    "this.definedProcedures.set({}, {{",
                    quoted(&meta.proc_code)
                ));
                w.open("method: (async function(argsMethodArgs, argsArgMapping) {");
                let outer = self.scope.replace(meta);
                let body = self.compile_chain(hat.next.as_ref(), w);
                self.scope = outer;
                body?;
                w.close("}).bind(this),");
                w.line(format!("argumentids: {},", string_array(&meta.argument_ids)));
                w.line(format!("argumentnames: {},", string_array(&meta.argument_names)));
                w.close("});");
            }
            HatOp::WhenThisSpriteClicked
            | HatOp::WhenStageClicked
            | HatOp::WhenKeyPressed
            | HatOp::WhenBackdropSwitchesTo
            | HatOp::WhenGreaterThan => {
                self.diagnostics.warn(format!(
                    "Unsupported hat block '{}' in '{}'",
                    hat.opcode, self.target.name
                ));
            }
        }
        Ok(())
    }
}
