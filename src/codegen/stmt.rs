use super::expr::MenuChoice;
use super::literal::Coercion;
use super::{CodeWriter, TargetCompiler};
use crate::error::{CompileError, CompileResult};
use crate::opcode::{MenuOp, Opcode, StatementOp};
use crate::project::{Block, Input};
use crate::sanitize::{comment_text, json_literal, quoted};

const RANDOM_POSITION: &str =
    "Math.floor(Math.random() * 480 - 240), Math.floor(Math.random() * 360 - 180)";
const MOUSE_POSITION: &str = "mouseX - 240, 180 - mouseY";
const EFFECTS: &[&str] = &[
    "color",
    "fisheye",
    "whirl",
    "pixelate",
    "mosaic",
    "brightness",
    "ghost",
];

impl TargetCompiler<'_, '_> {
    pub(crate) fn compile_statement(&mut self, block: &Block, w: &mut CodeWriter) -> CompileResult<()> {
        self.nested(block, |this| {
            w.open("{");
            this.statement_body(block, w)?;
            w.close("}");
            Ok(())
        })
    }

    pub(crate) fn compile_substack(
        &mut self,
        block: &Block,
        slot: &str,
        w: &mut CodeWriter,
    ) -> CompileResult<()> {
        let start = match block.input(slot) {
            None | Some(Input::Empty) => return Ok(()),
            Some(Input::Block { id, .. }) => id,
            Some(other) => {
                return Err(CompileError::MalformedInput {
                    block: block.id.to_string(),
                    slot: slot.to_string(),
                    detail: format!("substack must reference a block, found {:?}", other),
                })
            }
        };
        self.compile_chain(Some(start), w)
    }

    pub(crate) fn compile_chain(
        &mut self,
        start: Option<&crate::project::BlockId>,
        w: &mut CodeWriter,
    ) -> CompileResult<()> {
        let target = self.target;
        for block in target.blocks.chain(start)? {
            self.compile_statement(block, w)?;
        }
        Ok(())
    }

    fn statement_body(&mut self, block: &Block, w: &mut CodeWriter) -> CompileResult<()> {
        let op = match &block.opcode {
            Opcode::Statement(op) => *op,
            Opcode::Hat(_)
            | Opcode::Reporter(_)
            | Opcode::Menu(_)
            | Opcode::Prototype
            | Opcode::Unknown(_) => {
                self.diagnostics
                    .warn(format!("Unknown or unimplemented block '{}'", block.opcode));
                tracing::debug!(block = %block.raw(), "unimplemented statement block");
                w.line(format!("// Unknown block {}", comment_text(block.opcode.name())));
                return Ok(());
            }
        };

        match op {
            StatementOp::MoveSteps => {
                let steps = self.input_value(block, "STEPS", Coercion::Numeric)?;
                w.line(format!("const steps = {};", steps));
                w.line("this.changeXBy(Math.cos(this.direction * Math.PI / 180) * steps);");
                w.line("this.changeYBy(Math.sin(this.direction * Math.PI / 180) * steps);");
            }
            StatementOp::GoToXY => {
                let x = self.input_value(block, "X", Coercion::Numeric)?;
                let y = self.input_value(block, "Y", Coercion::Numeric)?;
                w.line(format!("this.moveTo({}, {});", x, y));
            }
            StatementOp::GoTo => {
                if let Some(position) = self.destination(block, "TO", MenuOp::GoToMenu)? {
                    w.line(format!("this.moveTo({});", position));
                }
            }
            StatementOp::ChangeXBy => {
                let dx = self.input_value(block, "DX", Coercion::Numeric)?;
                w.line(format!("this.changeXBy({});", dx));
            }
            StatementOp::ChangeYBy => {
                let dy = self.input_value(block, "DY", Coercion::Numeric)?;
                w.line(format!("this.changeYBy({});", dy));
            }
            StatementOp::SetX => {
                let x = self.input_value(block, "X", Coercion::Numeric)?;
                w.line(format!("this.moveTo({}, 180 - this.y);", x));
            }
            StatementOp::SetY => {
                let y = self.input_value(block, "Y", Coercion::Numeric)?;
                w.line(format!("this.moveTo(this.x - 240, {});", y));
            }
            StatementOp::TurnLeft => {
                let degrees = self.input_value(block, "DEGREES", Coercion::Numeric)?;
                w.line(format!("this.turn({});", degrees));
            }
            StatementOp::TurnRight => {
                let degrees = self.input_value(block, "DEGREES", Coercion::Numeric)?;
                w.line(format!("this.turn(-({}));", degrees));
            }
            StatementOp::PointTowards => {
                match self.menu_choice(block, "TOWARDS", MenuOp::PointTowardsMenu)? {
                    MenuChoice::Fixed(towards) if towards == "_mouse_" => {
                        w.line("this.pointTowardsMouse();");
                    }
                    MenuChoice::Fixed(towards) => self.diagnostics.warn(format!(
                        "Unsupported point towards target {} on '{}'",
                        quoted(&towards),
                        block.id
                    )),
                    MenuChoice::Computed(_) => self.diagnostics.warn(format!(
                        "Unsupported computed point towards target on '{}'",
                        block.id
                    )),
                }
            }
            StatementOp::PointInDirection => {
                let direction = self.input_value(block, "DIRECTION", Coercion::Numeric)?;
                w.line(format!("const direction = {};", direction));
                w.line(
                    "this.direction = (90 - direction > 0) ? (90 - direction) : (450 - direction);",
                );
            }
            StatementOp::SetRotationStyle => {
                let style = block.require_field("STYLE")?;
                w.line(format!("this.rotationStyle = {};", quoted(&style.value)));
            }
            StatementOp::GlideSecsToXY => {
                let secs = self.input_value(block, "SECS", Coercion::Numeric)?;
                let x = self.input_value(block, "X", Coercion::Numeric)?;
                let y = self.input_value(block, "Y", Coercion::Numeric)?;
                w.line(format!("await this.glideXYSecs({}, {}, {});", secs, x, y));
            }
            StatementOp::GlideTo => {
                let secs = self.input_value(block, "SECS", Coercion::Numeric)?;
                if let Some(position) = self.destination(block, "TO", MenuOp::GlideToMenu)? {
                    w.line(format!("await this.glideXYSecs({}, {});", secs, position));
                }
            }
            StatementOp::SwitchCostumeTo => {
                let costume = self.appearance(block, "COSTUME", MenuOp::Costume)?;
                w.line(format!("this.changeCostume({});", costume));
            }
            StatementOp::SwitchBackdropTo => {
                let backdrop = self.appearance(block, "BACKDROP", MenuOp::Backdrops)?;
                w.line(format!("stageSprite.changeCostume({});", backdrop));
            }
            StatementOp::NextCostume => w.line("this.nextCostume();"),
            StatementOp::NextBackdrop => w.line("stageSprite.nextCostume();"),
            StatementOp::ChangeEffectBy => {
                let change = self.input_value(block, "CHANGE", Coercion::Numeric)?;
                let effect = self.effect(block)?;
                w.line(format!("this.effects[{}] += {};", quoted(&effect), change));
            }
            StatementOp::SetEffectTo => {
                let value = self.input_value(block, "VALUE", Coercion::Numeric)?;
                let effect = self.effect(block)?;
                w.line(format!("this.effects[{}] = {};", quoted(&effect), value));
            }
            StatementOp::ClearGraphicEffects => {
                w.open("for (const effect in this.effects) {");
                w.line("this.effects[effect] = 0;");
                w.close("}");
            }
            StatementOp::ChangeSizeBy => {
                let change = self.input_value(block, "CHANGE", Coercion::Numeric)?;
                w.line(format!("this.size += {};", change));
            }
            StatementOp::SetSizeTo => {
                let size = self.input_value(block, "SIZE", Coercion::Numeric)?;
                w.line(format!("this.size = {};", size));
            }
            StatementOp::Show => w.line("this.visible = true;"),
            StatementOp::Hide => w.line("this.visible = false;"),
            StatementOp::GoToFrontBack => {
                let field = block.require_field("FRONT_BACK")?;
                let insert = match field.value.as_str() {
                    "front" => "push",
                    "back" => "unshift",
                    other => {
                        return Err(CompileError::InvalidMenuValue {
                            opcode: block.opcode.name().to_string(),
                            field: "FRONT_BACK".to_string(),
                            value: other.to_string(),
                        })
                    }
                };
                w.open("if (renderList.includes(this)) {");
                w.line(format!(
                    "renderList.{}(renderList.splice(renderList.indexOf(this), 1)[0]);",
                    insert
                ));
                w.close("}");
            }
            StatementOp::SayForSecs => {
                let message = self.input_value(block, "MESSAGE", Coercion::Any)?;
                let secs = self.input_value(block, "SECS", Coercion::Numeric)?;
                w.line(format!("await this.sayAndWait({}, {} * 1000);", message, secs));
            }
            StatementOp::Wait => {
                let duration = self.input_value(block, "DURATION", Coercion::Numeric)?;
                w.line(format!(
                    "await new Promise((resolve) => setTimeout(resolve, {} * 1000));",
                    duration
                ));
            }
            StatementOp::Forever => {
                w.open("while (true) {");
                self.compile_substack(block, "SUBSTACK", w)?;
                w.line("await this.screenRefresh();");
                w.close("}");
            }
            StatementOp::Repeat => {
                let times = self.input_value(block, "TIMES", Coercion::Numeric)?;
                w.line(format!("const _times = {};", times));
                w.line("let _i = 0;");
                w.open("while (_i < _times) {");
                self.compile_substack(block, "SUBSTACK", w)?;
                w.line("_i++;");
                w.line("await this.screenRefresh();");
                w.close("}");
            }
            StatementOp::RepeatUntil => {
                let condition = self.input_value(block, "CONDITION", Coercion::Any)?;
                w.open(format!("while (!({})) {{", condition));
                self.compile_substack(block, "SUBSTACK", w)?;
                w.line("await this.screenRefresh();");
                w.close("}");
            }
            StatementOp::WaitUntil => {
                let condition = self.input_value(block, "CONDITION", Coercion::Any)?;
                w.open(format!("while (!({})) {{", condition));
                w.line("await this.screenRefresh();");
                w.close("}");
            }
            StatementOp::If => {
                let condition = self.input_value(block, "CONDITION", Coercion::Any)?;
                w.open(format!("if ({}) {{", condition));
                self.compile_substack(block, "SUBSTACK", w)?;
                w.close("}");
            }
            StatementOp::IfElse => {
                let condition = self.input_value(block, "CONDITION", Coercion::Any)?;
                w.open(format!("if ({}) {{", condition));
                self.compile_substack(block, "SUBSTACK", w)?;
                w.reopen("} else {");
                self.compile_substack(block, "SUBSTACK2", w)?;
                w.close("}");
            }
            StatementOp::CreateCloneOf => {
                match self.menu_choice(block, "CLONE_OPTION", MenuOp::CloneOfMenu)? {
                    MenuChoice::Fixed(option) if option == "_myself_" => {
                        w.line("const sprite = new (this.createSelf)(true, this.visible);");
                        w.line("await sprite.waitForInit();");
                        w.line("renderList.push(sprite);");
                    }
                    MenuChoice::Fixed(option) => self.diagnostics.warn(format!(
                        "Unsupported clone target {} on '{}'",
                        quoted(&option),
                        block.id
                    )),
                    MenuChoice::Computed(_) => self.diagnostics.warn(format!(
                        "Unsupported computed clone target on '{}'",
                        block.id
                    )),
                }
            }
            StatementOp::DeleteThisClone => {
                w.open("if (this.isClone && renderList.includes(this)) {");
                w.line("renderList.splice(renderList.indexOf(this), 1);");
                w.close("}");
                w.line("return;");
            }
            StatementOp::SetVariableTo => {
                let key = block.require_field("VARIABLE")?.store_key();
                let value = self.input_value(block, "VALUE", Coercion::Any)?;
                w.line(format!("this.setVariable({}, {});", quoted(key), value));
            }
            StatementOp::ChangeVariableBy => {
                let key = block.require_field("VARIABLE")?.store_key();
                let value = self.input_value(block, "VALUE", Coercion::Numeric)?;
                w.line(format!("this.changeVariableBy({}, {});", quoted(key), value));
            }
            StatementOp::AddToList => {
                let list = self.list_ref(block)?;
                let item = self.input_value(block, "ITEM", Coercion::Any)?;
                w.line(format!("{}.push({});", list, item));
            }
            StatementOp::DeleteAllOfList => {
                w.line(format!("{}.length = 0;", self.list_ref(block)?));
            }
            StatementOp::InsertAtList => {
                let list = self.list_ref(block)?;
                let item = self.input_value(block, "ITEM", Coercion::Any)?;
                let index = self.input_value(block, "INDEX", Coercion::Numeric)?;
                w.line(format!("const listRef = {};", list));
                w.line(format!("const index = {} - 1;", index));
                w.open("if (index >= 0 && index <= listRef.length) {");
                w.line(format!("listRef.splice(index, 0, {});", item));
                w.close("}");
            }
            StatementOp::ReplaceItemOfList => {
                let list = self.list_ref(block)?;
                let item = self.input_value(block, "ITEM", Coercion::Any)?;
                let index = self.input_value(block, "INDEX", Coercion::Numeric)?;
                w.line(format!("const listRef = {};", list));
                w.line(format!("const index = {} - 1;", index));
                w.open("if (index >= 0 && index < listRef.length) {");
                w.line(format!("listRef[index] = {};", item));
                w.close("}");
            }
            StatementOp::DeleteOfList => {
                let list = self.list_ref(block)?;
                let index = self.input_value(block, "INDEX", Coercion::Numeric)?;
                w.line(format!("const listRef = {};", list));
                w.line(format!("const index = {} - 1;", index));
                w.open("if (index >= 0 && index < listRef.length) {");
                w.line("listRef.splice(index, 1);");
                w.close("}");
            }
            StatementOp::Broadcast => {
                let name = self.input_value(block, "BROADCAST_INPUT", Coercion::Any)?;
                w.line(format!("pendingBroadcasts.add({});", name));
            }
            StatementOp::BroadcastAndWait => {
                let name = self.input_value(block, "BROADCAST_INPUT", Coercion::Any)?;
                w.line(format!("await handleBroadcastSync({});", name));
            }
            StatementOp::ProcedureCall => self.procedure_call(block, w)?,
        }
        Ok(())
    }

    fn destination(
        &mut self,
        block: &Block,
        slot: &str,
        menu: MenuOp,
    ) -> CompileResult<Option<&'static str>> {
        match self.menu_choice(block, slot, menu)? {
            MenuChoice::Fixed(to) => match to.as_str() {
                "_random_" => Ok(Some(RANDOM_POSITION)),
                "_mouse_" => Ok(Some(MOUSE_POSITION)),
                _ => {
                    self.diagnostics.warn(format!(
                        "Unsupported '{}' destination {} on '{}'",
                        block.opcode,
                        quoted(&to),
                        block.id
                    ));
                    Ok(None)
                }
            },
            MenuChoice::Computed(_) => {
                self.diagnostics.warn(format!(
                    "Unsupported computed '{}' destination on '{}'",
                    block.opcode, block.id
                ));
                Ok(None)
            }
        }
    }

    fn appearance(&mut self, block: &Block, slot: &str, menu: MenuOp) -> CompileResult<String> {
        Ok(match self.menu_choice(block, slot, menu)? {
            MenuChoice::Fixed(name) => quoted(&name),
            MenuChoice::Computed(code) => code,
        })
    }

    fn effect(&self, block: &Block) -> CompileResult<String> {
        let field = block.require_field("EFFECT")?;
        let effect = field.value.to_lowercase();
        if EFFECTS.contains(&effect.as_str()) {
            Ok(effect)
        } else {
            Err(CompileError::InvalidMenuValue {
                opcode: block.opcode.name().to_string(),
                field: "EFFECT".to_string(),
                value: field.value.clone(),
            })
        }
    }

    fn procedure_call(&mut self, block: &Block, w: &mut CodeWriter) -> CompileResult<()> {
        let meta = block
            .mutation
            .as_ref()
            .ok_or_else(|| CompileError::MissingField {
                block: block.id.to_string(),
                slot: "mutation.proccode".to_string(),
            })?;
        if !self.procedures.contains(meta.proc_code.as_str()) {
            self.diagnostics.warn(format!(
                "Call to undefined procedure {} in '{}'",
                quoted(&meta.proc_code),
                self.target.name
            ));
            w.line("// Unresolved procedure call");
            return Ok(());
        }
        let mut args = Vec::with_capacity(meta.argument_ids.len());
        for argument_id in &meta.argument_ids {
            args.push(self.input_value(block, argument_id, Coercion::Any)?);
        }
        w.line(format!(
            "const procInfo = this.definedProcedures.get({});",
            quoted(&meta.proc_code)
        ));
        w.open("const methodArgs = [");
        for arg in args {
            w.line(format!("{},", arg));
        }
        w.close("];");
        w.open("if (procInfo) {");
        w.line("await (procInfo.method)(methodArgs, procInfo.argumentnames);");
        w.close("}");
        Ok(())
    }
}

pub(crate) fn string_array(items: &[String]) -> String {
    json_literal(&serde_json::Value::from(items.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{compile_sprite, compile_statement};
    use crate::diagnostics::Severity;
    use crate::error::CompileError;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn statement(opcode: &str, inputs: Value, fields: Value) -> Value {
        json!({
            "s": {"opcode": opcode, "next": null, "topLevel": true,
                "inputs": inputs, "fields": fields}
        })
    }

    fn compile(blocks: Value) -> String {
        compile_statement(blocks, "s").unwrap().0
    }

    fn with_menu(opcode: &str, slot: &str, menu_opcode: &str, field: &str, value: &str) -> Value {
        json!({
            "s": {"opcode": opcode, "next": null, "topLevel": true,
                "inputs": {slot: [1, "menu"], "SECS": [1, [4, "2"]]}, "fields": {}},
            "menu": {"opcode": menu_opcode, "next": null, "parent": "s", "shadow": true,
                "inputs": {}, "fields": {field: [value, null]}}
        })
    }

    #[test]
    fn repeat_counts_then_yields() {
        let blocks = json!({
            "s": {"opcode": "control_repeat", "next": null, "topLevel": true,
                "inputs": {"TIMES": [1, [6, "3"]], "SUBSTACK": [2, "body"]}, "fields": {}},
            "body": {"opcode": "motion_changexby", "next": null, "parent": "s",
                "inputs": {"DX": [1, [4, "10"]]}, "fields": {}}
        });
        assert_eq!(
            compile(blocks),
            "{\n\
             \x20   const _times = 3;\n\
             \x20   let _i = 0;\n\
             \x20   while (_i < _times) {\n\
             \x20       {\n\
             \x20           this.changeXBy(10);\n\
             \x20       }\n\
             \x20       _i++;\n\
             \x20       await this.screenRefresh();\n\
             \x20   }\n\
             }\n"
        );
    }

    #[test]
    fn loops_yield_exactly_once_per_iteration() {
        for opcode in ["control_forever", "control_repeat", "control_repeat_until"] {
            let blocks = json!({
                "s": {"opcode": opcode, "next": null, "topLevel": true,
                    "inputs": {"TIMES": [1, [6, "2"]], "SUBSTACK": [2, "inner"]}, "fields": {}},
                "inner": {"opcode": "looks_show", "next": null, "parent": "s",
                    "inputs": {}, "fields": {}}
            });
            let code = compile(blocks);
            assert_eq!(code.matches("await this.screenRefresh();").count(), 1, "{}", opcode);
            let body = code.find("this.visible = true;").unwrap();
            let yield_at = code.find("await this.screenRefresh();").unwrap();
            assert!(body < yield_at, "{}", opcode);
        }
    }

    #[test]
    fn empty_loop_bodies_still_yield() {
        let forever = compile(statement("control_forever", json!({}), json!({})));
        assert!(forever.contains("while (true) {"));
        assert!(forever.contains("await this.screenRefresh();"));
        let until = compile(statement("control_repeat_until", json!({"CONDITION": [1, null]}), json!({})));
        assert!(until.contains("while (!(null)) {"));
        let wait = compile(statement("control_wait_until", json!({}), json!({})));
        assert!(wait.contains("await this.screenRefresh();"));
    }

    #[test]
    fn if_else_with_empty_branches() {
        assert_eq!(
            compile(statement("control_if_else", json!({}), json!({}))),
            "{\n    if (null) {\n    } else {\n    }\n}\n"
        );
    }

    #[test]
    fn motion_formulas() {
        assert!(compile(statement(
            "motion_turnright",
            json!({"DEGREES": [1, [8, "-15"]]}),
            json!({})
        ))
        .contains("this.turn(-(-15));"));
        assert!(compile(statement("motion_setx", json!({"X": [1, [4, "5"]]}), json!({})))
            .contains("this.moveTo(5, 180 - this.y);"));
        assert!(compile(statement("motion_sety", json!({"Y": [1, [4, "5"]]}), json!({})))
            .contains("this.moveTo(this.x - 240, 5);"));
        let moved = compile(statement(
            "motion_movesteps",
            json!({"STEPS": [1, [4, "10"]]}),
            json!({}),
        ));
        assert_eq!(moved.matches("10").count(), 1);
        assert!(moved.contains("const steps = 10;"));
    }

    #[test]
    fn go_to_random_and_mouse() {
        assert!(compile(with_menu("motion_goto", "TO", "motion_goto_menu", "TO", "_random_"))
            .contains("this.moveTo(Math.floor(Math.random() * 480 - 240), Math.floor(Math.random() * 360 - 180));"));
        assert!(compile(with_menu("motion_goto", "TO", "motion_goto_menu", "TO", "_mouse_"))
            .contains("this.moveTo(mouseX - 240, 180 - mouseY);"));
        assert!(compile(with_menu("motion_glideto", "TO", "motion_glideto_menu", "TO", "_mouse_"))
            .contains("await this.glideXYSecs(2, mouseX - 240, 180 - mouseY);"));
        let (code, diagnostics) = compile_statement(
            with_menu("motion_goto", "TO", "motion_goto_menu", "TO", "Cat"),
            "s",
        )
        .unwrap();
        assert!(!code.contains("moveTo"));
        assert_eq!(diagnostics.count(Severity::Warning), 1);
    }

    #[test]
    fn switch_costume_forms() {
        assert!(compile(with_menu(
            "looks_switchcostumeto",
            "COSTUME",
            "looks_costume",
            "COSTUME",
            "costume2"
        ))
        .contains("this.changeCostume(\"costume2\");"));

        let computed = compile(json!({
            "s": {"opcode": "looks_switchcostumeto", "next": null, "topLevel": true,
                "inputs": {"COSTUME": [3, "var", "menu"]}, "fields": {}},
            "var": {"opcode": "data_variable", "next": null, "parent": "s",
                "inputs": {}, "fields": {"VARIABLE": ["score", "v1"]}},
            "menu": {"opcode": "looks_costume", "next": null, "parent": "s", "shadow": true,
                "inputs": {}, "fields": {"COSTUME": ["costume1", null]}}
        }));
        assert!(computed.contains("this.changeCostume(this.getVariable(\"v1\"));"));

        assert!(compile(json!({
            "s": {"opcode": "looks_switchcostumeto", "next": null, "topLevel": true,
                "inputs": {"COSTUME": [3, [12, "score", "v1"], "menu"]}, "fields": {}},
            "menu": {"opcode": "looks_costume", "next": null, "parent": "s", "shadow": true,
                "inputs": {}, "fields": {"COSTUME": ["costume1", null]}}
        }))
        .contains("this.changeCostume(this.getVariable(\"v1\"));"));

        assert!(compile(with_menu(
            "looks_switchbackdropto",
            "BACKDROP",
            "looks_backdrops",
            "BACKDROP",
            "night"
        ))
        .contains("stageSprite.changeCostume(\"night\");"));
    }

    #[test]
    fn switch_costume_without_menu_is_fatal() {
        let err = compile_statement(statement("looks_switchcostumeto", json!({}), json!({})), "s")
            .unwrap_err();
        assert!(matches!(err, CompileError::MalformedInput { .. }));
        let err = compile_statement(
            json!({
                "s": {"opcode": "looks_switchcostumeto", "next": null, "topLevel": true,
                    "inputs": {"COSTUME": [1, "other"]}, "fields": {}},
                "other": {"opcode": "looks_show", "next": null, "inputs": {}, "fields": {}}
            }),
            "s",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::MalformedInput { .. }));
    }

    #[test]
    fn effects_are_validated() {
        assert!(compile(statement(
            "looks_changeeffectby",
            json!({"CHANGE": [1, [4, "25"]]}),
            json!({"EFFECT": ["GHOST", null]})
        ))
        .contains("this.effects[\"ghost\"] += 25;"));
        let err = compile_statement(
            statement(
                "looks_seteffectto",
                json!({"VALUE": [1, [4, "0"]]}),
                json!({"EFFECT": ["\"]; alert(1); //", null]}),
            ),
            "s",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::InvalidMenuValue { .. }));
    }

    #[test]
    fn list_mutations_are_bounds_checked() {
        let insert = compile(statement(
            "data_insertatlist",
            json!({"ITEM": [1, [10, "x"]], "INDEX": [1, [7, "1"]]}),
            json!({"LIST": ["items", "l1"]}),
        ));
        assert!(insert.contains("const index = 1 - 1;"));
        assert!(insert.contains("if (index >= 0 && index <= listRef.length) {"));
        let delete = compile(statement(
            "data_deleteoflist",
            json!({"INDEX": [1, [7, "3"]]}),
            json!({"LIST": ["items", "l1"]}),
        ));
        assert!(delete.contains("if (index >= 0 && index < listRef.length) {"));
        assert!(delete.contains("listRef.splice(index, 1);"));
        let replace = compile(statement(
            "data_replaceitemoflist",
            json!({"ITEM": [1, [10, "y"]], "INDEX": [1, [7, "2"]]}),
            json!({"LIST": ["items", "l1"]}),
        ));
        assert!(replace.contains("listRef[index] = \"y\";"));
    }

    #[test]
    fn variables_are_addressed_by_id() {
        assert!(compile(statement(
            "data_setvariableto",
            json!({"VALUE": [1, [10, "hi"]]}),
            json!({"VARIABLE": ["score", "v1"]})
        ))
        .contains("this.setVariable(\"v1\", \"hi\");"));
        assert!(compile(statement(
            "data_changevariableby",
            json!({"VALUE": [1, [4, "1"]]}),
            json!({"VARIABLE": ["score", "v1"]})
        ))
        .contains("this.changeVariableBy(\"v1\", 1);"));
    }

    #[test]
    fn broadcasts_use_the_sanitized_name() {
        assert!(compile(statement(
            "event_broadcast",
            json!({"BROADCAST_INPUT": [1, [11, "go \"now\"", "b1"]]}),
            json!({})
        ))
        .contains("pendingBroadcasts.add(\"go \\\"now\\\"\");"));
        assert!(compile(statement(
            "event_broadcastandwait",
            json!({"BROADCAST_INPUT": [1, [11, "go", "b1"]]}),
            json!({})
        ))
        .contains("await handleBroadcastSync(\"go\");"));
    }

    #[test]
    fn unresolved_procedure_call_is_a_no_op() {
        let (code, diagnostics) = compile_statement(
            json!({
                "s": {"opcode": "procedures_call", "next": null, "topLevel": true,
                    "inputs": {"a1": [1, [10, "x"]]}, "fields": {},
                    "mutation": {"tagName": "mutation", "children": [], "proccode": "missing %s",
                        "argumentids": "[\"a1\"]", "warp": "false"}}
            }),
            "s",
        )
        .unwrap();
        assert_eq!(code, "{\n    // Unresolved procedure call\n}\n");
        assert_eq!(diagnostics.count(Severity::Warning), 1);
    }

    #[test]
    fn unknown_statement_is_a_comment() {
        let (code, diagnostics) =
            compile_statement(statement("pen_clear", json!({}), json!({})), "s").unwrap();
        assert_eq!(code, "{\n    // Unknown block pen_clear\n}\n");
        assert!(diagnostics.contains(Severity::Warning, "pen_clear"));
    }

    #[test]
    fn delete_this_clone_always_ends_the_script() {
        let code = compile(statement("control_delete_this_clone", json!({}), json!({})));
        assert_eq!(
            code,
            "{\n\
             \x20   if (this.isClone && renderList.includes(this)) {\n\
             \x20       renderList.splice(renderList.indexOf(this), 1);\n\
             \x20   }\n\
             \x20   return;\n\
             }\n"
        );
    }

    #[test]
    fn substack_cycle_is_fatal() {
        let err = compile_statement(
            json!({
                "s": {"opcode": "control_forever", "next": null, "topLevel": true,
                    "inputs": {"SUBSTACK": [2, "s"]}, "fields": {}}
            }),
            "s",
        )
        .unwrap_err();
        assert_eq!(
            err,
            CompileError::CyclicChain {
                target: "Sprite1".to_string(),
                id: "s".to_string()
            }
        );
    }

    #[test]
    fn clone_of_myself() {
        let code = compile(json!({
            "s": {"opcode": "control_create_clone_of", "next": null, "topLevel": true,
                "inputs": {"CLONE_OPTION": [1, "menu"]}, "fields": {}},
            "menu": {"opcode": "control_create_clone_of_menu", "next": null, "shadow": true,
                "inputs": {}, "fields": {"CLONE_OPTION": ["_myself_", null]}}
        }));
        assert!(code.contains("const sprite = new (this.createSelf)(true, this.visible);"));
        assert!(code.contains("await sprite.waitForInit();"));
    }

    #[test]
    fn substack_chain_keeps_order() {
        let (scripts, _) = compile_sprite(json!({
            "hat": {"opcode": "event_whenflagclicked", "next": "a", "topLevel": true,
                "inputs": {}, "fields": {}},
            "a": {"opcode": "looks_hide", "next": "b", "inputs": {}, "fields": {}},
            "b": {"opcode": "looks_show", "next": null, "inputs": {}, "fields": {}}
        }));
        let hide = scripts.find("this.visible = false;").unwrap();
        let show = scripts.find("this.visible = true;").unwrap();
        assert!(hide < show);
    }
}
