use super::literal::Coercion;
use super::TargetCompiler;
use crate::error::{CompileError, CompileResult};
use crate::opcode::{MenuOp, Opcode, ReporterOp};
use crate::project::{Block, Input, LiteralKind};
use crate::sanitize::{comment_text, is_numeric_text, js_number, parse_float, quoted};

pub(crate) enum MenuChoice {
    Fixed(String),
    Computed(String),
}

impl TargetCompiler<'_, '_> {
    pub(crate) fn compile_value(&mut self, block: &Block) -> CompileResult<String> {
        self.nested(block, |this| this.value_body(block))
    }

    fn value_body(&mut self, block: &Block) -> CompileResult<String> {
        let op = match &block.opcode {
            Opcode::Reporter(op) => *op,
            Opcode::Menu(menu) => {
                let field = block.require_field(menu.field_name())?;
                return Ok(quoted(&field.value));
            }
            Opcode::Hat(_) | Opcode::Statement(_) | Opcode::Prototype | Opcode::Unknown(_) => {
                self.diagnostics.warn(format!(
                    "Unknown or unimplemented value block '{}'",
                    block.opcode
                ));
                tracing::debug!(block = %block.raw(), "unimplemented value block");
                return Ok(format!(
                    "(/*Unimplemented value {}*/ null)",
                    comment_text(block.opcode.name())
                ));
            }
        };

        let code = match op {
            ReporterOp::And => self.binary(block, "OPERAND1", "&&", "OPERAND2", Coercion::Any)?,
            ReporterOp::Or => self.binary(block, "OPERAND1", "||", "OPERAND2", Coercion::Any)?,
            ReporterOp::Not => {
                let operand = self.input_value(block, "OPERAND", Coercion::Any)?;
                format!("(!{})", operand)
            }
            ReporterOp::Equals => self.binary(block, "OPERAND1", "==", "OPERAND2", Coercion::Any)?,
            ReporterOp::Gt => self.binary(block, "OPERAND1", ">", "OPERAND2", Coercion::Any)?,
            ReporterOp::Lt => self.binary(block, "OPERAND1", "<", "OPERAND2", Coercion::Any)?,
            ReporterOp::Add => self.binary(block, "NUM1", "+", "NUM2", Coercion::Numeric)?,
            ReporterOp::Subtract => self.binary(block, "NUM1", "-", "NUM2", Coercion::Numeric)?,
            ReporterOp::Multiply => self.binary(block, "NUM1", "*", "NUM2", Coercion::Numeric)?,
            ReporterOp::Divide => self.binary(block, "NUM1", "/", "NUM2", Coercion::Numeric)?,
            ReporterOp::Mod => self.binary(block, "NUM1", "%", "NUM2", Coercion::Numeric)?,
            ReporterOp::Round => {
                let operand = self.input_value(block, "NUM", Coercion::Numeric)?;
                format!("Math.round({})", operand)
            }
            ReporterOp::Random => self.random(block)?,
            ReporterOp::MathOp => self.math_op(block)?,
            ReporterOp::Join => {
                let left = self.input_value(block, "STRING1", Coercion::Any)?;
                let right = self.input_value(block, "STRING2", Coercion::Any)?;
                format!("(String({}) + String({}))", left, right)
            }
            ReporterOp::Contains => {
                let haystack = self.input_value(block, "STRING1", Coercion::Any)?;
                let needle = self.input_value(block, "STRING2", Coercion::Any)?;
                format!("(String({}).includes(String({})))", haystack, needle)
            }
            ReporterOp::Length => {
                let operand = self.input_value(block, "STRING", Coercion::Any)?;
                format!("(String({}).length)", operand)
            }
            ReporterOp::LetterOf => {
                let index = self.input_value(block, "LETTER", Coercion::Numeric)?;
                let text = self.input_value(block, "STRING", Coercion::Any)?;
                format!("(String({}).charAt({} - 1))", text, index)
            }
            ReporterOp::XPosition => "(this.x - 240)".to_string(),
            ReporterOp::YPosition => "(180 - this.y)".to_string(),
            ReporterOp::Direction => {
                "((90 - this.direction <= -180) ? (450 - this.direction) : (90 - this.direction))"
                    .to_string()
            }
            ReporterOp::MouseX => "(mouseX - 240)".to_string(),
            ReporterOp::MouseY => "(180 - mouseY)".to_string(),
            ReporterOp::MouseDown => "mouseBeingPressed".to_string(),
            ReporterOp::KeyPressed => self.key_pressed(block)?,
            ReporterOp::TouchingObject => {
                match self.menu_choice(block, "TOUCHINGOBJECTMENU", MenuOp::TouchingObjectMenu)? {
                    MenuChoice::Fixed(object) if object == "_mouse_" => {
                        "(await this.intersectsPoint(mouseX, mouseY))".to_string()
                    }
                    MenuChoice::Fixed(object) => {
                        self.diagnostics.warn(format!(
                            "Unsupported touching object {} on '{}'",
                            quoted(&object),
                            block.id
                        ));
                        "false".to_string()
                    }
                    MenuChoice::Computed(_) => {
                        self.diagnostics.warn(format!(
                            "Unsupported computed touching object on '{}'",
                            block.id
                        ));
                        "false".to_string()
                    }
                }
            }
            ReporterOp::Size => "this.size".to_string(),
            ReporterOp::CostumeNumberName => self.number_or_name(block, "this")?,
            ReporterOp::BackdropNumberName => self.number_or_name(block, "stageSprite")?,
            ReporterOp::Variable => {
                let key = block.require_field("VARIABLE")?.store_key();
                format!("this.getVariable({})", quoted(key))
            }
            ReporterOp::ListContents => {
                format!("{}.join(\" \")", self.list_ref(block)?)
            }
            ReporterOp::ItemOfList => {
                let list = self.list_ref(block)?;
                let index = self.input_value(block, "INDEX", Coercion::Numeric)?;
                format!("{}[{} - 1]", list, index)
            }
            ReporterOp::ItemNumOfList => {
                let list = self.list_ref(block)?;
                let item = self.input_value(block, "ITEM", Coercion::Any)?;
                format!("({}.indexOf({}) + 1)", list, item)
            }
            ReporterOp::ListContainsItem => {
                let list = self.list_ref(block)?;
                let item = self.input_value(block, "ITEM", Coercion::Any)?;
                format!("{}.includes({})", list, item)
            }
            ReporterOp::LengthOfList => format!("{}.length", self.list_ref(block)?),
            ReporterOp::ArgumentStringNumber => self.argument(block, "0")?,
            ReporterOp::ArgumentBoolean => self.argument(block, "false")?,
        };
        Ok(code)
    }

    fn binary(
        &mut self,
        block: &Block,
        left: &str,
        op: &str,
        right: &str,
        coercion: Coercion,
    ) -> CompileResult<String> {
        let left = self.input_value(block, left, coercion)?;
        let right = self.input_value(block, right, coercion)?;
        Ok(format!("({} {} {})", left, op, right))
    }

    fn random(&mut self, block: &Block) -> CompileResult<String> {
        if let (Some(from), Some(to)) = (
            constant_bound(block.input("FROM")),
            constant_bound(block.input("TO")),
        ) {
            let (f, t) = (js_number(from), js_number(to));
            return Ok(if from.fract() == 0.0 && to.fract() == 0.0 {
                format!("Math.floor(Math.random() * ({} - {} + 1) + {})", t, f, f)
            } else {
                format!("(Math.random() * ({} - {}) + {})", t, f, f)
            });
        }
        let from = self.input_value(block, "FROM", Coercion::Numeric)?;
        let to = self.input_value(block, "TO", Coercion::Numeric)?;
        Ok(format!(
            "((from, to) => (Number.isInteger(from) && Number.isInteger(to)) ? \
             Math.floor(Math.random() * (to - from + 1) + from) : \
             Math.random() * (to - from) + from)({}, {})",
            from, to
        ))
    }

    fn math_op(&mut self, block: &Block) -> CompileResult<String> {
        let operator = block.require_field("OPERATOR")?.value.clone();
        let x = self.input_value(block, "NUM", Coercion::Numeric)?;
        let code = match operator.as_str() {
            "abs" => format!("Math.abs({})", x),
            "floor" => format!("Math.floor({})", x),
            "ceiling" => format!("Math.ceil({})", x),
            "sqrt" => format!("Math.sqrt({})", x),
            "sin" => format!("Math.sin((Math.PI / 180) * {})", x),
            "cos" => format!("Math.cos((Math.PI / 180) * {})", x),
            "tan" => format!("Math.tan((Math.PI / 180) * {})", x),
            "asin" => format!("(Math.asin({}) * (180 / Math.PI))", x),
            "acos" => format!("(Math.acos({}) * (180 / Math.PI))", x),
            "atan" => format!("(Math.atan({}) * (180 / Math.PI))", x),
            "ln" => format!("Math.log({})", x),
            "log" => format!("Math.log10({})", x),
            "e ^" => format!("Math.exp({})", x),
            "10 ^" => format!("Math.pow(10, {})", x),
            _ => return Err(CompileError::UnknownMathOp(operator)),
        };
        Ok(code)
    }

    fn key_pressed(&mut self, block: &Block) -> CompileResult<String> {
        let key = match self.menu_choice(block, "KEY_OPTION", MenuOp::KeyOptions)? {
            MenuChoice::Fixed(key) => key,
            MenuChoice::Computed(_) => {
                self.diagnostics.warn(format!(
                    "Unsupported computed key in sensing_keypressed '{}'",
                    block.id
                ));
                return Ok("false".to_string());
            }
        };
        let code = match key.as_str() {
            "any" => return Ok("isAnyKeyDown()".to_string()),
            "space" => " ",
            "up arrow" => "ArrowUp",
            "down arrow" => "ArrowDown",
            "left arrow" => "ArrowLeft",
            "right arrow" => "ArrowRight",
            "enter" => "Enter",
            single if single.chars().count() == 1 => single,
            _ => return Err(CompileError::UnknownKey(key.clone())),
        };
        Ok(format!("(!!(pressedKeys.get({})))", quoted(code)))
    }

    fn number_or_name(&mut self, block: &Block, owner: &str) -> CompileResult<String> {
        let field = block.require_field("NUMBER_NAME")?;
        match field.value.as_str() {
            "name" => Ok(format!("({0}.costumes[{0}.currentCostume].name)", owner)),
            "number" => Ok(format!("({}.currentCostume + 1)", owner)),
            other => Err(CompileError::InvalidMenuValue {
                opcode: block.opcode.name().to_string(),
                field: "NUMBER_NAME".to_string(),
                value: other.to_string(),
            }),
        }
    }

    fn argument(&mut self, block: &Block, neutral: &str) -> CompileResult<String> {
        let name = &block.require_field("VALUE")?.value;
        let in_scope = self
            .scope
            .is_some_and(|meta| meta.argument_names.iter().any(|n| n == name));
        if in_scope {
            return Ok(format!(
                "argsMethodArgs[argsArgMapping.indexOf({})]",
                quoted(name)
            ));
        }
        self.diagnostics.debug(format!(
            "Argument reporter {} outside its procedure, using {}",
            quoted(name),
            neutral
        ));
        Ok(neutral.to_string())
    }

    pub(crate) fn list_ref(&self, block: &Block) -> CompileResult<String> {
        let key = block.require_field("LIST")?.store_key();
        Ok(format!("this.getListReference({})", quoted(key)))
    }

    pub(crate) fn menu_choice(
        &mut self,
        block: &Block,
        slot: &str,
        menu: MenuOp,
    ) -> CompileResult<MenuChoice> {
        let input = block.input(slot).ok_or_else(|| CompileError::MalformedInput {
            block: block.id.to_string(),
            slot: slot.to_string(),
            detail: "missing menu input".to_string(),
        })?;
        match input {
            Input::Block { id, shadow } => {
                let target = self.block(id)?;
                if target.opcode == Opcode::Menu(menu) && shadow.is_none() {
                    let field = target.require_field(menu.field_name())?;
                    return Ok(MenuChoice::Fixed(field.value.clone()));
                }
                if shadow.is_some() || matches!(target.opcode, Opcode::Reporter(_)) {
                    return Ok(MenuChoice::Computed(self.compile_value(target)?));
                }
                Err(CompileError::MalformedInput {
                    block: block.id.to_string(),
                    slot: slot.to_string(),
                    detail: format!("expected a menu block, found '{}'", target.opcode),
                })
            }
            other => Ok(MenuChoice::Computed(self.resolve(
                block,
                slot,
                other,
                Coercion::Any,
            )?)),
        }
    }
}

fn constant_bound(input: Option<&Input>) -> Option<f64> {
    match input {
        Some(Input::Literal { kind, raw })
            if kind.is_numeric() || (*kind == LiteralKind::String && is_numeric_text(raw)) =>
        {
            let value = parse_float(raw);
            value.is_finite().then_some(value)
        }
        _ => None,
    }
}
