use super::{CodeWriter, TargetCompiler};
use crate::diagnostics::Diagnostics;
use crate::error::CompileResult;
use crate::project::Target;
use crate::sanitize::{js_number, json_literal, quoted};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct TargetDescriptor {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub direction: f64,
    pub costumes: Value,
    pub current_costume: i64,
    pub rotation_style: String,
    pub variables: Value,
    pub lists: Value,
    pub is_stage: bool,
    pub visible: bool,
    pub global_variables: Vec<(String, Value)>,
    pub global_lists: Vec<(String, Value)>,
    pub scripts: String,
}

/// Stored (editor) direction to the runtime convention used by `this.direction`.
pub fn runtime_direction(direction: f64) -> f64 {
    if 90.0 - direction > 0.0 {
        90.0 - direction
    } else {
        450.0 - direction
    }
}

pub fn compile_target(target: &Target, diagnostics: &mut Diagnostics) -> CompileResult<TargetDescriptor> {
    let mut writer = CodeWriter::new(3);
    TargetCompiler::new(target, diagnostics)?.compile_scripts(&mut writer)?;
    let scripts = writer.finish();

    let costumes = Value::Array(target.costumes.iter().map(|c| c.to_json()).collect());
    let descriptor = if target.is_stage {
        TargetDescriptor {
            name: target.name.clone(),
            x: 240.0,
            y: 180.0,
            size: 100.0,
            direction: 0.0,
            costumes,
            current_costume: target.current_costume,
            rotation_style: "all around".to_string(),
            variables: Value::Object(Map::new()),
            lists: Value::Object(Map::new()),
            is_stage: true,
            visible: true,
            global_variables: target
                .variables
                .iter()
                .map(|v| (v.id.clone(), v.value.clone()))
                .collect(),
            global_lists: target
                .lists
                .iter()
                .map(|l| (l.id.clone(), Value::Array(l.items.clone())))
                .collect(),
            scripts,
        }
    } else {
        TargetDescriptor {
            name: target.name.clone(),
            x: 240.0 + target.x,
            y: 180.0 - target.y,
            size: target.size,
            direction: runtime_direction(target.direction),
            costumes,
            current_costume: target.current_costume,
            rotation_style: target.rotation_style.clone(),
            variables: Value::Object(
                target
                    .variables
                    .iter()
                    .map(|v| (v.id.clone(), v.value.clone()))
                    .collect(),
            ),
            lists: Value::Object(
                target
                    .lists
                    .iter()
                    .map(|l| (l.id.clone(), Value::Array(l.items.clone())))
                    .collect(),
            ),
            is_stage: false,
            visible: target.visible,
            global_variables: Vec::new(),
            global_lists: Vec::new(),
            scripts,
        }
    };
    Ok(descriptor)
}

impl TargetDescriptor {
    pub fn render(&self) -> String {
        let mut w = CodeWriter::new(0);
        for (id, value) in &self.global_variables {
            w.line(format!(
                "globalVariables.set({}, {});",
                quoted(id),
                json_literal(value)
            ));
        }
        for (id, items) in &self.global_lists {
            w.line(format!("globalLists.set({}, {});", quoted(id), json_literal(items)));
        }
        w.open("targets.push({");
        w.open("ctor: await createSpriteConstructor(");
        for arg in [
            quoted(&self.name),
            js_number(self.x),
            js_number(self.y),
            js_number(self.size),
            js_number(self.direction),
            json_literal(&self.costumes),
            self.current_costume.to_string(),
            quoted(&self.rotation_style),
            json_literal(&self.variables),
            json_literal(&self.lists),
            self.is_stage.to_string(),
        ] {
            w.line(format!("{},", arg));
        }
        w.open("function(isClone) {");
        let mut out = w.finish();
        out.push_str(&self.scripts);

        let mut w = CodeWriter::new(3);
        w.close("}");
        w.close("),");
        w.line(format!("visible: {},", self.visible));
        w.close("});");
        out.push_str(&w.finish());
        out
    }
}
