use crate::error::{CompileError, CompileResult};
use crate::opcode::Opcode;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BlockId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    PositiveNumber,
    PositiveInteger,
    Integer,
    Angle,
    Color,
    String,
    Broadcast,
}

impl LiteralKind {
    fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            4 => LiteralKind::Number,
            5 => LiteralKind::PositiveNumber,
            6 => LiteralKind::PositiveInteger,
            7 => LiteralKind::Integer,
            8 => LiteralKind::Angle,
            9 => LiteralKind::Color,
            10 => LiteralKind::String,
            11 => LiteralKind::Broadcast,
            _ => return None,
        })
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            LiteralKind::Number
                | LiteralKind::PositiveNumber
                | LiteralKind::PositiveInteger
                | LiteralKind::Integer
                | LiteralKind::Angle
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Empty,
    Literal {
        kind: LiteralKind,
        raw: String,
    },
    Block {
        id: BlockId,
        shadow: Option<Box<Input>>,
    },
    Variable {
        name: String,
        id: Option<String>,
    },
    List {
        name: String,
        id: Option<String>,
    },
}

impl Input {
    pub fn block_id(&self) -> Option<&BlockId> {
        match self {
            Input::Block { id, .. } => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub value: String,
    pub id: Option<String>,
}

impl Field {
    pub fn store_key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcMeta {
    pub proc_code: String,
    pub argument_ids: Vec<String>,
    pub argument_names: Vec<String>,
    pub warp: bool,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    pub opcode: Opcode,
    pub inputs: BTreeMap<String, Input>,
    pub fields: BTreeMap<String, Field>,
    pub next: Option<BlockId>,
    pub top_level: bool,
    pub x: f64,
    pub y: f64,
    pub mutation: Option<ProcMeta>,
    raw: Value,
}

impl Block {
    pub fn input(&self, slot: &str) -> Option<&Input> {
        self.inputs.get(slot)
    }

    pub fn field(&self, slot: &str) -> Option<&Field> {
        self.fields.get(slot)
    }

    pub fn require_field(&self, slot: &str) -> CompileResult<&Field> {
        self.field(slot).ok_or_else(|| CompileError::MissingField {
            block: self.id.to_string(),
            slot: slot.to_string(),
        })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlockGraph {
    target: String,
    blocks: HashMap<BlockId, Block>,
}

impl BlockGraph {
    pub fn get(&self, id: &BlockId) -> CompileResult<&Block> {
        self.blocks
            .get(id)
            .ok_or_else(|| CompileError::UnknownBlockId {
                target: self.target.clone(),
                id: id.to_string(),
            })
    }

    pub(crate) fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn top_level(&self) -> Vec<&Block> {
        let mut out = self
            .blocks
            .values()
            .filter(|b| b.top_level)
            .collect::<Vec<_>>();
        out.sort_by(|a, b| {
            a.y.total_cmp(&b.y)
                .then(a.x.total_cmp(&b.x))
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }

    pub fn chain(&self, start: Option<&BlockId>) -> CompileResult<Vec<&Block>> {
        let mut out = Vec::new();
        let Some(start) = start else {
            return Ok(out);
        };
        let mut seen = HashSet::new();
        let mut current = self.get(start)?;
        loop {
            if !seen.insert(&current.id) {
                return Err(CompileError::CyclicChain {
                    target: self.target.clone(),
                    id: current.id.to_string(),
                });
            }
            out.push(current);
            match &current.next {
                Some(next) => current = self.get(next)?,
                None => break,
            }
        }
        Ok(out)
    }

    fn validate_references(&self) -> CompileResult<()> {
        let mut ids = self.blocks.keys().collect::<Vec<_>>();
        ids.sort();
        for id in ids {
            let block = &self.blocks[id];
            if let Some(next) = &block.next {
                self.get(next)?;
            }
            for input in block.inputs.values() {
                self.validate_input(input)?;
            }
        }
        Ok(())
    }

    fn validate_input(&self, input: &Input) -> CompileResult<()> {
        if let Input::Block { id, shadow } = input {
            self.get(id)?;
            if let Some(shadow) = shadow {
                self.validate_input(shadow)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostumeRef {
    pub name: String,
    pub asset_id: String,
    pub md5ext: String,
    pub data_format: String,
    pub rotation_center_x: f64,
    pub rotation_center_y: f64,
    pub bitmap_resolution: Option<f64>,
}

impl CostumeRef {
    pub fn to_json(&self) -> Value {
        let mut out = json!({
            "name": self.name,
            "assetId": self.asset_id,
            "md5ext": self.md5ext,
            "dataFormat": self.data_format,
            "rotationCenterX": self.rotation_center_x,
            "rotationCenterY": self.rotation_center_y,
        });
        if let (Some(res), Some(obj)) = (self.bitmap_resolution, out.as_object_mut()) {
            obj.insert("bitmapResolution".to_string(), json!(res));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub id: String,
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListDecl {
    pub id: String,
    pub name: String,
    pub items: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub is_stage: bool,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub direction: f64,
    pub rotation_style: String,
    pub visible: bool,
    pub costumes: Vec<CostumeRef>,
    pub current_costume: i64,
    pub variables: Vec<VariableDecl>,
    pub lists: Vec<ListDecl>,
    pub blocks: BlockGraph,
}

#[derive(Debug, Clone)]
pub struct Project {
    pub targets: Vec<Target>,
}

impl Project {
    pub fn from_json_str(source: &str) -> CompileResult<Self> {
        let value: Value = serde_json::from_str(source)
            .map_err(|e| CompileError::MalformedProject(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> CompileResult<Self> {
        let targets_json = value
            .get("targets")
            .and_then(Value::as_array)
            .ok_or_else(|| CompileError::MalformedProject("missing 'targets' array.".to_string()))?;

        let mut targets = Vec::new();
        let mut stage_name: Option<String> = None;
        for target_json in targets_json {
            let target = parse_target(target_json)?;
            if target.is_stage {
                if let Some(first) = &stage_name {
                    return Err(CompileError::DuplicateStage {
                        first: first.clone(),
                        second: target.name.clone(),
                    });
                }
                stage_name = Some(target.name.clone());
            }
            targets.push(target);
        }
        Ok(Self { targets })
    }
}

fn parse_target(target: &Value) -> CompileResult<Target> {
    let name = target
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| CompileError::MalformedProject("target missing 'name'.".to_string()))?
        .to_string();
    let is_stage = target
        .get("isStage")
        .and_then(Value::as_bool)
        .ok_or_else(|| {
            CompileError::MalformedProject(format!("target '{}' missing isStage.", name))
        })?;

    let empty = Map::new();
    let blocks_obj = match target.get("blocks") {
        None => &empty,
        Some(v) => v.as_object().ok_or_else(|| {
            CompileError::MalformedProject(format!("target '{}' has a non-object 'blocks'.", name))
        })?,
    };
    let mut blocks = HashMap::new();
    for (id, block_json) in blocks_obj {
        // Loose variable/list reporters on the canvas are stored as bare arrays.
        if block_json.is_array() {
            continue;
        }
        let block = parse_block(id, block_json)?;
        blocks.insert(block.id.clone(), block);
    }
    let graph = BlockGraph {
        target: name.clone(),
        blocks,
    };
    graph.validate_references()?;

    Ok(Target {
        x: number_or(target, "x", 0.0),
        y: number_or(target, "y", 0.0),
        size: number_or(target, "size", 100.0),
        direction: number_or(target, "direction", 90.0),
        rotation_style: target
            .get("rotationStyle")
            .and_then(Value::as_str)
            .unwrap_or("all around")
            .to_string(),
        visible: target
            .get("visible")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        costumes: read_costumes(target.get("costumes")),
        current_costume: target
            .get("currentCostume")
            .and_then(Value::as_i64)
            .unwrap_or(0),
        variables: read_variables(target.get("variables")),
        lists: read_lists(target.get("lists")),
        blocks: graph,
        is_stage,
        name,
    })
}

fn number_or(node: &Value, key: &str, default: f64) -> f64 {
    node.get(key).and_then(Value::as_f64).unwrap_or(default)
}

fn read_costumes(node: Option<&Value>) -> Vec<CostumeRef> {
    let mut out = Vec::new();
    let Some(arr) = node.and_then(Value::as_array) else {
        return out;
    };
    for costume in arr {
        let text = |key: &str| {
            costume
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let asset_id = text("assetId");
        let data_format = text("dataFormat");
        let md5ext = costume
            .get("md5ext")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .unwrap_or_else(|| format!("{}.{}", asset_id, data_format));
        out.push(CostumeRef {
            name: text("name"),
            asset_id,
            md5ext,
            data_format,
            rotation_center_x: number_or(costume, "rotationCenterX", 0.0),
            rotation_center_y: number_or(costume, "rotationCenterY", 0.0),
            bitmap_resolution: costume.get("bitmapResolution").and_then(Value::as_f64),
        });
    }
    out
}

fn read_variables(node: Option<&Value>) -> Vec<VariableDecl> {
    let mut out = Vec::new();
    let Some(obj) = node.and_then(Value::as_object) else {
        return out;
    };
    for (id, decl) in obj {
        let Some(arr) = decl.as_array() else {
            continue;
        };
        let name = arr.first().and_then(Value::as_str).unwrap_or_default();
        out.push(VariableDecl {
            id: id.clone(),
            name: name.to_string(),
            value: arr.get(1).cloned().unwrap_or(Value::from(0)),
        });
    }
    out
}

fn read_lists(node: Option<&Value>) -> Vec<ListDecl> {
    let mut out = Vec::new();
    let Some(obj) = node.and_then(Value::as_object) else {
        return out;
    };
    for (id, decl) in obj {
        let Some(arr) = decl.as_array() else {
            continue;
        };
        let name = arr.first().and_then(Value::as_str).unwrap_or_default();
        out.push(ListDecl {
            id: id.clone(),
            name: name.to_string(),
            items: arr
                .get(1)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        });
    }
    out
}

fn parse_block(id: &str, block: &Value) -> CompileResult<Block> {
    let malformed = |detail: &str| CompileError::MalformedProject(format!("block '{}' {}", id, detail));
    let obj = block
        .as_object()
        .ok_or_else(|| malformed("is not an object."))?;
    let opcode = obj
        .get("opcode")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("has no opcode."))?;

    let mut inputs = BTreeMap::new();
    if let Some(raw_inputs) = obj.get("inputs") {
        let raw_inputs = raw_inputs
            .as_object()
            .ok_or_else(|| malformed("has a non-object 'inputs'."))?;
        for (slot, raw) in raw_inputs {
            inputs.insert(slot.clone(), parse_input(id, slot, raw)?);
        }
    }

    let mut fields = BTreeMap::new();
    if let Some(raw_fields) = obj.get("fields") {
        let raw_fields = raw_fields
            .as_object()
            .ok_or_else(|| malformed("has a non-object 'fields'."))?;
        for (slot, raw) in raw_fields {
            fields.insert(slot.clone(), parse_field(id, slot, raw)?);
        }
    }

    Ok(Block {
        id: BlockId::new(id),
        opcode: Opcode::from_name(opcode),
        inputs,
        fields,
        next: obj.get("next").and_then(Value::as_str).map(BlockId::new),
        top_level: obj.get("topLevel").and_then(Value::as_bool).unwrap_or(false),
        x: block.get("x").and_then(Value::as_f64).unwrap_or(0.0),
        y: block.get("y").and_then(Value::as_f64).unwrap_or(0.0),
        mutation: parse_mutation(id, obj.get("mutation"))?,
        raw: block.clone(),
    })
}

/// Decodes `[shadowState, payload, obscuredShadow?]`.
pub fn parse_input(block: &str, slot: &str, raw: &Value) -> CompileResult<Input> {
    let malformed = |detail: String| CompileError::MalformedInput {
        block: block.to_string(),
        slot: slot.to_string(),
        detail,
    };
    let arr = raw
        .as_array()
        .ok_or_else(|| malformed(format!("expected an array, found {}", raw)))?;
    if arr.len() < 2 {
        return Err(malformed(format!("expected at least 2 elements, found {}", arr.len())));
    }
    let state = arr[0].as_i64().unwrap_or_default();
    if !(1..=3).contains(&state) {
        return Err(malformed(format!("unknown input magic {}", arr[0])));
    }
    let primary = parse_payload(&arr[1]).map_err(&malformed)?;
    match primary {
        Input::Block { id, .. } if state == 3 && arr.len() >= 3 => {
            let shadow = parse_payload(&arr[2]).map_err(&malformed)?;
            let shadow = match shadow {
                Input::Empty => None,
                other => Some(Box::new(other)),
            };
            Ok(Input::Block { id, shadow })
        }
        other => Ok(other),
    }
}

fn parse_payload(payload: &Value) -> Result<Input, String> {
    match payload {
        Value::Null => Ok(Input::Empty),
        Value::String(id) => Ok(Input::Block {
            id: BlockId::new(id.clone()),
            shadow: None,
        }),
        Value::Array(prim) => {
            let code = prim
                .first()
                .and_then(Value::as_i64)
                .ok_or_else(|| format!("primitive without a type code: {}", payload))?;
            let text = prim
                .get(1)
                .and_then(value_text)
                .ok_or_else(|| format!("primitive without a value: {}", payload))?;
            let ref_id = prim.get(2).and_then(Value::as_str).map(ToString::to_string);
            match code {
                12 => Ok(Input::Variable {
                    name: text,
                    id: ref_id,
                }),
                13 => Ok(Input::List {
                    name: text,
                    id: ref_id,
                }),
                _ => {
                    let kind = LiteralKind::from_code(code)
                        .ok_or_else(|| format!("unknown primitive type {}", code))?;
                    Ok(Input::Literal { kind, raw: text })
                }
            }
        }
        other => Err(format!("unexpected payload {}", other)),
    }
}

fn parse_field(block: &str, slot: &str, raw: &Value) -> CompileResult<Field> {
    let malformed = |detail: String| CompileError::MalformedField {
        block: block.to_string(),
        slot: slot.to_string(),
        detail,
    };
    if let Some(value) = raw.as_str() {
        return Ok(Field {
            value: value.to_string(),
            id: None,
        });
    }
    let arr = raw
        .as_array()
        .ok_or_else(|| malformed(format!("expected an array, found {}", raw)))?;
    let value = arr
        .first()
        .and_then(value_text)
        .ok_or_else(|| malformed("missing value".to_string()))?;
    Ok(Field {
        value,
        id: arr.get(1).and_then(Value::as_str).map(ToString::to_string),
    })
}

fn parse_mutation(block: &str, raw: Option<&Value>) -> CompileResult<Option<ProcMeta>> {
    let Some(obj) = raw.and_then(Value::as_object) else {
        return Ok(None);
    };
    let Some(proc_code) = obj.get("proccode").and_then(Value::as_str) else {
        return Ok(None);
    };
    let string_list = |key: &str| -> CompileResult<Vec<String>> {
        let parsed = match obj.get(key) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::String(encoded)) => serde_json::from_str::<Vec<Value>>(encoded).ok(),
            Some(Value::Array(items)) => Some(items.clone()),
            Some(_) => None,
        };
        parsed
            .and_then(|items| items.iter().map(value_text).collect::<Option<Vec<_>>>())
            .ok_or_else(|| CompileError::MalformedField {
                block: block.to_string(),
                slot: format!("mutation.{}", key),
                detail: "expected a list of strings".to_string(),
            })
    };
    Ok(Some(ProcMeta {
        proc_code: proc_code.to_string(),
        argument_ids: string_list("argumentids")?,
        argument_names: string_list("argumentnames")?,
        warp: match obj.get("warp") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        },
    }))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{HatOp, StatementOp};
    use serde_json::json;

    fn project_with_blocks(blocks: Value) -> Value {
        json!({
            "targets": [
                {"isStage": true, "name": "Stage", "blocks": {}},
                {"isStage": false, "name": "Cat", "blocks": blocks}
            ]
        })
    }

    #[test]
    fn decodes_input_shapes() {
        assert_eq!(parse_input("b", "S", &json!([1, null])).unwrap(), Input::Empty);
        assert_eq!(
            parse_input("b", "S", &json!([1, [4, "10"]])).unwrap(),
            Input::Literal {
                kind: LiteralKind::Number,
                raw: "10".to_string()
            }
        );
        assert_eq!(
            parse_input("b", "S", &json!([1, [7, 3]])).unwrap(),
            Input::Literal {
                kind: LiteralKind::Integer,
                raw: "3".to_string()
            }
        );
        assert_eq!(
            parse_input("b", "S", &json!([1, [11, "go", "bid"]])).unwrap(),
            Input::Literal {
                kind: LiteralKind::Broadcast,
                raw: "go".to_string()
            }
        );
        assert_eq!(
            parse_input("b", "S", &json!([3, [12, "score", "vid"], [4, "0"]])).unwrap(),
            Input::Variable {
                name: "score".to_string(),
                id: Some("vid".to_string())
            }
        );
        assert_eq!(
            parse_input("b", "S", &json!([2, "child"])).unwrap(),
            Input::Block {
                id: BlockId::new("child"),
                shadow: None
            }
        );
    }

    #[test]
    fn obscured_shadow_is_kept_for_three_tuples() {
        let input = parse_input("b", "COSTUME", &json!([3, "reporter", "menu"])).unwrap();
        match input {
            Input::Block { id, shadow } => {
                assert_eq!(id.as_str(), "reporter");
                assert_eq!(
                    shadow.as_deref(),
                    Some(&Input::Block {
                        id: BlockId::new("menu"),
                        shadow: None
                    })
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_inputs() {
        assert!(matches!(
            parse_input("b", "S", &json!("oops")),
            Err(CompileError::MalformedInput { .. })
        ));
        assert!(matches!(
            parse_input("b", "S", &json!([9, [4, "1"]])),
            Err(CompileError::MalformedInput { .. })
        ));
        assert!(matches!(
            parse_input("b", "S", &json!([1, [99, "1"]])),
            Err(CompileError::MalformedInput { .. })
        ));
    }

    #[test]
    fn parses_targets_and_mutations() {
        let project = Project::from_value(&project_with_blocks(json!({
            "def": {
                "opcode": "procedures_definition", "next": null, "parent": null,
                "inputs": {"custom_block": [1, "proto"]}, "fields": {},
                "shadow": false, "topLevel": true, "x": 0, "y": 0
            },
            "proto": {
                "opcode": "procedures_prototype", "next": null, "parent": "def",
                "inputs": {}, "fields": {}, "shadow": true, "topLevel": false,
                "mutation": {
                    "tagName": "mutation", "children": [], "proccode": "jump %s",
                    "argumentids": "[\"a1\"]", "argumentnames": "[\"height\"]",
                    "argumentdefaults": "[\"\"]", "warp": "false"
                }
            },
            "loose": [12, "score", "vid", 10, 10]
        })))
        .unwrap();
        let cat = &project.targets[1];
        assert_eq!(cat.blocks.len(), 2);
        let def = cat.blocks.get(&BlockId::new("def")).unwrap();
        assert_eq!(def.opcode, Opcode::Hat(HatOp::ProcedureDefinition));
        let proto = cat.blocks.get(&BlockId::new("proto")).unwrap();
        let meta = proto.mutation.as_ref().unwrap();
        assert_eq!(meta.proc_code, "jump %s");
        assert_eq!(meta.argument_ids, vec!["a1".to_string()]);
        assert_eq!(meta.argument_names, vec!["height".to_string()]);
        assert!(!meta.warp);
        assert_eq!(cat.size, 100.0);
        assert_eq!(cat.direction, 90.0);
        assert!(project.targets[0].is_stage);
    }

    #[test]
    fn duplicate_stage_is_fatal() {
        let err = Project::from_value(&json!({
            "targets": [
                {"isStage": true, "name": "Stage"},
                {"isStage": true, "name": "Stage2"}
            ]
        }))
        .unwrap_err();
        assert!(matches!(err, CompileError::DuplicateStage { .. }));
    }

    #[test]
    fn dangling_reference_is_fatal() {
        let err = Project::from_value(&project_with_blocks(json!({
            "hat": {
                "opcode": "event_whenflagclicked", "next": "elsewhere", "parent": null,
                "inputs": {}, "fields": {}, "shadow": false, "topLevel": true
            }
        })))
        .unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownBlockId {
                target: "Cat".to_string(),
                id: "elsewhere".to_string()
            }
        );
    }

    #[test]
    fn cross_target_reference_is_rejected() {
        let err = Project::from_value(&json!({
            "targets": [
                {"isStage": true, "name": "Stage", "blocks": {
                    "stage_block": {"opcode": "looks_nextcostume", "next": null,
                        "inputs": {}, "fields": {}, "topLevel": true}
                }},
                {"isStage": false, "name": "Cat", "blocks": {
                    "hat": {"opcode": "event_whenflagclicked", "next": "stage_block",
                        "inputs": {}, "fields": {}, "topLevel": true}
                }}
            ]
        }))
        .unwrap_err();
        assert!(matches!(err, CompileError::UnknownBlockId { .. }));
    }

    #[test]
    fn chain_detects_cycles() {
        let project = Project::from_value(&project_with_blocks(json!({
            "a": {"opcode": "looks_show", "next": "b", "inputs": {}, "fields": {}, "topLevel": true},
            "b": {"opcode": "looks_hide", "next": "a", "inputs": {}, "fields": {}, "topLevel": false}
        })))
        .unwrap();
        let graph = &project.targets[1].blocks;
        let err = graph.chain(Some(&BlockId::new("a"))).unwrap_err();
        assert!(matches!(err, CompileError::CyclicChain { .. }));
    }

    #[test]
    fn chain_follows_next_links() {
        let project = Project::from_value(&project_with_blocks(json!({
            "a": {"opcode": "looks_show", "next": "b", "inputs": {}, "fields": {}, "topLevel": true},
            "b": {"opcode": "looks_hide", "next": null, "inputs": {}, "fields": {}, "topLevel": false}
        })))
        .unwrap();
        let graph = &project.targets[1].blocks;
        let chain = graph.chain(Some(&BlockId::new("a"))).unwrap();
        let ops = chain.iter().map(|b| b.opcode.clone()).collect::<Vec<_>>();
        assert_eq!(
            ops,
            vec![
                Opcode::Statement(StatementOp::Show),
                Opcode::Statement(StatementOp::Hide)
            ]
        );
        assert!(graph.chain(None).unwrap().is_empty());
    }

    #[test]
    fn top_level_sorted_by_canvas_position() {
        let project = Project::from_value(&project_with_blocks(json!({
            "low": {"opcode": "event_whenflagclicked", "next": null, "inputs": {}, "fields": {},
                "topLevel": true, "x": 0, "y": 300},
            "high": {"opcode": "control_start_as_clone", "next": null, "inputs": {}, "fields": {},
                "topLevel": true, "x": 50, "y": 10}
        })))
        .unwrap();
        let order = project.targets[1]
            .blocks
            .top_level()
            .iter()
            .map(|b| b.id.to_string())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["high".to_string(), "low".to_string()]);
    }
}
