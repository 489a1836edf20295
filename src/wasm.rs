use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn convert_project_json(project_json: &str, template: Option<String>) -> Result<String, JsValue> {
    let template = template.unwrap_or_else(|| crate::template::DEFAULT_TEMPLATE.to_string());
    crate::convert_project_json(project_json, &template)
        .map(|conversion| conversion.document)
        .map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}

#[wasm_bindgen]
pub fn compile_project_json_to_js(project_json: &str) -> Result<String, JsValue> {
    crate::compile_project_json(project_json)
        .map(|(code, _)| code)
        .map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
