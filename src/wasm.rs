use crate::export::{export_roadmap, layout_roadmap};
use crate::types::RoadmapDocument;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn wasm_init() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub struct WasmExportResult {
    file_name: String,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl WasmExportResult {
    #[wasm_bindgen(getter, js_name = fileName)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

fn parse_input(input_json: &str) -> Result<RoadmapDocument, JsValue> {
    serde_json::from_str(input_json).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen(js_name = exportRoadmap)]
pub fn export_roadmap_wasm(input_json: &str) -> Result<WasmExportResult, JsValue> {
    let doc = parse_input(input_json)?;
    let exported = export_roadmap(&doc).map_err(|e| JsValue::from_str(&e.to_string()))?;

    Ok(WasmExportResult {
        file_name: exported.file_name,
        bytes: exported.bytes,
    })
}

#[wasm_bindgen(js_name = layoutRoadmap)]
pub fn layout_roadmap_wasm(input_json: &str) -> Result<String, JsValue> {
    let doc = parse_input(input_json)?;
    let positions = layout_roadmap(&doc).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&positions).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
