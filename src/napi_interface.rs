use napi::bindgen_prelude::*;
use napi_derive::napi;

use crate::error::ExportError;
use crate::export::{export_roadmap, layout_roadmap};
use crate::types::RoadmapDocument;

#[napi(object)]
pub struct NapiExportResult {
    pub file_name: String,
    pub data: Buffer,
}

fn parse_input(input_json: &str) -> Result<RoadmapDocument> {
    serde_json::from_str(input_json)
        .map_err(|e| Error::new(Status::InvalidArg, format!("Invalid input JSON: {}", e)))
}

fn to_napi_error(err: ExportError) -> Error {
    let status = match err {
        ExportError::CyclicInput { .. } | ExportError::InvalidInput(_) => Status::InvalidArg,
        ExportError::Pdf(_) | ExportError::Io(_) => Status::GenericFailure,
    };
    Error::new(status, err.to_string())
}

#[napi(js_name = "exportRoadmap")]
pub fn export_roadmap_napi(input_json: String) -> Result<NapiExportResult> {
    let doc = parse_input(&input_json)?;
    let exported = export_roadmap(&doc).map_err(to_napi_error)?;

    Ok(NapiExportResult {
        file_name: exported.file_name,
        data: exported.bytes.into(),
    })
}

#[napi(js_name = "layoutRoadmap")]
pub fn layout_roadmap_napi(input_json: String) -> Result<String> {
    let doc = parse_input(&input_json)?;
    let positions = layout_roadmap(&doc).map_err(to_napi_error)?;

    serde_json::to_string(&positions).map_err(|e| {
        Error::new(
            Status::GenericFailure,
            format!("Failed to serialize positions: {}", e),
        )
    })
}

#[napi]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
