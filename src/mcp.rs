use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::commands::{self, PageSelection};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SelectionRequest {
    #[schemars(description = "Page lists such as '[1,3,7]' or '1,3,7' (one-based)")]
    #[serde(default)]
    pub lists: Vec<String>,
    #[schemars(description = "Inclusive page ranges such as '[2,5]' or '2-5'")]
    #[serde(default)]
    pub ranges: Vec<String>,
    #[schemars(description = "Single page numbers such as '4'")]
    #[serde(default)]
    pub indices: Vec<String>,
}

impl SelectionRequest {
    fn into_selection(self, all: bool) -> PageSelection {
        PageSelection {
            lists: self.lists,
            ranges: self.ranges,
            indices: self.indices,
            all,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfPagesRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[serde(flatten)]
    pub selection: SelectionRequest,
    #[schemars(description = "Output file path (default: derived from the input name)")]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[serde(flatten)]
    pub selection: SelectionRequest,
    #[schemars(description = "Split after every page, ignoring the selection (default: false)")]
    #[serde(default)]
    pub all: bool,
    #[schemars(description = "Output name pattern; pieces get a _<k> suffix")]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfRotateRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[serde(flatten)]
    pub selection: SelectionRequest,
    #[schemars(description = "Rotate every page, ignoring the selection (default: false)")]
    #[serde(default)]
    pub all: bool,
    #[schemars(description = "Clockwise angle in degrees, a multiple of 90")]
    pub angle: i64,
    #[schemars(description = "Output file path (default: derived from the input name)")]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfMergeRequest {
    #[schemars(description = "PDF files to concatenate, in order (at least two)")]
    pub inputs: Vec<String>,
    #[schemars(description = "Output file path (default: derived from the first input)")]
    pub output: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfReverseRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Output file path (default: derived from the input name)")]
    pub output: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

fn respond<T: Serialize>(result: Result<T>) -> String {
    match result {
        Ok(value) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("Error: {}", e))
        }
        Err(e) => format!("Error: {:#}", e),
    }
}

fn output_path(output: &Option<String>) -> Option<&Path> {
    output.as_deref().map(Path::new)
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get PDF metadata: page count, version, encryption flag and every document info entry")]
    fn pdf_info(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        respond(commands::info::execute(&path))
    }

    #[tool(description = "Delete pages from a PDF. Pages are one-based and given as lists ('1,3'), ranges ('2-5') or single indices ('4').")]
    fn pdf_delete(&self, Parameters(req): Parameters<PdfPagesRequest>) -> String {
        let output = output_path(&req.output);
        let selection = req.selection.into_selection(false);
        respond(commands::delete::execute(Path::new(&req.path), output, &selection))
    }

    #[tool(description = "Keep only the selected pages of a PDF and save them to a new file")]
    fn pdf_extract(&self, Parameters(req): Parameters<PdfPagesRequest>) -> String {
        let output = output_path(&req.output);
        let selection = req.selection.into_selection(false);
        respond(commands::extract::execute(Path::new(&req.path), output, &selection))
    }

    #[tool(description = "Split a PDF after each selected page into numbered files")]
    fn pdf_split(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        let output = output_path(&req.output);
        let selection = req.selection.into_selection(req.all);
        respond(commands::split::execute(Path::new(&req.path), output, &selection))
    }

    #[tool(description = "Concatenate two or more PDFs in the given order")]
    fn pdf_merge(&self, Parameters(req): Parameters<PdfMergeRequest>) -> String {
        if req.inputs.len() < 2 {
            return "Error: Cannot merge less than two files.".to_string();
        }
        let inputs: Vec<PathBuf> = req.inputs.iter().map(PathBuf::from).collect();
        respond(commands::merge::execute(&inputs, output_path(&req.output), false))
    }

    #[tool(description = "Rotate selected pages of a PDF clockwise by a multiple of 90 degrees")]
    fn pdf_rotate(&self, Parameters(req): Parameters<PdfRotateRequest>) -> String {
        let output = output_path(&req.output);
        let selection = req.selection.into_selection(req.all);
        respond(commands::rotate::execute(
            Path::new(&req.path),
            output,
            &selection,
            req.angle,
        ))
    }

    #[tool(description = "Reverse the page order of a PDF")]
    fn pdf_reverse(&self, Parameters(req): Parameters<PdfReverseRequest>) -> String {
        respond(commands::reverse::execute(
            Path::new(&req.path),
            output_path(&req.output),
        ))
    }
}

impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF page manipulation tools. Use pdf_info to inspect a document, pdf_delete and \
                 pdf_extract to drop or keep pages, pdf_split to cut a document into pieces, \
                 pdf_merge to concatenate files, pdf_rotate to turn pages and pdf_reverse to \
                 reverse page order. Page numbers are one-based."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
