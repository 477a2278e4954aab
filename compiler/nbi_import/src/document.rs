//! Notebook documents in nbformat JSON.
//!
//! Only what the import path needs is read: the format version and, per
//! cell, its type and source text. Versions 4 (`cells`) and 3
//! (`worksheets[].cells`, code under `input`) are accepted.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellType {
    Code,
    Markdown,
    Raw,
    /// Anything else, e.g. v3 `heading` cells.
    Other(String),
}

impl CellType {
    fn parse(tag: &str) -> Self {
        match tag {
            "code" => Self::Code,
            "markdown" => Self::Markdown,
            "raw" => Self::Raw,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// One cell in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRecord {
    /// 1-based position among all cells, code or not.
    pub ordinal: usize,
    pub cell_type: CellType,
    pub source: String,
}

impl CellRecord {
    pub fn is_code(&self) -> bool {
        self.cell_type == CellType::Code
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookDocument {
    pub nbformat: u32,
    pub nbformat_minor: u32,
    pub cells: Vec<CellRecord>,
}

impl NotebookDocument {
    /// Code cells in document order.
    pub fn code_cells(&self) -> impl Iterator<Item = &CellRecord> {
        self.cells.iter().filter(|cell| cell.is_code())
    }
}

#[derive(Debug, Error)]
#[error("cannot read notebook {}: {kind}", path.display())]
pub struct DocumentError {
    pub path: PathBuf,
    pub kind: DocumentErrorKind,
}

#[derive(Debug, Error)]
pub enum DocumentErrorKind {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid notebook JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported nbformat version {0}")]
    UnsupportedVersion(u32),
}

/// Cell text, stored either whole or as a list of lines.
#[derive(Deserialize)]
#[serde(untagged)]
enum MultilineText {
    Whole(String),
    Lines(Vec<String>),
}

impl MultilineText {
    fn into_string(self) -> String {
        match self {
            Self::Whole(text) => text,
            Self::Lines(lines) => lines.concat(),
        }
    }
}

#[derive(Deserialize)]
struct RawCell {
    cell_type: String,
    #[serde(default)]
    source: Option<MultilineText>,
    /// v3 code cells.
    #[serde(default)]
    input: Option<MultilineText>,
}

#[derive(Deserialize)]
struct RawWorksheet {
    #[serde(default)]
    cells: Vec<RawCell>,
}

#[derive(Deserialize)]
struct RawNotebook {
    nbformat: u32,
    #[serde(default)]
    nbformat_minor: u32,
    #[serde(default)]
    cells: Vec<RawCell>,
    #[serde(default)]
    worksheets: Vec<RawWorksheet>,
}

/// Parse notebook JSON text.
pub fn parse_notebook(text: &str) -> Result<NotebookDocument, DocumentErrorKind> {
    let raw: RawNotebook = serde_json::from_str(text)?;
    let raw_cells = match raw.nbformat {
        4 => raw.cells,
        3 => raw
            .worksheets
            .into_iter()
            .flat_map(|sheet| sheet.cells)
            .collect(),
        other => return Err(DocumentErrorKind::UnsupportedVersion(other)),
    };
    let cells = raw_cells
        .into_iter()
        .enumerate()
        .map(|(index, cell)| {
            let text = if cell.cell_type == "code" {
                cell.source.or(cell.input)
            } else {
                cell.source
            };
            CellRecord {
                ordinal: index + 1,
                cell_type: CellType::parse(&cell.cell_type),
                source: text.map(MultilineText::into_string).unwrap_or_default(),
            }
        })
        .collect();
    Ok(NotebookDocument {
        nbformat: raw.nbformat,
        nbformat_minor: raw.nbformat_minor,
        cells,
    })
}

/// Read and parse the notebook at `path`.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_notebook(path: &Path) -> Result<NotebookDocument, DocumentError> {
    let wrap = |kind: DocumentErrorKind| DocumentError {
        path: path.to_path_buf(),
        kind,
    };
    let text = std::fs::read_to_string(path).map_err(|err| wrap(err.into()))?;
    let document = parse_notebook(&text).map_err(wrap)?;
    tracing::debug!(
        nbformat = document.nbformat,
        cells = document.cells.len(),
        "notebook read"
    );
    Ok(document)
}
