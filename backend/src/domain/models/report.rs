//! Renderer-independent description of a report.
//!
//! Reports are a vertical flow of blocks on fixed-size pages. Figures use their own
//! coordinate space with the origin at the bottom-left corner and y growing upwards.

use serde::{Deserialize, Serialize};
use shared::ReportKind;

/// Page size in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };
}

/// Vector primitive inside a [`Drawing`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawPrimitive {
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        /// Dash pattern as (on, off) lengths; solid when absent
        dash: Option<[f64; 2]>,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        font_size: f64,
    },
}

/// Fixed-size vector figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub width: f64,
    pub height: f64,
    pub primitives: Vec<DrawPrimitive>,
}

impl Drawing {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            primitives: Vec::new(),
        }
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.primitives.push(DrawPrimitive::Line {
            x1,
            y1,
            x2,
            y2,
            dash: None,
        });
    }

    pub fn dashed_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, dash: [f64; 2]) {
        self.primitives.push(DrawPrimitive::Line {
            x1,
            y1,
            x2,
            y2,
            dash: Some(dash),
        });
    }

    pub fn text(&mut self, x: f64, y: f64, content: impl Into<String>, font_size: f64) {
        self.primitives.push(DrawPrimitive::Text {
            x,
            y,
            content: content.into(),
            font_size,
        });
    }

    /// All text primitives in drawing order
    pub fn texts(&self) -> Vec<&str> {
        self.primitives
            .iter()
            .filter_map(|primitive| match primitive {
                DrawPrimitive::Text { content, .. } => Some(content.as_str()),
                DrawPrimitive::Line { .. } => None,
            })
            .collect()
    }
}

/// Grid table with a shaded header row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub column_widths: Vec<f64>,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    /// Centered heading
    Title(String),
    Paragraph { text: String, font_size: f64 },
    /// Vertical gap in points
    Spacer(f64),
    Table(Table),
    Figure(Drawing),
}

/// A complete report ready to be handed to a renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub kind: ReportKind,
    pub title: String,
    pub page_size: PageSize,
    pub margin: f64,
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn new(kind: ReportKind, title: impl Into<String>, page_size: PageSize, margin: f64) -> Self {
        let title = title.into();
        Self {
            kind,
            blocks: vec![Block::Title(title.clone())],
            title,
            page_size,
            margin,
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Text of every paragraph, in order
    pub fn paragraphs(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}
