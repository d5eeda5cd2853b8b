//! Parser for the plain-text connectivity guide file (§6, §4.7): one block per net, a net-name
//! line followed by `xl yl xh yh layerName` rectangle lines, terminated by a blank line.
//!
//! This is deliberately the only "ingestion" this crate does; full LEF/DEF/ODB parsing is an
//! external collaborator (§1).

use std::fmt::{Display, Formatter};

use geom::Rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideRect {
    pub rect: Rect,
    pub layer_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideEntry {
    pub net: String,
    pub rects: Vec<GuideRect>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "guide file line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

pub fn parse(text: &str) -> Result<Vec<GuideEntry>, ParseError> {
    let mut entries = Vec::new();
    let mut current: Option<GuideEntry> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.len() {
            1 => {
                if current.is_some() {
                    return Err(ParseError {
                        line: line_no,
                        message: "net name line appeared before the previous net's block was closed by a blank line".into(),
                    });
                }
                current = Some(GuideEntry {
                    net: fields[0].to_string(),
                    rects: Vec::new(),
                });
            }
            5 => {
                let entry = current.as_mut().ok_or_else(|| ParseError {
                    line: line_no,
                    message: "rectangle line appeared before a net name line".into(),
                })?;
                let parse_coord = |s: &str| {
                    s.parse::<i64>().map_err(|_| ParseError {
                        line: line_no,
                        message: format!("expected integer coordinate, got {s:?}"),
                    })
                };
                let xl = parse_coord(fields[0])?;
                let yl = parse_coord(fields[1])?;
                let xh = parse_coord(fields[2])?;
                let yh = parse_coord(fields[3])?;
                if xl > xh || yl > yh {
                    return Err(ParseError {
                        line: line_no,
                        message: "rectangle corners out of order".into(),
                    });
                }
                entry.rects.push(GuideRect {
                    rect: Rect::new(xl, yl, xh, yh),
                    layer_name: fields[4].to_string(),
                });
            }
            n => {
                return Err(ParseError {
                    line: line_no,
                    message: format!("expected either a net name or 5 rectangle fields, got {n} fields"),
                });
            }
        }
    }
    if let Some(entry) = current.take() {
        entries.push(entry);
    }
    Ok(entries)
}
