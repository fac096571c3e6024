//! Segment sizes from the `size` tool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use compact_str::CompactString;

use super::error::{IntrospectionError, ParseError};
use super::runner::ToolRunner;
use super::{BinaryIntrospector, SegmentReport};

/// Column holding the proportionality total.
const TOTAL_KEY: &str = "dec";

/// Column repeating the total in hexadecimal.
const HEX_KEY: &str = "hex";

/// Binary introspector backed by the `size` command.
pub struct SizeTool {
    runner: Arc<ToolRunner>,
    program: PathBuf,
}

impl SizeTool {
    pub fn new(runner: Arc<ToolRunner>, program: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }
}

impl BinaryIntrospector for SizeTool {
    fn segments(&self, path: &Path) -> Result<SegmentReport, IntrospectionError> {
        let output = self.runner.run(&self.program, [path])?;
        Ok(parse_size_output(&output)?)
    }
}

/// Parse the two tab-separated lines printed by `size`.
///
/// The first line names the columns, the second holds their values. The
/// `dec` column becomes the total; `hex` and non-numeric values are dropped.
pub fn parse_size_output(output: &[u8]) -> Result<SegmentReport, ParseError> {
    let text = std::str::from_utf8(output).map_err(|_| ParseError::InvalidUtf8)?;

    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let (Some(header), Some(values)) = (lines.next(), lines.next()) else {
        return Err(ParseError::unexpected("expected a header and a value line"));
    };

    let mut total = None;
    let mut segments = Vec::new();
    for (key, value) in header.split('\t').zip(values.split('\t')) {
        let key = key.trim();
        if key.is_empty() || key == HEX_KEY {
            continue;
        }
        let Ok(value) = value.trim().parse::<u64>() else {
            continue;
        };
        if key == TOTAL_KEY {
            total = Some(value);
        } else {
            segments.push((CompactString::new(key), value));
        }
    }

    SegmentReport::new(segments, total.ok_or(ParseError::MissingTotal)?)
}
