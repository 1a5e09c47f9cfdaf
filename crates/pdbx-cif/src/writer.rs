use std::borrow::Cow;
use std::io;

use pdbx_core::{is_null, DataCategory, DataContainer};

use crate::error::WriteError;
use crate::token::reserved_prefix;

/// Layout settings for [`Writer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Spaces between a tag and its value, and between loop columns.
    /// Values below 1 are raised to 1.
    pub spacing: usize,
    /// Pad loop columns to their widest inline value.
    pub align_columns: bool,
    /// Loop rows wrap before exceeding this many characters.
    pub max_line_length: usize,
    /// Emit a `#` line after the block header and after each category.
    pub category_separators: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            spacing: 2,
            align_columns: true,
            max_line_length: 2048,
            category_separators: true,
        }
    }
}

/// How a value must be written to read back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueStyle {
    Bare,
    SingleQuoted,
    DoubleQuoted,
    TextField,
}

impl ValueStyle {
    /// Picks the quoting for one value.
    ///
    /// `?` and `.` stay bare. A line break forces a text field. Values that
    /// would otherwise be misread are quoted with whichever quote character
    /// they do not contain; a value containing both becomes a text field.
    pub fn of(value: &str) -> Self {
        if is_null(value) {
            return Self::Bare;
        }
        if value.contains('\n') {
            return Self::TextField;
        }
        if !needs_quotes(value) {
            return Self::Bare;
        }
        if !value.contains('\'') {
            Self::SingleQuoted
        } else if !value.contains('"') {
            Self::DoubleQuoted
        } else {
            Self::TextField
        }
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.chars().any(char::is_whitespace)
        || value.starts_with(['_', '#', '$', '\'', '"', ';', '[', ']'])
        || reserved_prefix(value).is_some()
}

/// A value ready for output.
enum Cell<'a> {
    Inline(Cow<'a, str>),
    /// `;`-delimited; must start in column 1.
    TextField(&'a str),
}

impl Cell<'_> {
    fn width(&self) -> usize {
        match self {
            Self::Inline(text) => text.chars().count(),
            Self::TextField(_) => 0,
        }
    }
}

/// Serializes containers to CIF text.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    options: WriterOptions,
}

impl Writer {
    pub fn new(mut options: WriterOptions) -> Self {
        options.spacing = options.spacing.max(1);
        Self { options }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Writes every container to `out`, one block after another.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::UnrepresentableValue`] for a multi-line value
    /// containing a line that starts with `;`, or [`WriteError::Io`] if
    /// `out` fails. Nothing is written for the failing container.
    pub fn write<W: io::Write>(
        &self,
        containers: &[DataContainer],
        mut out: W,
    ) -> Result<(), WriteError> {
        let mut buffer = String::new();
        for container in containers {
            buffer.clear();
            self.write_container(container, &mut buffer)?;
            out.write_all(buffer.as_bytes())?;
        }
        out.flush()?;
        Ok(())
    }

    /// Renders every container into a string.
    pub fn to_string(&self, containers: &[DataContainer]) -> Result<String, WriteError> {
        let mut output = String::new();
        for container in containers {
            self.write_container(container, &mut output)?;
        }
        Ok(output)
    }

    fn write_container(
        &self,
        container: &DataContainer,
        output: &mut String,
    ) -> Result<(), WriteError> {
        if container.is_global() {
            output.push_str("global_\n");
        } else {
            output.push_str("data_");
            output.push_str(container.name());
            output.push('\n');
        }
        self.separator(output);

        for category in container {
            if category.is_empty() || category.attribute_count() == 0 {
                tracing::debug!(
                    container = container.name(),
                    category = category.name(),
                    "skipping category with no rows"
                );
                continue;
            }
            if category.row_count() == 1 {
                self.write_items(category, output)?;
            } else {
                self.write_loop(category, output)?;
            }
            self.separator(output);
        }
        Ok(())
    }

    fn separator(&self, output: &mut String) {
        if self.options.category_separators {
            output.push_str("#\n");
        }
    }

    /// One `_category.attribute value` line per attribute.
    fn write_items(&self, category: &DataCategory, output: &mut String) -> Result<(), WriteError> {
        let tags: Vec<String> = category
            .attributes()
            .iter()
            .map(|attribute| format!("_{}.{attribute}", category.name()))
            .collect();
        let width = tags.iter().map(|t| t.chars().count()).max().unwrap_or(0);
        let Some(row) = category.row(0) else {
            return Ok(());
        };

        for ((tag, attribute), value) in tags.iter().zip(category.attributes()).zip(row.values()) {
            output.push_str(tag);
            match cell(value, category, attribute, 0)? {
                Cell::TextField(text) => {
                    output.push('\n');
                    push_text_field(text, output);
                }
                Cell::Inline(text) => {
                    let padded = width + self.options.spacing;
                    if padded + text.chars().count() > self.options.max_line_length {
                        output.push('\n');
                    } else {
                        pad(output, padded - tag.chars().count());
                    }
                    output.push_str(&text);
                    output.push('\n');
                }
            }
        }
        Ok(())
    }

    /// `loop_`, the tag lines, then one line per row.
    fn write_loop(&self, category: &DataCategory, output: &mut String) -> Result<(), WriteError> {
        output.push_str("loop_\n");
        for attribute in category.attributes() {
            output.push('_');
            output.push_str(category.name());
            output.push('.');
            output.push_str(attribute);
            output.push('\n');
        }

        let mut rows = Vec::with_capacity(category.row_count());
        for (index, row) in category.rows().enumerate() {
            debug_assert_eq!(row.len(), category.attribute_count());
            let cells = row
                .iter()
                .map(|(attribute, value)| cell(value, category, attribute, index))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }

        let mut widths = vec![0; category.attribute_count()];
        if self.options.align_columns {
            for cells in &rows {
                for (width, cell) in widths.iter_mut().zip(cells) {
                    *width = (*width).max(cell.width());
                }
            }
        }

        let last = category.attribute_count().saturating_sub(1);
        for cells in &rows {
            let mut line = String::new();
            let mut line_width = 0;
            for (column, cell) in cells.iter().enumerate() {
                match cell {
                    Cell::TextField(text) => {
                        flush_line(&mut line, &mut line_width, output);
                        push_text_field(text, output);
                    }
                    Cell::Inline(text) => {
                        let width = cell.width();
                        if line_width > 0 && line_width + width > self.options.max_line_length {
                            flush_line(&mut line, &mut line_width, output);
                        }
                        line.push_str(text);
                        line_width += width;
                        if column < last {
                            let fill = widths[column].saturating_sub(width) + self.options.spacing;
                            pad(&mut line, fill);
                            line_width += fill;
                        }
                    }
                }
            }
            flush_line(&mut line, &mut line_width, output);
        }
        Ok(())
    }
}

fn cell<'a>(
    value: &'a str,
    category: &DataCategory,
    attribute: &str,
    row: usize,
) -> Result<Cell<'a>, WriteError> {
    Ok(match ValueStyle::of(value) {
        ValueStyle::Bare => Cell::Inline(Cow::Borrowed(value)),
        ValueStyle::SingleQuoted => Cell::Inline(Cow::Owned(format!("'{value}'"))),
        ValueStyle::DoubleQuoted => Cell::Inline(Cow::Owned(format!("\"{value}\""))),
        ValueStyle::TextField => {
            if !text_field_round_trips(value) {
                return Err(WriteError::UnrepresentableValue {
                    category: category.name().to_string(),
                    attribute: attribute.to_string(),
                    row,
                });
            }
            Cell::TextField(value)
        }
    })
}

/// A text field ends at the first line starting with `;`, and carriage
/// returns at line ends are dropped when it is read.
fn text_field_round_trips(value: &str) -> bool {
    !value.contains("\n;") && !value.split('\n').any(|line| line.ends_with('\r'))
}

fn push_text_field(text: &str, output: &mut String) {
    output.push(';');
    output.push_str(text);
    output.push_str("\n;\n");
}

fn pad(output: &mut String, count: usize) {
    output.extend(std::iter::repeat(' ').take(count));
}

/// Ends the current row line, dropping trailing padding.
fn flush_line(line: &mut String, line_width: &mut usize, output: &mut String) {
    let trimmed = line.trim_end_matches(' ');
    if !trimmed.is_empty() {
        output.push_str(trimmed);
        output.push('\n');
    }
    line.clear();
    *line_width = 0;
}

/// Writes containers to `out` with default options.
pub fn write<W: io::Write>(containers: &[DataContainer], out: W) -> Result<(), WriteError> {
    Writer::default().write(containers, out)
}

/// Renders containers to a string with default options.
pub fn to_string(containers: &[DataContainer]) -> Result<String, WriteError> {
    Writer::default().to_string(containers)
}
