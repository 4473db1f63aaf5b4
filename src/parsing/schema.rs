
use indexmap::IndexSet;
use std::io::BufRead;

use crate::data_types::records::FieldKey;

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("malformed metadata line: {line:?}")]
    MalformedMetaLine { line: String },
    #[error("metadata line is missing required attribute {attribute:?}: {line:?}")]
    MissingAttribute { attribute: &'static str, line: String },
    #[error("reached end of file without finding the #CHROM column header")]
    MissingColumnHeader,
    #[error("I/O error while reading header: {0}")]
    Io(#[from] std::io::Error)
}

/// The set of provenance-qualified metric names known to be numeric and
/// single-valued for one metrics file. Discovered once per file from the
/// header block; the INFO and FORMAT sets are disjoint namespaces.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MetricSchema {
    /// INFO-class names with Type=Integer|Float and Number=1, in declaration order
    info: IndexSet<String>,
    /// FORMAT-class names with Type=Integer|Float and Number=1, in declaration order
    format: IndexSet<String>
}

impl MetricSchema {
    /// Consumes the header block of a metrics file, up to and including the
    /// `#CHROM` column-header line, leaving the reader positioned at the first
    /// data row. Any malformed `##INFO`/`##FORMAT` line fails discovery; a
    /// partial schema is never usable.
    /// # Arguments
    /// * `reader` - an open call-file reader positioned at the first line
    pub fn discover(reader: &mut impl BufRead) -> Result<Self, SchemaError> {
        let mut schema = MetricSchema::default();
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                // EOF without ever seeing the column header
                return Err(SchemaError::MissingColumnHeader);
            }
            let trimmed = line.trim_end();

            if let Some(body) = trimmed.strip_prefix("##INFO=") {
                let name = parse_declaration(body, trimmed)?;
                if let Some(name) = name {
                    schema.info.insert(name);
                }
            } else if let Some(body) = trimmed.strip_prefix("##FORMAT=") {
                let name = parse_declaration(body, trimmed)?;
                if let Some(name) = name {
                    schema.format.insert(name);
                }
            } else if trimmed.starts_with("##") {
                // other metadata declarations carry no metric information
            } else if trimmed.starts_with('#') {
                // the #CHROM column header ends the header block
                return Ok(schema);
            } else {
                // a data row before the column header means the header block is broken
                return Err(SchemaError::MissingColumnHeader);
            }
        }
    }

    /// Resolves the requested metric names against the discovered sets.
    /// A plain name may resolve to both classes. Returns the usable
    /// provenance-qualified keys and the unavailable plain names.
    /// # Arguments
    /// * `requested` - specific metric names, or None for "all discovered"
    pub fn usable_keys(&self, requested: Option<&[String]>) -> (Vec<FieldKey>, Vec<String>) {
        match requested {
            None => {
                let keys = self.info.iter().cloned().map(FieldKey::Info)
                    .chain(self.format.iter().cloned().map(FieldKey::Format))
                    .collect();
                (keys, Vec::new())
            },
            Some(names) => {
                let mut keys = Vec::new();
                let mut unavailable = Vec::new();
                for name in names {
                    let in_info = self.info.contains(name);
                    let in_format = self.format.contains(name);
                    if in_info {
                        keys.push(FieldKey::Info(name.clone()));
                    }
                    if in_format {
                        keys.push(FieldKey::Format(name.clone()));
                    }
                    if !in_info && !in_format {
                        unavailable.push(name.clone());
                    }
                }
                (keys, unavailable)
            }
        }
    }

    /// Returns true if the qualified key was discovered as numeric and single-valued
    pub fn contains(&self, key: &FieldKey) -> bool {
        match key {
            FieldKey::Info(name) => self.info.contains(name),
            FieldKey::Format(name) => self.format.contains(name)
        }
    }

    // getters
    pub fn info(&self) -> &IndexSet<String> {
        &self.info
    }

    pub fn format(&self) -> &IndexSet<String> {
        &self.format
    }
}

/// Parses one `##INFO=<...>` / `##FORMAT=<...>` body. Returns the declared
/// name if the field is numeric (Integer/Float) with cardinality exactly one,
/// or None for declarations we exclude (flags, text, multi-valued).
/// # Arguments
/// * `body` - the declaration starting at `<`
/// * `full_line` - the whole line, for error reporting
fn parse_declaration(body: &str, full_line: &str) -> Result<Option<String>, SchemaError> {
    let inner = body.strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| SchemaError::MalformedMetaLine { line: full_line.to_string() })?;

    let mut id = None;
    let mut number = None;
    let mut field_type = None;
    for attribute in split_attributes(inner) {
        let (key, value) = attribute.split_once('=')
            .ok_or_else(|| SchemaError::MalformedMetaLine { line: full_line.to_string() })?;
        match key {
            "ID" => id = Some(value.to_string()),
            "Number" => number = Some(value.to_string()),
            "Type" => field_type = Some(value.to_string()),
            _ => {}
        }
    }

    let id = id.ok_or(SchemaError::MissingAttribute { attribute: "ID", line: full_line.to_string() })?;
    let number = number.ok_or(SchemaError::MissingAttribute { attribute: "Number", line: full_line.to_string() })?;
    let field_type = field_type.ok_or(SchemaError::MissingAttribute { attribute: "Type", line: full_line.to_string() })?;

    // only scalar numerics are float-coercible metrics
    let is_numeric = matches!(field_type.as_str(), "Integer" | "Float");
    if is_numeric && number == "1" {
        Ok(Some(id))
    } else {
        Ok(None)
    }
}

/// Splits the inside of a declaration on top-level commas, respecting the
/// quoted Description attribute which may itself contain commas.
fn split_attributes(inner: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (index, c) in inner.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                pieces.push(&inner[start..index]);
                start = index + 1;
            },
            _ => {}
        }
    }
    pieces.push(&inner[start..]);
    pieces
}
