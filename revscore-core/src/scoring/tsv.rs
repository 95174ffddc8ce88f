//! Values/labels files.
//!
//! One observation per line: the encoded feature values in order, then the
//! label, separated by tabs. Blank lines are skipped, as are `#` header
//! lines before the first row.
//!
//! Cells use the [`Value`] text encoding, except that `Text` is written as a
//! JSON string. A quoted cell never contains a raw tab or newline, never
//! starts with `#` and never equals the absence marker.

use std::io::{BufRead, Write};

use super::{Label, LabelType, Observation, ScoringError};
use crate::value::{DecodeError, Value, ValueType, ABSENT};

/// Encode one cell.
pub fn encode_cell(value: &Value) -> String {
    match value {
        Value::Text(text) => quote(text),
        other => other.encode(),
    }
}

/// Decode one cell written by [`encode_cell`].
pub fn decode_cell(value_type: ValueType, raw: &str) -> Result<Value, DecodeError> {
    match value_type {
        ValueType::Text if raw != ABSENT => serde_json::from_str::<String>(raw)
            .map(Value::Text)
            .map_err(|_| DecodeError::Invalid {
                expected: ValueType::Text,
                raw: raw.to_string(),
            }),
        _ => value_type.decode(raw),
    }
}

fn quote(text: &str) -> String {
    // Serializing a str cannot fail.
    serde_json::to_string(text).unwrap_or_default()
}

/// Read observations, decoding column `i` with `types[i]` and the last
/// column with `label_type`.
pub fn read_values_labels<R: BufRead>(
    reader: R,
    types: &[ValueType],
    label_type: LabelType,
) -> Result<Vec<Observation>, ScoringError> {
    let mut observations = Vec::new();
    let mut in_header = true;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        if in_header && line.starts_with('#') {
            continue;
        }
        in_header = false;

        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() != types.len() + 1 {
            return Err(ScoringError::Columns {
                line: number,
                expected: types.len() + 1,
                found: columns.len(),
            });
        }

        let (raw_label, raw_values) = columns.split_last().ok_or(ScoringError::Columns {
            line: number,
            expected: types.len() + 1,
            found: 0,
        })?;

        let values = types
            .iter()
            .zip(raw_values)
            .enumerate()
            .map(|(column, (value_type, raw))| {
                decode_cell(*value_type, raw).map_err(|source| ScoringError::Value {
                    line: number,
                    column: column + 1,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let label = label_type
            .decode(raw_label)
            .ok_or_else(|| ScoringError::Label {
                line: number,
                raw: raw_label.to_string(),
                expected: label_type,
            })?;

        observations.push(Observation::new(values, label));
    }

    Ok(observations)
}

/// Write a `#`-prefixed header naming the columns.
pub fn write_header<W: Write, S: AsRef<str>>(
    mut writer: W,
    names: &[S],
) -> Result<(), ScoringError> {
    let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
    writeln!(writer, "#{}\tlabel", names.join("\t"))?;
    Ok(())
}

/// Write a single row. `label` may be absent, e.g. when extracting features
/// for unlabeled revisions.
pub fn write_row<W: Write>(
    mut writer: W,
    values: &[Value],
    label: Option<&Label>,
) -> Result<(), ScoringError> {
    let mut columns: Vec<String> = values.iter().map(encode_cell).collect();
    if let Some(label) = label {
        columns.push(label.to_string());
    }
    writeln!(writer, "{}", columns.join("\t"))?;
    Ok(())
}

/// Write observations in the format read by [`read_values_labels`].
pub fn write_values_labels<W: Write>(
    mut writer: W,
    observations: &[Observation],
) -> Result<(), ScoringError> {
    for observation in observations {
        write_row(&mut writer, &observation.values, Some(&observation.label))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: [ValueType; 3] = [ValueType::Int, ValueType::Real, ValueType::Bool];

    #[test]
    fn reads_rows_and_skips_comments() {
        let input = "#chars\tratio\tflag\tlabel\n12\t0.5\tTrue\ty\n\n3\tNone\tFalse\tn\n";
        let rows = read_values_labels(input.as_bytes(), &TYPES, LabelType::Bool).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].values,
            vec![Value::Int(12), Value::Real(0.5), Value::Bool(true)]
        );
        assert_eq!(rows[0].label, Label::Bool(true));
        assert_eq!(rows[1].values[1], Value::Absent);
        assert_eq!(rows[1].label, Label::Bool(false));
    }

    #[test]
    fn reports_the_offending_line() {
        let input = "1\t0.5\tTrue\tx\n1\t0.5\tx\n";
        let err = read_values_labels(input.as_bytes(), &TYPES, LabelType::Str).unwrap_err();
        assert!(matches!(err, ScoringError::Columns { line: 2, expected: 4, found: 3 }));

        let input = "1\tabc\tTrue\tx\n";
        let err = read_values_labels(input.as_bytes(), &TYPES, LabelType::Str).unwrap_err();
        assert!(matches!(err, ScoringError::Value { line: 1, column: 2, .. }));

        let input = "1\t0.5\tTrue\tx\n";
        let err = read_values_labels(input.as_bytes(), &TYPES, LabelType::Int).unwrap_err();
        assert!(matches!(err, ScoringError::Label { line: 1, .. }));
    }

    #[test]
    fn written_rows_read_back() {
        let observations = vec![
            Observation::new(
                vec![Value::Int(4), Value::Real(0.25), Value::Absent],
                Label::Bool(false),
            ),
            Observation::new(
                vec![Value::Int(0), Value::Real(1.0), Value::Bool(true)],
                Label::Bool(true),
            ),
        ];
        let mut buffer = Vec::new();
        write_header(&mut buffer, &["chars", "ratio", "flag"]).unwrap();
        write_values_labels(&mut buffer, &observations).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("#chars\tratio\tflag\tlabel\n4\t0.25\tNone\tFalse\n"));

        let rows = read_values_labels(text.as_bytes(), &TYPES, LabelType::Bool).unwrap();
        assert_eq!(rows, observations);
    }

    #[test]
    fn text_cells_survive_tabs_newlines_and_markers() {
        let types = [ValueType::Text, ValueType::Words];
        let observations: Vec<Observation> = ["a\tb", "line\nbreak", "#heading", "None", "", "\\"]
            .into_iter()
            .map(|text| {
                Observation::new(
                    vec![Value::Text(text.into()), Value::Words(vec![text.into()])],
                    Label::Text("x".into()),
                )
            })
            .chain(std::iter::once(Observation::new(
                vec![Value::Absent, Value::Absent],
                Label::Text("y".into()),
            )))
            .collect();

        let mut buffer = Vec::new();
        write_header(&mut buffer, &["revision.text", "revision.words"]).unwrap();
        write_values_labels(&mut buffer, &observations).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), observations.len() + 1);

        let rows = read_values_labels(text.as_bytes(), &types, LabelType::Str).unwrap();
        assert_eq!(rows, observations);
    }

    #[test]
    fn hash_rows_after_the_header_are_data() {
        let input = "#count\tlabel\n1\ta\n#2\tb\n";
        let err = read_values_labels(input.as_bytes(), &[ValueType::Int], LabelType::Str)
            .unwrap_err();
        assert!(matches!(err, ScoringError::Value { line: 3, column: 1, .. }));
    }

    #[test]
    fn unquoted_text_cells_are_rejected() {
        assert_eq!(
            decode_cell(ValueType::Text, "\"a\\tb\"").unwrap(),
            Value::Text("a\tb".into())
        );
        assert_eq!(decode_cell(ValueType::Text, "None").unwrap(), Value::Absent);
        assert!(matches!(
            decode_cell(ValueType::Text, "plain"),
            Err(DecodeError::Invalid { expected: ValueType::Text, .. })
        ));
    }
}
