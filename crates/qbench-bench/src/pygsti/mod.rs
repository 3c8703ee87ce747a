//! PyGSTi interoperability.
//!
//! Circuit strings use the PyGSTi grammar: `{}` for the empty circuit, or a
//! sequence of layers. A layer is a gate label `G<name>[:q]*`, a parallel
//! layer `[...]`, or a group `(...)` with an optional `^N` repetition. An
//! optional `@(q0,q1,...)` suffix names the circuit's lines.
//!
//! Datasets are written in PyGSTi's text format:
//!
//! ```text
//! ## Columns = 00 count, 01 count, 10 count, 11 count
//! Gxpi2:0 480 20 0 500
//! ```

mod lexer;
mod parser;

pub use parser::parse_circuit;

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use qbench_hal::{Bitstring, Counts};

use crate::error::{BenchError, BenchResult};

const COLUMNS_PREFIX: &str = "## Columns =";

/// One dataset line: a circuit string and its dense counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyGstiRow {
    /// Circuit string, as read from the input.
    pub circuit: String,
    /// Counts per outcome, in increasing integer bitstring order.
    pub counts: Vec<u64>,
}

/// Measured counts laid out as a PyGSTi dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyGstiDataset {
    num_qubits: usize,
    rows: Vec<PyGstiRow>,
}

impl PyGstiDataset {
    /// Pair circuit strings with their counts, 1:1 in order.
    pub fn new(circuits: &[String], counts: &[Counts], num_qubits: usize) -> BenchResult<Self> {
        if circuits.len() != counts.len() {
            return Err(BenchError::shape(format!(
                "{} circuit strings but {} count sets",
                circuits.len(),
                counts.len()
            )));
        }
        let rows = circuits
            .iter()
            .zip(counts)
            .map(|(circuit, counts)| {
                if let Some(width) = counts.width().filter(|&w| w != num_qubits) {
                    return Err(BenchError::shape(format!(
                        "counts for '{circuit}' have {width}-bit outcomes, expected {num_qubits}"
                    )));
                }
                let mut dense = vec![0; 1 << num_qubits];
                for (bitstring, &count) in counts {
                    dense[bitstring.to_index()] = count;
                }
                Ok(PyGstiRow {
                    circuit: circuit.clone(),
                    counts: dense,
                })
            })
            .collect::<BenchResult<_>>()?;
        Ok(Self { num_qubits, rows })
    }

    /// Outcome width.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Rows in circuit order.
    pub fn rows(&self) -> &[PyGstiRow] {
        &self.rows
    }

    /// Column labels, every `num_qubits`-bit string in integer order.
    pub fn columns(&self) -> Vec<Bitstring> {
        (0..1usize << self.num_qubits)
            .map(|index| Bitstring::from_index(index, self.num_qubits))
            .collect()
    }

    /// Count of `bitstring` for the first row with `circuit`.
    pub fn get(&self, circuit: &str, bitstring: &Bitstring) -> Option<u64> {
        if bitstring.len() != self.num_qubits {
            return None;
        }
        self.rows
            .iter()
            .find(|row| row.circuit == circuit)
            .map(|row| row.counts[bitstring.to_index()])
    }

    /// Rows converted back to counts.
    pub fn counts(&self) -> BenchResult<Vec<Counts>> {
        self.rows
            .iter()
            .map(|row| Ok(Counts::from_dense(self.num_qubits, &row.counts)?))
            .collect()
    }

    /// Render in PyGSTi's dataset text format.
    pub fn to_text(&self) -> String {
        let columns: Vec<String> = self
            .columns()
            .iter()
            .map(|b| format!("{b} count"))
            .collect();
        let mut text = format!("{COLUMNS_PREFIX} {}\n", columns.join(", "));
        for row in &self.rows {
            text.push_str(&row.circuit);
            for count in &row.counts {
                let _ = write!(text, " {count}");
            }
            text.push('\n');
        }
        text
    }

    /// Parse PyGSTi's dataset text format.
    ///
    /// The width is taken from the column header. Blank lines and other
    /// `#` comments are skipped.
    pub fn parse(text: &str) -> BenchResult<Self> {
        let mut num_qubits = None;
        let mut rows = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if let Some(header) = trimmed.strip_prefix(COLUMNS_PREFIX) {
                num_qubits = Some(parse_columns(header, line)?);
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let width = num_qubits.ok_or_else(|| BenchError::Parse {
                line,
                message: "data line before the '## Columns' header".into(),
            })?;
            rows.push(parse_row(trimmed, width, line)?);
        }

        let num_qubits = num_qubits.ok_or_else(|| BenchError::Parse {
            line: 0,
            message: "missing '## Columns' header".into(),
        })?;
        Ok(Self { num_qubits, rows })
    }
}

fn parse_columns(header: &str, line: usize) -> BenchResult<usize> {
    let labels = header
        .split(',')
        .map(|column| {
            let label = column.trim().strip_suffix("count").map(str::trim);
            label
                .and_then(|l| l.parse::<Bitstring>().ok())
                .ok_or_else(|| BenchError::Parse {
                    line,
                    message: format!("malformed column '{}'", column.trim()),
                })
        })
        .collect::<BenchResult<Vec<_>>>()?;

    // The header must hold exactly 2^width labels, so the width is bounded
    // by the input size before any outcome is enumerated.
    let width = labels.first().map_or(0, Bitstring::len);
    let complete = width > 0
        && u32::try_from(width)
            .ok()
            .and_then(|w| 1usize.checked_shl(w))
            .is_some_and(|n| n == labels.len())
        && labels
            .iter()
            .enumerate()
            .all(|(index, label)| *label == Bitstring::from_index(index, width));
    if !complete {
        return Err(BenchError::Parse {
            line,
            message: format!(
                "columns must list all {width}-bit outcomes in increasing order"
            ),
        });
    }
    Ok(width)
}

fn parse_row(text: &str, num_qubits: usize, line: usize) -> BenchResult<PyGstiRow> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    let columns = 1usize << num_qubits;
    if fields.len() <= columns {
        return Err(BenchError::Parse {
            line,
            message: format!("expected a circuit followed by {columns} counts"),
        });
    }
    let (circuit, values) = fields.split_at(fields.len() - columns);
    let counts = values
        .iter()
        .map(|v| {
            v.parse::<f64>()
                .ok()
                .filter(|c| c.is_finite() && *c >= 0.0 && c.fract() == 0.0)
                .map(|c| c as u64)
                .ok_or_else(|| BenchError::Parse {
                    line,
                    message: format!("invalid count '{v}'"),
                })
        })
        .collect::<BenchResult<Vec<_>>>()?;
    Ok(PyGstiRow {
        circuit: circuit.join(" "),
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparse(entries: &[(&str, u64)]) -> Counts {
        let mut counts = Counts::new();
        for (bits, count) in entries {
            counts.insert(bits.parse().unwrap(), *count).unwrap();
        }
        counts
    }

    fn sample() -> PyGstiDataset {
        let circuits = vec!["{}@(0,1)".to_string(), "Gxpi2:0Gcnot:0:1@(0,1)".to_string()];
        let counts = vec![
            Counts::from_dense(2, &[100, 0, 0, 0]).unwrap(),
            sparse(&[("00", 48), ("11", 52)]),
        ];
        PyGstiDataset::new(&circuits, &counts, 2).unwrap()
    }

    #[test]
    fn test_text_layout() {
        let text = sample().to_text();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("## Columns = 00 count, 01 count, 10 count, 11 count")
        );
        assert_eq!(lines.next(), Some("{}@(0,1) 100 0 0 0"));
        assert_eq!(lines.next(), Some("Gxpi2:0Gcnot:0:1@(0,1) 48 0 0 52"));
    }

    #[test]
    fn test_text_round_trip() {
        let dataset = sample();
        let parsed = PyGstiDataset::parse(&dataset.to_text()).unwrap();
        assert_eq!(parsed, dataset);
        let b11: Bitstring = "11".parse().unwrap();
        assert_eq!(parsed.get("Gxpi2:0Gcnot:0:1@(0,1)", &b11), Some(52));
    }

    #[test]
    fn test_parse_accepts_float_counts_and_comments() {
        let text = "# dataset\n## Columns = 0 count, 1 count\n\nGx 10.0 5\n";
        let dataset = PyGstiDataset::parse(text).unwrap();
        assert_eq!(dataset.num_qubits(), 1);
        assert_eq!(dataset.rows()[0].counts, vec![10, 5]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            PyGstiDataset::parse("Gx 1 2\n"),
            Err(BenchError::Parse { line: 1, .. })
        ));
        assert!(PyGstiDataset::parse("## Columns = 1 count, 0 count\n").is_err());
        assert!(matches!(
            PyGstiDataset::parse("## Columns = 0 count, 1 count\nGx 1\n"),
            Err(BenchError::Parse { line: 2, .. })
        ));
        assert!(PyGstiDataset::parse("## Columns = 0 count, 1 count\nGx 1 -2\n").is_err());
    }

    #[test]
    fn test_parse_rejects_oversized_header() {
        for width in [40, 64, 70] {
            let label = "0".repeat(width);
            let text = format!("## Columns = {label} count\n");
            let err = PyGstiDataset::parse(&text).unwrap_err();
            assert!(matches!(err, BenchError::Parse { line: 1, .. }), "{err}");
        }
    }

    #[test]
    fn test_new_rejects_mismatch() {
        let counts = vec![Counts::from_dense(1, &[1, 1]).unwrap()];
        assert!(PyGstiDataset::new(&[], &counts, 1).is_err());
        assert!(PyGstiDataset::new(&["Gx".into()], &counts, 2).is_err());
    }
}
