//! Plain-text QKP instance files
//!
//! Layout (blank lines are insignificant):
//!
//! ```text
//! <reference>
//! <n>
//! <diagonal profits, n values>
//! <row 0 of the upper triangle, n-1 values>
//! ...
//! <row n-2 of the upper triangle, 1 value>
//!
//! <constraint type, always 1>
//! <capacity>
//! <weights, n values>
//! ```
//!
//! Anything after the weights line (e.g. appended solver results) is ignored.

use crate::error::{Error, Result};
use crate::generator::MAX_ITEMS;
use crate::instance::Instance;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// An instance together with its reference label
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceFile {
    pub reference: String,
    pub instance: Instance,
}

struct Lines<'a> {
    inner: Vec<(usize, &'a str)>,
    pos: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        let inner = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty())
            .collect();
        Self { inner, pos: 0 }
    }

    fn next(&mut self, what: &str) -> Result<(usize, &'a str)> {
        let line = self.inner.get(self.pos).copied().ok_or_else(|| Error::Parse {
            line: self.inner.last().map_or(0, |(n, _)| *n),
            message: format!("Unexpected end of file, expected {}", what),
        })?;
        self.pos += 1;
        Ok(line)
    }

    fn scalar<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let (line, text) = self.next(what)?;
        text.parse().map_err(|_| Error::Parse {
            line,
            message: format!("Invalid {}: {:?}", what, text),
        })
    }

    fn row(&mut self, what: &str, expected: usize) -> Result<Vec<i64>> {
        let (line, text) = self.next(what)?;
        let values = text
            .split_whitespace()
            .map(|tok| {
                tok.parse::<i64>().map_err(|_| Error::Parse {
                    line,
                    message: format!("Invalid integer {:?} in {}", tok, what),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if values.len() != expected {
            return Err(Error::Parse {
                line,
                message: format!("{} has {} values, expected {}", what, values.len(), expected),
            });
        }
        Ok(values)
    }
}

/// Parse an instance from its text form
///
/// # Errors
/// Returns a parse error with the offending line number, or a construction
/// error if the parsed data do not form a valid instance
pub fn parse_instance(text: &str) -> Result<InstanceFile> {
    let mut lines = Lines::new(text);
    let (_, reference) = lines.next("instance reference")?;
    let (count_line, count) = lines.next("item count")?;
    let n: usize = count.parse().map_err(|_| Error::Parse {
        line: count_line,
        message: format!("Invalid item count: {:?}", count),
    })?;
    if n > MAX_ITEMS {
        return Err(Error::Parse {
            line: count_line,
            message: format!("Item count {} exceeds the limit of {}", n, MAX_ITEMS),
        });
    }

    let diagonal = lines.row("diagonal profits", n)?;
    let mut profits = vec![vec![0i64; n]; n];
    for (i, &p) in diagonal.iter().enumerate() {
        profits[i][i] = p;
    }
    for i in 0..n.saturating_sub(1) {
        let row = lines.row(&format!("profit row {}", i), n - 1 - i)?;
        for (k, &p) in row.iter().enumerate() {
            let j = i + 1 + k;
            profits[i][j] = p;
            profits[j][i] = p;
        }
    }

    let (line, kind) = lines.next("constraint type")?;
    if kind != "1" {
        return Err(Error::Parse {
            line,
            message: format!("Unsupported constraint type {:?}", kind),
        });
    }
    let capacity: i64 = lines.scalar("capacity")?;
    let weights = lines.row("weights", n)?;

    Ok(InstanceFile {
        reference: reference.to_string(),
        instance: Instance::new(n, profits, weights, capacity)?,
    })
}

/// Read and parse an instance file
pub fn read_instance<P: AsRef<Path>>(path: P) -> Result<InstanceFile> {
    let text = fs::read_to_string(path)?;
    parse_instance(&text)
}

fn join<I: IntoIterator<Item = T>, T: ToString>(values: I) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render an instance in the text form read by [`parse_instance`]
pub fn format_instance(reference: &str, instance: &Instance) -> String {
    let n = instance.num_items();
    let mut lines = vec![
        reference.to_string(),
        n.to_string(),
        join((0..n).map(|i| instance.profit(i, i))),
    ];
    lines.extend((0..n.saturating_sub(1)).map(|i| join(((i + 1)..n).map(|j| instance.profit(i, j)))));
    lines.push(String::new());
    lines.push("1".to_string());
    lines.push(instance.capacity().to_string());
    lines.push(join(instance.weights().iter()));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Write an instance file, replacing any existing content
pub fn write_instance<P: AsRef<Path>>(path: P, reference: &str, instance: &Instance) -> Result<()> {
    fs::write(path, format_instance(reference, instance))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "TestInstance1
3
10 20 30
1 2
3

1
5
2 3 4

QTG-QAOA solution:
Best Value:  30
Best Solution: 110
";

    #[test]
    fn test_parse_ignores_appended_results() {
        let file = parse_instance(SAMPLE).unwrap();
        assert_eq!(file.reference, "TestInstance1");
        let inst = &file.instance;
        assert_eq!(inst.num_items(), 3);
        assert_eq!(inst.profit(0, 2), 2);
        assert_eq!(inst.profit(2, 1), 3);
        assert_eq!(inst.capacity(), 5);
        assert_eq!(inst.weights(), &[2, 3, 4]);
    }

    #[test]
    fn test_format_round_trip() {
        let file = parse_instance(SAMPLE).unwrap();
        let text = format_instance(&file.reference, &file.instance);
        assert_eq!(parse_instance(&text).unwrap(), file);
    }

    #[test]
    fn test_single_item() {
        let file = parse_instance("one\n1\n7\n\n1\n3\n2\n").unwrap();
        assert_eq!(file.instance.profit(0, 0), 7);
        assert_eq!(file.instance.capacity(), 3);
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = parse_instance("ref\n2\n1 x\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));

        let err = parse_instance("ref\n2\n1 2\n3\n\n2\n5\n1 1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 6, .. }));

        assert!(parse_instance("ref\n2\n1 2\n").is_err());
    }

    #[test]
    fn test_oversized_item_count_rejected() {
        let err = parse_instance("ref\n100000\n1 2\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn test_format_layout() {
        let file = parse_instance(SAMPLE).unwrap();
        let text = format_instance(&file.reference, &file.instance);
        assert_eq!(text, "TestInstance1\n3\n10 20 30\n1 2\n3\n\n1\n5\n2 3 4\n");
    }
}
