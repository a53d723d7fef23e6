//! Pairwise similarity records (BLAST `-m8` reduced to three columns).
//!
//! Records are `id id score`, lower scores being more significant. The
//! [`BestScores`] table drops self-matches, folds `(a, b)` and `(b, a)` onto
//! one [`PairKey`] and keeps the lowest score seen for each key.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use crate::libs::error::FilterError;

/// Significant digits of the `%g` style score output
const PRECISION: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id_a: String,
    pub id_b: String,
    pub score: f64,
}

impl Record {
    /// Parses a whitespace-separated `id id score` line.
    ///
    /// ```
    /// use synpl::libs::pair::Record;
    /// let rec = Record::parse("geneA\tgeneB  1e-10", 1).unwrap();
    /// assert_eq!(rec.id_a, "geneA");
    /// assert_eq!(rec.id_b, "geneB");
    /// assert_eq!(rec.score, 1e-10);
    ///
    /// assert!(Record::parse("geneA geneB", 2).is_err());
    /// assert!(Record::parse("geneA geneB high", 3).is_err());
    /// ```
    pub fn parse(line: &str, line_no: usize) -> Result<Self, FilterError> {
        let malformed = |reason: String| FilterError::MalformedRecord {
            line: line_no,
            content: line.to_string(),
            reason,
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(malformed(format!(
                "expected 3 fields, found {}",
                fields.len()
            )));
        }

        let score = fields[2]
            .parse::<f64>()
            .map_err(|e| malformed(format!("invalid score `{}`: {}", fields[2], e)))?;

        Ok(Self {
            id_a: fields[0].to_string(),
            id_b: fields[1].to_string(),
            score,
        })
    }

    pub fn is_self_match(&self) -> bool {
        self.id_a == self.id_b
    }

    /// `None` for self-matches
    pub fn key(&self) -> Option<PairKey> {
        PairKey::new(&self.id_a, &self.id_b)
    }
}

/// An unordered pair of identifiers, stored as `(lo, hi)`.
///
/// The derived ordering compares `lo` first, then `hi`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    pub lo: String,
    pub hi: String,
}

impl PairKey {
    /// ```
    /// use synpl::libs::pair::PairKey;
    /// assert_eq!(PairKey::new("b", "a"), PairKey::new("a", "b"));
    /// assert_eq!(PairKey::new("a", "a"), None);
    /// ```
    pub fn new(a: &str, b: &str) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Less => Some(Self {
                lo: a.to_string(),
                hi: b.to_string(),
            }),
            std::cmp::Ordering::Greater => Some(Self {
                lo: b.to_string(),
                hi: a.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Lines consumed from the input
    pub read: usize,
    /// Distinct canonical pairs kept
    pub retained: usize,
}

/// Lowest score per canonical pair
#[derive(Debug, Clone, Default)]
pub struct BestScores {
    table: BTreeMap<PairKey, f64>,
}

impl BestScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one record into the table.
    ///
    /// An existing score is replaced only by a strictly lower one, so on ties the
    /// first score seen stays. Returns `true` when the table changed.
    pub fn insert(&mut self, record: Record) -> bool {
        let key = match record.key() {
            Some(key) => key,
            None => return false,
        };

        match self.table.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(record.score);
                true
            }
            Entry::Occupied(mut entry) => {
                if record.score < *entry.get() {
                    entry.insert(record.score);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Builds the table from every line of `reader`.
    ///
    /// `source` only labels read errors. Any malformed line, including one that is
    /// not valid UTF-8, aborts the whole pass.
    pub fn from_reader<R: BufRead>(
        mut reader: R,
        source: &str,
    ) -> Result<(Self, FilterStats), FilterError> {
        let mut best = Self::new();
        let mut read = 0;
        let mut buf: Vec<u8> = Vec::new();

        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| FilterError::InputNotFound {
                    path: source.to_string(),
                    reason: e.to_string(),
                })?;
            if n == 0 {
                break;
            }
            read += 1;

            // same line endings as BufRead::lines
            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }

            let line = std::str::from_utf8(&buf).map_err(|e| FilterError::MalformedRecord {
                line: read,
                content: String::from_utf8_lossy(&buf).into_owned(),
                reason: format!("invalid UTF-8: {}", e),
            })?;

            let record = Record::parse(line, read)?;
            best.insert(record);
        }

        let stats = FilterStats {
            read,
            retained: best.len(),
        };
        Ok((best, stats))
    }

    pub fn get(&self, key: &PairKey) -> Option<f64> {
        self.table.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, f64)> {
        self.table.iter().map(|(k, v)| (k, *v))
    }

    /// Writes `lo\thi\tscore` lines in ascending key order.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for (key, score) in self.iter() {
            writer.write_fmt(format_args!(
                "{}\t{}\t{}\n",
                key.lo,
                key.hi,
                format_g(score)
            ))?;
        }
        writer.flush()
    }
}

/// Formats a score like C's `%g`.
///
/// ```
/// use synpl::libs::pair::format_g;
/// assert_eq!(format_g(1e-50), "1e-50");
/// assert_eq!(format_g(1e-5), "1e-05");
/// assert_eq!(format_g(0.001), "0.001");
/// assert_eq!(format_g(123456789.0), "1.23457e+08");
/// assert_eq!(format_g(42.0), "42");
/// ```
pub fn format_g(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // The exponent is taken after rounding to PRECISION digits
    let sci = format!("{:.*e}", PRECISION - 1, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= PRECISION as i32 {
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            if exp < 0 { '-' } else { '+' },
            exp.abs()
        )
    } else {
        let decimals = (PRECISION as i32 - 1 - exp) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
