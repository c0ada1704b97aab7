use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::reconcile::{PairedRecord, MISSING_SENTINEL};
use crate::record::ScoreRecord;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

pub type ReportResult<T> = Result<T, ReportError>;

pub const SCORES_HEADER: [&str; 4] = ["student_name", "score", "missing_questions", "type"];
pub const PAIRED_HEADER: [&str; 5] = [
    "true_name",
    "student_name",
    "score",
    "missing_questions",
    "type",
];

const LINE_END: &str = "\r\n";

pub fn write_scores<W: Write>(mut out: W, records: &[ScoreRecord]) -> io::Result<()> {
    write_row(&mut out, &SCORES_HEADER)?;
    for record in records {
        let score = record.score.to_string();
        let missing = format_list(&record.missing_questions);
        write_row(
            &mut out,
            &[
                record.submission_key.as_str(),
                score.as_str(),
                missing.as_str(),
                record.source_type.as_str(),
            ],
        )?;
    }
    out.flush()
}

pub fn write_paired<W: Write>(mut out: W, paired: &[PairedRecord]) -> io::Result<()> {
    write_row(&mut out, &PAIRED_HEADER)?;
    for row in paired {
        match &row.submission {
            Some(record) => {
                let score = record.score.to_string();
                let missing = format_list(&record.missing_questions);
                write_row(
                    &mut out,
                    &[
                        row.true_name.as_str(),
                        record.submission_key.as_str(),
                        score.as_str(),
                        missing.as_str(),
                        record.source_type.as_str(),
                    ],
                )?;
            }
            None => write_row(&mut out, &[row.true_name.as_str(), "", "0", MISSING_SENTINEL, ""])?,
        }
    }
    out.flush()
}

pub async fn save_scores(path: &Path, records: &[ScoreRecord]) -> ReportResult<()> {
    let mut buf = Vec::new();
    write_scores(&mut buf, records).map_err(|source| write_error(path, source))?;
    save(path, buf).await
}

pub async fn save_paired(path: &Path, paired: &[PairedRecord]) -> ReportResult<()> {
    let mut buf = Vec::new();
    write_paired(&mut buf, paired).map_err(|source| write_error(path, source))?;
    save(path, buf).await
}

async fn save(path: &Path, contents: Vec<u8>) -> ReportResult<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| write_error(path, source))?;
    tracing::info!(path = %path.display(), "Wrote report");
    Ok(())
}

fn write_error(path: &Path, source: io::Error) -> ReportError {
    ReportError::Write {
        path: path.to_path_buf(),
        source,
    }
}

fn write_row<W: Write>(out: &mut W, fields: &[&str]) -> io::Result<()> {
    let line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    write!(out, "{line}{LINE_END}")
}

/// Quote a CSV field when it contains a delimiter, quote or line break.
#[must_use]
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render a list the way a Python list of strings prints, e.g.
/// `['Exercise 1.1', 'Exercise 2.3']`.
#[must_use]
pub fn format_list(items: &[String]) -> String {
    let items: Vec<String> = items.iter().map(|s| quote_str(s)).collect();
    format!("[{}]", items.join(", "))
}

fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionMethod;
    use crate::roster::RosterEntry;
    use crate::score::Score;

    fn record(file: &str, completed: usize, missing: &[&str], method: Option<ExtractionMethod>) -> ScoreRecord {
        ScoreRecord::new(
            file,
            Score {
                completed,
                missing: missing.iter().map(ToString::to_string).collect(),
            },
            method,
        )
    }

    fn render_scores(records: &[ScoreRecord]) -> String {
        let mut buf = Vec::new();
        write_scores(&mut buf, records).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_format_list() {
        assert_eq!(format_list(&[]), "[]");
        assert_eq!(
            format_list(&["Exercise 1.1".into(), "Exercise 2.3".into()]),
            "['Exercise 1.1', 'Exercise 2.3']"
        );
        assert_eq!(format_list(&["Bob's".into()]), "[\"Bob's\"]");
        assert_eq!(format_list(&["a'b\"c".into()]), "['a\\'b\"c']");
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("Doe, Jane"), "\"Doe, Jane\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_write_scores() {
        let records = vec![
            record("doejane_hw.pdf", 1, &["Exercise 2.3"], Some(ExtractionMethod::PdfOcrFallback)),
            record("roejohn_hw.pdf", 2, &[], Some(ExtractionMethod::Direct)),
            ScoreRecord::ungraded("notes.txt"),
        ];

        let csv = render_scores(&records);

        assert_eq!(
            csv,
            "student_name,score,missing_questions,type\r\n\
             doejane,1,['Exercise 2.3'],image pdf\r\n\
             roejohn,2,[],pdf\r\n\
             notes.txt,0,[],unknown\r\n"
        );
    }

    #[test]
    fn test_missing_list_with_comma_is_quoted() {
        let records = vec![record(
            "doejane_hw.png",
            0,
            &["Exercise 1.1", "Exercise 2.3"],
            Some(ExtractionMethod::ImageOcr),
        )];

        let csv = render_scores(&records);

        assert!(csv.contains("doejane,0,\"['Exercise 1.1', 'Exercise 2.3']\",image\r\n"));
    }

    #[test]
    fn test_write_paired() {
        let jane = RosterEntry::new("Doe, Jane");
        let ann = RosterEntry::new("Smith, Ann");
        let paired = vec![
            PairedRecord::matched(&jane, record("doejane_hw.pdf", 2, &[], Some(ExtractionMethod::Direct))),
            PairedRecord::missing(&ann),
            PairedRecord::orphan(record("roejohn_hw.pdf", 1, &["Exercise 1.1"], Some(ExtractionMethod::Direct))),
        ];

        let mut buf = Vec::new();
        write_paired(&mut buf, &paired).unwrap();
        let csv = String::from_utf8(buf).unwrap();

        assert_eq!(
            csv,
            "true_name,student_name,score,missing_questions,type\r\n\
             \"Doe, Jane\",doejane,2,[],pdf\r\n\
             \"Smith, Ann\",,0,MISSING,\r\n\
             ?,roejohn,1,['Exercise 1.1'],pdf\r\n"
        );
    }

    #[tokio::test]
    async fn test_save_to_missing_directory_fails() {
        let result = save_scores(Path::new("/nonexistent/dir/scores.csv"), &[]).await;

        assert!(matches!(result, Err(ReportError::Write { .. })));
    }
}
