use std::io::{BufRead, Write};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use tracing::info;

use crate::error::{Error, Result};
use crate::lemmatizer::Lemmatizer;
use crate::token::Record;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StreamStats {
    pub records: usize,
    pub blank_lines: usize,
    pub elapsed: Duration,
}

impl StreamStats {
    pub fn lines(&self) -> usize {
        self.records + self.blank_lines
    }

    pub fn lines_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.lines() as f64 / secs
        } else {
            0.0
        }
    }
}

pub struct StreamProcessor<'a> {
    lemmatizer: &'a Lemmatizer,
    separator: String,
    workers: NonZeroUsize,
}

impl<'a> StreamProcessor<'a> {
    pub fn new(lemmatizer: &'a Lemmatizer, separator: impl Into<String>) -> Result<Self> {
        let separator = separator.into();
        if separator.is_empty() {
            return Err(Error::Config("separator must not be empty".to_string()));
        }
        Ok(Self {
            lemmatizer,
            separator,
            workers: NonZeroUsize::MIN,
        })
    }

    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    pub fn parse_record(&self, line: &str, line_no: usize) -> Result<Record> {
        let mut fields = line.split(self.separator.as_str());
        match (fields.next(), fields.next(), fields.next()) {
            (Some(form), Some(tag), None) if !form.is_empty() => Ok(Record::new(form, tag)),
            _ => Err(Error::MalformedInputRecord {
                line: line_no,
                content: line.to_string(),
            }),
        }
    }

    pub fn process<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> Result<StreamStats> {
        let start = Instant::now();
        let mut stats = StreamStats::default();
        let mut sentence: Vec<(Record, &'static str)> = Vec::new();

        let mut buf = String::new();
        let mut line_no = 0;
        while reader.read_line(&mut buf)? > 0 {
            line_no += 1;
            let (line, eol) = split_terminator(&buf);

            if line.is_empty() {
                self.write_sentence(&mut sentence, &mut writer)?;
                write!(writer, "{}", eol)?;
                stats.blank_lines += 1;
                buf.clear();
                continue;
            }

            let record = self.parse_record(line, line_no)?;
            stats.records += 1;

            if self.workers.get() > 1 {
                sentence.push((record, eol));
            } else {
                let resolved = self.lemmatizer.resolve(record);
                write!(writer, "{}{}", resolved.to_line(&self.separator), eol)?;
            }
            buf.clear();
        }

        self.write_sentence(&mut sentence, &mut writer)?;
        writer.flush()?;

        stats.elapsed = start.elapsed();
        info!(
            "{} lines processed in {:.2} s ({:.1} lines/s)",
            stats.lines(),
            stats.elapsed.as_secs_f64(),
            stats.lines_per_second()
        );
        Ok(stats)
    }

    fn write_sentence<W: Write>(
        &self,
        sentence: &mut Vec<(Record, &'static str)>,
        writer: &mut W,
    ) -> Result<()> {
        if sentence.is_empty() {
            return Ok(());
        }
        let (records, eols): (Vec<Record>, Vec<&str>) = std::mem::take(sentence).into_iter().unzip();
        let resolved = self.lemmatizer.lemmatize_batch(records, self.workers);
        for (resolved, eol) in resolved.iter().zip(eols) {
            write!(writer, "{}{}", resolved.to_line(&self.separator), eol)?;
        }
        Ok(())
    }
}

// Lines keep their own terminator on output; the last line may have none.
fn split_terminator(buf: &str) -> (&str, &'static str) {
    if let Some(line) = buf.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = buf.strip_suffix('\n') {
        (line, "\n")
    } else {
        (buf, "")
    }
}
