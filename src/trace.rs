// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Temporal Cascade Simulation Suite - Trace Output
//
// One record per counted cascade link: `time provider contact run`.

use std::fmt;
use std::io::{self, BufWriter, Write};

use crate::types::{NodeId, RunId, Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub time: Time,
    pub provider: NodeId,
    pub contact: NodeId,
    pub run: RunId,
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.time, self.provider, self.contact, self.run)
    }
}

/// Destination for trace records emitted from inside the event loop.
pub trait TraceSink {
    fn emit(&mut self, record: TraceRecord) -> io::Result<()>;

    /// Called once after each run drains.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn emit(&mut self, _record: TraceRecord) -> io::Result<()> {
        Ok(())
    }
}

/// Collects records in memory.
impl TraceSink for Vec<TraceRecord> {
    fn emit(&mut self, record: TraceRecord) -> io::Result<()> {
        self.push(record);
        Ok(())
    }
}

impl<S: TraceSink + ?Sized> TraceSink for &mut S {
    fn emit(&mut self, record: TraceRecord) -> io::Result<()> {
        (**self).emit(record)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl<S: TraceSink> TraceSink for Option<S> {
    fn emit(&mut self, record: TraceRecord) -> io::Result<()> {
        match self {
            Some(sink) => sink.emit(record),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

/// Buffered text writer, one line per record.
pub struct TraceWriter<W: Write> {
    out: BufWriter<W>,
    lines: u64,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { out: BufWriter::new(inner), lines: 0 }
    }

    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.out.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> TraceSink for TraceWriter<W> {
    fn emit(&mut self, record: TraceRecord) -> io::Result<()> {
        self.lines += 1;
        writeln!(self.out, "{}", record)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Parse one trace line back into a record. Used by tooling and tests that
/// consume trace files.
pub fn parse_line(line: &str) -> Option<TraceRecord> {
    let mut fields = line.split_whitespace();
    let record = TraceRecord {
        time: fields.next()?.parse().ok()?,
        provider: fields.next()?.parse().ok()?,
        contact: fields.next()?.parse().ok()?,
        run: fields.next()?.parse().ok()?,
    };
    fields.next().is_none().then_some(record)
}
