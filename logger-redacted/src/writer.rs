use std::io;

use tracing_subscriber::fmt::MakeWriter;

use crate::redactor::PiiRedactor;

/// Wraps a [`MakeWriter`] so every formatted event is redacted before it is
/// written. The fmt layer hands each event over in a single `write` call, so
/// patterns never straddle two buffers.
pub struct RedactingMakeWriter<M> {
    inner: M,
    redactor: PiiRedactor,
}

impl<M> RedactingMakeWriter<M> {
    pub fn new(inner: M, redactor: PiiRedactor) -> Self {
        Self { inner, redactor }
    }
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<'a, M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new(self.inner.make_writer(), &self.redactor)
    }
}

pub struct RedactingWriter<'a, W> {
    inner: W,
    redactor: &'a PiiRedactor,
}

impl<'a, W> RedactingWriter<'a, W> {
    pub fn new(inner: W, redactor: &'a PiiRedactor) -> Self {
        Self { inner, redactor }
    }
}

impl<W: io::Write> io::Write for RedactingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.inner.write_all(self.redactor.redact(&text).as_bytes())?;
        // Report the caller's length; the redacted text may differ in size.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redactor::RedactionConfig;
    use std::io::Write;

    #[test]
    fn writes_redacted_lines() {
        let redactor = PiiRedactor::new(RedactionConfig {
            hash_for_correlation: false,
            ..Default::default()
        });
        let mut sink = Vec::new();
        {
            let mut writer = RedactingWriter::new(&mut sink, &redactor);
            let line = b"duplicate cpf 123.456.789-09\n";
            assert_eq!(writer.write(line).unwrap(), line.len());
            writer.flush().unwrap();
        }
        assert_eq!(String::from_utf8(sink).unwrap(), "duplicate cpf ***.***.***-**\n");
    }
}
