//! Collaborators at the edges of a request: where the payload comes from and
//! where the response goes. The dispatcher never owns the transport.

use std::io::{Read, Write};

use crate::error::JsonRpcTransportError;

/// Supplies the raw request payload on demand
pub trait PayloadSource {
    fn read_payload(&mut self) -> Result<Vec<u8>, JsonRpcTransportError>;
}

/// Accepts the finished response and is told when the request is done
pub trait OutputSink {
    fn write_response(&mut self, body: &[u8]) -> Result<(), JsonRpcTransportError>;

    /// Flush and end processing of the current request
    fn finish(&mut self) -> Result<(), JsonRpcTransportError>;
}

/// Payload source draining any reader (stdin, a file, a request body)
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> PayloadSource for ReaderSource<R> {
    fn read_payload(&mut self) -> Result<Vec<u8>, JsonRpcTransportError> {
        let mut payload = Vec::new();
        self.reader.read_to_end(&mut payload)?;
        Ok(payload)
    }
}

/// Output sink writing to any writer (stdout, a socket, a buffer)
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
    finished: bool,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            finished: false,
        }
    }

    /// Whether [`OutputSink::finish`] has been called
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn write_response(&mut self, body: &[u8]) -> Result<(), JsonRpcTransportError> {
        self.writer.write_all(body)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), JsonRpcTransportError> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }
}
