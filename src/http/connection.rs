//! # Conexión HTTP
//! src/http/connection.rs
//!
//! Envuelve un stream (un `TcpStream` en producción) y separa el bloque de
//! headers del body. Los bytes que llegan pegados a los headers se guardan
//! y se entregan primero cuando se lee el body de un PUT.

use super::{ParseError, Request, Response};
use std::io::{self, Chain, Cursor, Read, Take, Write};
use std::net::TcpStream;

/// Tamaño máximo del bloque de headers
pub const MAX_HEAD_SIZE: usize = 2048;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Una conexión aceptada, lista para leer un request y escribir la respuesta
#[derive(Debug)]
pub struct HttpConnection<S = TcpStream> {
    stream: S,

    /// Bytes leídos después de `\r\n\r\n`
    buffered: Vec<u8>,
}

impl<S: Read + Write> HttpConnection<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffered: Vec::new(),
        }
    }

    /// Lee del stream hasta el fin de los headers y los parsea
    pub fn read_request(&mut self) -> Result<Request, ParseError> {
        let mut head = Vec::with_capacity(512);
        let mut chunk = [0u8; 512];

        let end = loop {
            if let Some(pos) = find_terminator(&head) {
                break pos + HEAD_TERMINATOR.len();
            }
            if head.len() > MAX_HEAD_SIZE {
                return Err(ParseError::HeaderTooLarge);
            }

            let n = match self.stream.read(&mut chunk) {
                Ok(0) if head.is_empty() => return Err(ParseError::EmptyRequest),
                Ok(0) => return Err(ParseError::ConnectionClosed),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ParseError::Io(e.to_string())),
            };
            head.extend_from_slice(&chunk[..n]);
        };

        if end > MAX_HEAD_SIZE {
            return Err(ParseError::HeaderTooLarge);
        }

        self.buffered = head.split_off(end);
        Request::parse(&head)
    }

    /// Lector del body: primero lo ya leído, luego el stream, hasta `length` bytes
    pub fn body(&mut self, length: u64) -> Take<Chain<Cursor<Vec<u8>>, &mut S>> {
        let buffered = std::mem::take(&mut self.buffered);
        Cursor::new(buffered).chain(&mut self.stream).take(length)
    }

    /// Escribe una respuesta completa
    pub fn send(&mut self, response: &Response) -> io::Result<()> {
        self.stream.write_all(&response.to_bytes())?;
        self.stream.flush()
    }

    /// Acceso directo al stream (para enviar el contenido de un archivo)
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Consume la conexión y devuelve el stream
    pub fn into_inner(self) -> S {
        self.stream
    }
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
}
