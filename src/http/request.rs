//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Parsea el bloque de headers de un request (todo lo anterior al body).
//!
//! ## Formato
//!
//! ```text
//! PUT /notes.txt HTTP/1.1\r\n
//! Content-Length: 12\r\n
//! Request-Id: 7\r\n
//! \r\n
//! ```
//!
//! ## Reglas
//!
//! 1. **Request line**: método `[a-zA-Z]{1,8}`, URI `/[a-zA-Z0-9.-]{1,63}`,
//!    versión `HTTP/d.d`
//! 2. **Headers**: `Nombre: Valor`, nombre `[a-zA-Z0-9.-]{1,128}`, valor
//!    imprimible de hasta 128 caracteres
//! 3. Solo se atiende `HTTP/1.1` y los métodos GET y PUT
//! 4. PUT requiere `Content-Length`

use super::StatusCode;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

static REQUEST_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z]{1,8}) (/[a-zA-Z0-9.\-]{1,63}) (HTTP/[0-9]\.[0-9])$")
        .expect("request line regex is valid")
});

static HEADER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9.\-]{1,128}): ([\x20-\x7E]{0,128})$").expect("header regex is valid")
});

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Leer un archivo (lock de lectura)
    GET,

    /// PUT - Crear o sobrescribir un archivo (lock de escritura)
    PUT,
}

impl Method {
    fn from_str(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "PUT" => Ok(Method::PUT),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::PUT => "PUT",
        }
    }
}

/// Errores que pueden ocurrir al leer o parsear un request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// La conexión se cerró sin enviar ningún byte
    #[error("Empty request")]
    EmptyRequest,

    /// La conexión se cerró antes de terminar los headers
    #[error("Connection closed before end of headers")]
    ConnectionClosed,

    /// El bloque de headers supera el tamaño máximo
    #[error("Header block too large")]
    HeaderTooLarge,

    /// Formato inválido de la request line
    #[error("Invalid request line format")]
    InvalidRequestLine,

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Método distinto de GET/PUT
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Versión distinta de HTTP/1.1
    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    /// PUT sin `Content-Length`
    #[error("Missing Content-Length")]
    MissingContentLength,

    /// `Content-Length` no numérico
    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// Error de lectura del socket
    #[error("I/O error while reading request: {0}")]
    Io(String),
}

impl ParseError {
    /// Código de estado con el que se rechaza el request
    pub fn status(&self) -> StatusCode {
        match self {
            ParseError::UnsupportedMethod(_) => StatusCode::NotImplemented,
            ParseError::InvalidHttpVersion(_) => StatusCode::VersionNotSupported,
            _ => StatusCode::BadRequest,
        }
    }
}

/// Request HTTP/1.1 parseado (sin body)
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// URI tal como llegó (ej: "/notes.txt")
    uri: String,

    version: String,

    /// Headers con el nombre en minúsculas
    headers: HashMap<String, String>,
}

impl Request {
    /// Parsea el bloque de headers de un request
    ///
    /// Acepta el bloque con o sin la línea vacía final.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use file_server::http::{Method, Request};
    ///
    /// let raw = b"PUT /notes.txt HTTP/1.1\r\nContent-Length: 5\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::PUT);
    /// assert_eq!(request.resource_id(), "notes.txt");
    /// assert_eq!(request.content_length(), Some(5));
    /// ```
    pub fn parse(head: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;
        let text = text.strip_suffix("\r\n\r\n").unwrap_or(text);

        let mut lines = text.split("\r\n");
        let request_line = lines.next().ok_or(ParseError::InvalidRequestLine)?;

        // 1. Request line
        let captures = REQUEST_LINE
            .captures(request_line)
            .ok_or(ParseError::InvalidRequestLine)?;
        let method = &captures[1];
        let uri = captures[2].to_string();
        let version = captures[3].to_string();

        if version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        // 2. Headers
        let headers = Self::parse_headers(lines)?;

        // 3. Método (después de validar la forma del request completo)
        let method = Method::from_str(method)?;

        let request = Request {
            method,
            uri,
            version,
            headers,
        };

        // 4. PUT necesita saber cuántos bytes leer
        if method == Method::PUT {
            match request.header("Content-Length") {
                None => return Err(ParseError::MissingContentLength),
                Some(value) if value.parse::<u64>().is_err() => {
                    return Err(ParseError::InvalidContentLength(value.to_string()))
                }
                Some(_) => {}
            }
        }

        Ok(request)
    }

    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            let captures = HEADER_LINE
                .captures(line)
                .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;
            headers.insert(captures[1].to_ascii_lowercase(), captures[2].to_string());
        }

        Ok(headers)
    }

    /// Método HTTP
    pub fn method(&self) -> Method {
        self.method
    }

    /// URI completo (con la `/` inicial)
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Identificador del recurso: el URI sin la `/` inicial
    pub fn resource_id(&self) -> &str {
        self.uri.trim_start_matches('/')
    }

    /// Versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Header específico (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    /// Largo del body declarado en `Content-Length`
    pub fn content_length(&self) -> Option<u64> {
        self.header("Content-Length")?.parse().ok()
    }

    /// Valor de `Request-Id`, o "0" si no vino
    pub fn request_id(&self) -> &str {
        self.header("Request-Id").unwrap_or("0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let request = Request::parse(b"GET /foo.txt HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri(), "/foo.txt");
        assert_eq!(request.resource_id(), "foo.txt");
        assert_eq!(request.version(), "HTTP/1.1");
        assert_eq!(request.request_id(), "0");
    }

    #[test]
    fn test_parse_headers_case_insensitive() {
        let raw = b"GET /a HTTP/1.1\r\nrequest-id: 42\r\nHost: localhost:8080\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.request_id(), "42");
        assert_eq!(request.header("HOST"), Some("localhost:8080"));
    }

    #[test]
    fn test_parse_put_with_length() {
        let raw = b"PUT /data.bin HTTP/1.1\r\nContent-Length: 1024\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.content_length(), Some(1024));
    }

    #[test]
    fn test_put_without_length() {
        let result = Request::parse(b"PUT /data.bin HTTP/1.1\r\n\r\n");
        assert_eq!(result.unwrap_err(), ParseError::MissingContentLength);
    }

    #[test]
    fn test_put_with_invalid_length() {
        let result = Request::parse(b"PUT /x HTTP/1.1\r\nContent-Length: ten\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidContentLength(_))));
    }

    #[test]
    fn test_unsupported_method() {
        let err = Request::parse(b"DELETE /x HTTP/1.1\r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedMethod(_)));
        assert_eq!(err.status(), StatusCode::NotImplemented);
    }

    #[test]
    fn test_invalid_version() {
        let err = Request::parse(b"GET /x HTTP/1.0\r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidHttpVersion(_)));
        assert_eq!(err.status(), StatusCode::VersionNotSupported);
    }

    #[test]
    fn test_uri_with_slash_rejected() {
        let err = Request::parse(b"GET /dir/file HTTP/1.1\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::InvalidRequestLine);
        assert_eq!(err.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_uri_too_long_rejected() {
        let raw = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(64));
        let result = Request::parse(raw.as_bytes());
        assert_eq!(result.unwrap_err(), ParseError::InvalidRequestLine);
    }

    #[test]
    fn test_invalid_header() {
        let result = Request::parse(b"GET /x HTTP/1.1\r\nNoColonHere\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidHeader(_))));
    }

    #[test]
    fn test_blank_head_is_bad_request() {
        // Solo la conexión decide que no llegó nada; un bloque vacío es un request inválido
        for raw in [&b""[..], b"\r\n\r\n", b"   \r\n\r\n"] {
            let err = Request::parse(raw).unwrap_err();
            assert_eq!(err, ParseError::InvalidRequestLine);
            assert_eq!(err.status(), StatusCode::BadRequest);
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ParseError::UnsupportedMethod("DELETE".to_string()).to_string(),
            "Unsupported HTTP method: DELETE"
        );
        assert_eq!(ParseError::HeaderTooLarge.to_string(), "Header block too large");
    }

    #[test]
    fn test_garbage_request() {
        let result = Request::parse(b"\x00\x01\x02\x03garbage");
        assert_eq!(result.unwrap_err(), ParseError::InvalidRequestLine);
    }
}
