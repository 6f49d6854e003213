//! # Construcción de Respuestas HTTP
//!
//! API para construir respuestas HTTP/1.1 y convertirlas a bytes.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 201 Created\r\n
//! Content-Length: 8\r\n
//! \r\n
//! Created\n
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use file_server::http::{Response, StatusCode};
//!
//! let response = Response::status_message(StatusCode::NotFound);
//! let text = String::from_utf8(response.to_bytes()).unwrap();
//! assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
//! assert!(text.ends_with("\r\n\r\nNot Found\n"));
//! ```

use super::StatusCode;
use std::collections::HashMap;

/// Representa una respuesta HTTP/1.1
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    /// Usamos HashMap para evitar headers duplicados
    headers: HashMap<String, String>,

    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Respuesta estándar del servidor: el body es la razón seguida de `\n`
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::{Response, StatusCode};
    ///
    /// let response = Response::status_message(StatusCode::Created);
    /// assert_eq!(response.body(), b"Created\n");
    /// ```
    pub fn status_message(status: StatusCode) -> Self {
        Self::new(status).with_body(&format!("{}\n", status.reason_phrase()))
    }

    /// Agrega un header (si ya existe, se sobrescribe)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Agrega un header a una respuesta existente
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el body y calcula `Content-Length`
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece un body binario y calcula `Content-Length`
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self.headers
            .insert("Content-Length".to_string(), self.body.len().to_string());
        self
    }

    /// Convierte la respuesta a bytes: status line, headers, línea vacía y body
    ///
    /// Para GET el body (el archivo) se envía aparte, así que la respuesta
    /// solo lleva `Content-Length` y termina en la línea vacía.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(64 + self.body.len());

        result.extend_from_slice(format!("HTTP/1.1 {}\r\n", self.status).as_bytes());

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Código de estado
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Headers de la respuesta
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Body de la respuesta
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
