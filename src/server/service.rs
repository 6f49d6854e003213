//! # Colaboradores de los Workers
//! src/server/service.rs
//!
//! Los workers no saben de sockets ni de archivos: consumen estas dos
//! interfaces angostas.
//!
//! - `Listener`: acepta conexiones (solo lo usa el dispatcher)
//! - `Service`: parsea el request, transfiere el archivo y envía la respuesta
//!
//! Ninguna operación propaga errores entre hilos: toda falla se expresa
//! como un `Outcome` o un `ParseError` que el worker convierte en respuesta.

use crate::http::{ParseError, Request, Response, StatusCode};
use std::io;

/// Resultado de una transferencia de archivo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// La respuesta ya se escribió en la conexión junto con el contenido
    Delivered,

    /// PUT sobre un archivo existente
    Ok,

    /// PUT que creó el archivo
    Created,

    NotFound,

    Forbidden,

    ServerError,
}

impl Outcome {
    /// Código de estado que corresponde a este resultado
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Delivered | Outcome::Ok => StatusCode::Ok,
            Outcome::Created => StatusCode::Created,
            Outcome::NotFound => StatusCode::NotFound,
            Outcome::Forbidden => StatusCode::Forbidden,
            Outcome::ServerError => StatusCode::InternalServerError,
        }
    }

    /// Respuesta que falta enviar, si la transferencia no la envió
    pub fn response(&self) -> Option<Response> {
        match self {
            Outcome::Delivered => None,
            other => Some(Response::status_message(other.status())),
        }
    }

    /// Mapea un error de I/O al resultado que ve el cliente
    pub fn from_io_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Outcome::NotFound,
            io::ErrorKind::PermissionDenied => Outcome::Forbidden,
            _ => Outcome::ServerError,
        }
    }
}

/// Acepta conexiones entrantes
pub trait Listener {
    type Conn: Send + 'static;

    /// Bloquea hasta que llegue una conexión
    fn accept(&self) -> io::Result<Self::Conn>;
}

/// Protocolo + transferencia de archivos + envío de respuestas
pub trait Service: Send + Sync + 'static {
    type Conn: Send + 'static;

    /// Lee y valida el request de la conexión
    fn parse(&self, conn: &mut Self::Conn) -> Result<Request, ParseError>;

    /// Envía el recurso por la conexión (se llama con el lock de lectura tomado)
    fn read_resource(&self, resource: &str, conn: &mut Self::Conn) -> Outcome;

    /// Recibe `length` bytes y los guarda en el recurso (con el lock de escritura tomado)
    fn write_resource(&self, resource: &str, conn: &mut Self::Conn, length: u64) -> Outcome;

    /// Envía una respuesta; los errores de envío solo se registran
    fn send(&self, conn: &mut Self::Conn, response: &Response);
}
