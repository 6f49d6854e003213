//! # Módulo HTTP
//!
//! Subconjunto de HTTP/1.1 que necesita el servidor de archivos:
//!
//! - Lectura del bloque de headers desde la conexión
//! - Parsing y validación del request (GET y PUT)
//! - Construcción de responses y códigos de estado
//!
//! ### Formato de Request
//!
//! ```text
//! GET /file.txt HTTP/1.1\r\n
//! Request-Id: 1\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hello
//! ```

pub mod connection; // Lectura de headers y body desde el socket
pub mod request;    // Parsing de HTTP requests
pub mod response;   // Construcción de HTTP responses
pub mod status;     // Códigos de estado HTTP

pub use connection::HttpConnection;
pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
