//! # Servicio de Archivos
//! src/server/files.rs
//!
//! Implementación de `Service` sobre HTTP y el sistema de archivos. Los
//! recursos se resuelven dentro de `root`; como el URI no admite `/`, un
//! recurso nunca sale de ese directorio (`..` y `.` son directorios y se
//! rechazan con 403).
//!
//! | Situación                           | GET | PUT |
//! |-------------------------------------|-----|-----|
//! | éxito                               | 200 | 200 (existía) / 201 |
//! | no existe                           | 404 | -   |
//! | directorio, sin permisos            | 403 | 403 |
//! | directorio padre inexistente        | -   | 403 |
//! | otro error, body incompleto         | 500 | 500 |

use super::service::{Outcome, Service};
use crate::http::{HttpConnection, ParseError, Request, Response, StatusCode};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::marker::PhantomData;
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Sirve y guarda archivos bajo un directorio raíz
pub struct FileService<S = TcpStream> {
    root: PathBuf,
    _stream: PhantomData<fn() -> S>,
}

impl<S> FileService<S> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            _stream: PhantomData,
        }
    }

    /// Directorio raíz
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, resource: &str) -> PathBuf {
        self.root.join(resource)
    }

    fn open_for_write(path: &Path) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        options.open(path)
    }
}

impl<S> Service for FileService<S>
where
    S: Read + Write + Send + 'static,
{
    type Conn = HttpConnection<S>;

    fn parse(&self, conn: &mut Self::Conn) -> Result<Request, ParseError> {
        conn.read_request()
    }

    fn read_resource(&self, resource: &str, conn: &mut Self::Conn) -> Outcome {
        let path = self.path_for(resource);

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot open for reading");
                return Outcome::from_io_error(&e);
            }
        };

        let metadata = match file.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat file");
                return Outcome::ServerError;
            }
        };

        if metadata.is_dir() {
            return Outcome::Forbidden;
        }

        let length = metadata.len();
        let head = Response::new(StatusCode::Ok).with_header("Content-Length", &length.to_string());

        // A partir de aquí el status ya salió: un error solo puede truncar la respuesta
        match send_file(conn.stream_mut(), &head.to_bytes(), file, length) {
            Ok(copied) if copied < length => {
                warn!(path = %path.display(), copied, length, "file shrank while sending");
            }
            Ok(_) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "connection lost while sending file"),
        }

        Outcome::Delivered
    }

    fn write_resource(&self, resource: &str, conn: &mut Self::Conn, length: u64) -> Outcome {
        let path = self.path_for(resource);

        if path.is_dir() {
            return Outcome::Forbidden;
        }

        // Se consulta con el lock de escritura tomado: nadie más crea el archivo entre medio
        let existed = path.exists();

        let mut file = match Self::open_for_write(&path) {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot open for writing");
                return match e.kind() {
                    io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => Outcome::Forbidden,
                    _ => Outcome::ServerError,
                };
            }
        };

        match io::copy(&mut conn.body(length), &mut file) {
            Ok(written) if written == length => {
                if existed {
                    Outcome::Ok
                } else {
                    Outcome::Created
                }
            }
            Ok(written) => {
                warn!(path = %path.display(), written, length, "request body ended early");
                Outcome::ServerError
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to store request body");
                Outcome::ServerError
            }
        }
    }

    fn send(&self, conn: &mut Self::Conn, response: &Response) {
        if let Err(e) = conn.send(response) {
            warn!(status = %response.status(), error = %e, "failed to send response");
        }
    }
}

fn send_file<W: Write>(out: &mut W, head: &[u8], file: File, length: u64) -> io::Result<u64> {
    out.write_all(head)?;
    let copied = io::copy(&mut file.take(length), out)?;
    out.flush()?;
    Ok(copied)
}
