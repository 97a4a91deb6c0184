//! # Système de fichiers virtuel du webserver
//!
//! Catalogue en mémoire associant des chemins virtuels (`/virtual/...`) au
//! contenu des fichiers de description et des icônes du device. Le
//! catalogue est peuplé au démarrage, avant que le serveur HTTP n'accepte
//! des requêtes, puis n'est plus jamais modifié : les lectures ne prennent
//! aucun verrou.
//!
//! ## Cycle de vie d'une lecture
//!
//! ```text
//! open() -> OpenFileCursor -> read()/seek() -> drop (close)
//! ```
//!
//! Plusieurs curseurs peuvent coexister sur le même fichier ; chacun porte
//! sa propre position et une vue empruntée (aucune copie du contenu).

use axum::body::Bytes;
use axum::extract::{Path as AxumPath, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// Erreurs du système de fichiers virtuel
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    #[error("failed to read {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },

    #[error("refusing to register empty file {0}")]
    EmptyFile(String),

    #[error("virtual path already registered: {0}")]
    AlreadyRegistered(String),

    #[error("virtual file not found: {0}")]
    NotFound(String),

    #[error("virtual files are read-only")]
    ReadOnly,

    #[error("seek position out of range")]
    SeekOutOfRange,
}

/// Mode d'ouverture d'un fichier virtuel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

/// Fichier virtuel immuable
#[derive(Debug, Clone)]
pub struct VirtualFile {
    /// Chemin virtuel absolu (clé unique, commence par `/virtual/`)
    pub virtual_path: String,

    /// Type MIME
    pub content_type: String,

    /// Contenu, immuable pour toute la vie du process
    pub body: Bytes,

    /// Date de modification du fichier source
    pub mtime: SystemTime,
}

/// Métadonnées d'un fichier virtuel
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub length: u64,
    pub mtime: SystemTime,
    pub is_directory: bool,
    pub is_readable: bool,
    pub content_type: String,
}

/// Curseur de lecture sur un fichier virtuel
///
/// Emprunte le contenu du store : aucune copie, invariant `0 <= pos <= len`.
#[derive(Debug)]
pub struct OpenFileCursor<'a> {
    view: &'a [u8],
    pos: usize,
}

impl<'a> OpenFileCursor<'a> {
    /// Copie `min(|buf|, len - pos)` octets dans `buf` et avance la position.
    ///
    /// Retourne le nombre d'octets copiés, 0 en fin de fichier.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let remaining = self.view.len() - self.pos;
        let to_read = buf.len().min(remaining);
        buf[..to_read].copy_from_slice(&self.view[self.pos..self.pos + to_read]);
        self.pos += to_read;
        to_read
    }

    /// Déplace la position de lecture.
    ///
    /// Échoue si la position résultante sort de `[0, len]`.
    pub fn seek(&mut self, from: SeekFrom) -> Result<u64, VfsError> {
        let len = self.view.len() as i64;
        let new_pos = match from {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::Current(offset) => self.pos as i64 + offset,
            SeekFrom::End(offset) => len + offset,
        };

        if new_pos < 0 || new_pos > len {
            return Err(VfsError::SeekOutOfRange);
        }

        self.pos = new_pos as usize;
        Ok(self.pos as u64)
    }

    /// Les fichiers virtuels sont en lecture seule.
    pub fn write(&mut self, _buf: &[u8]) -> Result<usize, VfsError> {
        Err(VfsError::ReadOnly)
    }

    /// Position courante du curseur.
    pub fn position(&self) -> u64 {
        self.pos as u64
    }
}

/// Catalogue des fichiers virtuels
#[derive(Debug, Default)]
pub struct VirtualFileStore {
    files: HashMap<String, Arc<VirtualFile>>,
}

impl VirtualFileStore {
    /// Crée un store vide
    pub fn new() -> Self {
        Self::default()
    }

    /// Lit `real_path` en mémoire et l'enregistre sous `virtual_path`.
    ///
    /// # Errors
    ///
    /// - [`VfsError::Unreadable`] si le fichier source est illisible
    /// - [`VfsError::EmptyFile`] si le fichier source est vide
    /// - [`VfsError::AlreadyRegistered`] si le chemin virtuel existe déjà
    pub fn register(
        &mut self,
        real_path: impl AsRef<Path>,
        virtual_path: &str,
        content_type: &str,
    ) -> Result<(), VfsError> {
        let real_path = real_path.as_ref();

        if self.files.contains_key(virtual_path) {
            return Err(VfsError::AlreadyRegistered(virtual_path.to_string()));
        }

        let data = std::fs::read(real_path).map_err(|source| VfsError::Unreadable {
            path: real_path.display().to_string(),
            source,
        })?;

        if data.is_empty() {
            return Err(VfsError::EmptyFile(real_path.display().to_string()));
        }

        let mtime = std::fs::metadata(real_path)
            .and_then(|m| m.modified())
            .unwrap_or_else(|_| SystemTime::now());

        debug!(
            "Loaded virtual file: {} -> {} ({} bytes)",
            real_path.display(),
            virtual_path,
            data.len()
        );

        self.files.insert(
            virtual_path.to_string(),
            Arc::new(VirtualFile {
                virtual_path: virtual_path.to_string(),
                content_type: content_type.to_string(),
                body: Bytes::from(data),
                mtime,
            }),
        );

        Ok(())
    }

    /// Retourne les métadonnées d'un fichier virtuel, ou `None`.
    pub fn get_info(&self, virtual_path: &str) -> Option<FileInfo> {
        self.files.get(virtual_path).map(|f| FileInfo {
            length: f.body.len() as u64,
            mtime: f.mtime,
            is_directory: false,
            is_readable: true,
            content_type: f.content_type.clone(),
        })
    }

    /// Ouvre un curseur de lecture sur un fichier virtuel.
    ///
    /// # Errors
    ///
    /// - [`VfsError::ReadOnly`] si `mode` n'est pas [`OpenMode::Read`]
    /// - [`VfsError::NotFound`] si le chemin n'est pas enregistré
    pub fn open(&self, virtual_path: &str, mode: OpenMode) -> Result<OpenFileCursor<'_>, VfsError> {
        if mode != OpenMode::Read {
            return Err(VfsError::ReadOnly);
        }

        let file = self
            .files
            .get(virtual_path)
            .ok_or_else(|| VfsError::NotFound(virtual_path.to_string()))?;

        Ok(OpenFileCursor {
            view: file.body.as_ref(),
            pos: 0,
        })
    }

    /// Accès direct à un fichier (pour le handler HTTP).
    pub fn file(&self, virtual_path: &str) -> Option<&Arc<VirtualFile>> {
        self.files.get(virtual_path)
    }

    /// Nombre de fichiers enregistrés.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Vrai si aucun fichier n'est enregistré.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Router Axum servant le répertoire virtuel en GET.
pub fn virtual_dir_router(store: Arc<VirtualFileStore>) -> Router {
    Router::new()
        .route("/virtual/{*path}", get(serve_virtual_file))
        .with_state(store)
}

/// Handler GET pour `/virtual/{*path}`.
async fn serve_virtual_file(
    State(store): State<Arc<VirtualFileStore>>,
    AxumPath(path): AxumPath<String>,
) -> Response {
    let virtual_path = format!("/virtual/{path}");

    match store.file(&virtual_path) {
        Some(file) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, file.content_type.clone())],
            file.body.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
