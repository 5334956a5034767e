// [libs/infra/object-store/src/lib.rs]
//! Adaptador de almacén de objetos para documentos cifrados. Habla WebDAV
//! y expone primitivas idempotentes (`put`, `head`, `get_range`, `delete`,
//! `mkcol_idempotent`) envueltas en la misma política de reintento
//! exponencial que usan los crates de dominio que lo consumen.

pub mod backoff;
pub mod errors;
pub mod webdav;

pub use errors::{classify_status, FaultClass, ObjectStoreError};
pub use webdav::WebDavClient;
