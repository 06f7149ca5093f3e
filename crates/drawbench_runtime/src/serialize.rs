//! Document export/import using `MessagePack`.
//!
//! A document walks live entities per kind (via the store's iteration) and
//! keys every record by the handle's portable string form, so reloading a
//! compacted store reproduces the same handles regardless of row order.
//! Component cells travel as named raw byte blobs; the registry supplies
//! the names on both sides.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use drawbench_foundation::{Error, ErrorKind, Handle, Result};
use drawbench_store::{SchemaRegistry, Store};

/// A serialized store: one section per entity kind.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Document {
    /// Sections in registry order.
    pub kinds: Vec<KindSection>,
}

/// All live entities of one kind.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct KindSection {
    /// Registered kind name.
    pub kind: String,
    /// Entity records in iteration order at export time.
    pub entities: Vec<EntityRecord>,
}

/// One entity: its portable handle string plus component cells.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EntityRecord {
    /// Portable handle form, e.g. `"12v3"`.
    pub id: String,
    /// Component cells in declaration order.
    pub components: Vec<ComponentRecord>,
}

/// One component cell.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ComponentRecord {
    /// Registered component name.
    pub component: String,
    /// Raw cell bytes.
    pub bytes: Vec<u8>,
}

/// Exports all live entities into a document.
///
/// # Errors
///
/// Returns an error if the store's registry and tables disagree (which
/// indicates a bug, not a user condition).
pub fn export(store: &Store) -> Result<Document> {
    let registry = store.registry();
    let mut kinds = Vec::new();

    for kind in registry.kinds() {
        let kind_name = registry
            .kind_name(kind)
            .ok_or_else(|| Error::unknown_kind(kind))?;

        let handles: Vec<Handle> = store.iterate(kind)?.collect();
        let mut entities = Vec::with_capacity(handles.len());
        for handle in handles {
            let mut components = Vec::new();
            for &component in registry.components_of(kind) {
                let name = registry
                    .component_name(component)
                    .ok_or_else(|| Error::internal("registered component without a name"))?;
                components.push(ComponentRecord {
                    component: name.to_owned(),
                    bytes: store.get_raw(handle, component)?.to_vec(),
                });
            }
            entities.push(EntityRecord {
                id: handle.to_string(),
                components,
            });
        }

        kinds.push(KindSection {
            kind: kind_name.to_owned(),
            entities,
        });
    }

    Ok(Document { kinds })
}

/// Rebuilds a store from a document.
///
/// Every entity is re-created under its original handle, so references
/// between entities (relation links, pooled ids) stay valid.
///
/// # Errors
///
/// Returns an error if the document names kinds or components the
/// registry does not know, a handle string is malformed, or two records
/// claim the same slot.
pub fn import(document: &Document, registry: Arc<SchemaRegistry>) -> Result<Store> {
    let mut store = Store::new(registry.clone());

    for section in &document.kinds {
        let kind = registry.kind_by_name(&section.kind).ok_or_else(|| {
            Error::new(ErrorKind::SerializationError(format!(
                "unknown entity kind {:?}",
                section.kind
            )))
        })?;

        for record in &section.entities {
            let handle: Handle = record.id.parse()?;
            store.create_with_handle(kind, handle)?;

            for cell in &record.components {
                let component = registry.component_by_name(&cell.component).ok_or_else(|| {
                    Error::new(ErrorKind::SerializationError(format!(
                        "unknown component {:?}",
                        cell.component
                    )))
                })?;
                store.set_raw(handle, component, &cell.bytes)?;
            }
        }
    }

    Ok(store)
}

/// Serializes a document to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(document: &Document) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(document)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Deserializes a document from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn from_bytes(bytes: &[u8]) -> Result<Document> {
    rmp_serde::from_slice(bytes)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Saves a document to a file using `MessagePack` format.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to, or if
/// serialization fails.
pub fn save_to_file<P: AsRef<Path>>(document: &Document, path: P) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to create file '{}': {e}",
            path.as_ref().display()
        )))
    })?;

    let mut writer = BufWriter::new(file);
    let bytes = to_bytes(document)?;

    writer.write_all(&bytes).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to write to file '{}': {e}",
            path.as_ref().display()
        )))
    })?;

    writer.flush().map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to flush file '{}': {e}",
            path.as_ref().display()
        )))
    })?;

    Ok(())
}

/// Loads a document from a `MessagePack` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or if deserialization
/// fails.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let file = File::open(path.as_ref()).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to open file '{}': {e}",
            path.as_ref().display()
        )))
    })?;

    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();

    reader.read_to_end(&mut bytes).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to read file '{}': {e}",
            path.as_ref().display()
        )))
    })?;

    from_bytes(&bytes)
}
