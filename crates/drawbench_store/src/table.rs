//! Dense per-kind storage: parallel byte columns plus an id column.
//!
//! Row r across all columns describes one entity. Removal compacts by
//! copying the last row into the vacated row, so every row in
//! `[0, len)` is always live and iteration never skips.

use drawbench_foundation::{Error, ErrorKind, Handle, Result};

/// One component column: fixed element size, densely packed bytes.
#[derive(Clone, Debug)]
struct Column {
    elem: usize,
    bytes: Vec<u8>,
}

impl Column {
    fn range(&self, row: u32) -> std::ops::Range<usize> {
        let start = row as usize * self.elem;
        start..start + self.elem
    }
}

/// Growable, row-dense parallel component columns for one entity kind.
///
/// Column element sizes come from the schema registry; the table itself
/// is fully generic over entity shape.
#[derive(Clone, Debug)]
pub struct ColumnTable {
    ids: Vec<Handle>,
    columns: Vec<Column>,
}

impl ColumnTable {
    /// Creates an empty table with one column per element size given.
    #[must_use]
    pub fn new(sizes: &[usize]) -> Self {
        Self {
            ids: Vec::new(),
            columns: sizes
                .iter()
                .map(|&elem| Column {
                    elem,
                    bytes: Vec::new(),
                })
                .collect(),
        }
    }

    /// Returns the number of live rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of component columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Appends a zero-initialized row owned by `id`, returning its index.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::CapacityExhausted`] when the 32-bit row space
    /// is spent.
    pub fn push_row(&mut self, id: Handle) -> Result<u32> {
        let row = u32::try_from(self.ids.len())
            .map_err(|_| Error::capacity_exhausted("table rows"))?;
        for column in &mut self.columns {
            column.bytes.resize(column.bytes.len() + column.elem, 0);
        }
        self.ids.push(id);
        Ok(row)
    }

    /// Removes `row` by swapping the last row into its place.
    ///
    /// Every column is copied byte-for-byte. Returns the id of the entity
    /// that moved into `row`, or `None` if `row` was the last row.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::RowOutOfBounds`] if `row` is not live.
    pub fn swap_remove_row(&mut self, row: u32) -> Result<Option<Handle>> {
        let len = self.ids.len();
        if row as usize >= len {
            return Err(Error::new(ErrorKind::RowOutOfBounds {
                row,
                length: len,
            }));
        }

        let last = len - 1;
        let moved = if row as usize == last {
            self.ids.pop();
            None
        } else {
            for column in &mut self.columns {
                let src = last * column.elem..(last + 1) * column.elem;
                column.bytes.copy_within(src, row as usize * column.elem);
            }
            self.ids.swap_remove(row as usize);
            Some(self.ids[row as usize])
        };

        for column in &mut self.columns {
            column.bytes.truncate(last * column.elem);
        }
        Ok(moved)
    }

    /// Returns the id owning `row`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::RowOutOfBounds`] if `row` is not live.
    pub fn id_at(&self, row: u32) -> Result<Handle> {
        self.ids
            .get(row as usize)
            .copied()
            .ok_or_else(|| Error::new(ErrorKind::RowOutOfBounds {
                row,
                length: self.ids.len(),
            }))
    }

    /// Returns the bytes of one component cell.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::RowOutOfBounds`] if `row` is not live.
    pub fn get(&self, row: u32, position: usize) -> Result<&[u8]> {
        if row as usize >= self.ids.len() {
            return Err(Error::new(ErrorKind::RowOutOfBounds {
                row,
                length: self.ids.len(),
            }));
        }
        let column = &self.columns[position];
        Ok(&column.bytes[column.range(row)])
    }

    /// Overwrites one component cell.
    ///
    /// `bytes` must match the column's element size exactly; the store
    /// validates this against the registry before calling.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::RowOutOfBounds`] if `row` is not live.
    pub fn set(&mut self, row: u32, position: usize, bytes: &[u8]) -> Result<()> {
        if row as usize >= self.ids.len() {
            return Err(Error::new(ErrorKind::RowOutOfBounds {
                row,
                length: self.ids.len(),
            }));
        }
        let column = &mut self.columns[position];
        debug_assert_eq!(bytes.len(), column.elem);
        let range = column.range(row);
        column.bytes[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Iterates ids in current row order.
    ///
    /// Order is unstable across removals; do not interleave with removals
    /// of the same kind.
    pub fn iter_ids(&self) -> impl Iterator<Item = Handle> + '_ {
        self.ids.iter().copied()
    }
}
