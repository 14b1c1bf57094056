use std::collections::BTreeMap;

/// A run of contiguous file bytes backed by contiguous bytes inside one
/// stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Extent {
    /// Index of the backing object.
    pub obj: u32,
    /// Byte offset within the object's file-data region.
    pub offset: u32,
    /// Length in bytes.
    pub len: u32,
}

/// Per-file interval map from file offset to [`Extent`].
///
/// Keys are the starting file offset of each extent. Invariant: extents
/// never overlap. Holes between extents are permitted; the read path
/// zero-fills them.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExtentMap {
    map: BTreeMap<i64, Extent>,
}

impl ExtentMap {
    /// Returns the entry whose interval contains `offset`, or else the lowest
    /// entry whose key exceeds `offset`, or `None`.
    pub(crate) fn lookup(&self, offset: i64) -> Option<(i64, Extent)> {
        if let Some((&base, &e)) = self.map.range(..=offset).next_back() {
            if base + e.len as i64 > offset {
                return Some((base, e));
            }
        }
        self.map.range(offset..).next().map(|(&b, &e)| (b, e))
    }

    /// Iterate entries starting from the one [`lookup`] would return for
    /// `offset`.
    ///
    /// [`lookup`]: ExtentMap::lookup
    pub(crate) fn from_offset(&self, offset: i64) -> impl Iterator<Item = (i64, Extent)> + '_ {
        let start = self.lookup(offset).map(|(base, _)| base);
        start
            .into_iter()
            .flat_map(move |s| self.map.range(s..).map(|(&k, &e)| (k, e)))
    }

    /// Insert `new` at `offset`, splicing out whatever it overlaps.
    ///
    /// The tail-append merge runs before the general overlap handling: a
    /// write stream appending strictly after the last extent with adjacent
    /// object bytes extends that extent in place, which is what keeps
    /// sequential writes from fragmenting the map.
    pub(crate) fn update(&mut self, offset: i64, new: Extent) {
        if self.map.is_empty() {
            self.map.insert(offset, new);
            return;
        }

        let (&last_base, &last) = self.map.iter().next_back().unwrap();
        if offset == last_base + last.len as i64
            && new.obj == last.obj
            && new.offset == last.offset + last.len
        {
            self.map.get_mut(&last_base).unwrap().len += new.len;
            return;
        }

        let end = offset + new.len as i64;

        // Drop entries fully covered by [offset, end).
        let covered: Vec<i64> = self
            .map
            .range(offset..)
            .take_while(|&(&k, e)| k + e.len as i64 <= end)
            .map(|(&k, _)| k)
            .collect();
        for k in covered {
            self.map.remove(&k);
        }

        // Trim an entry overlapped on its left flank: it survives as a
        // shorter extent starting at `end`.
        if let Some((&k, &e)) = self.map.range(offset..).next() {
            if k < end {
                let cut = (end - k) as u32;
                self.map.remove(&k);
                self.map.insert(
                    end,
                    Extent {
                        obj: e.obj,
                        offset: e.offset + cut,
                        len: e.len - cut,
                    },
                );
            }
        }

        // The predecessor may reach into [offset, end): either it spans the
        // whole interval (bisect into two fragments) or just its tail
        // overlaps (shorten it).
        if let Some((&k, &e)) = self.map.range(..offset).next_back() {
            let e_end = k + e.len as i64;
            if e_end > end {
                self.map.get_mut(&k).unwrap().len = (offset - k) as u32;
                let cut = (end - k) as u32;
                self.map.insert(
                    end,
                    Extent {
                        obj: e.obj,
                        offset: e.offset + cut,
                        len: e.len - cut,
                    },
                );
            } else if e_end > offset {
                self.map.get_mut(&k).unwrap().len = (offset - k) as u32;
            }
        }

        self.map.insert(offset, new);
    }

    /// Remove the entry keyed exactly at `offset`, if present.
    pub(crate) fn erase(&mut self, offset: i64) {
        self.map.remove(&offset);
    }

    /// Discard everything at or beyond `new_size`, shortening the extent
    /// that straddles the boundary.
    pub(crate) fn truncate(&mut self, new_size: i64) {
        while let Some((base, _)) = self.lookup(new_size) {
            if base < new_size {
                self.map.get_mut(&base).unwrap().len = (new_size - base) as u32;
            } else {
                self.erase(base);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (i64, Extent)> + '_ {
        self.map.iter().map(|(&k, &e)| (k, e))
    }
}
