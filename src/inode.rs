use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;

use crate::extent::ExtentMap;

/// Inode number. The root directory is always [`ROOT_INO`].
pub type Ino = u32;

/// Inode number of the root directory.
pub const ROOT_INO: Ino = 1;

/// First inode number handed out by the allocator.
pub(crate) const FIRST_ALLOC_INO: Ino = 2;

/// File-type mask and type bits, as found in `st_mode`.
pub(crate) const S_IFMT: u32 = 0o170000;
pub(crate) const S_IFDIR: u32 = 0o040000;
pub(crate) const S_IFREG: u32 = 0o100000;
pub(crate) const S_IFLNK: u32 = 0o120000;

/// Seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSpec {
    pub sec: i64,
    pub nsec: i32,
}

impl TimeSpec {
    /// The current wall-clock time.
    pub fn now() -> TimeSpec {
        let d = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        TimeSpec {
            sec: d.as_secs() as i64,
            nsec: d.subsec_nanos() as i32,
        }
    }
}

/// An in-memory inode: the header shared by every variant plus the
/// variant-specific payload.
#[derive(Debug, Clone)]
pub(crate) struct Inode {
    pub ino: Ino,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u32,
    pub size: i64,
    pub mtime: TimeSpec,
    pub kind: NodeKind,
}

/// The variant-specific payload of an inode.
#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    File { extents: ExtentMap },
    Dir { entries: BTreeMap<String, Ino> },
    Symlink { target: Vec<u8> },
    /// Device node, FIFO, or socket. Carries nothing beyond the header.
    Other,
}

impl NodeKind {
    /// The variant implied by a mode's file-type bits.
    pub(crate) fn from_mode(mode: u32) -> NodeKind {
        match mode & S_IFMT {
            S_IFDIR => NodeKind::Dir {
                entries: BTreeMap::new(),
            },
            S_IFREG => NodeKind::File {
                extents: ExtentMap::default(),
            },
            S_IFLNK => NodeKind::Symlink { target: Vec::new() },
            _ => NodeKind::Other,
        }
    }
}

impl Inode {
    pub(crate) fn new(ino: Ino, mode: u32, uid: u32, gid: u32, rdev: u32) -> Inode {
        Inode {
            ino,
            mode,
            uid,
            gid,
            rdev,
            size: 0,
            mtime: TimeSpec::now(),
            kind: NodeKind::from_mode(mode),
        }
    }

    pub(crate) fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Dir { .. })
    }

    pub(crate) fn entries(&self) -> Option<&BTreeMap<String, Ino>> {
        match &self.kind {
            NodeKind::Dir { entries } => Some(entries),
            _ => None,
        }
    }

    pub(crate) fn entries_mut(&mut self) -> Option<&mut BTreeMap<String, Ino>> {
        match &mut self.kind {
            NodeKind::Dir { entries } => Some(entries),
            _ => None,
        }
    }

    pub(crate) fn extents(&self) -> Option<&ExtentMap> {
        match &self.kind {
            NodeKind::File { extents } => Some(extents),
            _ => None,
        }
    }

    pub(crate) fn extents_mut(&mut self) -> Option<&mut ExtentMap> {
        match &mut self.kind {
            NodeKind::File { extents } => Some(extents),
            _ => None,
        }
    }
}

/// Process-wide mapping from inode number to inode.
///
/// Never persisted as a table: it is reconstructed entirely from replay.
/// The table owns every inode; directories refer to children by number
/// only, which keeps the graph acyclic and makes rename/unlink a matter
/// of moving a key.
#[derive(Debug)]
pub(crate) struct InodeTable {
    nodes: IndexMap<Ino, Inode>,
    next_ino: Ino,
}

impl InodeTable {
    pub(crate) fn new() -> InodeTable {
        InodeTable {
            nodes: IndexMap::new(),
            next_ino: FIRST_ALLOC_INO,
        }
    }

    pub(crate) fn get(&self, ino: Ino) -> Option<&Inode> {
        self.nodes.get(&ino)
    }

    pub(crate) fn get_mut(&mut self, ino: Ino) -> Option<&mut Inode> {
        self.nodes.get_mut(&ino)
    }

    pub(crate) fn insert(&mut self, inode: Inode) {
        self.nodes.insert(inode.ino, inode);
    }

    pub(crate) fn remove(&mut self, ino: Ino) -> Option<Inode> {
        self.nodes.swap_remove(&ino)
    }

    pub(crate) fn contains(&self, ino: Ino) -> bool {
        self.nodes.contains_key(&ino)
    }

    /// Hand out the next inode number. Monotone within a mount.
    pub(crate) fn allocate(&mut self) -> Ino {
        let ino = self.next_ino;
        self.next_ino += 1;
        ino
    }

    /// Advance the allocator past `ino`, as replay observes numbers that
    /// were handed out by a previous mount.
    pub(crate) fn observe(&mut self, ino: Ino) {
        self.next_ino = self.next_ino.max(ino + 1);
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}
