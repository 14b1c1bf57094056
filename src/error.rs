use thiserror::Error;

/// A specialized [`Result`] type for filesystem operations.
///
/// [`Result`]: std::result::Result
pub type Result<T = ()> = std::result::Result<T, FsError>;

/// Errors surfaced by filesystem operations.
///
/// Each variant corresponds to the POSIX errno a binding layer (e.g. FUSE)
/// reports for the failed operation; see [`FsError::errno`].
#[derive(Debug, Error)]
pub enum FsError {
    /// A path component does not exist.
    #[error("no such file or directory")]
    NotFound,

    /// A path traverses a non-directory.
    #[error("not a directory")]
    NotADirectory,

    /// A file operation was applied to a directory.
    #[error("is a directory")]
    IsADirectory,

    /// A create target already exists.
    #[error("file exists")]
    AlreadyExists,

    /// `rmdir` on a directory that still has entries.
    #[error("directory not empty")]
    NotEmpty,

    /// Type-mismatched operation (e.g. `readlink` on a regular file).
    #[error("invalid argument")]
    InvalidArgument,

    /// An entry name exceeds 255 bytes.
    #[error("file name too long")]
    NameTooLong,

    /// A stored object failed validation during decode or replay.
    #[error("malformed object: {0}")]
    BadFormat(&'static str),

    /// The object store failed a `PUT`, `GET`, or `LIST`.
    #[error("object store i/o: {0}")]
    Io(#[from] std::io::Error),
}

impl FsError {
    /// The positive POSIX errno for this error. Binding layers negate it.
    ///
    /// Malformed objects encountered at read time surface as `EIO`, matching
    /// the treatment of any other store-side failure.
    pub fn errno(&self) -> i32 {
        match self {
            FsError::NotFound => 2,         // ENOENT
            FsError::Io(_) => 5,            // EIO
            FsError::AlreadyExists => 17,   // EEXIST
            FsError::NotADirectory => 20,   // ENOTDIR
            FsError::IsADirectory => 21,    // EISDIR
            FsError::InvalidArgument => 22, // EINVAL
            FsError::NameTooLong => 36,     // ENAMETOOLONG
            FsError::NotEmpty => 39,        // ENOTEMPTY
            FsError::BadFormat(_) => 5,     // EIO
        }
    }
}
