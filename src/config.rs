/// Mount-time configuration: staging buffer caps and the object key prefix.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// Cap on the metadata staging buffer; exceeding it triggers a cut.
    pub(crate) meta_capacity: usize,

    /// Cap on the file-data staging buffer; exceeding it triggers a cut.
    pub(crate) data_capacity: usize,

    /// Prefix under which object keys are formed as `"{prefix}.{index:08x}"`.
    pub(crate) prefix: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            meta_capacity: 64 * 1024,
            data_capacity: 16 * 1024 * 1024,
            prefix: "objfs".to_string(),
        }
    }
}
