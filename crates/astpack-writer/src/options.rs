//! Session configuration.

use astpack_bitstream::on_disk_hash::DEFAULT_BUCKET_COUNT;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitOptions {
    /// Starting bucket count of both hash tables. Rounded up to a power of two.
    pub initial_buckets: usize,
    /// Register block and record names in the block-info block.
    pub block_names: bool,
    /// Turn `__DATE__`/`__TIME__` usage into a [`crate::Warning`].
    pub report_date_time: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_BUCKET_COUNT,
            block_names: true,
            report_date_time: true,
        }
    }
}

impl EmitOptions {
    pub fn with_block_names(mut self, enabled: bool) -> Self {
        self.block_names = enabled;
        self
    }

    pub fn with_initial_buckets(mut self, buckets: usize) -> Self {
        self.initial_buckets = buckets;
        self
    }

    pub fn with_date_time_report(mut self, enabled: bool) -> Self {
        self.report_date_time = enabled;
        self
    }
}
