/// Tunables for the band-parallel pipeline. The sequential pipeline takes none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Upper bound on concurrent band workers in the parallel pipeline.
    pub workers: usize,
    /// Bands are never split below this many output rows.
    pub min_rows_per_band: u32,
}

const DEFAULT_MIN_ROWS_PER_BAND: u32 = 16;

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            min_rows_per_band: DEFAULT_MIN_ROWS_PER_BAND,
        }
    }
}

impl EditorConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_min_rows_per_band(mut self, rows: u32) -> Self {
        self.min_rows_per_band = rows.max(1);
        self
    }

    /// Contiguous row ranges covering `0..rows`, at most `workers` of them.
    pub fn bands(&self, rows: u32) -> Vec<std::ops::Range<u32>> {
        if rows == 0 {
            return Vec::new();
        }
        let by_size = rows.div_ceil(self.min_rows_per_band.max(1)) as usize;
        let count = self.workers.max(1).min(by_size).max(1) as u32;
        let base = rows / count;
        let extra = rows % count;

        let mut bands = Vec::with_capacity(count as usize);
        let mut start = 0;
        for i in 0..count {
            let len = base + u32::from(i < extra);
            bands.push(start..start + len);
            start += len;
        }
        bands
    }
}
