//! Decoder configuration: concurrency and resource ceilings.

/// Bounds the work the decoder is willing to do on a single file.
/// Exceeding any ceiling raises [`crate::Error::LimitExceeded`].
#[derive(Debug, Clone)]
pub struct Config {
    /// -1 = hardware concurrency, capped at 1024. 1 forces single-threaded.
    pub num_threads: i32,
    pub max_memory_budget_mb: u64,
    pub max_dict_elements: u64,
    pub max_asset_path_elements: u64,
    pub max_field_value_pairs_per_spec: u64,
    pub max_element_size: u64,
    pub max_elements: u64,
    pub max_prim_nest_level: u32,
    pub max_connection_hops: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            num_threads: 1,
            max_memory_budget_mb: if cfg!(target_pointer_width = "32") {
                2 * 1024
            } else {
                4 * 1024
            },
            max_dict_elements: 1_000_000,
            max_asset_path_elements: 1_000_000,
            max_field_value_pairs_per_spec: 100_000,
            max_element_size: 1 << 20,
            max_elements: (1u64 << 30) / 4,
            max_prim_nest_level: 256,
            max_connection_hops: 16,
        }
    }
}

impl Config {
    pub fn resolved_num_threads(&self) -> usize {
        if self.num_threads == 1 {
            return 1;
        }
        let hw = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let requested = if self.num_threads < 0 {
            hw
        } else {
            self.num_threads as usize
        };
        requested.clamp(1, 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_single_threaded_and_4gib() {
        let c = Config::default();
        assert_eq!(c.num_threads, 1);
        assert_eq!(c.resolved_num_threads(), 1);
    }

    #[test]
    fn negative_thread_count_resolves_to_hardware_concurrency() {
        let mut c = Config::default();
        c.num_threads = -1;
        assert!(c.resolved_num_threads() >= 1);
    }
}
