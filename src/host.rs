use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::time::Instant;

/// Services the embedding runtime provides to the engine.
///
/// The engine only ever samples the clock between playouts, pulls one seed
/// per decision, and emits trace values in instrumented runs; nothing else
/// crosses this seam.
pub trait Host {
    /// Monotonic wall clock, in milliseconds.
    fn time_now(&mut self) -> f64;

    /// Fresh seed material. The engine consumes the raw bit pattern, so any
    /// value is acceptable, including ones that are not finite numbers.
    fn random(&mut self) -> f64;

    /// Optional trace sink; ignored by default.
    fn trace_log(&mut self, _value: u32) {}
}

/// Process-local host for native builds: a monotonic epoch clock and
/// hasher-derived seed entropy.
pub struct SystemHost {
    epoch: Instant,
}

impl SystemHost {
    pub fn new() -> SystemHost {
        SystemHost { epoch: Instant::now() }
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        SystemHost::new()
    }
}

impl Host for SystemHost {
    fn time_now(&mut self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn random(&mut self) -> f64 {
        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u128(self.epoch.elapsed().as_nanos());
        f64::from_bits(hasher.finish())
    }

    fn trace_log(&mut self, value: u32) {
        log::trace!("host trace: {value}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_monotonic() {
        let mut host = SystemHost::new();
        let a = host.time_now();
        let b = host.time_now();
        assert!(b >= a);
    }

    #[test]
    fn seeds_vary() {
        let mut host = SystemHost::new();
        let a = host.random().to_bits();
        let b = host.random().to_bits();
        assert_ne!(a, b);
    }
}
