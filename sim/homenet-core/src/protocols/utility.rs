//! Random values that only need the right shape: checksums and source
//! ports.

use rand::{Rng, RngCore};

/// First port of the range clients pick their source ports from.
pub const EPHEMERAL_PORT_BASE: u16 = 49152;

/// A four byte checksum rendered as lowercase hex. The value is random; only
/// its shape is meaningful.
pub fn checksum(rng: &mut dyn RngCore) -> String {
    let mut bytes = [0u8; 4];
    rng.fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// A client source port in `[49152, 50152)`.
pub fn ephemeral_port(rng: &mut dyn RngCore) -> u16 {
    rng.gen_range(EPHEMERAL_PORT_BASE..EPHEMERAL_PORT_BASE + 1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn checksum_shape() {
        let mut rng = SmallRng::seed_from_u64(0xBAD5EED);
        for _ in 0..20 {
            let sum = checksum(&mut rng);
            assert_eq!(sum.len(), 8);
            assert!(sum.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn ports_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            let port = ephemeral_port(&mut rng);
            assert!((49152..50152).contains(&port));
        }
    }
}
