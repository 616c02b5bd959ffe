pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const GENESIS_INDEX: u64 = 1;
pub const GENESIS_PROOF: u64 = 1;
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const DEFAULT_MODULUS: u64 = 99;
pub const DEFAULT_DIFFICULTY: usize = 1;
