use super::ports::RandomSource;

pub const ORDER_PREFIX: &str = "order";
pub const PAYMENT_PREFIX: &str = "pay";
pub const ID_SUFFIX_LEN: usize = 16;
/// How many times a service regenerates an id that is already taken.
pub const MAX_ID_ATTEMPTS: usize = 5;

/// Builds `<prefix>_<16 random alphanumerics>`.
///
/// No uniqueness check happens here; callers that care look the id up first.
pub fn generate_id(prefix: &str, random: &dyn RandomSource) -> String {
    format!("{prefix}_{}", random.alphanumeric(ID_SUFFIX_LEN))
}
