use primitive_types::U256;

/// Multiplies two `u128` values into a `U256`, which cannot overflow.
pub fn casted_mul(a: u128, b: u128) -> U256 {
    U256::from(a) * U256::from(b)
}

/// Arithmetic failure, tagged with a numeric code identifying the call site.
#[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum MathError {
    AddOverflow(u8),
    CastOverflow(u8),
    DivByZero(u8),
    MulOverflow(u8),
    SubUnderflow(u8),
}

#[cfg(test)]
mod tests {
    use super::casted_mul;
    use primitive_types::U256;

    #[test]
    fn casted_mul_exceeds_u128() {
        let product = casted_mul(u128::MAX, u128::MAX);
        assert!(product > U256::from(u128::MAX));
        assert_eq!(product, U256::from(u128::MAX) * U256::from(u128::MAX));
    }
}
