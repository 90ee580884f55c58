use primitive_types::U256;
use scale::{Decode, Encode};

/// `U256` wrapped for use as a contract storage field.
///
/// `primitive_types::U256` carries the SCALE codecs (with the `codec`
/// feature) but not ink's storage-layout metadata, so storage structs hold
/// this wrapper instead of the bare type.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Encode, Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub struct WrappedU256(pub U256);

impl WrappedU256 {
    pub const ZERO: Self = WrappedU256(U256::zero());
}

impl From<U256> for WrappedU256 {
    fn from(value: U256) -> Self {
        WrappedU256(value)
    }
}

impl From<WrappedU256> for U256 {
    fn from(value: WrappedU256) -> Self {
        value.0
    }
}

#[cfg(feature = "std")]
impl ink::storage::traits::StorageLayout for WrappedU256 {
    fn layout(key: &ink::primitives::Key) -> ink::metadata::layout::Layout {
        ink::metadata::layout::Layout::Leaf(ink::metadata::layout::LeafLayout::from_key::<Self>(
            ink::metadata::layout::LayoutKey::from(key),
        ))
    }
}
