use keysticks_bit_derive::Bit;
use keysticks_bit_mask::{Bitable, Bitmask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
enum Mode {
    NonDirectional,
    TwoWay,
    FourWay,
    EightWay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Bit)]
enum Sparse {
    First = 10,
    Second = 3,
}

#[test]
fn bits_follow_declaration_order() {
    assert_eq!(Mode::NonDirectional.bit(), 1);
    assert_eq!(Mode::FourWay.bit(), 1 << 2);
    assert_eq!(Mode::EightWay.index(), 3);
}

#[test]
fn explicit_discriminants_do_not_affect_bits() {
    assert_eq!(Sparse::First.index(), 0);
    assert_eq!(Sparse::Second.index(), 1);
}

#[test]
fn from_index_inverts_index() {
    for mode in [Mode::NonDirectional, Mode::TwoWay, Mode::FourWay, Mode::EightWay] {
        assert_eq!(Mode::from_index(mode.index()), Some(mode));
    }
    assert_eq!(Mode::from_index(4), None);
}

#[test]
fn derived_enums_work_in_masks() {
    let mask = Bitmask::new(&[Mode::TwoWay, Mode::EightWay]);
    assert!(mask.contains(Mode::TwoWay));
    assert!(!mask.contains(Mode::FourWay));
    assert_eq!(mask.iter().collect::<Vec<_>>(), vec![Mode::TwoWay, Mode::EightWay]);
}
