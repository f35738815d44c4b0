use padwire_bit_derive::Bit;
use padwire_bit_mask::{Bitable, Bitmask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Bit)]
enum Pad {
    Up,
    Down,
    Left,
    Right,
}

#[test]
fn variants_use_declaration_order() {
    assert_eq!(Pad::Up.index(), 0);
    assert_eq!(Pad::Right.index(), 3);
    assert_eq!(Pad::Left.bit(), 0b100);
}

#[test]
fn count_and_all_cover_every_variant() {
    assert_eq!(Pad::COUNT, 4);
    assert_eq!(Pad::ALL, [Pad::Up, Pad::Down, Pad::Left, Pad::Right]);
}

#[test]
fn derived_values_work_in_bitmask() {
    let mask = Bitmask::new(&[Pad::Down, Pad::Right]);
    assert!(mask.contains(Pad::Down));
    assert!(!mask.contains(Pad::Up));
    assert_eq!(mask.iter().collect::<Vec<_>>(), vec![1, 3]);
}
