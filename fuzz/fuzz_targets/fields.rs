#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mosaic_wire::{FieldKind, RawField};

#[derive(Arbitrary, Debug)]
enum Kind {
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    F32,
    F64,
    Text(u8),
}

impl From<Kind> for FieldKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::U8 => FieldKind::U8,
            Kind::U16 => FieldKind::U16,
            Kind::U32 => FieldKind::U32,
            Kind::I8 => FieldKind::I8,
            Kind::I16 => FieldKind::I16,
            Kind::I32 => FieldKind::I32,
            Kind::F32 => FieldKind::F32,
            Kind::F64 => FieldKind::F64,
            Kind::Text(len) => FieldKind::Text(usize::from(len)),
        }
    }
}

#[derive(Arbitrary, Debug)]
struct Input {
    offset: u16,
    fields: Vec<Kind>,
    frame: Vec<u8>,
}

// Fuzz target: bounds-checked field access over an arbitrary frame.
//
// RawField::for_kind must refuse any field that does not fit, and
// decoding an accepted field must never read past it.
fuzz_target!(|input: Input| {
    let mut offset = usize::from(input.offset);
    for kind in input.fields {
        let kind = FieldKind::from(kind);
        let Ok(field) = RawField::for_kind(&input.frame, offset, kind) else {
            assert!(offset + kind.width() > input.frame.len());
            break;
        };
        let value = field.decode(kind);
        let _ = value.as_f64();
        let _ = value.text_lossy();
        offset += kind.width();
    }
});
