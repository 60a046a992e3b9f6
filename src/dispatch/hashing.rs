//! The structural hash used by `Value::Assoc` bucketing and the `hash()`
//! builtin (`spec.md` §4.2.6): a 32-bit FNV-0-like accumulator.
//!
//! `h = (h << 1) + (h << 4) + (h << 7) + (h << 8) + (h << 24); h ^= word`,
//! seeded at zero and fed one 32-bit quantum at a time. The tag is mixed
//! in first, then the value's own limbs/bytes/structural descriptors.

use crate::value::{Value, ValueBody};

fn mix(h: u32, word: u32) -> u32 {
    let h = h
        .wrapping_shl(1)
        .wrapping_add(h.wrapping_shl(4))
        .wrapping_add(h.wrapping_shl(7))
        .wrapping_add(h.wrapping_shl(8))
        .wrapping_add(h.wrapping_shl(24));
    h ^ word
}

fn mix_bytes(mut h: u32, bytes: &[u8]) -> u32 {
    for chunk in bytes.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        h = mix(h, u32::from_le_bytes(word));
    }
    h
}

fn mix_bigint(h: u32, z: &crate::kernel::Z) -> u32 {
    let (sign, bytes) = z.as_bigint().to_bytes_le();
    let h = mix(h, sign as i8 as u32);
    mix_bytes(h, &bytes)
}

fn mix_q(mut h: u32, q: &crate::kernel::Q) -> u32 {
    h = mix_bigint(h, &q.numerator());
    mix_bigint(h, &q.denominator())
}

/// First 16 elements plus a stride-sampled tail, per the module docs: full
/// hashing of very large containers is wasteful and the spec only asks for
/// a representative structural hash, not a collision-free one.
fn sample_indices(len: usize) -> Vec<usize> {
    const HEAD: usize = 16;
    if len <= HEAD {
        return (0..len).collect();
    }
    let mut idx: Vec<usize> = (0..HEAD).collect();
    let stride = (len / HEAD).max(1);
    let mut i = HEAD;
    while i < len {
        idx.push(i);
        i += stride;
    }
    idx
}

/// Structural hash of a single value.
pub fn quickhash_value(v: &Value) -> u32 {
    let mut h = mix(0, v.tag() as u32);
    match v.body() {
        ValueBody::Null => h,
        ValueBody::Int(i) => mix(h, *i as u32) ^ mix(h, (*i >> 32) as u32),
        ValueBody::Num(q) => mix_q(h, q),
        ValueBody::Com(c) => {
            h = mix_q(h, &c.real);
            mix_q(h, &c.imag)
        }
        ValueBody::Str(s) => mix_bytes(h, s),
        ValueBody::Mat(m) => {
            for b in m.bounds() {
                h = mix(h, b.min as u32);
                h = mix(h, b.max as u32);
            }
            for &i in &sample_indices(m.len()) {
                h = mix(h, quickhash_value(&m.elements()[i].borrow()));
            }
            h
        }
        ValueBody::List(l) => {
            h = mix(h, l.len() as u32);
            for (i, slot) in l.iter().enumerate() {
                if sample_indices(l.len()).contains(&i) {
                    h = mix(h, quickhash_value(&slot.borrow()));
                }
            }
            h
        }
        ValueBody::Assoc(a) => mix(h, a.len() as u32),
        ValueBody::Obj(o) => {
            h = mix(h, o.schema.index);
            for slot in o.elements() {
                h = mix(h, quickhash_value(&slot.borrow()));
            }
            h
        }
        ValueBody::Error(code) => mix(h, code.code() as u32),
        _ => h,
    }
}

/// Structural hash of a tuple of values, as used to key an association's
/// bucket chain: the tag of each element is mixed in as an initial word,
/// per the module docs.
pub fn quickhash_tuple(values: &[Value]) -> u32 {
    let mut h = mix(0, values.len() as u32);
    for v in values {
        h = mix(h, quickhash_value(v));
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{Q, Z};

    #[test]
    fn equal_values_hash_equal() {
        let a = Value::num(Q::new(Z::from_i64(1), Z::from_i64(2)).unwrap());
        let b = Value::num(Q::new(Z::from_i64(1), Z::from_i64(2)).unwrap());
        assert_eq!(quickhash_value(&a), quickhash_value(&b));
    }

    #[test]
    fn different_tags_usually_differ() {
        let a = Value::int(0);
        let b = Value::null();
        assert_ne!(quickhash_value(&a), quickhash_value(&b));
    }

    #[test]
    fn tuple_hash_depends_on_order() {
        let a = Value::int(1);
        let b = Value::int(2);
        assert_ne!(
            quickhash_tuple(&[a.clone(), b.clone()]),
            quickhash_tuple(&[b, a])
        );
    }
}
