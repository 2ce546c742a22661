//! Encoding: logical `Value` → extprot bytes, directed by a descriptor.

use crate::descriptor::Descriptor;
use crate::error::Error;
use crate::value::Value;
use crate::varint;
use crate::wire::kind;
use crate::wire::writer::{MemWriter, WriteBytes};

/// Writes one value to the stream.
///
/// Delimited payloads are rendered into a scratch buffer first so their byte
/// length can be emitted ahead of them. A failed render may leave bytes
/// already written (the prefix goes out before the payload renders); callers
/// wanting transactional output should write into a [`MemWriter`] first.
pub fn write_value(w: &mut dyn WriteBytes, value: &Value, desc: &Descriptor) -> Result<(), Error> {
    match (desc, value) {
        (Descriptor::Bool, Value::Bool(b)) => {
            write_prefix(w, kind::BITS8, 0)?;
            w.write_byte(u8::from(*b))
        }
        (Descriptor::Byte, Value::Byte(b)) => {
            write_prefix(w, kind::VINT, 0)?;
            varint::write_unsigned(w, u64::from(*b))
        }
        (Descriptor::Int, Value::Int(i)) => {
            write_prefix(w, kind::VINT, 0)?;
            varint::write_signed(w, *i)
        }
        (Descriptor::Long, Value::Long(i)) => {
            write_prefix(w, kind::BITS64_LONG, 0)?;
            w.write_all(&i.to_le_bytes())
        }
        (Descriptor::Float, Value::Float(x)) => {
            write_prefix(w, kind::BITS64_FLOAT, 0)?;
            w.write_all(&x.to_le_bytes())
        }
        (Descriptor::String, Value::Bytes(b)) => {
            write_prefix(w, kind::BYTES, 0)?;
            varint::write_unsigned(w, b.len() as u64)?;
            w.write_all(b)
        }
        (Descriptor::Tuple(types), Value::Tuple(items)) => {
            check_arity("tuple", types.len(), items.len())?;
            write_delimited(w, kind::TUPLE, 0, |sub| {
                varint::write_unsigned(sub, items.len() as u64)?;
                for (item, ty) in items.iter().zip(types.iter()) {
                    write_value(sub, item, ty)?;
                }
                Ok(())
            })
        }
        (Descriptor::Message(msg), Value::Record(rec)) => {
            check_arity(&msg.name, msg.fields.len(), rec.fields.len())?;
            write_delimited(w, kind::TUPLE, 0, |sub| {
                varint::write_unsigned(sub, msg.fields.len() as u64)?;
                for f in &msg.fields {
                    let value = rec.get(&f.name).ok_or_else(|| {
                        Error::Render(format!("message {} is missing field {}", msg.name, f.name))
                    })?;
                    write_value(sub, value, &f.ty)?;
                }
                Ok(())
            })
        }
        (Descriptor::List(element), Value::List(items)) => {
            write_delimited(w, kind::HTUPLE, 0, |sub| {
                varint::write_unsigned(sub, items.len() as u64)?;
                for item in items {
                    write_value(sub, item, element)?;
                }
                Ok(())
            })
        }
        (Descriptor::Assoc(assoc), Value::Assoc(pairs)) => {
            write_delimited(w, kind::ASSOC, 0, |sub| {
                varint::write_unsigned(sub, pairs.len() as u64)?;
                for (key, value) in pairs {
                    write_value(sub, key, &assoc.key)?;
                    write_value(sub, value, &assoc.value)?;
                }
                Ok(())
            })
        }
        (Descriptor::Union(union), Value::Variant(variant)) => {
            let case = union.case_named(&variant.name).ok_or_else(|| {
                Error::Render(format!(
                    "union {} has no constructor {}",
                    union.name, variant.name
                ))
            })?;
            if case.is_constant() {
                if !variant.values.is_empty() {
                    return Err(Error::Render(format!(
                        "constant constructor {} given a payload",
                        case.name
                    )));
                }
                write_prefix(w, kind::ENUM, case.tag)
            } else {
                check_arity(&case.name, case.fields.len(), variant.values.len())?;
                write_delimited(w, kind::TUPLE, case.tag, |sub| {
                    varint::write_unsigned(sub, variant.values.len() as u64)?;
                    for (item, ty) in variant.values.iter().zip(case.fields.iter()) {
                        write_value(sub, item, ty)?;
                    }
                    Ok(())
                })
            }
        }
        (desc, value) => Err(Error::Render(format!(
            "cannot render {} value as {}",
            value.type_name(),
            desc.type_name()
        ))),
    }
}

fn write_prefix(w: &mut dyn WriteBytes, wire_kind: u8, tag: u32) -> Result<(), Error> {
    varint::write_unsigned(w, kind::prefix(wire_kind, tag))
}

fn check_arity(what: &str, expected: usize, got: usize) -> Result<(), Error> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::Render(format!(
            "{what} expects {expected} items, got {got}"
        )))
    }
}

/// Emits the prefix, then the payload length and bytes. The payload is
/// rendered into a scratch in-memory stream scoped to this call.
fn write_delimited(
    w: &mut dyn WriteBytes,
    wire_kind: u8,
    tag: u32,
    write_body: impl FnOnce(&mut MemWriter) -> Result<(), Error>,
) -> Result<(), Error> {
    write_prefix(w, wire_kind, tag)?;
    let mut scratch = MemWriter::new();
    write_body(&mut scratch)?;
    varint::write_unsigned(w, scratch.len() as u64)?;
    w.write_all(scratch.as_slice())
}
