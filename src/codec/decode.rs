//! Decoding: extprot bytes → logical `Value`, directed by a descriptor.

use crate::descriptor::{Descriptor, MessageDescriptor};
use crate::error::Error;
use crate::value::{Record, Value, Variant};
use crate::varint;
use crate::wire::kind;
use crate::wire::reader::{ReadBytes, SliceReader, EAGER_BUFFER_LIMIT};

/// Reads one value from the stream.
///
/// Returns [`Error::Eof`] when the stream ends cleanly before the first
/// prefix byte, [`Error::UnexpectedEof`] when it ends mid-value.
pub fn read_value(r: &mut dyn ReadBytes, desc: &Descriptor) -> Result<Value, Error> {
    let prefix = read_prefix(r)?;
    read_prefixed_value(r, desc, prefix)
}

/// Skips one value without consulting any descriptor.
///
/// Delimited payloads are skipped via their length field, primitives by their
/// known size, so trailing fields of unknown type never need to be parsed.
/// The cursor ends exactly where [`read_value`] would leave it.
pub fn skip_value(r: &mut dyn ReadBytes) -> Result<(), Error> {
    let prefix = read_prefix(r)?;
    let (wire, _tag) = kind::split_prefix(prefix);
    if kind::is_delimited(wire) {
        let len = varint::read_unsigned(r)?;
        return r.skip(len);
    }
    match wire {
        kind::VINT => varint::read_unsigned(r).map(drop),
        kind::BITS8 => r.skip(1),
        kind::BITS32 => r.skip(4),
        kind::BITS64_LONG | kind::BITS64_FLOAT => r.skip(8),
        kind::ENUM => Ok(()),
        _ => Err(Error::UnexpectedWireType),
    }
}

/// Reads the prefix varint, telling a clean end of stream (nothing read yet)
/// apart from truncation inside the prefix.
fn read_prefix(r: &mut dyn ReadBytes) -> Result<u64, Error> {
    let first = match r.read_byte() {
        Ok(b) => b,
        Err(Error::UnexpectedEof) => return Err(Error::Eof),
        Err(e) => return Err(e),
    };
    varint::read_unsigned_from(first, r)
}

fn read_prefixed_value(
    r: &mut dyn ReadBytes,
    desc: &Descriptor,
    prefix: u64,
) -> Result<Value, Error> {
    let (wire, tag) = kind::split_prefix(prefix);
    match desc {
        Descriptor::Bool => {
            expect_untagged(wire, tag, kind::BITS8)?;
            Ok(Value::Bool(r.read_byte()? != 0))
        }
        Descriptor::Byte => {
            expect_untagged(wire, tag, kind::VINT)?;
            let u = varint::read_unsigned(r)?;
            u8::try_from(u)
                .map(Value::Byte)
                .map_err(|_| Error::Parse(format!("byte value {u} out of range")))
        }
        Descriptor::Int => {
            expect_untagged(wire, tag, kind::VINT)?;
            Ok(Value::Int(varint::unzigzag(varint::read_unsigned(r)?)))
        }
        Descriptor::Long => {
            expect_untagged(wire, tag, kind::BITS64_LONG)?;
            let mut b = [0u8; 8];
            r.read_exact(&mut b)?;
            Ok(Value::Long(i64::from_le_bytes(b)))
        }
        Descriptor::Float => {
            expect_untagged(wire, tag, kind::BITS64_FLOAT)?;
            let mut b = [0u8; 8];
            r.read_exact(&mut b)?;
            Ok(Value::Float(f64::from_le_bytes(b)))
        }
        Descriptor::String => {
            expect_untagged(wire, tag, kind::BYTES)?;
            let len = read_count(r)?;
            Ok(Value::Bytes(r.read_vec(len)?))
        }
        Descriptor::Tuple(types) => {
            if wire == kind::TUPLE && tag == 0 {
                read_delimited(r, |sub| read_tuple_items(sub, types)).map(Value::Tuple)
            } else if kind::is_promotable(wire) {
                promote_items(r, types, prefix).map(Value::Tuple)
            } else {
                Err(Error::UnexpectedWireType)
            }
        }
        Descriptor::Message(msg) => {
            if wire == kind::TUPLE && tag == 0 {
                read_delimited(r, |sub| read_message_items(sub, msg)).map(Value::Record)
            } else if kind::is_promotable(wire) {
                promote_message(r, msg, prefix).map(Value::Record)
            } else {
                Err(Error::UnexpectedWireType)
            }
        }
        Descriptor::List(element) => {
            expect_untagged(wire, tag, kind::HTUPLE)?;
            read_delimited(r, |sub| read_list_items(sub, element)).map(Value::List)
        }
        Descriptor::Assoc(assoc) => {
            expect_untagged(wire, tag, kind::ASSOC)?;
            read_delimited(r, |sub| {
                let npairs = read_count(sub)?;
                let mut pairs = Vec::with_capacity(npairs);
                for _ in 0..npairs {
                    let key = read_item(sub, &assoc.key)?;
                    let value = read_item(sub, &assoc.value)?;
                    pairs.push((key, value));
                }
                Ok(pairs)
            })
            .map(Value::Assoc)
        }
        Descriptor::Union(union) => {
            if wire == kind::ENUM || wire == kind::TUPLE {
                let case = union
                    .case_for_wire(wire, tag)
                    .ok_or(Error::UnexpectedWireType)?;
                let values = if case.is_constant() {
                    Vec::new()
                } else {
                    read_delimited(r, |sub| read_tuple_items(sub, &case.fields))?
                };
                Ok(Value::Variant(Variant::new(
                    case.name.clone(),
                    case.tag,
                    values,
                )))
            } else if kind::is_promotable(wire) {
                let case = union.promotion_case().ok_or(Error::UnexpectedWireType)?;
                let values = promote_items(r, &case.fields, prefix)?;
                Ok(Value::Variant(Variant::new(
                    case.name.clone(),
                    case.tag,
                    values,
                )))
            } else {
                Err(Error::UnexpectedWireType)
            }
        }
    }
}

fn expect_untagged(wire: u8, tag: u64, want: u8) -> Result<(), Error> {
    if wire == want && tag == 0 {
        Ok(())
    } else {
        Err(Error::UnexpectedWireType)
    }
}

fn read_count(r: &mut dyn ReadBytes) -> Result<usize, Error> {
    usize::try_from(varint::read_unsigned(r)?)
        .map_err(|_| Error::Parse("count overflows address space".into()))
}

/// Reads a nested value; a missing item inside a composite is truncation,
/// not a clean end of stream.
fn read_item(r: &mut dyn ReadBytes, desc: &Descriptor) -> Result<Value, Error> {
    match read_value(r, desc) {
        Err(Error::Eof) => Err(Error::UnexpectedEof),
        other => other,
    }
}

fn skip_item(r: &mut dyn ReadBytes) -> Result<(), Error> {
    match skip_value(r) {
        Err(Error::Eof) => Err(Error::UnexpectedEof),
        other => other,
    }
}

/// Runs `read_body` over the delimited payload that follows the prefix.
///
/// Memory-backed streams hand the payload over as a zero-copy sub-slice.
/// Source streams copy payloads under 4096 bytes into memory first, trading
/// one larger read for many small ones; larger payloads decode in place.
fn read_delimited<T>(
    r: &mut dyn ReadBytes,
    read_body: impl FnOnce(&mut dyn ReadBytes) -> Result<T, Error>,
) -> Result<T, Error> {
    let len = varint::read_unsigned(r)?;
    if r.is_buffered() {
        let n = usize::try_from(len).map_err(|_| Error::UnexpectedEof)?;
        let mut sub = SliceReader::new(r.view(n)?);
        return read_body(&mut sub);
    }
    if len < EAGER_BUFFER_LIMIT {
        let buf = r.read_vec(len as usize)?;
        let mut sub = SliceReader::new(&buf);
        return read_body(&mut sub);
    }
    read_body(r)
}

/// Reads tuple items against the expected types, applying the compatibility
/// rule: missing trailing items take their type's default, excess trailing
/// items are skipped structurally.
fn read_tuple_items(r: &mut dyn ReadBytes, types: &[Descriptor]) -> Result<Vec<Value>, Error> {
    let nitems = read_count(r)?;
    let mut items = Vec::with_capacity(types.len());
    if nitems <= types.len() {
        for ty in &types[..nitems] {
            items.push(read_item(r, ty)?);
        }
        for ty in &types[nitems..] {
            items.push(ty.default_value()?);
        }
    } else {
        for ty in types {
            items.push(read_item(r, ty)?);
        }
        for _ in types.len()..nitems {
            skip_item(r)?;
        }
    }
    Ok(items)
}

fn read_message_items(r: &mut dyn ReadBytes, msg: &MessageDescriptor) -> Result<Record, Error> {
    let nitems = read_count(r)?;
    let nfields = msg.fields.len();
    let mut fields = Vec::with_capacity(nfields);
    if nitems <= nfields {
        for f in &msg.fields[..nitems] {
            fields.push((f.name.clone(), read_item(r, &f.ty)?));
        }
        for f in &msg.fields[nitems..] {
            fields.push((f.name.clone(), f.ty.default_value()?));
        }
    } else {
        for f in &msg.fields {
            fields.push((f.name.clone(), read_item(r, &f.ty)?));
        }
        for _ in nfields..nitems {
            skip_item(r)?;
        }
    }
    Ok(Record {
        name: msg.name.clone(),
        fields,
    })
}

fn read_list_items(r: &mut dyn ReadBytes, element: &Descriptor) -> Result<Vec<Value>, Error> {
    let nitems = read_count(r)?;
    let mut items = Vec::with_capacity(nitems);
    for _ in 0..nitems {
        items.push(read_item(r, element)?);
    }
    Ok(items)
}

/// Promotes a primitive wire value into a composite: the primitive becomes
/// the first item, every later item takes its default. This is how a field
/// that used to be a primitive can grow into a tuple or union without
/// breaking old data.
fn promote_items(
    r: &mut dyn ReadBytes,
    types: &[Descriptor],
    prefix: u64,
) -> Result<Vec<Value>, Error> {
    let first = types
        .first()
        .ok_or_else(|| Error::Parse("could not promote primitive to Tuple type".into()))?;
    let mut items = vec![read_prefixed_value(r, first, prefix)?];
    for ty in &types[1..] {
        items.push(ty.default_value()?);
    }
    Ok(items)
}

fn promote_message(
    r: &mut dyn ReadBytes,
    msg: &MessageDescriptor,
    prefix: u64,
) -> Result<Record, Error> {
    let first = msg
        .fields
        .first()
        .ok_or_else(|| Error::Parse("could not promote primitive to Tuple type".into()))?;
    let mut fields = vec![(first.name.clone(), read_prefixed_value(r, &first.ty, prefix)?)];
    for f in &msg.fields[1..] {
        fields.push((f.name.clone(), f.ty.default_value()?));
    }
    Ok(Record {
        name: msg.name.clone(),
        fields,
    })
}
