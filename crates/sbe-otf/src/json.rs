use sbe_types::{PrimitiveType, PrimitiveValue, Signal, Token};
use sbe_wire::buffer::slice_at;
use serde_json::{Map, Number, Value};

use crate::error::DecodeError;
use crate::listener::TokenListener;

/// Output options for [`JsonPrinter`].
///
/// ```text
/// ┌──────────────────────┬──────────────────────────────────────────┐
/// │ Field                │ Effect                                   │
/// ├──────────────────────┼──────────────────────────────────────────┤
/// │ pretty               │ Indented output instead of one line      │
/// │ include_message_name │ Wrap the body as {"<MessageName>": ...}  │
/// └──────────────────────┴──────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonConfig {
    pub pretty: bool,
    pub include_message_name: bool,
}

/// A partially built JSON container.
#[derive(Debug)]
enum Frame {
    Object { key: Option<String>, map: Map<String, Value> },
    Array { key: String, items: Vec<Value> },
}

/// Renders a decoded message as JSON.
///
/// ```text
/// ┌────────────────────┬──────────────────────────────────────────────┐
/// │ Wire shape         │ JSON                                         │
/// ├────────────────────┼──────────────────────────────────────────────┤
/// │ scalar             │ number (null when optional and at its null)  │
/// │ fixed array        │ array of numbers                             │
/// │ char array         │ string, trailing NULs trimmed                │
/// │ constant           │ its constant value                           │
/// │ composite          │ object                                       │
/// │ enum               │ valid-value name, or the raw number          │
/// │ set                │ array of chosen choice names                 │
/// │ group              │ array of objects                             │
/// │ var data           │ UTF-8 string, or hex when not UTF-8          │
/// └────────────────────┴──────────────────────────────────────────────┘
/// ```
///
/// Keys keep wire order. One printer renders one message; call
/// [`take`](Self::take) between messages to reuse it.
#[derive(Debug, Default)]
pub struct JsonPrinter {
    config: JsonConfig,
    stack: Vec<Frame>,
    output: Option<Value>,
}

impl JsonPrinter {
    pub fn new(config: JsonConfig) -> Self {
        Self {
            config,
            stack: Vec::new(),
            output: None,
        }
    }

    /// The last completed message.
    pub fn value(&self) -> Option<&Value> {
        self.output.as_ref()
    }

    /// Take the last completed message, leaving the printer empty.
    pub fn take(&mut self) -> Option<Value> {
        self.stack.clear();
        self.output.take()
    }

    /// Serialize the last completed message per the config.
    ///
    /// # Errors
    ///
    /// Whatever `serde_json` reports.
    pub fn render(&self) -> Result<Option<String>, serde_json::Error> {
        self.output
            .as_ref()
            .map(|v| {
                if self.config.pretty {
                    serde_json::to_string_pretty(v)
                } else {
                    serde_json::to_string(v)
                }
            })
            .transpose()
    }

    fn attach(&mut self, key: Option<String>, value: Value) {
        match self.stack.last_mut() {
            Some(Frame::Object { map, .. }) => {
                map.insert(key.unwrap_or_default(), value);
            }
            Some(Frame::Array { items, .. }) => items.push(value),
            None => self.output = Some(value),
        }
    }

    fn pop_object(&mut self) -> Option<(Option<String>, Map<String, Value>)> {
        match self.stack.pop() {
            Some(Frame::Object { key, map }) => Some((key, map)),
            Some(other) => {
                self.stack.push(other);
                None
            }
            None => None,
        }
    }
}

impl TokenListener for JsonPrinter {
    fn on_begin_message(&mut self, _token: &Token) -> Result<(), DecodeError> {
        self.stack.clear();
        self.output = None;
        self.stack.push(Frame::Object {
            key: None,
            map: Map::new(),
        });
        Ok(())
    }

    fn on_end_message(&mut self, token: &Token) -> Result<(), DecodeError> {
        let (_, map) = self
            .pop_object()
            .ok_or_else(|| DecodeError::listener("unbalanced message"))?;
        let body = Value::Object(map);
        self.output = Some(if self.config.include_message_name {
            let mut wrapper = Map::new();
            wrapper.insert(token.name.clone(), body);
            Value::Object(wrapper)
        } else {
            body
        });
        Ok(())
    }

    fn on_encoding(
        &mut self,
        field: &Token,
        buffer: &[u8],
        offset: usize,
        type_token: &Token,
        _acting_version: u32,
    ) -> Result<(), DecodeError> {
        let value = encoding_value(buffer, offset, type_token)?;
        self.attach(Some(field.name.clone()), value);
        Ok(())
    }

    fn on_enum(
        &mut self,
        field: &Token,
        buffer: &[u8],
        offset: usize,
        tokens: &[Token],
        _acting_version: u32,
    ) -> Result<(), DecodeError> {
        let value = enum_value(field, buffer, offset, tokens)?;
        self.attach(Some(field.name.clone()), value);
        Ok(())
    }

    fn on_bit_set(
        &mut self,
        field: &Token,
        buffer: &[u8],
        offset: usize,
        tokens: &[Token],
        _acting_version: u32,
    ) -> Result<(), DecodeError> {
        let begin = &tokens[0];
        let raw = read_scalar(buffer, offset, begin)?.as_u64().unwrap_or_default();
        let chosen = tokens
            .iter()
            .filter(|t| t.signal == Signal::Choice)
            .filter(|t| {
                let bit = t.encoding.const_value.as_ref().and_then(PrimitiveValue::as_u64);
                bit.is_some_and(|b| b < 64 && raw & (1 << b) != 0)
            })
            .map(|t| Value::String(t.name.clone()))
            .collect();
        self.attach(Some(field.name.clone()), Value::Array(chosen));
        Ok(())
    }

    fn on_begin_composite(&mut self, field: &Token, _tokens: &[Token]) -> Result<(), DecodeError> {
        self.stack.push(Frame::Object {
            key: Some(field.name.clone()),
            map: Map::new(),
        });
        Ok(())
    }

    fn on_end_composite(&mut self, _field: &Token, _tokens: &[Token]) -> Result<(), DecodeError> {
        let (key, map) = self
            .pop_object()
            .ok_or_else(|| DecodeError::listener("unbalanced composite"))?;
        self.attach(key, Value::Object(map));
        Ok(())
    }

    fn on_group_header(&mut self, token: &Token, _num_in_group: u64) -> Result<(), DecodeError> {
        self.stack.push(Frame::Array {
            key: token.name.clone(),
            items: Vec::new(),
        });
        Ok(())
    }

    fn on_begin_group(&mut self, _token: &Token, _index: u64, _num_in_group: u64) -> Result<(), DecodeError> {
        self.stack.push(Frame::Object {
            key: None,
            map: Map::new(),
        });
        Ok(())
    }

    fn on_end_group(&mut self, _token: &Token, index: u64, num_in_group: u64) -> Result<(), DecodeError> {
        let (_, map) = self
            .pop_object()
            .ok_or_else(|| DecodeError::listener("unbalanced group element"))?;
        if num_in_group > 0 {
            self.attach(None, Value::Object(map));
        }
        if index + 1 >= num_in_group {
            match self.stack.pop() {
                Some(Frame::Array { key, items }) => self.attach(Some(key), Value::Array(items)),
                _ => return Err(DecodeError::listener("unbalanced group")),
            }
        }
        Ok(())
    }

    fn on_var_data(
        &mut self,
        field: &Token,
        buffer: &[u8],
        offset: usize,
        length: usize,
        _type_token: &Token,
    ) -> Result<(), DecodeError> {
        let bytes = slice_at(buffer, offset, length)?;
        let value = match std::str::from_utf8(bytes) {
            Ok(text) => Value::String(text.to_owned()),
            Err(_) => Value::String(hex::encode(bytes)),
        };
        self.attach(Some(field.name.clone()), value);
        Ok(())
    }
}

// ── Values ────────────────────────────────────────────────────────────

fn primitive_type(token: &Token) -> Result<PrimitiveType, DecodeError> {
    token
        .encoding
        .primitive_type
        .ok_or_else(|| DecodeError::listener(format!("{} has no primitive type", token.name)))
}

fn read_scalar(buffer: &[u8], offset: usize, token: &Token) -> Result<PrimitiveValue, DecodeError> {
    let t = primitive_type(token)?;
    Ok(PrimitiveValue::read(buffer, offset, t, token.encoding.byte_order)?)
}

fn encoding_value(buffer: &[u8], offset: usize, token: &Token) -> Result<Value, DecodeError> {
    let t = primitive_type(token)?;
    if token.is_constant_encoding() {
        return Ok(token
            .encoding
            .const_value
            .as_ref()
            .map_or(Value::Null, |v| to_json(v, t)));
    }

    let count = token.array_length();
    if t == PrimitiveType::Char && count > 1 {
        let bytes = slice_at(buffer, offset, count)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        return Ok(Value::String(String::from_utf8_lossy(&bytes[..end]).into_owned()));
    }

    let mut values = Vec::with_capacity(count);
    for i in 0..count {
        let value = PrimitiveValue::read(buffer, offset + i * t.size(), t, token.encoding.byte_order)?;
        values.push(if token.is_optional_encoding() && token.encoding.is_null(&value) {
            Value::Null
        } else {
            to_json(&value, t)
        });
    }
    Ok(match values.len() {
        1 => values.swap_remove(0),
        _ => Value::Array(values),
    })
}

fn enum_value(field: &Token, buffer: &[u8], offset: usize, tokens: &[Token]) -> Result<Value, DecodeError> {
    let begin = &tokens[0];
    let t = primitive_type(begin)?;
    let raw = if field.is_constant_encoding() || begin.is_constant_encoding() {
        match begin.encoding.const_value.clone() {
            Some(value) => value,
            // Only the "Enum.Value" reference survived; report its name.
            None => {
                let name = field
                    .encoding
                    .const_value
                    .as_ref()
                    .and_then(PrimitiveValue::as_bytes)
                    .map(String::from_utf8_lossy)
                    .and_then(|r| r.rsplit_once('.').map(|(_, v)| v.to_owned()));
                return Ok(name.map_or(Value::Null, Value::String));
            }
        }
    } else {
        PrimitiveValue::read(buffer, offset, t, begin.encoding.byte_order)?
    };

    let named = tokens
        .iter()
        .filter(|v| v.signal == Signal::ValidValue)
        .find(|v| v.encoding.const_value.as_ref() == Some(&raw));
    Ok(match named {
        Some(v) => Value::String(v.name.clone()),
        None if begin.is_optional_encoding() && begin.encoding.is_null(&raw) => Value::Null,
        None => to_json(&raw, t),
    })
}

fn to_json(value: &PrimitiveValue, t: PrimitiveType) -> Value {
    match value {
        PrimitiveValue::Long(v) if t == PrimitiveType::Char => u8::try_from(*v)
            .map(|b| Value::String(char::from(b).to_string()))
            .unwrap_or_else(|_| Value::from(*v)),
        PrimitiveValue::Long(_) if t == PrimitiveType::Uint64 => Value::from(value.as_u64().unwrap_or_default()),
        PrimitiveValue::Long(v) => Value::from(*v),
        PrimitiveValue::Double(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
        PrimitiveValue::Bytes { bytes, .. } => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;
    use sbe_ir::Ir;
    use sbe_irgen::{IrGenerator, MessageSchema};
    use serde_json::json;

    fn ir() -> Ir {
        let schema: MessageSchema = serde_json::from_value(json!({
            "package": "test", "id": 1,
            "types": [
                { "kind": "composite", "name": "messageHeader", "elements": [
                    { "kind": "type", "name": "blockLength", "primitiveType": "uint16" },
                    { "kind": "type", "name": "templateId", "primitiveType": "uint16" },
                    { "kind": "type", "name": "schemaId", "primitiveType": "uint16" },
                    { "kind": "type", "name": "version", "primitiveType": "uint16" } ]},
                { "kind": "composite", "name": "groupSizeEncoding", "elements": [
                    { "kind": "type", "name": "blockLength", "primitiveType": "uint16" },
                    { "kind": "type", "name": "numInGroup", "primitiveType": "uint8" } ]},
                { "kind": "composite", "name": "varDataEncoding", "elements": [
                    { "kind": "type", "name": "length", "primitiveType": "uint8" },
                    { "kind": "type", "name": "varData", "primitiveType": "uint8", "length": 0 } ]},
                { "kind": "type", "name": "Code", "primitiveType": "char", "length": 4 },
                { "kind": "type", "name": "MaybeInt", "primitiveType": "int32", "presence": "optional" },
                { "kind": "enum", "name": "Side", "encodingType": "char", "validValues": [
                    { "name": "Buy", "value": "B" }, { "name": "Sell", "value": "S" } ] },
                { "kind": "set", "name": "Flags", "encodingType": "uint8", "choices": [
                    { "name": "a", "bit": 0 }, { "name": "b", "bit": 1 }, { "name": "c", "bit": 2 } ] }
            ],
            "messages": [{ "name": "Order", "id": 1,
                "fields": [
                    { "name": "code", "id": 1, "type": "Code" },
                    { "name": "qty", "id": 2, "type": "MaybeInt" },
                    { "name": "side", "id": 3, "type": "Side" },
                    { "name": "flags", "id": 4, "type": "Flags" },
                    { "name": "kind", "id": 5, "type": "Side", "presence": "constant", "valueRef": "Side.Sell" } ],
                "groups": [{ "name": "fills", "id": 6, "fields": [{ "name": "px", "id": 1, "type": "uint16" }] }],
                "data": [{ "name": "note", "id": 7 }] }]
        }))
        .unwrap();
        IrGenerator::default().generate(&schema).unwrap()
    }

    fn buffer(fills: &[u16], note: &[u8]) -> Vec<u8> {
        let mut buf = b"AB\0\0".to_vec();
        buf.extend_from_slice(&i32::MIN.to_le_bytes());
        buf.push(b'S');
        buf.push(0b101);
        buf.extend_from_slice(&[2, 0, u8::try_from(fills.len()).unwrap()]);
        for px in fills {
            buf.extend_from_slice(&px.to_le_bytes());
        }
        buf.push(u8::try_from(note.len()).unwrap());
        buf.extend_from_slice(note);
        buf
    }

    fn print(buf: &[u8], config: JsonConfig) -> JsonPrinter {
        let ir = ir();
        let mut printer = JsonPrinter::new(config);
        decode(buf, 0, 0, 10, ir.message(1).unwrap(), &mut printer).unwrap();
        printer
    }

    #[test]
    fn renders_every_shape() {
        let printer = print(&buffer(&[100, 200], b"hi"), JsonConfig::default());
        assert_eq!(
            printer.value().unwrap(),
            &json!({
                "code": "AB",
                "qty": null,
                "side": "Sell",
                "flags": ["a", "c"],
                "kind": "Sell",
                "fills": [{ "px": 100 }, { "px": 200 }],
                "note": "hi",
            })
        );
    }

    #[test]
    fn empty_group_is_empty_array_and_binary_note_is_hex() {
        let printer = print(&buffer(&[], &[0xFF, 0x00]), JsonConfig::default());
        let value = printer.value().unwrap();
        assert_eq!(value["fills"], json!([]));
        assert_eq!(value["note"], json!("ff00"));
    }

    #[test]
    fn message_name_wraps_body() {
        let printer = print(
            &buffer(&[1], b""),
            JsonConfig {
                pretty: false,
                include_message_name: true,
            },
        );
        let text = printer.render().unwrap().unwrap();
        assert!(text.starts_with(r#"{"Order":{"code":"AB""#));
    }

    #[test]
    fn pretty_output_snapshot() {
        let printer = print(
            &buffer(&[7], b"ok"),
            JsonConfig {
                pretty: true,
                include_message_name: false,
            },
        );
        insta::assert_snapshot!(printer.render().unwrap().unwrap());
    }
}
