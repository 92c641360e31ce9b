//! Console-style, cycle-safe rendering of values.
//!
//! Used for `Debug`/`Display` and for the diagnostic context carried by
//! merge errors. Revisited containers print as `[Circular]`; containers the
//! caller holds mutably borrowed print as `[<Type> <borrowed>]`.

use std::fmt::{self, Write};

use chrono::SecondsFormat;

use crate::value::Value;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Renderer::default().write(self, f)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Renderer::default().write(self, f)
    }
}

#[derive(Default)]
struct Renderer {
    /// Identities of the containers currently being rendered.
    open: Vec<usize>,
}

impl Renderer {
    fn write(&mut self, value: &Value, f: &mut dyn Write) -> fmt::Result {
        match value {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write_number(*n, f),
            Value::BigInt(i) => write!(f, "{i}n"),
            Value::String(s) => write!(f, "{:?}", &**s),
            Value::Symbol(s) => write!(f, "Symbol({})", s.description()),
            Value::Function(func) if func.name().is_empty() => {
                f.write_str("[Function (anonymous)]")
            }
            Value::Function(func) => write!(f, "[Function: {}]", func.name()),
            Value::Date(date) => match date.to_datetime() {
                Some(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
                None => f.write_str("Invalid Date"),
            },
            Value::RegExp(re) => write!(f, "/{}/{}", re.source(), re.flags()),
            Value::ArrayBuffer(buf) => match buf.try_borrow() {
                Ok(bytes) => write!(f, "ArrayBuffer {{ byteLength: {} }}", bytes.len()),
                Err(_) => f.write_str("[ArrayBuffer <borrowed>]"),
            },
            Value::Blob(blob) => write!(
                f,
                "Blob {{ type: {:?}, size: {} }}",
                blob.media_type(),
                blob.size()
            ),
            Value::Map(_) | Value::Set(_) | Value::Array(_) | Value::Object(_) => {
                self.write_container(value, f)
            }
        }
    }

    fn write_container(&mut self, value: &Value, f: &mut dyn Write) -> fmt::Result {
        let id = value.identity().unwrap_or_default();
        if self.open.contains(&id) {
            return f.write_str("[Circular]");
        }
        self.open.push(id);
        let result = match value {
            Value::Map(map) => match map.try_borrow() {
                Ok(entries) => {
                    write!(f, "Map({})", entries.len())?;
                    if entries.is_empty() {
                        f.write_str(" {}")
                    } else {
                        f.write_str(" { ")?;
                        for (i, (k, v)) in entries.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            self.write(k.value(), f)?;
                            f.write_str(" => ")?;
                            self.write(v, f)?;
                        }
                        f.write_str(" }")
                    }
                }
                Err(_) => f.write_str("[Map <borrowed>]"),
            },
            Value::Set(set) => match set.try_borrow() {
                Ok(members) => {
                    write!(f, "Set({})", members.len())?;
                    if members.is_empty() {
                        f.write_str(" {}")
                    } else {
                        f.write_str(" { ")?;
                        for (i, m) in members.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            self.write(m.value(), f)?;
                        }
                        f.write_str(" }")
                    }
                }
                Err(_) => f.write_str("[Set <borrowed>]"),
            },
            Value::Array(array) => match array.try_borrow() {
                Ok(slots) => self.write_slots(&slots, f),
                Err(_) => f.write_str("[Array <borrowed>]"),
            },
            Value::Object(object) => match object.try_borrow() {
                Ok(data) => {
                    if !data.is_plain() {
                        write!(f, "{} ", data.class())?;
                    }
                    if data.is_empty() {
                        f.write_str("{}")
                    } else {
                        f.write_str("{ ")?;
                        for (i, (k, v)) in data.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            write!(f, "{k}: ")?;
                            self.write(v, f)?;
                        }
                        f.write_str(" }")
                    }
                }
                Err(_) => f.write_str("[Object <borrowed>]"),
            },
            _ => Ok(()),
        };
        self.open.pop();
        result
    }

    fn write_slots(&mut self, slots: &[Option<Value>], f: &mut dyn Write) -> fmt::Result {
        f.write_char('[')?;
        let mut first = true;
        let mut holes = 0usize;
        for slot in slots {
            match slot {
                None => holes += 1,
                Some(item) => {
                    flush_holes(&mut holes, &mut first, f)?;
                    separator(&mut first, f)?;
                    self.write(item, f)?;
                }
            }
        }
        flush_holes(&mut holes, &mut first, f)?;
        f.write_char(']')
    }
}

fn separator(first: &mut bool, f: &mut dyn Write) -> fmt::Result {
    if !*first {
        f.write_str(", ")?;
    }
    *first = false;
    Ok(())
}

fn flush_holes(holes: &mut usize, first: &mut bool, f: &mut dyn Write) -> fmt::Result {
    match *holes {
        0 => return Ok(()),
        1 => {
            separator(first, f)?;
            f.write_str("<1 empty item>")?;
        }
        n => {
            separator(first, f)?;
            write!(f, "<{n} empty items>")?;
        }
    }
    *holes = 0;
    Ok(())
}

fn write_number(n: f64, f: &mut dyn Write) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{n}")
    }
}
