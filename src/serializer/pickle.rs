//! A restricted pickle decoder.
//!
//! Only opcodes describing plain data are understood: dicts, lists, tuples, strings, integers,
//! floats, booleans and `None`, plus the memo and framing machinery around them. Anything that
//! would import a global, call a constructor or reference external state is refused with
//! [`DecodeError::UnsupportedFormat`].
//!
//! Containers live in an arena and the stack and memo hold indices into it, so a container that
//! is memoized and mutated afterwards is seen in its final state wherever it is referenced.

use std::{collections::HashMap, num::IntErrorKind};

use crate::{
    error::{DecodeError, Result},
    value::{Session, Value},
};

const HIGHEST_PROTOCOL: u8 = 5;
const MAX_DEPTH: usize = 256;
const MAX_VALUES: usize = 1 << 20;

mod op {
    pub const MARK: u8 = b'(';
    pub const STOP: u8 = b'.';
    pub const POP: u8 = b'0';
    pub const POP_MARK: u8 = b'1';
    pub const DUP: u8 = b'2';
    pub const FLOAT: u8 = b'F';
    pub const INT: u8 = b'I';
    pub const BININT: u8 = b'J';
    pub const BININT1: u8 = b'K';
    pub const LONG: u8 = b'L';
    pub const BININT2: u8 = b'M';
    pub const NONE: u8 = b'N';
    pub const STRING: u8 = b'S';
    pub const BINSTRING: u8 = b'T';
    pub const SHORT_BINSTRING: u8 = b'U';
    pub const UNICODE: u8 = b'V';
    pub const BINUNICODE: u8 = b'X';
    pub const APPEND: u8 = b'a';
    pub const DICT: u8 = b'd';
    pub const EMPTY_DICT: u8 = b'}';
    pub const APPENDS: u8 = b'e';
    pub const GET: u8 = b'g';
    pub const BINGET: u8 = b'h';
    pub const LONG_BINGET: u8 = b'j';
    pub const LIST: u8 = b'l';
    pub const EMPTY_LIST: u8 = b']';
    pub const PUT: u8 = b'p';
    pub const BINPUT: u8 = b'q';
    pub const LONG_BINPUT: u8 = b'r';
    pub const SETITEM: u8 = b's';
    pub const TUPLE: u8 = b't';
    pub const EMPTY_TUPLE: u8 = b')';
    pub const SETITEMS: u8 = b'u';
    pub const BINFLOAT: u8 = b'G';
    pub const PROTO: u8 = 0x80;
    pub const TUPLE1: u8 = 0x85;
    pub const TUPLE2: u8 = 0x86;
    pub const TUPLE3: u8 = 0x87;
    pub const NEWTRUE: u8 = 0x88;
    pub const NEWFALSE: u8 = 0x89;
    pub const LONG1: u8 = 0x8a;
    pub const LONG4: u8 = 0x8b;
    pub const SHORT_BINUNICODE: u8 = 0x8c;
    pub const BINUNICODE8: u8 = 0x8d;
    pub const MEMOIZE: u8 = 0x94;
    pub const FRAME: u8 = 0x95;
}

#[derive(Debug)]
enum Node {
    Scalar(Value),
    List(Vec<usize>),
    Tuple(Vec<usize>),
    Dict(Vec<(usize, usize)>),
}

impl Node {
    fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(value) => value.kind(),
            Self::List(_) | Self::Tuple(_) => "sequence",
            Self::Dict(_) => "mapping",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Mark,
    Node(usize),
}

/// Decode a pickled dict of plain data.
pub(super) fn from_slice(bytes: &[u8]) -> Result<Value> {
    let mut machine = Machine::new(bytes);
    let root = machine.run()?;

    // Reject a non-dict root before looking at any keys.
    if !matches!(machine.nodes[root], Node::Dict(_)) {
        return Err(DecodeError::TypeMismatch(machine.nodes[root].kind()));
    }

    let mut builder = Builder {
        nodes: &machine.nodes,
        active: vec![false; machine.nodes.len()],
        emitted: 0,
    };
    builder.build(root, 0)
}

fn truncated() -> DecodeError {
    DecodeError::Deserialize("pickle stream is truncated".into())
}

fn malformed(msg: &str) -> DecodeError {
    DecodeError::Deserialize(format!("malformed pickle stream: {msg}"))
}

fn unsupported_opcode(opcode: u8) -> DecodeError {
    let name = match opcode {
        b'c' => "GLOBAL",
        0x93 => "STACK_GLOBAL",
        b'R' => "REDUCE",
        b'b' => "BUILD",
        b'i' => "INST",
        b'o' => "OBJ",
        0x81 => "NEWOBJ",
        0x92 => "NEWOBJ_EX",
        b'P' | b'Q' => "persistent id",
        0x82..=0x84 => "extension",
        b'B' | b'C' | 0x8e | 0x96 => "bytes",
        0x8f..=0x91 => "set",
        _ => "unknown",
    };
    DecodeError::UnsupportedFormat(format!("pickle opcode {opcode:#04x} ({name})"))
}

struct Machine<'a> {
    input: &'a [u8],
    pos: usize,
    nodes: Vec<Node>,
    stack: Vec<Slot>,
    memo: HashMap<u64, usize>,
}

impl<'a> Machine<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            nodes: Vec::new(),
            stack: Vec::new(),
            memo: HashMap::new(),
        }
    }

    /// Execute opcodes up to `STOP` and return the arena index of the result.
    fn run(&mut self) -> Result<usize> {
        loop {
            let opcode = self.read_u8()?;
            match opcode {
                op::PROTO => {
                    let version = self.read_u8()?;
                    if version > HIGHEST_PROTOCOL {
                        return Err(DecodeError::UnsupportedFormat(format!(
                            "pickle protocol {version}"
                        )));
                    }
                }
                op::FRAME => {
                    self.take(8)?;
                }
                op::STOP => return self.pop_node(),

                op::MARK => self.stack.push(Slot::Mark),
                op::POP => {
                    self.stack.pop().ok_or_else(|| malformed("stack underflow"))?;
                }
                op::POP_MARK => {
                    self.pop_mark()?;
                }
                op::DUP => {
                    let top = self.peek_node()?;
                    self.stack.push(Slot::Node(top));
                }

                op::NONE => self.push_scalar(Value::Null),
                op::NEWTRUE => self.push_scalar(Value::Bool(true)),
                op::NEWFALSE => self.push_scalar(Value::Bool(false)),
                op::INT => {
                    let value = match self.read_line()? {
                        b"00" => Value::Bool(false),
                        b"01" => Value::Bool(true),
                        line => Value::Integer(parse_int(line)?),
                    };
                    self.push_scalar(value);
                }
                op::BININT => {
                    let n = i32::from_le_bytes(self.take_array()?);
                    self.push_scalar(Value::Integer(n.into()));
                }
                op::BININT1 => {
                    let n = self.read_u8()?;
                    self.push_scalar(Value::Integer(n.into()));
                }
                op::BININT2 => {
                    let n = u16::from_le_bytes(self.take_array()?);
                    self.push_scalar(Value::Integer(n.into()));
                }
                op::LONG => {
                    let line = self.read_line()?;
                    let digits = line.strip_suffix(b"L").unwrap_or(line);
                    self.push_scalar(Value::Integer(parse_int(digits)?));
                }
                op::LONG1 => {
                    let len = self.read_u8()?;
                    let bytes = self.take(len.into())?;
                    self.push_scalar(Value::Integer(decode_long(bytes)?));
                }
                op::LONG4 => {
                    let len = self.read_len_i32()?;
                    let bytes = self.take(len)?;
                    self.push_scalar(Value::Integer(decode_long(bytes)?));
                }
                op::FLOAT => {
                    let line = self.read_line()?;
                    let n = std::str::from_utf8(line)
                        .ok()
                        .and_then(|s| s.trim().parse::<f64>().ok())
                        .ok_or_else(|| malformed("invalid FLOAT literal"))?;
                    self.push_scalar(Value::Float(n));
                }
                op::BINFLOAT => {
                    let n = f64::from_be_bytes(self.take_array()?);
                    self.push_scalar(Value::Float(n));
                }

                op::STRING => {
                    let line = self.read_line()?;
                    let bytes = unquote(line)?;
                    self.push_scalar(Value::String(utf8(bytes)?));
                }
                op::BINSTRING => {
                    let len = self.read_len_i32()?;
                    let bytes = self.take(len)?.to_vec();
                    self.push_scalar(Value::String(utf8(bytes)?));
                }
                op::SHORT_BINSTRING => {
                    let len = self.read_u8()?;
                    let bytes = self.take(len.into())?.to_vec();
                    self.push_scalar(Value::String(utf8(bytes)?));
                }
                op::UNICODE => {
                    let line = self.read_line()?;
                    self.push_scalar(Value::String(raw_unicode_unescape(line)?));
                }
                op::BINUNICODE => {
                    let len = u32::from_le_bytes(self.take_array()?);
                    self.push_unicode(u64::from(len))?;
                }
                op::SHORT_BINUNICODE => {
                    let len = self.read_u8()?;
                    self.push_unicode(u64::from(len))?;
                }
                op::BINUNICODE8 => {
                    let len = u64::from_le_bytes(self.take_array()?);
                    self.push_unicode(len)?;
                }

                op::EMPTY_DICT => self.push_node(Node::Dict(Vec::new())),
                op::DICT => {
                    let items = self.pop_mark()?;
                    let pairs = pairs(&items)?;
                    self.push_node(Node::Dict(pairs));
                }
                op::SETITEM => {
                    let value = self.pop_node()?;
                    let key = self.pop_node()?;
                    let dict = self.peek_node()?;
                    self.dict_mut(dict)?.push((key, value));
                }
                op::SETITEMS => {
                    let items = self.pop_mark()?;
                    let pairs = pairs(&items)?;
                    let dict = self.peek_node()?;
                    self.dict_mut(dict)?.extend(pairs);
                }

                op::EMPTY_LIST => self.push_node(Node::List(Vec::new())),
                op::LIST => {
                    let items = self.pop_mark()?;
                    self.push_node(Node::List(items));
                }
                op::APPEND => {
                    let value = self.pop_node()?;
                    let list = self.peek_node()?;
                    self.list_mut(list)?.push(value);
                }
                op::APPENDS => {
                    let items = self.pop_mark()?;
                    let list = self.peek_node()?;
                    self.list_mut(list)?.extend(items);
                }

                op::EMPTY_TUPLE => self.push_node(Node::Tuple(Vec::new())),
                op::TUPLE => {
                    let items = self.pop_mark()?;
                    self.push_node(Node::Tuple(items));
                }
                op::TUPLE1 | op::TUPLE2 | op::TUPLE3 => {
                    let len = usize::from(opcode - op::TUPLE1 + 1);
                    let mut items = (0..len)
                        .map(|_| self.pop_node())
                        .collect::<Result<Vec<_>>>()?;
                    items.reverse();
                    self.push_node(Node::Tuple(items));
                }

                op::PUT => {
                    let key = parse_memo_key(self.read_line()?)?;
                    self.memoize(key)?;
                }
                op::BINPUT => {
                    let key = self.read_u8()?;
                    self.memoize(key.into())?;
                }
                op::LONG_BINPUT => {
                    let key = u32::from_le_bytes(self.take_array()?);
                    self.memoize(key.into())?;
                }
                op::MEMOIZE => {
                    let key = self.memo.len() as u64;
                    self.memoize(key)?;
                }
                op::GET => {
                    let key = parse_memo_key(self.read_line()?)?;
                    self.recall(key)?;
                }
                op::BINGET => {
                    let key = self.read_u8()?;
                    self.recall(key.into())?;
                }
                op::LONG_BINGET => {
                    let key = u32::from_le_bytes(self.take_array()?);
                    self.recall(key.into())?;
                }

                other => return Err(unsupported_opcode(other)),
            }
        }
    }

    fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.input.get(self.pos).ok_or_else(truncated)?;
        self.pos += 1;
        Ok(byte)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or_else(truncated)?;
        let bytes = self.input.get(self.pos..end).ok_or_else(truncated)?;
        self.pos = end;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.take(N)?;
        bytes.try_into().map_err(|_| truncated())
    }

    fn read_len_i32(&mut self) -> Result<usize> {
        let len = i32::from_le_bytes(self.take_array()?);
        usize::try_from(len).map_err(|_| malformed("negative length"))
    }

    /// Bytes up to (not including) the next newline.
    fn read_line(&mut self) -> Result<&'a [u8]> {
        let rest = self.input.get(self.pos..).ok_or_else(truncated)?;
        let len = rest.iter().position(|&b| b == b'\n').ok_or_else(truncated)?;
        self.pos += len + 1;
        Ok(&rest[..len])
    }

    fn push_node(&mut self, node: Node) {
        self.nodes.push(node);
        self.stack.push(Slot::Node(self.nodes.len() - 1));
    }

    fn push_scalar(&mut self, value: Value) {
        self.push_node(Node::Scalar(value));
    }

    fn push_unicode(&mut self, len: u64) -> Result<()> {
        let len = usize::try_from(len).map_err(|_| truncated())?;
        let bytes = self.take(len)?;
        let s = std::str::from_utf8(bytes).map_err(|_| malformed("invalid UTF-8 in unicode"))?;
        self.push_scalar(Value::String(s.to_owned()));
        Ok(())
    }

    fn pop_node(&mut self) -> Result<usize> {
        match self.stack.pop() {
            Some(Slot::Node(index)) => Ok(index),
            Some(Slot::Mark) => Err(malformed("unexpected MARK")),
            None => Err(malformed("stack underflow")),
        }
    }

    fn peek_node(&self) -> Result<usize> {
        match self.stack.last() {
            Some(Slot::Node(index)) => Ok(*index),
            Some(Slot::Mark) => Err(malformed("unexpected MARK")),
            None => Err(malformed("stack underflow")),
        }
    }

    /// Pop everything above the topmost MARK, in push order.
    fn pop_mark(&mut self) -> Result<Vec<usize>> {
        let mark = self
            .stack
            .iter()
            .rposition(|slot| matches!(slot, Slot::Mark))
            .ok_or_else(|| malformed("missing MARK"))?;
        let items = self
            .stack
            .drain(mark..)
            .filter_map(|slot| match slot {
                Slot::Node(index) => Some(index),
                Slot::Mark => None,
            })
            .collect();
        Ok(items)
    }

    fn dict_mut(&mut self, index: usize) -> Result<&mut Vec<(usize, usize)>> {
        match &mut self.nodes[index] {
            Node::Dict(pairs) => Ok(pairs),
            _ => Err(malformed("SETITEM target is not a dict")),
        }
    }

    fn list_mut(&mut self, index: usize) -> Result<&mut Vec<usize>> {
        match &mut self.nodes[index] {
            Node::List(items) => Ok(items),
            _ => Err(malformed("APPEND target is not a list")),
        }
    }

    fn memoize(&mut self, key: u64) -> Result<()> {
        let top = self.peek_node()?;
        self.memo.insert(key, top);
        Ok(())
    }

    fn recall(&mut self, key: u64) -> Result<()> {
        let index = *self
            .memo
            .get(&key)
            .ok_or_else(|| malformed("memo key not found"))?;
        self.stack.push(Slot::Node(index));
        Ok(())
    }
}

/// Materializes arena nodes into [`Value`]s.
struct Builder<'a> {
    nodes: &'a [Node],
    active: Vec<bool>,
    emitted: usize,
}

impl Builder<'_> {
    fn build(&mut self, index: usize, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::UnsupportedFormat("nesting is too deep".into()));
        }
        self.emitted += 1;
        if self.emitted > MAX_VALUES {
            return Err(DecodeError::UnsupportedFormat("too many values".into()));
        }
        if self.active[index] {
            return Err(DecodeError::UnsupportedFormat(
                "self-referential structure".into(),
            ));
        }

        let nodes = self.nodes;
        self.active[index] = true;
        let value = match &nodes[index] {
            Node::Scalar(value) => Ok(value.clone()),
            Node::List(items) | Node::Tuple(items) => items
                .iter()
                .map(|&item| self.build(item, depth + 1))
                .collect::<Result<Vec<_>>>()
                .map(Value::Sequence),
            Node::Dict(pairs) => self.build_mapping(pairs, depth).map(Value::Mapping),
        };
        self.active[index] = false;
        value
    }

    fn build_mapping(&mut self, pairs: &[(usize, usize)], depth: usize) -> Result<Session> {
        let mut map = Session::new();
        for &(key, value) in pairs {
            let key = match self.build(key, depth + 1)? {
                Value::String(key) => key,
                other => return Err(DecodeError::KeyType(describe_key(&other))),
            };
            let value = self.build(value, depth + 1)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

fn describe_key(key: &Value) -> String {
    match key {
        Value::Integer(n) => format!("integer {n}"),
        Value::Float(n) => format!("float {n}"),
        Value::Bool(b) => format!("bool {b}"),
        other => other.kind().to_owned(),
    }
}

fn pairs(items: &[usize]) -> Result<Vec<(usize, usize)>> {
    if items.len() % 2 != 0 {
        return Err(malformed("odd number of dict items"));
    }
    Ok(items.chunks_exact(2).map(|kv| (kv[0], kv[1])).collect())
}

fn parse_int(digits: &[u8]) -> Result<i64> {
    let text = std::str::from_utf8(digits).map_err(|_| malformed("invalid INT literal"))?;
    text.trim().parse::<i64>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            DecodeError::UnsupportedFormat("integer does not fit in 64 bits".into())
        }
        _ => malformed("invalid INT literal"),
    })
}

fn parse_memo_key(digits: &[u8]) -> Result<u64> {
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| malformed("invalid memo key"))
}

/// Little-endian two's complement, as written by LONG1/LONG4.
fn decode_long(bytes: &[u8]) -> Result<i64> {
    let negative = bytes.last().is_some_and(|b| b & 0x80 != 0);
    let fill = if negative { 0xff } else { 0x00 };

    if bytes.len() > 8 {
        let (low, high) = bytes.split_at(8);
        let sign_matches = (low[7] & 0x80 != 0) == negative;
        if !sign_matches || high.iter().any(|&b| b != fill) {
            return Err(DecodeError::UnsupportedFormat(
                "integer does not fit in 64 bits".into(),
            ));
        }
    }

    let mut buf = [fill; 8];
    let len = bytes.len().min(8);
    buf[..len].copy_from_slice(&bytes[..len]);
    Ok(i64::from_le_bytes(buf))
}

fn utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|_| DecodeError::UnsupportedFormat("byte string is not valid UTF-8".into()))
}

/// Undo the Python `repr()` quoting of a protocol 0 STRING argument.
fn unquote(line: &[u8]) -> Result<Vec<u8>> {
    let inner = match line {
        [b'\'', inner @ .., b'\''] | [b'"', inner @ .., b'"'] => inner,
        _ => return Err(malformed("STRING argument is not quoted")),
    };

    let mut out = Vec::with_capacity(inner.len());
    let mut bytes = inner.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        if byte != b'\\' {
            out.push(byte);
            continue;
        }
        match bytes.next() {
            Some(b'n') => out.push(b'\n'),
            Some(b'r') => out.push(b'\r'),
            Some(b't') => out.push(b'\t'),
            Some(b'a') => out.push(0x07),
            Some(b'b') => out.push(0x08),
            Some(b'f') => out.push(0x0c),
            Some(b'v') => out.push(0x0b),
            Some(b'x') => {
                let hi = bytes.next().and_then(hex_digit);
                let lo = bytes.next().and_then(hex_digit);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
                    _ => return Err(malformed("invalid \\x escape")),
                }
            }
            Some(first @ b'0'..=b'7') => {
                let mut n = u32::from(first - b'0');
                for _ in 0..2 {
                    match bytes.peek() {
                        Some(&d @ b'0'..=b'7') => {
                            n = n * 8 + u32::from(d - b'0');
                            bytes.next();
                        }
                        _ => break,
                    }
                }
                out.push((n & 0xff) as u8);
            }
            Some(other @ (b'\\' | b'\'' | b'"')) => out.push(other),
            Some(other) => out.extend_from_slice(&[b'\\', other]),
            None => return Err(malformed("dangling escape")),
        }
    }
    Ok(out)
}

fn hex_digit(byte: u8) -> Option<u8> {
    char::from(byte).to_digit(16).map(|d| d as u8)
}

/// Decode Python's `raw-unicode-escape`: Latin-1 bytes plus `\uXXXX` and `\UXXXXXXXX`.
fn raw_unicode_unescape(line: &[u8]) -> Result<String> {
    let mut out = String::with_capacity(line.len());
    let mut i = 0;
    while i < line.len() {
        let width = match (line[i], line.get(i + 1)) {
            (b'\\', Some(b'u')) => 4,
            (b'\\', Some(b'U')) => 8,
            (byte, _) => {
                out.push(char::from(byte));
                i += 1;
                continue;
            }
        };
        let digits = line
            .get(i + 2..i + 2 + width)
            .and_then(|d| std::str::from_utf8(d).ok())
            .ok_or_else(|| malformed("truncated unicode escape"))?;
        let c = u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| malformed("invalid unicode escape"))?;
        out.push(c);
        i += 2 + width;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Result<Session> {
        match from_slice(bytes)? {
            Value::Mapping(map) => Ok(map),
            other => panic!("expected mapping, got {other:?}"),
        }
    }

    #[test]
    fn protocol_2_session() {
        let bytes = b"\x80\x02}q\x01(U\r_auth_user_idq\x02M6\x05U\x12_auth_user_backendq\x03U\x12some.sweet.Backendu.";
        let session = decode(bytes).expect("pickle decodes");
        assert_eq!(session["_auth_user_id"], Value::Integer(1334));
        assert_eq!(
            session["_auth_user_backend"],
            Value::from("some.sweet.Backend")
        );
    }

    #[test]
    fn protocol_0_python2_strings() {
        let bytes = b"(dp0\nS'name'\np1\nS'it\\'s \\xc3\\xa9'\np2\nsS'n'\np3\nI-12\nsS'b'\np4\nI01\ns.";
        let session = decode(bytes).expect("pickle decodes");
        assert_eq!(session["name"], Value::from("it's \u{e9}"));
        assert_eq!(session["n"], Value::Integer(-12));
        assert_eq!(session["b"], Value::Bool(true));
    }

    #[test]
    fn protocol_0_unicode_and_long() {
        let bytes = b"(dp0\nVcaf\xe9 \\u2603\np1\nL9007199254740993L\ns.";
        let session = decode(bytes).expect("pickle decodes");
        assert_eq!(
            session["caf\u{e9} \u{2603}"],
            Value::Integer(9007199254740993)
        );
    }

    #[test]
    fn memoized_container_sees_later_mutation() {
        // {"a": l, "b": l}, with 7 appended to l through the memo after the dict is built.
        let bytes = b"\x80\x02}q\x00(X\x01\x00\x00\x00a]q\x01X\x01\x00\x00\x00bh\x01uh\x01K\x07a0.";
        let session = decode(bytes).expect("pickle decodes");
        assert_eq!(session["a"], Value::Sequence(vec![Value::Integer(7)]));
        assert_eq!(session["b"], session["a"]);
    }

    #[test]
    fn long1_values() {
        assert_eq!(decode_long(&[]).expect("fits"), 0);
        assert_eq!(decode_long(&[0xff]).expect("fits"), -1);
        assert_eq!(decode_long(&[0x00, 0x80, 0x00]).expect("fits"), 0x8000);
        assert_eq!(
            decode_long(&[0, 0, 0, 0, 0, 1]).expect("fits"),
            1_099_511_627_776
        );
        assert_eq!(
            decode_long(&[0, 0, 0, 0, 0, 0, 0, 0x80, 0xff]).expect("fits"),
            i64::MIN
        );
        assert!(matches!(
            decode_long(&[0, 0, 0, 0, 0, 0, 0, 0x80, 0x00]),
            Err(DecodeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn tuples_and_floats() {
        let bytes = b"\x80\x02}q\x00X\x01\x00\x00\x00tK\x01G@\x04\x00\x00\x00\x00\x00\x00N\x87s.";
        let session = decode(bytes).expect("pickle decodes");
        assert_eq!(
            session["t"],
            Value::Sequence(vec![Value::Integer(1), Value::Float(2.5), Value::Null])
        );
    }

    #[test]
    fn refuses_globals() {
        let bytes = b"\x80\x02}q\x00X\x01\x00\x00\x00xcos\nsystem\nq\x01s.";
        assert!(matches!(
            decode(bytes),
            Err(DecodeError::UnsupportedFormat(msg)) if msg.contains("GLOBAL")
        ));
    }

    #[test]
    fn refuses_reduce_and_bytes() {
        for bytes in [&b"\x80\x02)R."[..], b"\x80\x03C\x01x."] {
            assert!(matches!(
                decode(bytes),
                Err(DecodeError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn refuses_newer_protocols() {
        assert!(matches!(
            decode(b"\x80\x06}."),
            Err(DecodeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn refuses_cycles() {
        let bytes = b"\x80\x02}q\x00X\x04\x00\x00\x00loopq\x01]q\x02h\x02as.";
        assert!(matches!(
            decode(bytes),
            Err(DecodeError::UnsupportedFormat(msg)) if msg.contains("self-referential")
        ));
    }

    #[test]
    fn non_string_keys() {
        let bytes = b"\x80\x02}q\x00K\x01X\x03\x00\x00\x00oneq\x01s.";
        assert!(matches!(
            decode(bytes),
            Err(DecodeError::KeyType(msg)) if msg == "integer 1"
        ));
    }

    #[test]
    fn nested_non_string_keys() {
        let bytes = b"\x80\x02}X\x01\x00\x00\x00a}\x88Nss.";
        assert!(matches!(
            decode(bytes),
            Err(DecodeError::KeyType(msg)) if msg == "bool true"
        ));
    }

    #[test]
    fn top_level_must_be_a_dict() {
        assert!(matches!(
            decode(b"\x80\x02]K\x01a."),
            Err(DecodeError::TypeMismatch("sequence"))
        ));
        assert!(matches!(
            decode(b"\x80\x02N."),
            Err(DecodeError::TypeMismatch("null"))
        ));
    }

    #[test]
    fn truncated_streams() {
        for bytes in [
            &b""[..],
            b"\x80\x02}",
            b"\x80\x02}X\x05\x00\x00\x00ab",
            b"(dp0\nVname",
        ] {
            assert!(matches!(decode(bytes), Err(DecodeError::Deserialize(_))));
        }
    }

    #[test]
    fn structural_errors() {
        for bytes in [
            &b"s."[..],
            b"}K\x01u.",
            b"]K\x01K\x02s.",
            b"}h\x05.",
            b"(.",
        ] {
            assert!(matches!(decode(bytes), Err(DecodeError::Deserialize(_))));
        }
    }

    #[test]
    fn unquote_escapes() {
        assert_eq!(unquote(b"'a\\nb'").expect("quoted"), b"a\nb");
        assert_eq!(unquote(b"\"q\\\"\"").expect("quoted"), b"q\"");
        assert_eq!(unquote(b"'\\101\\0'").expect("quoted"), b"A\0");
        assert_eq!(unquote(b"'\\d'").expect("quoted"), b"\\d");
        assert!(unquote(b"noquotes").is_err());
    }
}
