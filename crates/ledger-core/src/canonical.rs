//! Canonical JSON encoding used for block hashing.
//!
//! Byte-for-byte the text `json.dumps(value, sort_keys=True)` produces:
//! keys sorted by code point at every nesting level, `", "` and `": "`
//! separators, non-ASCII and control characters escaped as `\uXXXX` (UTF-16
//! surrogate pairs above the BMP), and floats in shortest round-trip form with
//! a signed two-digit exponent outside `1e-4 <= |x| < 1e16`.

use std::fmt::Write as _;

use serde_json::{json, Number, Value};

use crate::{Block, Transaction};

pub fn transaction_value(tx: &Transaction) -> Value {
    json!({
        "sender": tx.sender,
        "recipient": tx.recipient,
        "amount": tx.amount,
    })
}

pub fn block_value(block: &Block) -> Value {
    let transactions: Vec<Value> = block.transactions.iter().map(transaction_value).collect();
    json!({
        "index": block.index,
        "timestamp": block.timestamp,
        "transactions": transactions,
        "proof": block.proof,
        "previous_hash": block.previous_hash,
    })
}

/// Encode `value` with sorted keys.
pub fn to_canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

pub fn to_canonical_bytes(value: &Value) -> Vec<u8> {
    to_canonical_string(value).into_bytes()
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            // UTF-8 byte order is code point order.
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_string(key, out);
                out.push_str(": ");
                write_value(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::String(s) => write_string(s, out),
        Value::Number(n) => write_number(n, out),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => out.push_str("null"),
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
        }
    }
    out.push('"');
}

fn write_number(n: &Number, out: &mut String) {
    let text = n.to_string();
    if !n.is_f64() {
        out.push_str(&text);
        return;
    }
    out.push_str(&float_repr(&text));
}

/// Rewrite serde_json's float text into the shortest-repr layout Python prints.
fn float_repr(text: &str) -> String {
    let (sign, body) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };

    if let Some((mantissa, exp)) = body.split_once('e') {
        if let Ok(exp) = exp.parse::<i32>() {
            let exp_sign = if exp < 0 { '-' } else { '+' };
            return format!("{sign}{mantissa}e{exp_sign}{:02}", exp.abs());
        }
        return text.to_string();
    }

    // serde_json keeps 0.0000ddd in positional form, Python switches to an exponent there.
    if let Some(digits) = body.strip_prefix("0.0000") {
        let (head, tail) = digits.split_at(1.min(digits.len()));
        if !head.is_empty() && head != "0" {
            let point = if tail.is_empty() { "" } else { "." };
            return format!("{sign}{head}{point}{tail}e-05");
        }
    }

    text.to_string()
}
