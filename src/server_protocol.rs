use serde_json::Value;

use crate::types::Direction;

#[derive(Debug)]
pub enum ParsedClientMessage {
    Start { seed: Option<u32> },
    Input { dir: Direction },
    Ping { t: f64 },
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "start" => {
            let seed = match object.get("seed") {
                None | Some(Value::Null) => None,
                Some(value) => Some(parse_seed(value)?),
            };
            Some(ParsedClientMessage::Start { seed })
        }
        "input" => {
            let dir = Direction::parse_move(object.get("dir")?.as_str()?)?;
            Some(ParsedClientMessage::Input { dir })
        }
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

/// Accepts any non-negative integer, folding values above `u32::MAX` into range.
fn parse_seed(value: &Value) -> Option<u32> {
    if let Some(number) = value.as_u64() {
        return Some((number % (u64::from(u32::MAX) + 1)) as u32);
    }
    let number = value.as_f64()?;
    if !number.is_finite() || number < 0.0 || number.fract() != 0.0 {
        return None;
    }
    if number > u64::MAX as f64 {
        return None;
    }
    Some(((number as u64) % (u64::from(u32::MAX) + 1)) as u32)
}
