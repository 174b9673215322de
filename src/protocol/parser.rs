//! # Protocol Parser
//!
//! Decodes controller frames into [`Command`]s.
//!
//! A frame holds one or more `;`-separated fragments. Every fragment is decoded
//! on its own: a broken fragment becomes [`Command::Unknown`] and the rest of the
//! frame is still delivered.
//!
//! ## Stick Payload Grammar
//!
//! ```text
//! payload := field*
//! field   := ('V' | 'H') '=' number
//! number  := '-'? digit+ ('.' digit*)?
//! ```
//!
//! Fields are concatenated (`V=1.0H=-0.5`); whitespace between fields is
//! tolerated, anything else is not.

use tracing::trace;

use super::command::*;

/// Detail string carried by a malformed fragment.
type Decode<T> = std::result::Result<T, String>;

/// Parse a complete frame into commands
///
/// # Arguments
///
/// * `frame` - Raw text frame as delivered by the transport
///
/// # Returns
///
/// * `Vec<Command>` - One command per non-blank fragment, in frame order
///
/// # Examples
///
/// ```
/// use pad_bridge::protocol::{parse_frame, Command};
///
/// let commands = parse_frame("BTN:A=1;GARBAGE;TRIG:L=0");
/// assert_eq!(commands.len(), 3);
/// assert!(commands[0].is_known());
/// assert!(!commands[1].is_known());
/// assert!(commands[2].is_known());
///
/// assert_eq!(parse_frame("I am here!"), vec![Command::Greeting]);
/// assert!(parse_frame(" ; ;").is_empty());
/// ```
pub fn parse_frame(frame: &str) -> Vec<Command> {
    if frame == GREETING {
        return vec![Command::Greeting];
    }

    frame
        .split(COMMAND_SEPARATOR)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(parse_command)
        .collect()
}

/// Parse a single command fragment
///
/// Never fails: anything that cannot be decoded is returned as
/// [`Command::Unknown`] with the reason attached.
pub fn parse_command(fragment: &str) -> Command {
    let Some((tag, payload)) = fragment.split_once(CATEGORY_SEPARATOR) else {
        return Command::malformed(fragment, "missing ':' separator");
    };

    let Some(category) = Category::from_tag(tag) else {
        return Command::Unknown {
            raw: fragment.to_string(),
            reason: UnknownReason::UnknownCategory,
        };
    };

    let decoded = match category {
        Category::Face | Category::DPad | Category::Trigger => decode_button(category, payload),
        Category::Brake => decode_brake(fragment, payload),
        Category::LeftStick => decode_stick(Stick::Left, payload),
        Category::RightStick => decode_stick(Stick::Right, payload),
    };

    match decoded {
        Ok(command) => command,
        Err(detail) => {
            trace!("Malformed fragment '{}': {}", fragment, detail);
            Command::malformed(fragment, detail)
        }
    }
}

/// Splits a `key=value` payload.
fn split_key_value(payload: &str) -> Decode<(&str, &str)> {
    let (key, value) = payload
        .split_once(VALUE_SEPARATOR)
        .ok_or_else(|| "missing '=' separator".to_string())?;

    if key.is_empty() {
        return Err("empty button id".to_string());
    }

    Ok((key, value))
}

/// Decodes `<id>=<0|1>`. Only `"1"` means pressed.
fn decode_button(category: Category, payload: &str) -> Decode<Command> {
    let (button_id, value) = split_key_value(payload)?;

    Ok(Command::Button {
        category,
        button_id: button_id.to_string(),
        pressed: value == PRESSED_VALUE,
    })
}

/// Decodes `<L|R>=<float>`.
fn decode_brake(fragment: &str, payload: &str) -> Decode<Command> {
    let (id, value) = split_key_value(payload)?;

    let magnitude: f32 = value
        .parse()
        .map_err(|_| format!("brake value '{}' is not a number", value))?;

    if !magnitude.is_finite() {
        return Err(format!("brake value '{}' is not finite", value));
    }

    let Some(side) = Side::from_id(id) else {
        return Ok(Command::Unknown {
            raw: fragment.to_string(),
            reason: UnknownReason::UnknownButton {
                category: Category::Brake,
                id: id.to_string(),
            },
        });
    };

    Ok(Command::Brake { side, magnitude })
}

/// Decodes a stick payload made of optional `V=` and `H=` fields.
fn decode_stick(stick: Stick, payload: &str) -> Decode<Command> {
    let mut vertical = None;
    let mut horizontal = None;
    let mut rest = payload.trim_start();

    while let Some(axis) = rest.chars().next() {
        let slot = match axis {
            'V' => &mut vertical,
            'H' => &mut horizontal,
            other => return Err(format!("unexpected '{}' in axis list", other)),
        };

        rest = rest[1..]
            .strip_prefix(VALUE_SEPARATOR)
            .ok_or_else(|| format!("missing '=' after {}", axis))?;

        let (value, remaining) =
            take_number(rest).ok_or_else(|| format!("invalid number for {} axis", axis))?;

        if slot.is_some() {
            return Err(format!("duplicate {} axis", axis));
        }
        *slot = Some(value);
        rest = remaining.trim_start();
    }

    Ok(Command::Stick {
        stick,
        vertical,
        horizontal,
    })
}

/// Consumes `'-'? digit+ ('.' digit*)?` from the front of `input`.
///
/// Returns the value and the unconsumed remainder.
fn take_number(input: &str) -> Option<(f32, &str)> {
    let bytes = input.as_bytes();
    let mut end = usize::from(bytes.first() == Some(&b'-'));

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }

    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }

    // Digit runs longer than f32 can hold parse to infinity
    let value = input[..end]
        .trim_end_matches('.')
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())?;
    Some((value, &input[end..]))
}
