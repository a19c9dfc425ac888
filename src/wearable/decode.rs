use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::appearance::textures::AvatarTextureIndex;
use crate::foundation::core::AssetId;
use crate::foundation::error::{BakeError, BakeResult};
use crate::wearable::model::{Wearable, WearableType};

const HEADER: &str = "LLWearable version";
const MIN_VERSION: u32 = 18;
const MAX_VERSION: u32 = 22;

/// Decode a wearable asset in the line-oriented `LLWearable` text format.
///
/// Permission and sale blocks are skipped; `type`, `parameters` and `textures` sections are
/// required to be well formed.
pub fn decode_wearable(bytes: &[u8]) -> BakeResult<Wearable> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| BakeError::decode(format!("wearable is not utf-8: {e}")))?;
    let mut raw_lines = text.lines();

    let header = raw_lines
        .next()
        .map(str::trim)
        .ok_or_else(|| BakeError::decode("empty wearable asset"))?;
    let version = header
        .strip_prefix(HEADER)
        .ok_or_else(|| BakeError::decode(format!("bad wearable header '{header}'")))?
        .trim()
        .parse::<u32>()
        .map_err(|e| BakeError::decode(format!("bad wearable version: {e}")))?;
    if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
        return Err(BakeError::decode(format!(
            "unsupported wearable version {version}"
        )));
    }

    // name and description are positional and may be empty
    let name = raw_lines.next().unwrap_or_default().trim().to_string();
    let description = raw_lines.next().unwrap_or_default().trim().to_string();
    let mut lines = raw_lines.map(str::trim).filter(|l| !l.is_empty());

    let mut wearable_type = None;
    let mut params = BTreeMap::new();
    let mut textures = BTreeMap::new();
    let mut depth = 0usize;

    while let Some(line) = lines.next() {
        if line == "{" {
            depth += 1;
            continue;
        }
        if line == "}" {
            depth = depth
                .checked_sub(1)
                .ok_or_else(|| BakeError::decode("unbalanced '}' in wearable"))?;
            continue;
        }
        if depth > 0 {
            continue;
        }

        let (key, rest) = split_key(line);
        match key {
            "permissions" | "sale_info" => {}
            "type" => {
                let raw = parse_field::<u8>("type", rest)?;
                wearable_type = Some(WearableType::from_u8(raw)?);
            }
            "parameters" => {
                let count = parse_field::<usize>("parameters", rest)?;
                for _ in 0..count {
                    let entry = lines
                        .next()
                        .ok_or_else(|| BakeError::decode("truncated parameters section"))?;
                    let (id, value) = split_key(entry);
                    params.insert(
                        parse_field::<u32>("parameter id", id)?,
                        parse_field::<f32>("parameter value", value)?,
                    );
                }
            }
            "textures" => {
                let count = parse_field::<usize>("textures", rest)?;
                for _ in 0..count {
                    let entry = lines
                        .next()
                        .ok_or_else(|| BakeError::decode("truncated textures section"))?;
                    let (slot, id) = split_key(entry);
                    let slot = AvatarTextureIndex::from_u8(parse_field::<u8>("texture slot", slot)?)
                        .map_err(|e| BakeError::decode(e.to_string()))?;
                    let id = id
                        .parse::<AssetId>()
                        .map_err(|e| BakeError::decode(e.to_string()))?;
                    textures.insert(slot, id);
                }
            }
            other => {
                return Err(BakeError::decode(format!(
                    "unexpected wearable field '{other}'"
                )));
            }
        }
    }

    if depth != 0 {
        return Err(BakeError::decode("unterminated block in wearable"));
    }
    let wearable_type =
        wearable_type.ok_or_else(|| BakeError::decode("wearable is missing its type"))?;

    Ok(Wearable {
        wearable_type,
        name,
        description,
        textures,
        params,
    })
}

/// Encode a wearable in the `LLWearable version 22` text format.
pub fn encode_wearable(wearable: &Wearable) -> Vec<u8> {
    let mut out = String::new();
    let _ = writeln!(out, "{HEADER} {MAX_VERSION}");
    let _ = writeln!(out, "{}", wearable.name);
    let _ = writeln!(out, "{}", wearable.description);
    out.push_str("\tpermissions 0\n\t{\n\t}\n");
    out.push_str("\tsale_info\t0\n\t{\n\t}\n");
    let _ = writeln!(out, "type {}", wearable.wearable_type.as_u8());
    let _ = writeln!(out, "parameters {}", wearable.params.len());
    for (id, value) in &wearable.params {
        let _ = writeln!(out, "{id} {value}");
    }
    let _ = writeln!(out, "textures {}", wearable.textures.len());
    for (slot, id) in &wearable.textures {
        let _ = writeln!(out, "{} {id}", slot.as_u8());
    }
    out.into_bytes()
}

fn split_key(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((k, rest)) => (k, rest.trim()),
        None => (line, ""),
    }
}

fn parse_field<T>(what: &str, raw: &str) -> BakeResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| BakeError::decode(format!("bad {what} '{raw}': {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/wearable/decode.rs"]
mod tests;
