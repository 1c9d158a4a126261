use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrString {
    List(Vec<String>),
    Joined(String),
}

pub fn split_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<ListOrString>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(ListOrString::List(items)) => Ok(items
            .into_iter()
            .map(|item| item.trim().to_string())
            .collect()),
        Some(ListOrString::Joined(raw)) => Ok(split_comma_list(&raw)),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    Text(String),
}

pub fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected one of: 1, true, yes, on, 0, false, no, off".to_string()),
    }
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(false),
        Some(BoolOrString::Bool(value)) => Ok(value),
        Some(BoolOrString::Text(raw)) => {
            parse_flag(&raw).map_err(|err| D::Error::custom(format!("invalid flag `{raw}`: {err}")))
        }
    }
}
