//! Directory serialization
//!
//! Two shapes per shard:
//! - **Map mode**: `{ zip_code: AddressGroup }`, the persisted canonical form
//! - **Array mode**: `{ zip_code: [pref_id, city[], town[], …] }` wrapped as
//!   `callback(…);` (default `$yubin`) so the file can be loaded as a script
//!
//! Lookup helpers read either shape back for a single zip code.

use crate::model::{Address, AddressGroup, Directory};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default callback wrapped around array-mode output
pub const CALLBACK: &str = "$yubin";

const SCRIPT_SUFFIX: &str = ");";

/// Render a shard in map mode
///
/// `indent` pretty-prints with that many spaces; `None` is compact.
pub fn to_map_json(dir: &Directory, indent: Option<usize>) -> Result<Vec<u8>> {
    let groups = dir.groups();
    match indent {
        None => Ok(serde_json::to_vec(groups)?),
        Some(width) => {
            let indent = vec![b' '; width];
            let mut out = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
            let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
            groups.serialize(&mut ser)?;
            Ok(out)
        }
    }
}

/// Decode map-mode bytes
pub fn from_map_json(bytes: &[u8]) -> serde_json::Result<BTreeMap<String, AddressGroup>> {
    serde_json::from_slice(bytes)
}

type CompactTuple = (
    u8,
    Vec<String>,
    Vec<String>,
    Vec<String>,
    Vec<String>,
    Vec<String>,
    Vec<String>,
    Vec<String>,
    Vec<String>,
);

/// Array-mode record for one zip code
///
/// Encoded as a 9-element JSON array in field order. The six address columns
/// collapse to a single element when every address shares the value; office
/// columns are always positional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CompactTuple", into = "CompactTuple")]
pub struct CompactRecord {
    pub prefecture_id: u8,
    pub city: Vec<String>,
    pub town: Vec<String>,
    pub address: Vec<String>,
    pub city_kana: Vec<String>,
    pub town_kana: Vec<String>,
    pub address_kana: Vec<String>,
    pub office_name: Vec<String>,
    pub office_kana: Vec<String>,
}

impl CompactRecord {
    pub fn from_group(group: &AddressGroup) -> Self {
        let column = |f: fn(&Address) -> &str| -> Vec<String> {
            group.addresses.iter().map(|a| f(a).to_string()).collect()
        };
        Self {
            prefecture_id: group.prefecture.id(),
            city: collapse(column(|a| a.city.as_str())),
            town: collapse(column(|a| a.town.as_str())),
            address: collapse(column(|a| a.display_address())),
            city_kana: collapse(column(|a| a.city_kana.as_str())),
            town_kana: collapse(column(|a| a.town_kana.as_str())),
            address_kana: collapse(column(|a| a.display_address_kana())),
            office_name: column(|a| a.office_name.as_str()),
            office_kana: column(|a| a.office_kana.as_str()),
        }
    }
}

impl From<CompactTuple> for CompactRecord {
    fn from(t: CompactTuple) -> Self {
        Self {
            prefecture_id: t.0,
            city: t.1,
            town: t.2,
            address: t.3,
            city_kana: t.4,
            town_kana: t.5,
            address_kana: t.6,
            office_name: t.7,
            office_kana: t.8,
        }
    }
}

impl From<CompactRecord> for CompactTuple {
    fn from(r: CompactRecord) -> Self {
        (
            r.prefecture_id,
            r.city,
            r.town,
            r.address,
            r.city_kana,
            r.town_kana,
            r.address_kana,
            r.office_name,
            r.office_kana,
        )
    }
}

/// Single element when all values agree, otherwise unchanged
fn collapse(values: Vec<String>) -> Vec<String> {
    match values.first() {
        Some(first) if values.iter().all(|v| v == first) => vec![first.clone()],
        _ => values,
    }
}

/// Array-mode records for every key in the shard's key list
pub fn to_array_form(dir: &Directory) -> BTreeMap<String, CompactRecord> {
    dir.iter()
        .map(|group| (group.zip_code.clone(), CompactRecord::from_group(group)))
        .collect()
}

/// Render a shard in array mode as `callback({...});`
pub fn to_array_script(dir: &Directory, callback: &str) -> Result<String> {
    if callback.is_empty() {
        return Err(Error::InvalidInput("callback name is empty".to_string()));
    }
    let body = serde_json::to_string(&to_array_form(dir))?;
    Ok(format!("{callback}({body}{SCRIPT_SUFFIX}"))
}

/// Strip the `callback(` … `);` wrapper; other text is returned as is
pub fn strip_callback<'a>(body: &'a str, callback: &str) -> &'a str {
    body.trim_end()
        .strip_prefix(callback)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(SCRIPT_SUFFIX))
        .unwrap_or(body)
}

/// Wrap a JSON value as `callback(value)` for script consumers
pub fn wrap_callback<T: Serialize>(callback: &str, value: &T) -> Result<String> {
    if callback.is_empty() {
        return Err(Error::InvalidInput("callback name is empty".to_string()));
    }
    let body = serde_json::to_string(value)?;
    Ok(format!("{callback}({body})"))
}

/// Find one zip code in map-mode bytes
pub fn lookup_map(bytes: &[u8], zip_code: &str) -> Result<Option<AddressGroup>> {
    let mut groups = from_map_json(bytes)?;
    Ok(groups.remove(zip_code))
}

/// Find one zip code in array-mode text, re-wrapped under its key
pub fn lookup_array(
    body: &str,
    zip_code: &str,
    callback: &str,
) -> Result<Option<BTreeMap<String, CompactRecord>>> {
    let mut records: BTreeMap<String, CompactRecord> =
        serde_json::from_str(strip_callback(body, callback))?;
    Ok(records
        .remove(zip_code)
        .map(|record| BTreeMap::from([(zip_code.to_string(), record)])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Prefecture;

    fn street(city: &str, town: &str, street: &str) -> Address {
        Address {
            city: city.to_string(),
            town: town.to_string(),
            street: street.to_string(),
            city_kana: "チヨダク".to_string(),
            ..Default::default()
        }
    }

    fn shard() -> Directory {
        let tokyo = Prefecture::from_name("東京都").unwrap();
        Directory::new("100")
            .merge(AddressGroup::new(
                "1000005",
                tokyo,
                vec![
                    street("千代田区", "丸の内", "１丁目"),
                    street("千代田区", "大手町", ""),
                    street("千代田区", "有楽町", ""),
                ],
            ))
            .merge(AddressGroup::new(
                "1008994",
                tokyo,
                vec![Address {
                    city: "千代田区".to_string(),
                    town: "丸の内".to_string(),
                    address: "２丁目７−２".to_string(),
                    office_name: "東京中央郵便局".to_string(),
                    office_kana: "トウキヨウチユウオウユウビンキヨク".to_string(),
                    ..Default::default()
                }],
            ))
    }

    #[test]
    fn test_array_mode_collapses_shared_columns() {
        let forms = to_array_form(&shard());
        let record = &forms["1000005"];

        assert_eq!(record.prefecture_id, 13);
        assert_eq!(record.city, vec!["千代田区"]);
        assert_eq!(record.town, vec!["丸の内", "大手町", "有楽町"]);
        assert_eq!(record.address, vec!["１丁目", "", ""]);
        assert_eq!(record.city_kana, vec!["チヨダク"]);
        assert_eq!(record.town_kana, vec![""]);
        assert_eq!(record.office_name, vec!["", "", ""]);
    }

    #[test]
    fn test_array_mode_office_address_column() {
        let forms = to_array_form(&shard());
        let record = &forms["1008994"];

        assert_eq!(record.address, vec!["２丁目７−２"]);
        assert_eq!(record.office_name, vec!["東京中央郵便局"]);
        assert_eq!(record.office_kana, vec!["トウキヨウチユウオウユウビンキヨク"]);
    }

    #[test]
    fn test_compact_record_encodes_as_array() {
        let forms = to_array_form(&shard());
        let json = serde_json::to_value(&forms["1008994"]).unwrap();

        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 9);
        assert_eq!(items[0], serde_json::json!(13));
    }

    fn single_group_shard() -> Directory {
        Directory::new("100").merge(AddressGroup::new(
            "1000005",
            Prefecture::from_name("東京都").unwrap(),
            vec![street("千代田区", "丸の内", "")],
        ))
    }

    #[test]
    fn test_array_script_wrapping() {
        let script = to_array_script(&single_group_shard(), CALLBACK).unwrap();
        assert_eq!(
            script,
            concat!(
                "$yubin({\"1000005\":[13,[\"千代田区\"],[\"丸の内\"],[\"\"],",
                "[\"チヨダク\"],[\"\"],[\"\"],[\"\"],[\"\"]]});"
            )
        );
    }

    #[test]
    fn test_array_script_custom_callback() {
        let script = to_array_script(&single_group_shard(), "cb").unwrap();
        assert!(script.starts_with("cb({\"1000005\":"));
        assert!(script.ends_with("]]});"));
        assert!(to_array_script(&single_group_shard(), "").is_err());

        let found = lookup_array(&script, "1000005", "cb").unwrap().unwrap();
        assert_eq!(found["1000005"].town, vec!["丸の内"]);
    }

    #[test]
    fn test_strip_callback() {
        assert_eq!(strip_callback("$yubin({\"a\":1});\n", CALLBACK), "{\"a\":1}");
        assert_eq!(strip_callback("{\"a\":1}", CALLBACK), "{\"a\":1}");
        assert_eq!(strip_callback("cb({\"a\":1});", "cb"), "{\"a\":1}");
    }

    #[test]
    fn test_lookup_array_rewraps_under_key() {
        let script = to_array_script(&shard(), CALLBACK).unwrap();

        let found = lookup_array(&script, "1008994", CALLBACK).unwrap().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found["1008994"].office_name, vec!["東京中央郵便局"]);

        assert!(lookup_array(&script, "1009999", CALLBACK).unwrap().is_none());
    }

    #[test]
    fn test_lookup_map() {
        let bytes = to_map_json(&shard(), None).unwrap();

        let group = lookup_map(&bytes, "1000005").unwrap().unwrap();
        assert_eq!(group.addresses.len(), 3);
        assert!(lookup_map(&bytes, "1009999").unwrap().is_none());
    }

    #[test]
    fn test_lookup_map_rejects_garbage() {
        let err = lookup_map(b"not json", "1000005").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_map_mode_indent() {
        let compact = to_map_json(&shard(), None).unwrap();
        let pretty = to_map_json(&shard(), Some(2)).unwrap();

        assert!(!compact.contains(&b'\n'));
        let text = String::from_utf8(pretty).unwrap();
        assert!(text.contains("\n  \"1000005\": {"));
    }

    #[test]
    fn test_wrap_callback() {
        let wrapped = wrap_callback("cb", &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(wrapped, "cb({\"a\":1})");
        assert!(wrap_callback("", &1).is_err());
    }
}
