//! Kana inference
//!
//! Two sources of readings for fragments the parser could not read:
//! - [`SupplementaryTable`]: closed table of irregular names (Kyoto street
//!   intersections and the like), consulted once per fragment
//! - [`KanaDictionary`]: readings already known inside the same shard,
//!   rebuilt after every shard mutation and used to replenish empty fields

use crate::model::{Address, AddressGroup};
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Built-in irregular readings
///
/// Kyoto addresses name a block by the crossing of two streets plus a
/// direction (上る / 下る / 東入 / 西入), which the registry leaves without a
/// per-fragment reading.
const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    // directions
    ("通", "ドオリ"),
    ("上る", "アガル"),
    ("上ル", "アガル"),
    ("下る", "サガル"),
    ("下ル", "サガル"),
    ("東入", "ヒガシイル"),
    ("東入る", "ヒガシイル"),
    ("東入ル", "ヒガシイル"),
    ("西入", "ニシイル"),
    ("西入る", "ニシイル"),
    ("西入ル", "ニシイル"),
    // east-west streets
    ("鞍馬口", "クラマグチ"),
    ("寺之内", "テラノウチ"),
    ("上御霊前", "カミゴリョウマエ"),
    ("今出川", "イマデガワ"),
    ("元誓願寺", "モトセイガンジ"),
    ("一条", "イチジョウ"),
    ("中立売", "ナカダチウリ"),
    ("上長者町", "カミチョウジャマチ"),
    ("下長者町", "シモチョウジャマチ"),
    ("出水", "デミズ"),
    ("下立売", "シモダチウリ"),
    ("椹木町", "サワラギチョウ"),
    ("丸太町", "マルタマチ"),
    ("竹屋町", "タケヤマチ"),
    ("夷川", "エビスガワ"),
    ("二条", "ニジョウ"),
    ("押小路", "オシコウジ"),
    ("御池", "オイケ"),
    ("姉小路", "アネヤコウジ"),
    ("三条", "サンジョウ"),
    ("六角", "ロッカク"),
    ("蛸薬師", "タコヤクシ"),
    ("錦小路", "ニシキコウジ"),
    ("四条", "シジョウ"),
    ("綾小路", "アヤノコウジ"),
    ("仏光寺", "ブッコウジ"),
    ("高辻", "タカツジ"),
    ("松原", "マツバラ"),
    ("万寿寺", "マンジュジ"),
    ("五条", "ゴジョウ"),
    ("六条", "ロクジョウ"),
    ("正面", "ショウメン"),
    ("七条", "シチジョウ"),
    ("北大路", "キタオオジ"),
    // north-south streets
    ("寺町", "テラマチ"),
    ("御幸町", "ゴコマチ"),
    ("麩屋町", "フヤチョウ"),
    ("富小路", "トミノコウジ"),
    ("柳馬場", "ヤナギノバンバ"),
    ("堺町", "サカイマチ"),
    ("高倉", "タカクラ"),
    ("間之町", "アイノマチ"),
    ("東洞院", "ヒガシノトウイン"),
    ("車屋町", "クルマヤチョウ"),
    ("烏丸", "カラスマ"),
    ("両替町", "リョウガエマチ"),
    ("室町", "ムロマチ"),
    ("衣棚", "コロモノタナ"),
    ("新町", "シンマチ"),
    ("釜座", "カマンザ"),
    ("西洞院", "ニシノトウイン"),
    ("小川", "オガワ"),
    ("油小路", "アブラノコウジ"),
    ("堀川", "ホリカワ"),
    ("猪熊", "イノクマ"),
    ("黒門", "クロモン"),
    ("大宮", "オオミヤ"),
    ("坊城", "ボウジョウ"),
    ("壬生川", "ミブガワ"),
    ("千本", "センボン"),
    ("七本松", "シチホンマツ"),
    ("西大路", "ニシオオジ"),
    ("河原町", "カワラマチ"),
    ("木屋町", "キヤマチ"),
];

/// On-disk form of extra supplementary entries
#[derive(Debug, Deserialize)]
struct TableFile {
    #[serde(default)]
    entries: HashMap<String, String>,
}

/// Closed table of irregular kanji → kana readings
#[derive(Debug, Clone)]
pub struct SupplementaryTable {
    entries: HashMap<String, String>,
    /// Longest key in chars, bounds the segmentation window
    longest: usize,
}

impl Default for SupplementaryTable {
    fn default() -> Self {
        Self::from_entries(
            BUILTIN_ENTRIES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }
}

impl SupplementaryTable {
    /// Table holding exactly the given entries (no built-ins)
    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let entries: HashMap<String, String> = entries
            .into_iter()
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        let longest = entries.keys().map(|k| k.chars().count()).max().unwrap_or(0);
        Self { entries, longest }
    }

    /// Built-in table extended with `[entries]` from a TOML file
    ///
    /// File entries override built-ins with the same key.
    pub fn with_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: TableFile = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Parse kana table {} failed: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), entries = file.entries.len(), "Loaded supplementary kana table");

        let mut entries: HashMap<String, String> = BUILTIN_ENTRIES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        entries.extend(file.entries);
        Ok(Self::from_entries(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reading for `fragment`, if the table covers it
    ///
    /// **Algorithm:**
    /// 1. Exact match on the whole fragment
    /// 2. Otherwise segment left to right, always taking the longest table
    ///    key that matches at the current position
    /// 3. Found only when the segmentation covers the whole fragment
    pub fn lookup(&self, fragment: &str) -> Option<String> {
        if fragment.is_empty() {
            return None;
        }
        if let Some(kana) = self.entries.get(fragment) {
            return Some(kana.clone());
        }

        let chars: Vec<char> = fragment.chars().collect();
        let mut kana = String::new();
        let mut pos = 0;
        while pos < chars.len() {
            let window = self.longest.min(chars.len() - pos);
            let matched = (1..=window).rev().find_map(|len| {
                let token: String = chars[pos..pos + len].iter().collect();
                self.entries.get(&token).map(|reading| (len, reading))
            });
            let (len, reading) = matched?;
            kana.push_str(reading);
            pos += len;
        }
        Some(kana)
    }
}

/// Kanji fragment → kana reading, derived from the addresses of one shard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KanaDictionary {
    readings: HashMap<String, String>,
}

impl KanaDictionary {
    /// Record every non-empty reading of city, town, street and office name
    ///
    /// Later addresses overwrite earlier ones for the same fragment.
    pub fn build<'a>(addresses: impl IntoIterator<Item = &'a Address>) -> Self {
        let mut readings = HashMap::new();
        for a in addresses {
            for (kanji, kana) in [
                (&a.office_name, &a.office_kana),
                (&a.city, &a.city_kana),
                (&a.town, &a.town_kana),
                (&a.street, &a.street_kana),
            ] {
                if !kanji.is_empty() && !kana.is_empty() {
                    readings.insert(kanji.clone(), kana.clone());
                }
            }
        }
        Self { readings }
    }

    /// Dictionary over every address of the given groups, in iteration order
    pub fn from_groups<'a>(groups: impl IntoIterator<Item = &'a AddressGroup>) -> Self {
        Self::build(groups.into_iter().flat_map(|g| g.addresses.iter()))
    }

    pub fn get(&self, fragment: &str) -> Option<&str> {
        self.readings.get(fragment).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Fill each empty kana field whose kanji fragment is known
    pub fn replenish(&self, mut address: Address) -> Address {
        if self.readings.is_empty() {
            return address;
        }
        fill(&mut address.city_kana, &address.city, self);
        fill(&mut address.town_kana, &address.town, self);
        fill(&mut address.street_kana, &address.street, self);
        fill(&mut address.office_kana, &address.office_name, self);
        address
    }

    /// Replenish every address of a group
    pub fn replenish_group(&self, mut group: AddressGroup) -> AddressGroup {
        group.addresses = group
            .addresses
            .into_iter()
            .map(|a| self.replenish(a))
            .collect();
        group
    }
}

fn fill(kana: &mut String, kanji: &str, dict: &KanaDictionary) {
    if kana.is_empty() && !kanji.is_empty() {
        if let Some(reading) = dict.get(kanji) {
            *kana = reading.to_string();
        }
    }
}
