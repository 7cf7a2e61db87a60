//! Closed set of the 47 prefectures
//!
//! Persisted (map mode) as the kanji name; array mode uses the numeric
//! local-government code (1 = 北海道 … 47 = 沖縄県).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// (kanji, kana) ordered by local-government prefecture code
const PREFECTURES: [(&str, &str); 47] = [
    ("北海道", "ホッカイドウ"),
    ("青森県", "アオモリケン"),
    ("岩手県", "イワテケン"),
    ("宮城県", "ミヤギケン"),
    ("秋田県", "アキタケン"),
    ("山形県", "ヤマガタケン"),
    ("福島県", "フクシマケン"),
    ("茨城県", "イバラキケン"),
    ("栃木県", "トチギケン"),
    ("群馬県", "グンマケン"),
    ("埼玉県", "サイタマケン"),
    ("千葉県", "チバケン"),
    ("東京都", "トウキョウト"),
    ("神奈川県", "カナガワケン"),
    ("新潟県", "ニイガタケン"),
    ("富山県", "トヤマケン"),
    ("石川県", "イシカワケン"),
    ("福井県", "フクイケン"),
    ("山梨県", "ヤマナシケン"),
    ("長野県", "ナガノケン"),
    ("岐阜県", "ギフケン"),
    ("静岡県", "シズオカケン"),
    ("愛知県", "アイチケン"),
    ("三重県", "ミエケン"),
    ("滋賀県", "シガケン"),
    ("京都府", "キョウトフ"),
    ("大阪府", "オオサカフ"),
    ("兵庫県", "ヒョウゴケン"),
    ("奈良県", "ナラケン"),
    ("和歌山県", "ワカヤマケン"),
    ("鳥取県", "トットリケン"),
    ("島根県", "シマネケン"),
    ("岡山県", "オカヤマケン"),
    ("広島県", "ヒロシマケン"),
    ("山口県", "ヤマグチケン"),
    ("徳島県", "トクシマケン"),
    ("香川県", "カガワケン"),
    ("愛媛県", "エヒメケン"),
    ("高知県", "コウチケン"),
    ("福岡県", "フクオカケン"),
    ("佐賀県", "サガケン"),
    ("長崎県", "ナガサキケン"),
    ("熊本県", "クマモトケン"),
    ("大分県", "オオイタケン"),
    ("宮崎県", "ミヤザキケン"),
    ("鹿児島県", "カゴシマケン"),
    ("沖縄県", "オキナワケン"),
];

/// One of the 47 prefectures
///
/// Only constructible from a known name or code, so every value is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Prefecture(u8);

impl Prefecture {
    /// Look up a prefecture by its kanji name
    pub fn from_name(name: &str) -> Result<Self> {
        PREFECTURES
            .iter()
            .position(|(kanji, _)| *kanji == name)
            .map(|index| Self(index as u8 + 1))
            .ok_or_else(|| Error::UnknownPrefecture(name.to_string()))
    }

    /// Numeric code used by the compact array encoding
    pub fn id(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        PREFECTURES[self.index()].0
    }

    pub fn kana(self) -> &'static str {
        PREFECTURES[self.index()].1
    }

    fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for Prefecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for Prefecture {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_name(&value)
    }
}

impl From<Prefecture> for String {
    fn from(value: Prefecture) -> Self {
        value.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_local_government_codes() {
        assert_eq!(Prefecture::from_name("北海道").unwrap().id(), 1);
        assert_eq!(Prefecture::from_name("東京都").unwrap().id(), 13);
        assert_eq!(Prefecture::from_name("京都府").unwrap().id(), 26);
        assert_eq!(Prefecture::from_name("沖縄県").unwrap().id(), 47);
    }

    #[test]
    fn test_kana_and_name() {
        let tokyo = Prefecture::from_name("東京都").unwrap();
        assert_eq!(tokyo.name(), "東京都");
        assert_eq!(tokyo.kana(), "トウキョウト");
        assert_eq!(tokyo.to_string(), "東京都");
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = Prefecture::from_name("東京").unwrap_err();
        assert!(matches!(err, Error::UnknownPrefecture(ref name) if name == "東京"));
    }

    #[test]
    fn test_serde_uses_kanji_name() {
        let pref = Prefecture::from_name("大阪府").unwrap();
        let json = serde_json::to_string(&pref).unwrap();
        assert_eq!(json, "\"大阪府\"");

        let back: Prefecture = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pref);

        assert!(serde_json::from_str::<Prefecture>("\"大阪\"").is_err());
    }
}
