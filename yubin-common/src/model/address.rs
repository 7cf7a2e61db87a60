//! Address and AddressGroup
//!
//! Empty strings stand for absent fragments and are omitted from the
//! persisted JSON.

use super::Prefecture;
use serde::{Deserialize, Serialize};

/// Length of the shard prefix taken from the front of a zip code
pub const PREFIX_LEN: usize = 3;

/// One physical address unit
///
/// Identity for deduplication is (city, town, street, office_name); kana
/// fields never take part in it. Use [`Address::same_place`] rather than
/// `==` when deduplicating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub town: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub street: String,
    /// Literal address field of office rows
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city_kana: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub town_kana: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub street_kana: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address_kana: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub office_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub office_kana: String,
}

impl Address {
    /// Identity comparison ignoring every kana field
    pub fn same_place(&self, other: &Address) -> bool {
        self.city == other.city
            && self.town == other.town
            && self.street == other.street
            && self.office_name == other.office_name
    }

    /// Address column used by the compact encoding: office address, else street
    pub fn display_address(&self) -> &str {
        if self.address.is_empty() {
            &self.street
        } else {
            &self.address
        }
    }

    pub fn display_address_kana(&self) -> &str {
        if self.address_kana.is_empty() {
            &self.street_kana
        } else {
            &self.address_kana
        }
    }
}

/// All addresses sharing one postal code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressGroup {
    pub zip_code: String,
    pub prefecture: Prefecture,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefecture_kana: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
}

impl AddressGroup {
    pub fn new(zip_code: impl Into<String>, prefecture: Prefecture, addresses: Vec<Address>) -> Self {
        Self {
            zip_code: zip_code.into(),
            prefecture,
            prefecture_kana: prefecture.kana().to_string(),
            addresses,
        }
    }

    /// Shard prefix (first three characters of the zip code)
    pub fn prefix(&self) -> &str {
        shard_prefix(&self.zip_code)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.addresses.iter().any(|a| a.same_place(address))
    }
}

/// First three characters of a zip code (the whole string when shorter)
pub fn shard_prefix(zip_code: &str) -> &str {
    match zip_code.char_indices().nth(PREFIX_LEN) {
        Some((end, _)) => &zip_code[..end],
        None => zip_code,
    }
}
