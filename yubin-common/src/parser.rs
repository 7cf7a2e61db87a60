//! Record parser for the postal-code registry
//!
//! Turns one registry row into an [`AddressGroup`]. Rows come in two shapes:
//!
//! - **Standard** (15 fields): street-level records whose town field may
//!   carry a bracketed expression such as `大通西（１〜１９丁目）`, expanded here
//!   into one address per block
//! - **Office** (13 fields): business records; one address per row, no
//!   expansion
//!
//! The shape is decided once, when fields are decoded into [`RawRow`].

use crate::diagnostics::Diagnostics;
use crate::kana::SupplementaryTable;
use crate::model::{Address, AddressGroup, Prefecture};
use crate::width::{fold, widen};
use crate::{Error, Result};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

/// Town value meaning "no more specific entry below this city"
pub const NOT_LISTED: &str = "以下に掲載がない場合";

const OFFICE_FIELDS: usize = 13;
const STANDARD_FIELDS: usize = 15;
const ZIP_LEN: usize = 7;

const OPEN: char = '（';
const CLOSE: char = '）';
const ENUM_SEP: char = '、';
const RANGE_SEP: char = '〜';
/// Brackets that mark an annotated expression; such text is never expanded
const NESTED: [char; 3] = ['「', '＜', '（'];

/// Script a suffix token is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Kanji,
    Kana,
}

/// A recognized numbering suffix and the kana appended to generated readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suffix {
    pub token: &'static str,
    /// Reading appended to kana fragments; empty for kana-script tokens
    pub kana: &'static str,
    pub script: Script,
}

/// Closed suffix table shared by enumeration and range classification
pub const SUFFIXES: [Suffix; 4] = [
    Suffix { token: "丁目", kana: "チョウメ", script: Script::Kanji },
    Suffix { token: "チョウメ", kana: "", script: Script::Kana },
    Suffix { token: "番地", kana: "バンチ", script: Script::Kanji },
    Suffix { token: "バンチ", kana: "", script: Script::Kana },
];

fn recognized_suffix(exp: &str) -> Option<&'static Suffix> {
    SUFFIXES.iter().find(|s| exp.ends_with(s.token))
}

/// Street-level registry row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardRow {
    pub zip_code: String,
    pub prefecture: Prefecture,
    pub city: String,
    pub city_kana: String,
    pub town: String,
    pub town_kana: String,
}

/// Business/office registry row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficeRow {
    pub zip_code: String,
    pub prefecture: Prefecture,
    pub city: String,
    pub town: String,
    pub address: String,
    pub office_name: String,
    /// Reading as supplied (usually half-width katakana)
    pub office_kana: String,
}

/// One registry row, decoded once at the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRow {
    Standard(StandardRow),
    Office(OfficeRow),
}

impl RawRow {
    /// Decode a tokenized row; the field count selects the schema
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self> {
        let field = |i: usize| fields[i].as_ref().to_string();
        match fields.len() {
            OFFICE_FIELDS => Ok(RawRow::Office(OfficeRow {
                zip_code: zip_code(fields[7].as_ref())?,
                prefecture: Prefecture::from_name(fields[3].as_ref())?,
                city: field(4),
                town: field(5),
                address: field(6),
                office_name: field(2),
                office_kana: field(1),
            })),
            STANDARD_FIELDS => Ok(RawRow::Standard(StandardRow {
                zip_code: zip_code(fields[2].as_ref())?,
                prefecture: Prefecture::from_name(fields[6].as_ref())?,
                city: field(7),
                city_kana: field(4),
                town: field(8),
                town_kana: field(5),
            })),
            n => Err(Error::InvalidRow(n)),
        }
    }
}

fn zip_code(value: &str) -> Result<String> {
    if value.len() == ZIP_LEN && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(value.to_string())
    } else {
        Err(Error::InvalidZipCode(value.to_string()))
    }
}

/// Kanji fragments with their positional kana readings
///
/// `kana` may be shorter than `kanji` (or empty) when no reading could be
/// generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragments {
    pub kanji: Vec<String>,
    pub kana: Vec<String>,
}

impl Fragments {
    fn literal(exp: &str) -> Self {
        Self {
            kanji: vec![exp.to_string()],
            kana: Vec::new(),
        }
    }

    fn extend(&mut self, other: Fragments) {
        self.kanji.extend(other.kanji);
        self.kana.extend(other.kana);
    }
}

/// Expand a numeric range such as `1〜3丁目`
///
/// **Algorithm:**
/// 1. Fold both ends to half-width digits and strip `suffix`
/// 2. Start number: the whole head if numeric, otherwise its trailing digit
///    run; anything before the digits is a literal prefix repeated on every
///    item
/// 3. Numeric tail: emit start..=end (ascending, empty when start > end)
/// 4. Non-numeric tail: emit exactly two items, the start and the literal tail
///
/// Numbers are rendered with full-width digits. Fails with
/// [`Error::MalformedRange`] when the head has no trailing numeral.
pub fn expand_range(head: &str, tail: &str, suffix: &str, kana_suffix: &str) -> Result<Fragments> {
    let malformed = || Error::MalformedRange {
        head: head.to_string(),
        tail: tail.to_string(),
    };

    let folded_head = fold(head);
    let folded_head = folded_head.strip_suffix(suffix).unwrap_or(&folded_head);
    let (prefix, start) = match parse_number(folded_head) {
        Some(n) => (String::new(), n),
        None => {
            let digits_at = folded_head
                .char_indices()
                .rev()
                .take_while(|(_, c)| c.is_ascii_digit())
                .last()
                .map(|(i, _)| i)
                .ok_or_else(malformed)?;
            let start = parse_number(&folded_head[digits_at..]).ok_or_else(malformed)?;
            (widen(&folded_head[..digits_at]), start)
        }
    };

    let folded_tail = fold(tail);
    let folded_tail = folded_tail.strip_suffix(suffix).unwrap_or(&folded_tail);
    let mut fragments = Fragments::default();
    match parse_number(folded_tail) {
        Some(end) => {
            for n in start..=end {
                let number = widen(&n.to_string());
                fragments.kanji.push(format!("{prefix}{number}{suffix}"));
                fragments.kana.push(format!("{prefix}{number}{kana_suffix}"));
            }
        }
        None => {
            let number = widen(&start.to_string());
            let literal = widen(folded_tail);
            fragments.kanji.push(format!("{prefix}{number}{suffix}"));
            fragments.kanji.push(format!("{literal}{suffix}"));
            fragments.kana.push(format!("{prefix}{number}{kana_suffix}"));
            fragments.kana.push(format!("{literal}{kana_suffix}"));
        }
    }
    Ok(fragments)
}

fn parse_number(s: &str) -> Option<u32> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

/// Split an enumeration whose items share `suffix`
///
/// Items may themselves be ranges. Plain items get the suffix appended when
/// missing; kana items are produced only for kanji suffixes.
fn expand_enumeration(exp: &str, suffix: &Suffix) -> Result<Fragments> {
    let mut fragments = Fragments::default();
    for item in exp.split(ENUM_SEP) {
        if item.contains(RANGE_SEP) {
            let mut ends = item.split(RANGE_SEP);
            let head = ends.next().unwrap_or_default();
            let tail = ends.next().unwrap_or_default();
            fragments.extend(expand_range(head, tail, suffix.token, suffix.kana)?);
            continue;
        }

        if item.ends_with(suffix.token) {
            fragments.kanji.push(item.to_string());
        } else {
            fragments.kanji.push(format!("{item}{}", suffix.token));
        }
        if !suffix.kana.is_empty() {
            let bare = item.strip_suffix(suffix.token).unwrap_or(item);
            if bare.ends_with(suffix.kana) {
                fragments.kana.push(bare.to_string());
            } else {
                fragments.kana.push(format!("{bare}{}", suffix.kana));
            }
        }
    }
    Ok(fragments)
}

/// Classify a bracketed expression and expand it into fragments
///
/// - enumeration (`、`) ending in a recognized suffix: split, items may be ranges
/// - enumeration without a recognized suffix: split, no readings
/// - range (`〜`) ending in a kanji suffix: numeric expansion
/// - anything else, or text with nested brackets: one literal fragment
pub fn expand_expression(exp: &str) -> Result<Fragments> {
    if exp.contains(NESTED) {
        return Ok(Fragments::literal(exp));
    }

    if exp.contains(ENUM_SEP) {
        return match recognized_suffix(exp) {
            Some(suffix) => expand_enumeration(exp, suffix),
            None => Ok(Fragments {
                kanji: exp.split(ENUM_SEP).map(str::to_string).collect(),
                kana: Vec::new(),
            }),
        };
    }

    if exp.contains(RANGE_SEP) {
        if let Some(suffix) = recognized_suffix(exp).filter(|s| s.script == Script::Kanji) {
            let ends: Vec<&str> = exp.split(RANGE_SEP).collect();
            if let [head, tail] = ends.as_slice() {
                return expand_range(head, tail, suffix.token, suffix.kana);
            }
        }
    }

    Ok(Fragments::literal(exp))
}

/// `name（expression）` → (name, expression)
///
/// The bracket must not open the string, and the expression runs to the last
/// closing bracket.
fn split_bracketed(text: &str) -> Option<(&str, &str)> {
    let open = text.find(OPEN).filter(|&i| i > 0)?;
    let body = open + OPEN.len_utf8();
    let close = text.rfind(CLOSE).filter(|&i| i >= body)?;
    Some((&text[..open], &text[body..close]))
}

/// Turns registry rows into address groups
#[derive(Debug, Clone, Default)]
pub struct RecordParser {
    table: SupplementaryTable,
}

impl RecordParser {
    pub fn new(table: SupplementaryTable) -> Self {
        Self { table }
    }

    /// Decode and parse one tokenized row
    ///
    /// Rejected rows are counted in `diag` before the error is returned.
    pub fn parse_fields<S: AsRef<str>>(
        &self,
        fields: &[S],
        diag: &mut Diagnostics,
    ) -> Result<AddressGroup> {
        diag.rows_read += 1;
        match RawRow::from_fields(fields) {
            Ok(row) => Ok(self.parse(row, diag)),
            Err(e) => {
                diag.rows_rejected += 1;
                Err(e)
            }
        }
    }

    /// Parse one decoded row
    pub fn parse(&self, row: RawRow, diag: &mut Diagnostics) -> AddressGroup {
        match row {
            RawRow::Standard(row) => self.parse_standard(row, diag),
            RawRow::Office(row) => parse_office(row),
        }
    }

    fn parse_standard(&self, row: StandardRow, diag: &mut Diagnostics) -> AddressGroup {
        let StandardRow {
            zip_code,
            prefecture,
            city,
            city_kana,
            mut town,
            mut town_kana,
        } = row;

        let mut street: Vec<String> = Vec::new();
        let mut street_kana: Vec<String> = Vec::new();

        if town == NOT_LISTED {
            town.clear();
            town_kana.clear();
        } else if town.find(OPEN).is_some_and(|i| i > 0) {
            // An unclosed town bracket stays literal, the kana bracket is still cut
            if let Some((name, exp)) = split_bracketed(&town) {
                let fragments = match expand_expression(exp) {
                    Ok(fragments) => fragments,
                    Err(e) => {
                        warn!(zip_code = %zip_code, expression = exp, error = %e, "Range not expanded, kept as literal");
                        diag.malformed_ranges += 1;
                        Fragments::literal(exp)
                    }
                };
                street = fragments.kanji;
                street_kana = fragments.kana;
                town = name.to_string();
            }

            if let Some((kana_name, kana_exp)) = split_bracketed(&town_kana) {
                if !street.is_empty() && street_kana.is_empty() {
                    if let Ok(fragments) = expand_expression(kana_exp) {
                        street_kana = fragments.kanji;
                    }
                }
                town_kana = kana_name.to_string();
            }
        }

        if !street.is_empty() && street.len() != street_kana.len() {
            street_kana = self.infer_street_kana(&zip_code, &street, diag);
        }

        let addresses = if street.is_empty() {
            vec![Address {
                city,
                town,
                city_kana,
                town_kana,
                ..Default::default()
            }]
        } else {
            street
                .into_iter()
                .zip(street_kana.into_iter().chain(std::iter::repeat(String::new())))
                .map(|(street, street_kana)| Address {
                    city: city.clone(),
                    town: town.clone(),
                    street,
                    city_kana: city_kana.clone(),
                    town_kana: town_kana.clone(),
                    street_kana,
                    ..Default::default()
                })
                .collect()
        };

        AddressGroup::new(zip_code, prefecture, addresses)
    }

    /// Readings for fragments whose kana could not be paired positionally
    fn infer_street_kana(&self, zip_code: &str, street: &[String], diag: &mut Diagnostics) -> Vec<String> {
        street
            .iter()
            .map(|fragment| match self.table.lookup(fragment) {
                Some(kana) => {
                    debug!(zip_code, fragment = %fragment, kana = %kana, "Kana resolved from supplementary table");
                    kana
                }
                None => {
                    warn!(zip_code, fragment = %fragment, "Kana unresolved");
                    diag.unresolved_kana += 1;
                    String::new()
                }
            })
            .collect()
    }
}

fn parse_office(row: OfficeRow) -> AddressGroup {
    let address = Address {
        city: row.city,
        town: row.town,
        address: row.address,
        office_name: row.office_name,
        office_kana: row.office_kana.nfkc().collect(),
        ..Default::default()
    };
    AddressGroup::new(row.zip_code, row.prefecture, vec![address])
}
