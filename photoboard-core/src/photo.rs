use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// One uploaded photo: the blob name, the uploader's comment, and when it
/// was uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub filename: String,
    pub comment: String,
    #[serde(rename = "date", with = "timestamp")]
    pub uploaded_at: DateTime<Utc>,
}

impl PhotoRecord {
    /// Stamp a new record with the current time.
    ///
    /// The timestamp is truncated to milliseconds, the precision the
    /// snapshot stores, so a record compares equal after a reload.
    pub fn new(filename: impl Into<String>, comment: impl Into<String>) -> Self {
        Self::with_timestamp(filename, comment, Utc::now())
    }

    pub fn with_timestamp(
        filename: impl Into<String>,
        comment: impl Into<String>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            filename: filename.into(),
            comment: comment.into(),
            uploaded_at: uploaded_at.trunc_subsecs(3),
        }
    }
}

/// Ordered photo records, oldest first. Serializes as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoCollection {
    records: Vec<PhotoRecord>,
}

impl PhotoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_snapshot(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhotoRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    pub fn get(&self, filename: &str) -> Option<&PhotoRecord> {
        self.records.iter().find(|record| record.filename == filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.get(filename).is_some()
    }

    pub fn push(&mut self, record: PhotoRecord) {
        self.records.push(record);
    }

    /// Remove the first record with `filename`, keeping the order of the rest.
    pub fn remove(&mut self, filename: &str) -> Option<PhotoRecord> {
        let index = self
            .records
            .iter()
            .position(|record| record.filename == filename)?;
        Some(self.records.remove(index))
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.filename.as_str())
    }
}

impl From<Vec<PhotoRecord>> for PhotoCollection {
    fn from(records: Vec<PhotoRecord>) -> Self {
        Self { records }
    }
}

impl IntoIterator for PhotoCollection {
    type Item = PhotoRecord;
    type IntoIter = std::vec::IntoIter<PhotoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// RFC 3339 on the wire. Older data files carry `ja-JP` locale strings
/// (`2024/5/1 9:05:03`, Tokyo time), which are still accepted on read.
mod timestamp {
    use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    const LEGACY_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
    const LEGACY_OFFSET_SECS: i32 = 9 * 3600;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognized date: {raw:?}")))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }

        let naive = NaiveDateTime::parse_from_str(raw.trim(), LEGACY_FORMAT).ok()?;
        FixedOffset::east_opt(LEGACY_OFFSET_SECS)?
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.with_timezone(&Utc))
    }
}
