use serde::Serialize;

/// Empty body for endpoints that have nothing to report beyond 200 OK.
#[derive(Clone, Debug, Serialize)]
pub struct SuccessBody {}

/// Serde adapter for `Option<DateTime<Utc>>` fields stored as nullable BSON
/// datetimes; `serde_helpers::chrono_datetime_as_bson_datetime` only covers
/// the non-optional case.
pub mod bson_datetime_option {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(bson::DateTime::from_chrono).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<bson::DateTime>::deserialize(deserializer)?;
        Ok(value.map(bson::DateTime::to_chrono))
    }
}
