//! Field catalog — the owned list of fields for the active index.
//!
//! The catalog is rebuilt from raw schema descriptors on every refresh, with
//! each prior field's `display` flag merged back in by name so toggles
//! survive. A synthetic `_source` field is always injected first. All lookup
//! maps are computed views over the single owned `Vec<Field>`; there are no
//! independently mutable aliases.

use crate::error::FormatError;
use crate::types::SOURCE_FIELD;
use serde::Deserialize;

/// A raw field descriptor as returned by the remote schema lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type", deserialize_with = "field_type_from_mapping")]
    pub kind: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldType) -> Self {
        Self { name: name.into(), kind }
    }
}

fn field_type_from_mapping<'de, D>(deserializer: D) -> Result<FieldType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(FieldType::from_mapping(&raw))
}

/// Field type as reported by the schema lookup.
///
/// The set is open: unrecognized mapping types fall through to `Other` and
/// format as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Date,
    Boolean,
    Source,
    Other,
}

impl FieldType {
    /// Map a raw schema mapping type to a catalog field type. Numeric
    /// mapping names all collapse to `Number`.
    pub fn from_mapping(raw: &str) -> Self {
        match raw {
            "string" => FieldType::String,
            "number" | "long" | "integer" | "short" | "float" | "double" => FieldType::Number,
            "date" => FieldType::Date,
            "boolean" => FieldType::Boolean,
            "source" => FieldType::Source,
            _ => FieldType::Other,
        }
    }

    /// The converter used for values of this type.
    pub fn formatter(self) -> Formatter {
        match self {
            FieldType::String | FieldType::Other => Formatter::Text,
            FieldType::Number => Formatter::Numeric,
            FieldType::Date => Formatter::Timestamp,
            FieldType::Boolean => Formatter::Flag,
            FieldType::Source => Formatter::SourceJson,
        }
    }
}

/// Stable value-to-display-string converter for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    Text,
    Numeric,
    /// RFC 3339 strings or epoch-millisecond numbers, rendered in UTC.
    Timestamp,
    Flag,
    /// Compact JSON of the whole value; used by the `_source` field.
    SourceJson,
}

impl Formatter {
    /// Convert one row value to its display string.
    ///
    /// A conversion mismatch is a per-cell [`FormatError`]; callers substitute
    /// the raw value and continue with the rest of the row.
    pub fn convert(&self, field: &str, value: &serde_json::Value) -> Result<String, FormatError> {
        use serde_json::Value;
        let fail = || FormatError { field: field.to_string() };
        match self {
            Formatter::Text => match value {
                Value::String(s) => Ok(s.clone()),
                Value::Null => Ok(String::new()),
                Value::Bool(b) => Ok(b.to_string()),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(fail()),
            },
            Formatter::Numeric => match value {
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(fail()),
            },
            Formatter::Timestamp => match value {
                Value::String(s) => chrono::DateTime::parse_from_rfc3339(s)
                    .map(|dt| {
                        dt.with_timezone(&chrono::Utc)
                            .format("%Y-%m-%d %H:%M:%S%.3f")
                            .to_string()
                    })
                    .map_err(|_| fail()),
                Value::Number(n) => n
                    .as_i64()
                    .and_then(|ms| chrono::DateTime::from_timestamp_millis(ms))
                    .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
                    .ok_or_else(fail),
                _ => Err(fail()),
            },
            Formatter::Flag => match value {
                Value::Bool(b) => Ok(b.to_string()),
                _ => Err(fail()),
            },
            Formatter::SourceJson => serde_json::to_string(value).map_err(|_| fail()),
        }
    }
}

/// One field in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldType,
    /// Whether the field is shown as a column. Preserved across refreshes.
    pub display: bool,
    pub format: Formatter,
}

/// The full, name-sorted field list for an index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCatalog {
    fields: Vec<Field>,
}

impl FieldCatalog {
    /// Build a catalog from raw schema descriptors.
    ///
    /// Fields are sorted by name. Each field's `display` flag is taken from
    /// the prior catalog when a same-named field existed there, otherwise
    /// from membership in the current column list. The synthetic `_source`
    /// field goes first, `display = false` unless previously toggled on.
    pub fn build(
        raw: Vec<FieldDescriptor>,
        prior: Option<&FieldCatalog>,
        columns: &[String],
    ) -> Self {
        let prior_display =
            |name: &str| prior.and_then(|catalog| catalog.get(name)).map(|f| f.display);

        let mut fields = vec![Field {
            name: SOURCE_FIELD.to_string(),
            kind: FieldType::Source,
            display: prior_display(SOURCE_FIELD).unwrap_or(false),
            format: Formatter::SourceJson,
        }];

        let mut raw = raw;
        raw.sort_by(|a, b| a.name.cmp(&b.name));
        for descriptor in raw {
            if descriptor.name == SOURCE_FIELD {
                continue; // the injected synthetic entry wins
            }
            let display = prior_display(&descriptor.name)
                .unwrap_or_else(|| columns.iter().any(|c| *c == descriptor.name));
            fields.push(Field {
                format: descriptor.kind.formatter(),
                name: descriptor.name,
                kind: descriptor.kind,
                display,
            });
        }

        tracing::debug!(fields = fields.len(), "field catalog built");
        FieldCatalog { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// The converter for a field.
    ///
    /// Panics on an unknown name: a caller holding a field name the catalog
    /// does not know is working from a stale catalog reference, which is a
    /// defect to fix, not to paper over.
    pub fn formatter_for(&self, name: &str) -> &Formatter {
        &self
            .get(name)
            .unwrap_or_else(|| panic!("formatter_for: unknown field {name:?} (stale catalog?)"))
            .format
    }

    /// First date-typed field, if any. Decides auxiliary-visualization
    /// eligibility and which field the time filter binds to.
    pub fn first_date_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.kind == FieldType::Date)
    }

    /// Names of all fields currently flagged for display, in catalog order.
    pub fn displayed_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.display)
            .map(|f| f.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("timestamp", FieldType::Date),
            FieldDescriptor::new("bytes", FieldType::Number),
            FieldDescriptor::new("host", FieldType::String),
        ]
    }

    #[test]
    fn build_sorts_by_name_and_injects_source_first() {
        let catalog = FieldCatalog::build(raw(), None, &[]);
        let names: Vec<&str> = catalog.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["_source", "bytes", "host", "timestamp"]);
        assert_eq!(catalog.get("_source").unwrap().kind, FieldType::Source);
        assert!(!catalog.get("_source").unwrap().display);
    }

    #[test]
    fn display_flags_survive_a_rebuild() {
        let mut first = FieldCatalog::build(raw(), None, &[]);
        first.get_mut("host").unwrap().display = true;

        let second = FieldCatalog::build(raw(), Some(&first), &[]);
        assert!(second.get("host").unwrap().display);
        assert!(!second.get("bytes").unwrap().display);
    }

    #[test]
    fn source_display_survives_when_previously_toggled_on() {
        let mut first = FieldCatalog::build(raw(), None, &[]);
        first.get_mut("_source").unwrap().display = true;

        let second = FieldCatalog::build(raw(), Some(&first), &[]);
        assert!(second.get("_source").unwrap().display);
    }

    #[test]
    fn new_fields_default_display_from_current_columns() {
        let columns = vec!["host".to_string()];
        let catalog = FieldCatalog::build(raw(), None, &columns);
        assert!(catalog.get("host").unwrap().display);
        assert!(!catalog.get("bytes").unwrap().display);
    }

    #[test]
    fn first_date_field_finds_the_time_field() {
        let catalog = FieldCatalog::build(raw(), None, &[]);
        assert_eq!(catalog.first_date_field().unwrap().name, "timestamp");

        let no_dates = FieldCatalog::build(
            vec![FieldDescriptor::new("host", FieldType::String)],
            None,
            &[],
        );
        assert!(no_dates.first_date_field().is_none());
    }

    #[test]
    #[should_panic(expected = "stale catalog")]
    fn formatter_for_unknown_field_fails_fast() {
        let catalog = FieldCatalog::build(raw(), None, &[]);
        catalog.formatter_for("no-such-field");
    }

    #[test]
    fn descriptor_deserializes_numeric_aliases() {
        let d: FieldDescriptor =
            serde_json::from_str(r#"{"name": "bytes", "type": "long"}"#).unwrap();
        assert_eq!(d.kind, FieldType::Number);

        let d: FieldDescriptor =
            serde_json::from_str(r#"{"name": "geo", "type": "geo_point"}"#).unwrap();
        assert_eq!(d.kind, FieldType::Other);
    }

    #[rstest::rstest]
    #[case("string", FieldType::String)]
    #[case("long", FieldType::Number)]
    #[case("integer", FieldType::Number)]
    #[case("short", FieldType::Number)]
    #[case("float", FieldType::Number)]
    #[case("double", FieldType::Number)]
    #[case("date", FieldType::Date)]
    #[case("boolean", FieldType::Boolean)]
    #[case("ip", FieldType::Other)]
    fn mapping_types_collapse_to_catalog_types(#[case] raw: &str, #[case] expected: FieldType) {
        assert_eq!(FieldType::from_mapping(raw), expected);
    }

    #[test]
    fn timestamp_formatter_accepts_rfc3339_and_epoch_millis() {
        let f = Formatter::Timestamp;
        assert_eq!(
            f.convert("ts", &serde_json::json!("2014-04-18T12:30:00.000Z")).unwrap(),
            "2014-04-18 12:30:00.000"
        );
        assert_eq!(
            f.convert("ts", &serde_json::json!(1_397_824_200_000_i64)).unwrap(),
            "2014-04-18 12:30:00.000"
        );
        assert!(f.convert("ts", &serde_json::json!(["not", "a", "date"])).is_err());
    }

    #[test]
    fn source_formatter_renders_compact_json() {
        let f = Formatter::SourceJson;
        let value = serde_json::json!({"bytes": 42, "host": "web-01"});
        assert_eq!(f.convert("_source", &value).unwrap(), r#"{"bytes":42,"host":"web-01"}"#);
    }
}
