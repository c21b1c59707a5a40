//! Module views: one raw registry record in, one classified display record out.

use crate::commune::ModuleRecord;
use crate::compute::classify::{classify, ModuleType};
use crate::compute::immunity::is_immune;
use crate::compute::units::{display_emission_rounded, display_stake_rounded};
use crate::compute::DeriveError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Decimal places of `stake` in a module view.
pub const STAKE_DECIMALS: u32 = 2;
/// Decimal places of `emission` in a module view.
pub const EMISSION_DECIMALS: u32 = 4;

/// Field names a view always carries; they cannot be excluded.
const DERIVED_FIELDS: [&str; 5] = ["key", "stake", "emission", "in_immunity", "type"];

/// Raw fields hidden from module views unless configured otherwise.
pub const DEFAULT_EXCLUDED_FIELDS: [&str; 4] =
    ["stake_from", "metadata", "last_update", "regblock"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleView {
    pub key: String,
    pub stake: f64,
    pub emission: f64,
    pub in_immunity: bool,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    /// Pass-through fields of the record, minus the excluded ones.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Subnet-level inputs shared by every module view of one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubnetContext {
    pub immunity_period: u64,
    pub current_block: u64,
    /// Blocks per epoch. Zero when unknown.
    pub tempo: u64,
}

/// Validated set of raw field names that never appear in a [`ModuleView`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ExcludedFields(BTreeSet<String>);

impl ExcludedFields {
    pub fn new<I, S>(names: I) -> Result<Self, DeriveError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            let name = name.into();
            if DERIVED_FIELDS.contains(&name.as_str()) {
                return Err(DeriveError::ReservedField(name));
            }
            set.insert(name);
        }
        Ok(Self(set))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for ExcludedFields {
    fn default() -> Self {
        Self(DEFAULT_EXCLUDED_FIELDS.iter().map(|s| s.to_string()).collect())
    }
}

impl TryFrom<Vec<String>> for ExcludedFields {
    type Error = DeriveError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<ExcludedFields> for Vec<String> {
    fn from(fields: ExcludedFields) -> Self {
        fields.0.into_iter().collect()
    }
}

/// Build the view of one module. The record is only read.
pub fn build_module_view(
    record: &ModuleRecord,
    ctx: SubnetContext,
    excluded: &ExcludedFields,
) -> ModuleView {
    let mut fields = Map::new();
    fields.insert("incentive".into(), Value::from(record.incentive));
    fields.insert("dividends".into(), Value::from(record.dividends));
    fields.insert("regblock".into(), Value::from(record.regblock));
    for (name, value) in &record.extra {
        if !DERIVED_FIELDS.contains(&name.as_str()) {
            fields.insert(name.clone(), value.clone());
        }
    }
    fields.retain(|name, _| !excluded.contains(name));

    ModuleView {
        key: record.key.clone(),
        stake: display_stake_rounded(record.stake, STAKE_DECIMALS),
        emission: display_emission_rounded(record.emission, ctx.tempo, EMISSION_DECIMALS),
        in_immunity: is_immune(record.regblock, ctx.immunity_period, ctx.current_block),
        module_type: classify(record.incentive, record.dividends),
        fields,
    }
}

/// Views for a whole registry, ordered by `uid`. Records without a numeric `uid`
/// follow, in registry key order.
pub fn build_module_views(
    registry: &BTreeMap<String, ModuleRecord>,
    ctx: SubnetContext,
    excluded: &ExcludedFields,
) -> Vec<ModuleView> {
    let mut records: Vec<&ModuleRecord> = registry.values().collect();
    records.sort_by_key(|r| r.extra.get("uid").and_then(Value::as_u64).unwrap_or(u64::MAX));
    records
        .into_iter()
        .map(|record| build_module_view(record, ctx, excluded))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(extra: Map<String, Value>) -> ModuleRecord {
        ModuleRecord {
            key: "5Ck".into(),
            stake: 1_000_000_000,
            emission: 500,
            incentive: 0,
            dividends: 0,
            regblock: 100,
            extra,
        }
    }

    fn ctx() -> SubnetContext {
        SubnetContext {
            immunity_period: 50,
            current_block: 140,
            tempo: 1,
        }
    }

    #[test]
    fn inactive_module_in_immunity() {
        let view = build_module_view(&record(Map::new()), ctx(), &ExcludedFields::default());
        assert_eq!(view.key, "5Ck");
        assert_eq!(view.stake, 1.0);
        assert_eq!(view.emission, 0.0);
        assert!(view.in_immunity);
        assert_eq!(view.module_type, ModuleType::Inactive);
    }

    #[test]
    fn default_exclusions_drop_opaque_fields() {
        let mut extra = Map::new();
        extra.insert("stake_from".into(), serde_json::json!([["5Ab", 1]]));
        extra.insert("metadata".into(), Value::from("ipfs://x"));
        extra.insert("last_update".into(), Value::from(139));
        extra.insert("name".into(), Value::from("alpha"));
        let view = build_module_view(&record(extra), ctx(), &ExcludedFields::default());
        let json = serde_json::to_value(&view).unwrap();
        let obj = json.as_object().unwrap();
        for hidden in DEFAULT_EXCLUDED_FIELDS {
            assert!(!obj.contains_key(hidden), "{hidden} leaked");
        }
        assert_eq!(obj["name"], "alpha");
        assert_eq!(obj["type"], "inactive");
        assert_eq!(obj["incentive"], 0);
    }

    #[test]
    fn custom_exclusions_apply() {
        let excluded = ExcludedFields::new(["incentive", "dividends"]).unwrap();
        let view = build_module_view(&record(Map::new()), ctx(), &excluded);
        assert!(!view.fields.contains_key("incentive"));
        assert!(view.fields.contains_key("regblock"));
    }

    #[test]
    fn derived_fields_cannot_be_excluded() {
        let err = ExcludedFields::new(["stake"]).unwrap_err();
        assert_eq!(err, DeriveError::ReservedField("stake".into()));
        assert!(serde_json::from_str::<ExcludedFields>(r#"["type"]"#).is_err());
    }

    #[test]
    fn input_record_untouched() {
        let mut extra = Map::new();
        extra.insert("metadata".into(), Value::from("m"));
        let rec = record(extra);
        let before = rec.clone();
        let _ = build_module_view(&rec, ctx(), &ExcludedFields::default());
        assert_eq!(rec, before);
    }

    #[test]
    fn views_follow_registry_order() {
        let mut registry = BTreeMap::new();
        for key in ["b", "a", "c"] {
            let mut r = record(Map::new());
            r.key = key.into();
            registry.insert(key.to_string(), r);
        }
        let views = build_module_views(&registry, ctx(), &ExcludedFields::default());
        let keys: Vec<_> = views.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn views_ordered_by_uid_when_present() {
        let mut registry = BTreeMap::new();
        for (key, uid) in [("a", Some(2)), ("b", None), ("c", Some(0)), ("d", Some(1))] {
            let mut extra = Map::new();
            if let Some(uid) = uid {
                extra.insert("uid".into(), Value::from(uid));
            }
            let mut r = record(extra);
            r.key = key.into();
            registry.insert(key.to_string(), r);
        }
        let excluded = ExcludedFields::new(["uid"]).unwrap();
        let views = build_module_views(&registry, ctx(), &excluded);
        let keys: Vec<_> = views.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, ["c", "d", "a", "b"]);
        assert!(views.iter().all(|v| !v.fields.contains_key("uid")));
    }

    proptest! {
        #[test]
        fn excluded_fields_never_surface(
            names in proptest::collection::vec("[a-z_]{1,12}", 0..6),
            stake in any::<u64>(),
            regblock in any::<u64>(),
        ) {
            let mut extra = Map::new();
            for name in &names {
                extra.insert(name.clone(), Value::from(1));
            }
            let excluded = match ExcludedFields::new(names.iter().cloned()) {
                Ok(e) => e,
                Err(_) => return Ok(()),
            };
            let mut rec = record(extra);
            rec.stake = stake;
            rec.regblock = regblock;
            let view = build_module_view(&rec, ctx(), &excluded);
            let json = serde_json::to_value(&view).unwrap();
            let obj = json.as_object().unwrap();
            for name in excluded.iter() {
                prop_assert!(!obj.contains_key(name));
            }
        }
    }
}
