//! Serde types mirroring the YAML operation declaration.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use super::{BehavioralDefaults, OperationDef};
use crate::error::{Error, Result};
use crate::flag::{Bounds, FlagChoice, FlagDef, FlagType};
use crate::value::{self, FlagValue};

/// One operation as written in a declaration.
///
/// Behavioral fields left out are filled from [`BehavioralDefaults::default`]
/// when the catalog is built.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OperationDecl {
    /// Help text; may span several lines.
    #[serde(default)]
    pub description: String,
    /// Backend command, possibly containing the `${python_exe}` placeholder.
    pub exec: String,
    /// Tunable flags by name.
    #[serde(default)]
    pub flags: BTreeMap<String, FlagDecl>,
    /// Encoder reference.
    pub flag_encoder: Option<String>,
    /// Trial cap used when the user gives none.
    pub default_max_trials: Option<NonZeroU32>,
    /// Whether the batch run is deleted once it succeeds.
    #[serde(default, deserialize_with = "yaml_bool")]
    pub delete_on_success: Option<bool>,
    /// Whether the operation can stage trials instead of running them.
    #[serde(default, deserialize_with = "yaml_bool")]
    pub can_stage_trials: Option<bool>,
    /// Environment applied to the backend process.
    pub env: Option<BTreeMap<String, String>>,
}

/// One flag as written in a declaration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagDecl {
    /// Help text.
    pub description: Option<String>,
    /// Default value.
    pub default: Option<FlagValue>,
    /// Declared type.
    #[serde(rename = "type")]
    pub flag_type: Option<FlagType>,
    /// Allowed values.
    #[serde(default)]
    pub choices: Vec<FlagChoice>,
    /// Lower bound; requires `max`.
    pub min: Option<FlagValue>,
    /// Upper bound; requires `min`.
    pub max: Option<FlagValue>,
    /// Sampling distribution for the range.
    pub distribution: Option<String>,
}

/// Reads a boolean written as `true`/`false` or as `yes`/`no`/`on`/`off`.
fn yaml_bool<'de, D>(deserializer: D) -> core::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FlagValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FlagValue::Bool(b)) => Ok(Some(b)),
        Some(other) => Err(D::Error::custom(format!(
            "expected a boolean, found {}",
            value::encode(&other)
        ))),
    }
}

impl OperationDecl {
    pub(super) fn into_operation(self, name: String) -> Result<OperationDef> {
        let global = BehavioralDefaults::default();
        let defaults = BehavioralDefaults {
            flag_encoder: self.flag_encoder.unwrap_or(global.flag_encoder),
            default_max_trials: self
                .default_max_trials
                .map_or(global.default_max_trials, NonZeroU32::get),
            delete_on_success: self.delete_on_success.unwrap_or(global.delete_on_success),
            can_stage_trials: self.can_stage_trials.unwrap_or(global.can_stage_trials),
            env: self.env.unwrap_or(global.env),
        };

        let flags = self
            .flags
            .into_iter()
            .map(|(flag_name, decl)| {
                let flag = decl.into_flag(&name, &flag_name)?;
                Ok((flag_name, flag))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        trace_debug!(operation = %name, flags = flags.len(), "operation defaults filled");

        Ok(OperationDef {
            name,
            description: self.description,
            exec: self.exec,
            flags,
            defaults,
        })
    }
}

impl FlagDecl {
    fn into_flag(self, operation: &str, flag: &str) -> Result<FlagDef> {
        let partial = |present, missing| Error::PartialBounds {
            operation: operation.to_owned(),
            flag: flag.to_owned(),
            present,
            missing,
        };
        let bounds = match (self.min, self.max) {
            (Some(min), Some(max)) => Some(Bounds { min, max }),
            (None, None) => None,
            (Some(_), None) => return Err(partial("min", "max")),
            (None, Some(_)) => return Err(partial("max", "min")),
        };

        let mut def = FlagDef::new()
            .with_choices(self.choices)
            .with_bounds(bounds);
        if let Some(description) = self.description {
            def = def.with_description(description);
        }
        if let Some(default) = self.default {
            def = def.with_default(default);
        }
        if let Some(flag_type) = self.flag_type {
            def = def.with_type(flag_type);
        }
        if let Some(distribution) = self.distribution {
            def = def.with_distribution(distribution);
        }

        def.validate().map_err(|source| Error::InvalidFlag {
            operation: operation.to_owned(),
            flag: flag.to_owned(),
            source: Box::new(source),
        })?;
        Ok(def)
    }
}
