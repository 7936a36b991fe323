//! The catalog of optimizer operations.
//!
//! An [`OperationCatalog`] is built once from a YAML declaration and is
//! read-only afterwards. Building fills every behavioral field an operation
//! leaves out from [`BehavioralDefaults::default`]; declared fields are kept.
//!
//! # Declaration format
//!
//! ```yaml
//! gp:
//!   description: Bayesian optimizer using Gaussian processes.
//!   exec: ${python_exe} -um guild.plugins.skopt_gp_main
//!   delete-on-success: false        # optional, see BehavioralDefaults
//!   flags:
//!     kappa:
//!       default: 1.96
//!       type: float
//!       min: 0.0                    # min and max come as a pair
//!       max: 10.0
//!       distribution: log-uniform   # optional, defaults to uniform
//!     acq-func:
//!       default: gp_hedge
//!       choices:
//!         - value: LCB
//!           description: Lower confidence bound
//! ```
//!
//! # Example
//!
//! ```
//! use skopt_ops::catalog::OperationCatalog;
//!
//! let catalog = OperationCatalog::build().unwrap();
//! let gp = catalog.lookup("gp").unwrap();
//! assert_eq!(gp.defaults().default_max_trials, 20);
//! assert!(catalog.lookup("random").unwrap().defaults().delete_on_success);
//! ```

mod declaration;

use std::collections::BTreeMap;

pub use declaration::{FlagDecl, OperationDecl};

use crate::encoder::{self, ENCODER_REF, EncodeFn, SearchSpace};
use crate::error::{Error, Result};
use crate::flag::FlagDef;
use crate::value::FlagValue;

/// Trial cap used when an operation does not declare one.
pub const DEFAULT_MAX_TRIALS: u32 = 20;

/// Placeholder in exec references replaced by the interpreter path.
pub const INTERPRETER_PLACEHOLDER: &str = "${python_exe}";

const BUILTIN_DECLARATION: &str = include_str!("skopt.yml");

/// Behavioral settings every operation carries once the catalog is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BehavioralDefaults {
    /// Reference to the flag encoder, resolved by [`encoder::resolve`].
    pub flag_encoder: String,
    /// Trial cap used when the user gives none. Always positive.
    pub default_max_trials: u32,
    /// Whether the batch run is deleted once it succeeds.
    pub delete_on_success: bool,
    /// Whether the operation can stage trials instead of running them.
    pub can_stage_trials: bool,
    /// Environment applied verbatim to the backend process.
    pub env: BTreeMap<String, String>,
}

impl Default for BehavioralDefaults {
    fn default() -> Self {
        Self {
            flag_encoder: ENCODER_REF.to_owned(),
            default_max_trials: DEFAULT_MAX_TRIALS,
            delete_on_success: false,
            can_stage_trials: false,
            env: BTreeMap::from([("NO_OP_INTERRUPTED_MSG".to_owned(), "1".to_owned())]),
        }
    }
}

/// One optimization strategy exposed to the host.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationDef {
    name: String,
    description: String,
    exec: String,
    flags: BTreeMap<String, FlagDef>,
    defaults: BehavioralDefaults,
}

impl OperationDef {
    /// Returns the operation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the help text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the backend command as declared.
    #[must_use]
    pub fn exec(&self) -> &str {
        &self.exec
    }

    /// Returns the backend command with [`INTERPRETER_PLACEHOLDER`] replaced.
    #[must_use]
    pub fn exec_with_interpreter(&self, interpreter: &str) -> String {
        self.exec.replace(INTERPRETER_PLACEHOLDER, interpreter)
    }

    /// Returns the flags by name.
    #[must_use]
    pub fn flags(&self) -> &BTreeMap<String, FlagDef> {
        &self.flags
    }

    /// Returns the named flag.
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<&FlagDef> {
        self.flags.get(name)
    }

    /// Returns the filled-in behavioral settings.
    #[must_use]
    pub fn defaults(&self) -> &BehavioralDefaults {
        &self.defaults
    }

    /// Returns the environment overrides for the backend process.
    #[must_use]
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.defaults.env
    }

    /// Encodes one flag with the operation's encoder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFlag`] if the operation has no such flag, or
    /// [`Error::UnknownEncoder`] if its encoder reference does not resolve.
    pub fn encode_flag(&self, name: &str, value: Option<&FlagValue>) -> Result<SearchSpace> {
        let flag = self.flag(name).ok_or_else(|| self.unknown_flag(name))?;
        let encode = self.encoder()?;
        let token = encode(flag, value);
        trace_debug!(operation = %self.name, flag = name, kind = token.kind(), "flag encoded");
        Ok(token)
    }

    /// Encodes every flag of the operation.
    ///
    /// Each flag is encoded with its entry in `values`, or with its default
    /// when `values` has none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFlag`] if `values` names a flag the operation
    /// does not declare, or [`Error::UnknownEncoder`] if its encoder
    /// reference does not resolve.
    pub fn search_space(
        &self,
        values: &BTreeMap<String, FlagValue>,
    ) -> Result<BTreeMap<String, SearchSpace>> {
        if let Some(unknown) = values.keys().find(|name| !self.flags.contains_key(*name)) {
            return Err(self.unknown_flag(unknown));
        }
        let encode = self.encoder()?;
        Ok(self
            .flags
            .iter()
            .map(|(name, flag)| {
                let value = values.get(name).or(flag.default_value());
                (name.clone(), encode(flag, value))
            })
            .collect())
    }

    fn encoder(&self) -> Result<EncodeFn> {
        encoder::resolve(&self.defaults.flag_encoder).ok_or_else(|| Error::UnknownEncoder {
            operation: self.name.clone(),
            reference: self.defaults.flag_encoder.clone(),
        })
    }

    fn unknown_flag(&self, flag: &str) -> Error {
        Error::UnknownFlag {
            operation: self.name.clone(),
            flag: flag.to_owned(),
        }
    }
}

/// Immutable set of operation definitions keyed by name.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationCatalog {
    operations: BTreeMap<String, OperationDef>,
}

impl OperationCatalog {
    /// Builds the catalog of `random`, `gp`, `forest` and `gbrt`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded declaration is invalid.
    pub fn build() -> Result<Self> {
        Self::from_yaml(BUILTIN_DECLARATION)
    }

    /// Builds a catalog from a YAML declaration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Declaration`] if the YAML does not match the
    /// declaration format, [`Error::PartialBounds`] if a flag declares only
    /// one of `min`/`max`, or [`Error::InvalidFlag`] if a range is not
    /// numeric or not ordered. No catalog is produced on error.
    pub fn from_yaml(source: &str) -> Result<Self> {
        let decls: BTreeMap<String, OperationDecl> = serde_yaml::from_str(source)?;
        Self::from_declarations(decls)
    }

    /// Builds a catalog from parsed declarations.
    ///
    /// # Errors
    ///
    /// See [`OperationCatalog::from_yaml`].
    pub fn from_declarations(
        decls: impl IntoIterator<Item = (String, OperationDecl)>,
    ) -> Result<Self> {
        let operations = decls
            .into_iter()
            .map(|(name, decl)| {
                let op = decl.into_operation(name.clone())?;
                Ok((name, op))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        trace_info!(operations = operations.len(), "operation catalog built");
        Ok(Self { operations })
    }

    /// Returns the named operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOperation`] if the catalog has no such operation.
    pub fn lookup(&self, name: &str) -> Result<&OperationDef> {
        self.operations
            .get(name)
            .ok_or_else(|| Error::UnknownOperation(name.to_owned()))
    }

    /// Returns the operation names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Returns the operations in name order.
    pub fn iter(&self) -> impl Iterator<Item = &OperationDef> {
        self.operations.values()
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the catalog holds no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_declares_four_operations() {
        let catalog = OperationCatalog::build().unwrap();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, ["forest", "gbrt", "gp", "random"]);
    }

    #[test]
    fn missing_fields_take_global_defaults() {
        let catalog = OperationCatalog::build().unwrap();
        let gp = catalog.lookup("gp").unwrap();
        assert_eq!(gp.defaults(), &BehavioralDefaults::default());
        assert_eq!(gp.env().get("NO_OP_INTERRUPTED_MSG").map(String::as_str), Some("1"));
    }

    #[test]
    fn declared_fields_win() {
        let catalog = OperationCatalog::build().unwrap();
        let random = catalog.lookup("random").unwrap();
        assert!(random.defaults().delete_on_success);
        assert!(random.defaults().can_stage_trials);
        assert_eq!(random.defaults().default_max_trials, DEFAULT_MAX_TRIALS);
        assert_eq!(random.defaults().flag_encoder, ENCODER_REF);
    }

    #[test]
    fn declared_env_replaces_default_env() {
        let catalog = OperationCatalog::from_yaml(
            "op:\n  exec: run\n  env:\n    SEED: '7'\n",
        )
        .unwrap();
        let env = catalog.lookup("op").unwrap().env();
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("SEED").map(String::as_str), Some("7"));
    }

    #[test]
    fn build_is_idempotent() {
        assert_eq!(OperationCatalog::build().unwrap(), OperationCatalog::build().unwrap());
    }

    #[test]
    fn exec_placeholder_is_substituted() {
        let catalog = OperationCatalog::build().unwrap();
        let gp = catalog.lookup("gp").unwrap();
        assert!(gp.exec().starts_with(INTERPRETER_PLACEHOLDER));
        assert_eq!(
            gp.exec_with_interpreter("/usr/bin/python3"),
            "/usr/bin/python3 -um guild.plugins.skopt_gp_main"
        );
    }

    #[test]
    fn unknown_operation_is_an_error() {
        let catalog = OperationCatalog::build().unwrap();
        assert!(matches!(
            catalog.lookup("tpe"),
            Err(Error::UnknownOperation(ref name)) if name == "tpe"
        ));
    }

    #[test]
    fn unknown_encoder_reference_fails_encoding() {
        let catalog = OperationCatalog::from_yaml(
            "op:\n  exec: run\n  flag-encoder: elsewhere:encode\n  flags:\n    x:\n      default: 1\n",
        )
        .unwrap();
        let op = catalog.lookup("op").unwrap();
        assert!(matches!(
            op.encode_flag("x", None),
            Err(Error::UnknownEncoder { ref reference, .. }) if reference == "elsewhere:encode"
        ));
    }
}
