//! Lifecycle contract for remote resources
//!
//! Every resource kind implements [`Lifecycle`]: a typed adapter that
//! turns a configuration record into remote calls and the remote answer
//! back into a record. Adapters are stateless; the client is passed in on
//! every call and the host owns the records.
//!
//! The host drives heterogeneous kinds through [`DynResource`], which every
//! `Lifecycle` implements automatically over `serde_json::Value` records.

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::secrets;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Typed lifecycle adapter for one resource kind.
///
/// # Example
///
/// ```ignore
/// use declarative::{Lifecycle, Result, Schema};
///
/// struct Note;
///
/// impl Lifecycle for Note {
///     type Client = NotesApi;
///     type Model = NoteModel;
///
///     fn type_name(&self) -> &'static str { "note" }
///     fn schema(&self) -> Schema { Schema::v0() }
///     fn identity(&self, model: &NoteModel) -> String { model.title.clone() }
///
///     fn create(&self, api: &NotesApi, plan: &NoteModel) -> Result<NoteModel> {
///         api.post(plan)?;
///         let fetched = api.get(&plan.title)?;
///         self.preserve_secrets(fetched, plan)
///     }
///     // read / update / delete / import ...
/// }
/// ```
pub trait Lifecycle: Send + Sync {
    /// Client handed to every call.
    type Client: ?Sized + Sync;

    /// Configuration record, also persisted as state.
    type Model: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync;

    /// Type name used in configuration (`sftpgo_user`, ...).
    fn type_name(&self) -> &'static str;

    /// Attribute declarations.
    fn schema(&self) -> Schema;

    /// Remote identifier of a record. Also the import identifier format.
    fn identity(&self, model: &Self::Model) -> String;

    /// Value constraints beyond what the schema expresses.
    fn validate(&self, _model: &Self::Model) -> Vec<crate::Diagnostic> {
        Vec::new()
    }

    /// JSON pointers of secret attributes for the branch active in `model`.
    fn secret_paths(&self, _model: &Self::Model) -> Vec<String> {
        Vec::new()
    }

    /// Create the remote object and return the record to persist.
    fn create(&self, client: &Self::Client, plan: &Self::Model) -> Result<Self::Model>;

    /// Refresh a tracked record. `None` means the object is gone.
    fn read(&self, client: &Self::Client, state: &Self::Model) -> Result<Option<Self::Model>>;

    /// Push a changed record.
    fn update(
        &self,
        client: &Self::Client,
        plan: &Self::Model,
        prior: &Self::Model,
    ) -> Result<Self::Model>;

    /// Remove the remote object. Absent objects count as removed.
    fn delete(&self, client: &Self::Client, state: &Self::Model) -> Result<()>;

    /// Seed a record from an import identifier; the host reads it next.
    fn import(&self, id: &str) -> Result<Self::Model>;

    /// Copy secrets from `source` over the remote echo in `remote`.
    ///
    /// Paths come from `remote`, so only the branch the server actually
    /// holds is touched.
    fn preserve_secrets(&self, remote: Self::Model, source: &Self::Model) -> Result<Self::Model> {
        let paths = Lifecycle::secret_paths(self, &remote);
        secrets::preserve_typed(remote, source, &paths)
    }
}

/// Type-erased lifecycle adapter over JSON records.
pub trait DynResource<C: ?Sized>: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Check a configuration record and return it in canonical form.
    ///
    /// Canonical form is the typed model serialized back, so configuration
    /// and state compare field by field.
    fn normalize(&self, config: &Value) -> Result<Value>;

    fn identity(&self, record: &Value) -> Result<String>;

    fn secret_paths(&self, record: &Value) -> Result<Vec<String>>;

    fn create(&self, client: &C, plan: &Value) -> Result<Value>;

    fn read(&self, client: &C, state: &Value) -> Result<Option<Value>>;

    fn update(&self, client: &C, plan: &Value, prior: &Value) -> Result<Value>;

    fn delete(&self, client: &C, state: &Value) -> Result<()>;

    fn import(&self, id: &str) -> Result<Value>;
}

fn decode<M: DeserializeOwned>(type_name: &str, value: &Value) -> Result<M> {
    serde_json::from_value(value.clone())
        .map_err(|e| Error::Decode(format!("{type_name}: {e}")))
}

impl<L> DynResource<L::Client> for L
where
    L: Lifecycle,
{
    fn type_name(&self) -> &'static str {
        Lifecycle::type_name(self)
    }

    fn schema(&self) -> Schema {
        Lifecycle::schema(self)
    }

    fn normalize(&self, config: &Value) -> Result<Value> {
        let diagnostics = Lifecycle::schema(self).check_config(config);
        if !diagnostics.is_empty() {
            return Err(Error::Validation(diagnostics));
        }
        let model: L::Model = decode(Lifecycle::type_name(self), config)?;
        let diagnostics = Lifecycle::validate(self, &model);
        if !diagnostics.is_empty() {
            return Err(Error::Validation(diagnostics));
        }
        Ok(serde_json::to_value(model)?)
    }

    fn identity(&self, record: &Value) -> Result<String> {
        let model: L::Model = decode(Lifecycle::type_name(self), record)?;
        Ok(Lifecycle::identity(self, &model))
    }

    fn secret_paths(&self, record: &Value) -> Result<Vec<String>> {
        let model: L::Model = decode(Lifecycle::type_name(self), record)?;
        Ok(Lifecycle::secret_paths(self, &model))
    }

    fn create(&self, client: &L::Client, plan: &Value) -> Result<Value> {
        let plan: L::Model = decode(Lifecycle::type_name(self), plan)?;
        let created = Lifecycle::create(self, client, &plan)?;
        Ok(serde_json::to_value(created)?)
    }

    fn read(&self, client: &L::Client, state: &Value) -> Result<Option<Value>> {
        let state: L::Model = decode(Lifecycle::type_name(self), state)?;
        match Lifecycle::read(self, client, &state)? {
            Some(model) => Ok(Some(serde_json::to_value(model)?)),
            None => Ok(None),
        }
    }

    fn update(&self, client: &L::Client, plan: &Value, prior: &Value) -> Result<Value> {
        let plan: L::Model = decode(Lifecycle::type_name(self), plan)?;
        let prior: L::Model = decode(Lifecycle::type_name(self), prior)?;
        let updated = Lifecycle::update(self, client, &plan, &prior)?;
        Ok(serde_json::to_value(updated)?)
    }

    fn delete(&self, client: &L::Client, state: &Value) -> Result<()> {
        let state: L::Model = decode(Lifecycle::type_name(self), state)?;
        Lifecycle::delete(self, client, &state)
    }

    fn import(&self, id: &str) -> Result<Value> {
        Ok(serde_json::to_value(Lifecycle::import(self, id)?)?)
    }
}

/// A boxed resource for type-erased storage
pub type BoxedResource<C> = Box<dyn DynResource<C>>;

/// Ordered collection of resource kinds.
///
/// Registration order is dependency order: kinds registered earlier are
/// created before and destroyed after kinds registered later.
pub struct Registry<C: ?Sized> {
    resources: Vec<Box<dyn DynResource<C>>>,
}

impl<C: ?Sized> Registry<C> {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    /// Register a resource kind.
    pub fn register(mut self, resource: impl DynResource<C> + 'static) -> Self {
        self.resources.push(Box::new(resource));
        self
    }

    /// Look up a kind by type name.
    pub fn get(&self, type_name: &str) -> Result<&dyn DynResource<C>> {
        self.resources
            .iter()
            .find(|r| r.type_name() == type_name)
            .map(AsRef::as_ref)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))
    }

    /// Dependency tier of a kind (its registration index).
    pub fn tier(&self, type_name: &str) -> Option<usize> {
        self.resources
            .iter()
            .position(|r| r.type_name() == type_name)
    }

    /// Registered type names, in dependency order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.resources.iter().map(|r| r.type_name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn DynResource<C>> {
        self.resources.iter().map(AsRef::as_ref)
    }
}

impl<C: ?Sized> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Items, Store};
    use super::*;
    use serde_json::json;

    fn registry() -> Registry<Store> {
        Registry::new()
            .register(Items { name: "first" })
            .register(Items { name: "second" })
    }

    #[test]
    fn test_registry_lookup_and_tiers() {
        let registry = registry();
        assert_eq!(registry.type_names(), vec!["first", "second"]);
        assert_eq!(registry.tier("second"), Some(1));
        assert!(matches!(
            registry.get("third"),
            Err(Error::UnknownType(name)) if name == "third"
        ));
    }

    #[test]
    fn test_normalize_rejects_schema_and_value_errors() {
        let registry = registry();
        let first = registry.get("first").unwrap();
        assert!(matches!(
            first.normalize(&json!({"size": 1})),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            first.normalize(&json!({"name": "a", "size": -1})),
            Err(Error::Validation(d)) if d[0].path == "/size"
        ));
    }

    #[test]
    fn test_normalize_fills_unset_with_null() {
        let registry = registry();
        let normalized = registry
            .get("first")
            .unwrap()
            .normalize(&json!({"name": "a"}))
            .unwrap();
        assert_eq!(normalized["size"], Value::Null);
        assert_eq!(normalized["name"], "a");
    }

    #[test]
    fn test_create_read_keeps_plaintext_secret() {
        let store = Store::default();
        let registry = registry();
        let first = registry.get("first").unwrap();

        let created = first
            .create(&store, &json!({"name": "a", "token": "plain"}))
            .unwrap();
        assert_eq!(created["token"], "plain");
        assert_eq!(created["revision"], 1);

        let read = first.read(&store, &created).unwrap().unwrap();
        assert_eq!(read["token"], "plain");
    }

    #[test]
    fn test_import_then_read_keeps_echo() {
        let store = Store::default();
        let registry = registry();
        let first = registry.get("first").unwrap();
        first
            .create(&store, &json!({"name": "a", "token": "plain"}))
            .unwrap();

        let seeded = first.import("a").unwrap();
        let read = first.read(&store, &seeded).unwrap().unwrap();
        assert_eq!(read["token"], "***");
    }
}
