use std::fmt::{self, Debug};

use async_trait::async_trait;
use kube::api::{Api, PostParams};
use kube::{Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::error::{is_already_exists, OperatorError, OperatorResult};

/// The slice of the API server the reconciler needs for one kind.
///
/// Implemented for [`kube::Api`] in production; tests substitute an
/// in-memory store or a mock.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStore<K>: Send + Sync
where
    K: Clone + Send + Sync + 'static,
{
    /// `Ok(None)` when the object does not exist.
    async fn get(&self, name: &str) -> Result<Option<K>, kube::Error>;

    async fn create(&self, object: &K) -> Result<K, kube::Error>;

    async fn replace(&self, name: &str, object: &K) -> Result<K, kube::Error>;
}

#[async_trait]
impl<K> ObjectStore<K> for Api<K>
where
    K: Resource + Clone + DeserializeOwned + Serialize + Debug + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> Result<Option<K>, kube::Error> {
        self.get_opt(name).await
    }

    async fn create(&self, object: &K) -> Result<K, kube::Error> {
        Api::create(self, &PostParams::default(), object).await
    }

    async fn replace(&self, name: &str, object: &K) -> Result<K, kube::Error> {
        Api::replace(self, name, &PostParams::default(), object).await
    }
}

/// What a create-or-update did, without the object it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Created,
    Updated,
    Unchanged,
    AlreadyExists,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Created => "created",
            Operation::Updated => "updated",
            Operation::Unchanged => "unchanged",
            Operation::AlreadyExists => "already exists",
        };
        f.write_str(s)
    }
}

/// Result of an idempotent write. `AlreadyExists` means another writer
/// created the object between our read and our create.
#[derive(Debug)]
pub enum WriteOutcome<K> {
    Created(K),
    Updated(K),
    Unchanged(K),
    AlreadyExists,
    Failed(OperatorError),
}

impl<K> WriteOutcome<K> {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            WriteOutcome::Created(_) => Some(Operation::Created),
            WriteOutcome::Updated(_) => Some(Operation::Updated),
            WriteOutcome::Unchanged(_) => Some(Operation::Unchanged),
            WriteOutcome::AlreadyExists => Some(Operation::AlreadyExists),
            WriteOutcome::Failed(_) => None,
        }
    }

    /// The object as stored, if the write reached the API server.
    pub fn into_object(self) -> Option<K> {
        match self {
            WriteOutcome::Created(k) | WriteOutcome::Updated(k) | WriteOutcome::Unchanged(k) => {
                Some(k)
            }
            WriteOutcome::AlreadyExists | WriteOutcome::Failed(_) => None,
        }
    }

    fn from_error(err: kube::Error) -> Self {
        if is_already_exists(&err) {
            WriteOutcome::AlreadyExists
        } else {
            WriteOutcome::Failed(err.into())
        }
    }
}

/// Create `desired` if no object with its name exists, otherwise run
/// `mutate` on the live object and write it back when that changed it.
///
/// `mutate` also runs on `desired` before it is created. It must not change
/// the object's name or namespace.
pub async fn create_or_update<K, S, F>(store: &S, desired: K, mutate: F) -> WriteOutcome<K>
where
    K: Resource<DynamicType = ()> + Clone + PartialEq + Send + Sync + 'static,
    S: ObjectStore<K> + ?Sized,
    F: FnOnce(&mut K) -> OperatorResult<()>,
{
    let kind = K::kind(&());
    let name = desired.name_any();
    let namespace = desired.namespace();

    let existing = match store.get(&name).await {
        Ok(existing) => existing,
        Err(err) => return WriteOutcome::from_error(err),
    };

    match existing {
        None => {
            let mut object = desired;
            if let Err(err) = checked_mutate(&mut object, mutate, &name, &namespace) {
                return WriteOutcome::Failed(err);
            }
            debug!(%kind, %name, "creating");
            match store.create(&object).await {
                Ok(created) => WriteOutcome::Created(created),
                Err(err) => WriteOutcome::from_error(err),
            }
        }
        Some(current) => {
            let mut object = current.clone();
            if let Err(err) = checked_mutate(&mut object, mutate, &name, &namespace) {
                return WriteOutcome::Failed(err);
            }
            if object == current {
                return WriteOutcome::Unchanged(current);
            }
            debug!(%kind, %name, "updating");
            match store.replace(&name, &object).await {
                Ok(updated) => WriteOutcome::Updated(updated),
                Err(err) => WriteOutcome::from_error(err),
            }
        }
    }
}

fn checked_mutate<K, F>(
    object: &mut K,
    mutate: F,
    name: &str,
    namespace: &Option<String>,
) -> OperatorResult<()>
where
    K: Resource<DynamicType = ()>,
    F: FnOnce(&mut K) -> OperatorResult<()>,
{
    mutate(object)?;
    if object.name_any() != name || &object.namespace() != namespace {
        return Err(OperatorError::MutatedKey {
            kind: K::kind(&()).to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}
