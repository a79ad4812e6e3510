use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{Resource, ResourceExt};

use crate::error::{OperatorError, OperatorResult};

/// Point `object` at `owner` as its controller so the garbage collector
/// deletes it together with the owner.
///
/// An existing reference to the same owner is refreshed in place. Fails if
/// another controller already owns the object, or if a namespaced owner
/// would reach into a different namespace.
pub fn set_controller_reference<O, K>(owner: &O, object: &mut K) -> OperatorResult<()>
where
    O: Resource<DynamicType = ()>,
    K: Resource<DynamicType = ()>,
{
    let mut owner_ref = owner
        .controller_owner_ref(&())
        .ok_or_else(|| OperatorError::MissingObjectKey {
            kind: O::kind(&()).to_string(),
        })?;
    // Foreground deletion of the owner waits for this object.
    owner_ref.block_owner_deletion = Some(true);

    if let Some(owner_namespace) = owner.meta().namespace.as_deref() {
        if object.meta().namespace.as_deref() != Some(owner_namespace) {
            return Err(OperatorError::CrossNamespaceOwner {
                object: object.name_any(),
                owner_namespace: owner_namespace.to_string(),
            });
        }
    }

    let object_name = object.name_any();
    let references = object.owner_references_mut();

    if let Some(current) = references
        .iter()
        .find(|r| r.controller == Some(true) && !same_owner(r, &owner_ref))
    {
        return Err(OperatorError::AlreadyOwned {
            object: object_name,
            kind: current.kind.clone(),
            name: current.name.clone(),
        });
    }

    match references.iter_mut().find(|r| same_owner(r, &owner_ref)) {
        Some(existing) => *existing = owner_ref,
        None => references.push(owner_ref),
    }
    Ok(())
}

/// References match on group, kind and name; the version may differ.
fn same_owner(a: &OwnerReference, b: &OwnerReference) -> bool {
    api_group(&a.api_version) == api_group(&b.api_version) && a.kind == b.kind && a.name == b.name
}

fn api_group(api_version: &str) -> &str {
    api_version
        .split_once('/')
        .map(|(group, _)| group)
        .unwrap_or("")
}
