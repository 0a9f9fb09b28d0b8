/*!

The cross-platform policy layer: rules that read only the machine envelope and apply no matter
which platform the cluster runs on. These run after the platform handler so their errors append
to the platform's.

!*/

use crate::field::{FieldError, FieldPath};
use machine_model::constants::CLUSTER_ID_LABEL;
use machine_model::{LifecycleHook, LifecycleHooks, Machine, MachineExt};
use std::collections::BTreeMap;

/// On create, stamp the machine with the cluster's ID label unless the user already set one.
/// Returns true when the label was written.
pub(crate) fn default_cluster_id_label(machine: &mut Machine, cluster_id: &str) -> bool {
    let labels = machine.metadata.labels.get_or_insert_with(BTreeMap::new);
    match labels.get(CLUSTER_ID_LABEL) {
        Some(value) if !value.is_empty() => false,
        _ => {
            labels.insert(CLUSTER_ID_LABEL.to_string(), cluster_id.to_string());
            true
        }
    }
}

/// Once a machine is marked for deletion its lifecycle hooks are frozen: hooks may be removed,
/// but adding or changing one would extend the deletion a hook owner is already waiting on.
pub(crate) fn validate_lifecycle_hooks(
    machine: &Machine,
    old_machine: Option<&Machine>,
) -> Vec<FieldError> {
    let marked_for_deletion = machine.is_delete_requested()
        || old_machine.map(MachineExt::is_delete_requested).unwrap_or(false);
    if !marked_for_deletion {
        return Vec::new();
    }

    let no_hooks = LifecycleHooks::default();
    let old_hooks = old_machine
        .map(|machine| &machine.spec.lifecycle_hooks)
        .unwrap_or(&no_hooks);
    let new_hooks = &machine.spec.lifecycle_hooks;

    let mut errors = Vec::new();
    check_hooks_frozen(
        "preDrain",
        "pre-drain",
        &new_hooks.pre_drain,
        &old_hooks.pre_drain,
        &mut errors,
    );
    check_hooks_frozen(
        "preTerminate",
        "pre-terminate",
        &new_hooks.pre_terminate,
        &old_hooks.pre_terminate,
        &mut errors,
    );
    errors
}

fn check_hooks_frozen(
    field_name: &str,
    hook_kind: &str,
    new: &[LifecycleHook],
    old: &[LifecycleHook],
    errors: &mut Vec<FieldError>,
) {
    let changed: Vec<String> = new
        .iter()
        .filter(|hook| !old.contains(hook))
        .map(ToString::to_string)
        .collect();
    if changed.is_empty() {
        return;
    }
    let path = FieldPath::new("spec").child("lifecycleHooks").child(field_name);
    errors.push(FieldError::forbidden(
        &path,
        format!(
            "{} hooks are immutable when machine is marked for deletion: \
             the following hooks are new or changed: [{}]",
            hook_kind,
            changed.join(", ")
        ),
    ));
}
