use crate::constants::CLUSTER_ID_LABEL;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Provides some conveniences for querying a machine object.
pub trait MachineExt {
    /// Returns this object's `ObjectMeta` information (i.e. the `metadata` field). You implement
    /// this by returning `&self.metadata`. This allows the rest of this trait's functions to be
    /// implemented for you.
    fn object_meta(&self) -> &ObjectMeta;

    /// Returns the object's name, unwrapping a potential `None` with `""`.
    fn object_name(&self) -> &str {
        self.object_meta().name.as_deref().unwrap_or("")
    }

    /// Returns the object's namespace, unwrapping a potential `None` with `""`.
    fn object_namespace(&self) -> &str {
        self.object_meta().namespace.as_deref().unwrap_or("")
    }

    /// Has someone requested that the object be deleted.
    fn is_delete_requested(&self) -> bool {
        self.object_meta().deletion_timestamp.is_some()
    }

    /// The value of the cluster-ID label, if the label is present.
    fn cluster_id_label(&self) -> Option<&str> {
        self.object_meta()
            .labels
            .as_ref()
            .and_then(|labels| labels.get(CLUSTER_ID_LABEL))
            .map(String::as_str)
    }

    /// Does the object have the given `finalizer`.
    fn has_finalizer(&self, finalizer: &str) -> bool {
        let mut finalizers = match &self.object_meta().finalizers {
            None => return false,
            Some(value) => value.iter(),
        };
        finalizers.any(|item| item == finalizer)
    }
}
