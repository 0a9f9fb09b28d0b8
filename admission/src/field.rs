use serde::Serialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Builder for the dotted/indexed paths that field errors attach to, e.g.
/// `providerSpec.network.devices[1].networkName`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new<S>(root: S) -> Self
    where
        S: Into<String>,
    {
        Self(root.into())
    }

    pub fn child(&self, name: &str) -> Self {
        Self(format!("{}.{}", self.0, name))
    }

    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The classification of a field error. The labels follow the Kubernetes apimachinery rendering
/// so messages read the same as those emitted by any other admission plugin.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldErrorKind {
    Required,
    Invalid,
    Forbidden,
    Unsupported,
    TooLong,
    TooMany,
}

impl FieldErrorKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Required => "Required value",
            Self::Invalid => "Invalid value",
            Self::Forbidden => "Forbidden",
            Self::Unsupported => "Unsupported value",
            Self::TooLong => "Too long",
            Self::TooMany => "Too many",
        }
    }
}

/// A single fatal finding about one field of a machine. Rendered as
/// `<path>: <kind label>[: <bad value>]: <detail>`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub path: String,
    pub kind: FieldErrorKind,
    pub bad_value: Option<Value>,
    pub detail: String,
}

impl FieldError {
    pub fn required<S>(path: &FieldPath, detail: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            path: path.to_string(),
            kind: FieldErrorKind::Required,
            bad_value: None,
            detail: detail.into(),
        }
    }

    pub fn invalid<V, S>(path: &FieldPath, bad_value: V, detail: S) -> Self
    where
        V: Into<Value>,
        S: Into<String>,
    {
        Self {
            path: path.to_string(),
            kind: FieldErrorKind::Invalid,
            bad_value: Some(bad_value.into()),
            detail: detail.into(),
        }
    }

    pub fn forbidden<S>(path: &FieldPath, detail: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            path: path.to_string(),
            kind: FieldErrorKind::Forbidden,
            bad_value: None,
            detail: detail.into(),
        }
    }

    pub fn unsupported<V>(path: &FieldPath, bad_value: V, supported: &[&str]) -> Self
    where
        V: Into<Value>,
    {
        let supported = supported
            .iter()
            .map(|value| format!("\"{}\"", value))
            .collect::<Vec<String>>()
            .join(", ");
        Self {
            path: path.to_string(),
            kind: FieldErrorKind::Unsupported,
            bad_value: Some(bad_value.into()),
            detail: format!("supported values: {}", supported),
        }
    }

    pub fn too_many(path: &FieldPath, actual: usize, limit: usize) -> Self {
        Self {
            path: path.to_string(),
            kind: FieldErrorKind::TooMany,
            bad_value: Some(Value::from(actual)),
            detail: format!("must have at most {} items", limit),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.kind.label())?;
        if let Some(bad_value) = &self.bad_value {
            write!(f, ": {}", bad_value)?;
        }
        write!(f, ": {}", self.detail)
    }
}

/// Render a list of field errors the way the admission response reports them: nothing for an
/// empty list, the bare error for a single entry, and a bracketed join for more.
pub fn join_errors(errors: &[FieldError]) -> Option<String> {
    match errors {
        [] => None,
        [only] => Some(only.to_string()),
        many => {
            let joined = many
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
                .join(", ");
            Some(format!("[{}]", joined))
        }
    }
}

#[cfg(test)]
mod test {
    use super::{join_errors, FieldError, FieldPath};

    #[test]
    fn path_building() {
        let path = FieldPath::new("providerSpec")
            .child("network")
            .child("devices")
            .index(1)
            .child("networkName");
        assert_eq!(path.as_str(), "providerSpec.network.devices[1].networkName");
    }

    #[test]
    fn required_rendering() {
        let error = FieldError::required(
            &FieldPath::new("providerSpec").child("value"),
            "a value must be provided",
        );
        assert_eq!(
            error.to_string(),
            "providerSpec.value: Required value: a value must be provided"
        );
    }

    #[test]
    fn invalid_rendering_quotes_strings() {
        let error = FieldError::invalid(
            &FieldPath::new("providerSpec").child("zone"),
            "zone",
            "zone not in configured region (region)",
        );
        assert_eq!(
            error.to_string(),
            "providerSpec.zone: Invalid value: \"zone\": zone not in configured region (region)"
        );
    }

    #[test]
    fn invalid_rendering_leaves_numbers_bare() {
        let error = FieldError::invalid(
            &FieldPath::new("providerSpec").child("osDisk").child("diskSizeGB"),
            0,
            "diskSizeGB must be greater than zero and less than 32768",
        );
        assert_eq!(
            error.to_string(),
            "providerSpec.osDisk.diskSizeGB: Invalid value: 0: diskSizeGB must be greater than zero and less than 32768"
        );
    }

    #[test]
    fn unsupported_rendering() {
        let error = FieldError::unsupported(
            &FieldPath::new("providerSpec").child("disks").index(0).child("type"),
            "pd-extreme",
            &["pd-ssd", "pd-standard"],
        );
        assert_eq!(
            error.to_string(),
            "providerSpec.disks[0].type: Unsupported value: \"pd-extreme\": supported values: \"pd-ssd\", \"pd-standard\""
        );
    }

    #[test]
    fn too_many_rendering() {
        let error = FieldError::too_many(&FieldPath::new("providerSpec").child("gpus"), 2, 1);
        assert_eq!(
            error.to_string(),
            "providerSpec.gpus: Too many: 2: must have at most 1 items"
        );
    }

    #[test]
    fn join_renders_single_errors_unbracketed() {
        let path = FieldPath::new("providerSpec").child("template");
        let single = vec![FieldError::required(&path, "template must be provided")];
        assert_eq!(
            join_errors(&single).unwrap(),
            "providerSpec.template: Required value: template must be provided"
        );
    }

    #[test]
    fn join_brackets_multiple_errors() {
        let errors = vec![
            FieldError::required(
                &FieldPath::new("providerSpec").child("template"),
                "template must be provided",
            ),
            FieldError::required(
                &FieldPath::new("providerSpec").child("workspace"),
                "workspace must be provided",
            ),
        ];
        assert_eq!(
            join_errors(&errors).unwrap(),
            "[providerSpec.template: Required value: template must be provided, \
             providerSpec.workspace: Required value: workspace must be provided]"
        );
    }

    #[test]
    fn join_is_empty_for_no_errors() {
        assert_eq!(join_errors(&[]), None);
    }
}
