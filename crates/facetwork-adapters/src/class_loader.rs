//! Filesystem-based class loader.
//!
//! Discovers and parses one TOML manifest per domain class from a directory
//! tree, converting them into [`ClassDescriptor`]s with declarative method
//! bodies so the metamodel can introspect and evaluate them.
//!
//! # Directory layout expected
//!
//! ```text
//! classes/
//! ├── order.toml
//! ├── customer.toml
//! ├── authorization.toml     ← role table, not a class (see `authorizor`)
//! └── billing/
//!     └── invoice.toml
//! ```
//!
//! # Manifest format
//!
//! ```toml
//! [class]
//! name              = "com.acme.Order"
//! nature            = "entity"           # entity | view_model | service
//! logical_type_name = "acme.Order"       # optional
//! immutable         = false              # optional
//!
//! [[methods]]
//! name        = "getQuantity"
//! returns     = "integer"                # void | boolean | integer | text | ref:<class> | list:<class>
//! annotations = [{ kind = "max_length", value = 3 }]
//! body        = { kind = "field", field = "quantity" }
//!
//! [[methods]]
//! name    = "disableQuantity"
//! returns = "text"
//! body    = { kind = "when_persistent", value = "Cannot change quantity once placed" }
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use facetwork_core::domain::{
    Annotation, ClassDescriptor, InvocationError, MethodBody, MethodDescriptor, Nature,
    ObjectAdapter, ParameterDescriptor, TypeRef, Value,
};

use crate::{authorizor::AUTHORIZATION_FILE, class_registry::InMemoryClassRegistry, error::ManifestError};

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of one class manifest.
#[derive(Debug, Deserialize, Clone)]
pub struct ClassManifest {
    pub class: ClassSection,
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
}

/// `[class]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct ClassSection {
    /// Fully-qualified class name, e.g. `"com.acme.Order"`.
    pub name: String,
    pub nature: Option<Nature>,
    pub logical_type_name: Option<String>,
    #[serde(default)]
    pub immutable: bool,
    pub named: Option<String>,
    pub described_as: Option<String>,
}

/// One entry under `[[methods]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct MethodEntry {
    pub name: String,
    #[serde(default = "void")]
    pub returns: String,
    #[serde(default)]
    pub parameters: Vec<ParameterEntry>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    pub body: Option<BodySpec>,
}

fn void() -> String {
    "void".into()
}

/// One entry under `[[methods.parameters]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct ParameterEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// Declarative method behavior.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodySpec {
    /// Read a field.
    Field { field: String },
    /// Write the first argument into a field.
    SetField { field: String },
    /// Always return `value`.
    Constant { value: toml::Value },
    /// `value` when the target is persistent, null otherwise.
    WhenPersistent { value: toml::Value },
    /// `value` when the target is transient, null otherwise.
    WhenTransient { value: toml::Value },
    /// `value` when `field` equals `equals`, null otherwise.
    WhenFieldEquals {
        field: String,
        equals: toml::Value,
        value: toml::Value,
    },
    /// `message` when the first argument is text longer than `max`.
    MaxTextLength { max: usize, message: String },
    /// `message` when the first argument is null or blank.
    NotBlank { message: String },
    /// Persist the target under `oid`.
    MarkPersistent { oid: String },
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`ClassDescriptor`]s from a directory tree of class manifests.
///
/// Every `*.toml` file below `classes_dir` (except the authorization table)
/// is one class. Files that fail to parse emit a `WARN` log and are
/// skipped; they do not prevent other classes from loading.
pub struct ClassManifestLoader {
    classes_dir: PathBuf,
}

impl ClassManifestLoader {
    /// Create a loader pointed at `classes_dir`.
    pub fn new(classes_dir: impl Into<PathBuf>) -> Self {
        Self {
            classes_dir: classes_dir.into(),
        }
    }

    pub fn classes_dir(&self) -> &Path {
        &self.classes_dir
    }

    /// Load every valid class manifest found under `classes_dir`, sorted by
    /// file path.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::DirectoryNotFound`] if `classes_dir` does not
    /// exist, or [`ManifestError::Io`] if it cannot be walked.
    #[instrument(skip(self), fields(dir = %self.classes_dir.display()))]
    pub fn load_all(&self) -> Result<Vec<ClassDescriptor>, ManifestError> {
        if !self.classes_dir.is_dir() {
            return Err(ManifestError::DirectoryNotFound(self.classes_dir.clone()));
        }

        let mut classes = Vec::new();

        for entry in WalkDir::new(&self.classes_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| ManifestError::Io {
                path: self.classes_dir.clone(),
                source: e.into(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().is_none_or(|ext| ext != "toml")
                || path.file_name().is_some_and(|name| name == AUTHORIZATION_FILE)
            {
                continue;
            }

            match load_file(path) {
                Ok(class) => {
                    debug!(class = %class.name, methods = class.methods.len(), "loaded class manifest");
                    classes.push(class);
                }
                Err(e) => {
                    warn!(
                        file  = %path.display(),
                        error = %e,
                        "skipping class manifest due to load error"
                    );
                }
            }
        }

        debug!(count = classes.len(), "finished loading class manifests");
        Ok(classes)
    }

    /// Load every manifest into a fresh registry.
    pub fn load_registry(&self) -> Result<InMemoryClassRegistry, ManifestError> {
        let registry = InMemoryClassRegistry::new();
        for class in self.load_all()? {
            registry
                .register(class)
                .map_err(|e| ManifestError::Parse {
                    path: self.classes_dir.clone(),
                    message: e.to_string(),
                })?;
        }
        Ok(registry)
    }
}

/// Read and parse one manifest file.
pub fn load_file(path: &Path) -> Result<ClassDescriptor, ManifestError> {
    let raw = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&raw).map_err(|e| match e {
        ManifestError::Parse { message, .. } => ManifestError::Parse {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Parse manifest text into a class descriptor.
pub fn parse_manifest(raw: &str) -> Result<ClassDescriptor, ManifestError> {
    let manifest: ClassManifest = toml::from_str(raw).map_err(|e| ManifestError::Parse {
        path: PathBuf::new(),
        message: e.to_string(),
    })?;
    build_class(manifest)
}

fn build_class(manifest: ClassManifest) -> Result<ClassDescriptor, ManifestError> {
    let section = manifest.class;
    let mut class = ClassDescriptor::new(section.name);

    if section.nature.is_some() || section.logical_type_name.is_some() {
        class = class.annotated(Annotation::DomainObject {
            nature: section.nature.unwrap_or_default(),
            logical_type_name: section.logical_type_name,
        });
    }
    if section.immutable {
        class = class.annotated(Annotation::Immutable { reason: None });
    }
    if let Some(value) = section.named {
        class = class.annotated(Annotation::Named { value });
    }
    if let Some(value) = section.described_as {
        class = class.annotated(Annotation::DescribedAs { value });
    }

    for entry in manifest.methods {
        class = class.method(build_method(entry)?);
    }
    Ok(class)
}

fn build_method(entry: MethodEntry) -> Result<MethodDescriptor, ManifestError> {
    let mut method = MethodDescriptor::new(entry.name, parse_type_ref(&entry.returns)?);
    for parameter in entry.parameters {
        let mut descriptor =
            ParameterDescriptor::new(parameter.name, parse_type_ref(&parameter.type_name)?);
        descriptor.annotations = parameter.annotations;
        method = method.param(descriptor);
    }
    method.annotations = entry.annotations;
    method.is_static = entry.is_static;
    if let Some(body) = entry.body {
        method = method.body(build_body(body)?);
    }
    Ok(method)
}

// ── Parsing helpers ───────────────────────────────────────────────────────────

/// Parse a declared type.
///
/// Valid values: `void`, `boolean`, `integer`, `text`, `ref:<class>`,
/// `list:<class>`.
pub fn parse_type_ref(s: &str) -> Result<TypeRef, ManifestError> {
    let s = s.trim();
    if let Some(class) = s.strip_prefix("ref:") {
        return Ok(TypeRef::Reference(class.trim().to_string()));
    }
    if let Some(class) = s.strip_prefix("list:") {
        return Ok(TypeRef::Collection(class.trim().to_string()));
    }
    match s.to_lowercase().as_str() {
        "void" => Ok(TypeRef::Void),
        "boolean" | "bool" => Ok(TypeRef::Boolean),
        "integer" | "int" => Ok(TypeRef::Integer),
        "text" | "string" => Ok(TypeRef::Text),
        _ => Err(ManifestError::UnknownType(s.to_string())),
    }
}

/// Convert a TOML value into a metamodel [`Value`].
pub fn to_value(value: &toml::Value) -> Result<Value, ManifestError> {
    match value {
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Integer(i) => Ok(Value::Int(*i)),
        toml::Value::String(s) => Ok(Value::Text(s.clone())),
        toml::Value::Array(items) => items
            .iter()
            .map(to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other => Err(ManifestError::UnsupportedValue(other.to_string())),
    }
}

fn build_body(spec: BodySpec) -> Result<MethodBody, ManifestError> {
    let body = match spec {
        BodySpec::Field { field } => MethodBody::query(move |target, _| Ok(target.field(&field))),
        BodySpec::SetField { field } => MethodBody::command(move |target, args| {
            let value = args.first().cloned().unwrap_or_default();
            target.set_field(field.clone(), value);
            Ok(Value::Null)
        }),
        BodySpec::Constant { value } => {
            let value = to_value(&value)?;
            MethodBody::query(move |_, _| Ok(value.clone()))
        }
        BodySpec::WhenPersistent { value } => {
            let value = to_value(&value)?;
            when(move |target| target.is_persistent(), value)
        }
        BodySpec::WhenTransient { value } => {
            let value = to_value(&value)?;
            when(move |target| target.is_transient(), value)
        }
        BodySpec::WhenFieldEquals {
            field,
            equals,
            value,
        } => {
            let equals = to_value(&equals)?;
            let value = to_value(&value)?;
            when(move |target| target.field(&field) == equals, value)
        }
        BodySpec::MaxTextLength { max, message } => MethodBody::query(move |_, args| {
            let too_long = args
                .first()
                .and_then(Value::as_text)
                .is_some_and(|text| text.chars().count() > max);
            Ok(if too_long {
                Value::Text(message.clone())
            } else {
                Value::Null
            })
        }),
        BodySpec::NotBlank { message } => MethodBody::query(move |_, args| {
            let blank = args.first().is_none_or(|arg| match arg {
                Value::Text(text) => text.trim().is_empty(),
                other => other.is_null(),
            });
            Ok(if blank {
                Value::Text(message.clone())
            } else {
                Value::Null
            })
        }),
        BodySpec::MarkPersistent { oid } => MethodBody::command(move |target, _| {
            if target.is_persistent() {
                return Err(InvocationError::Failed {
                    method: "persist".into(),
                    reason: format!("{} is already persistent", target.oid()),
                });
            }
            target.mark_persistent(oid.clone());
            Ok(Value::Null)
        }),
    };
    Ok(body)
}

fn when<F>(condition: F, value: Value) -> MethodBody
where
    F: Fn(&ObjectAdapter) -> bool + Send + Sync + 'static,
{
    MethodBody::query(move |target, _| {
        Ok(if condition(target) {
            value.clone()
        } else {
            Value::Null
        })
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use facetwork_core::domain::{Annotated, Where, When};
    use tempfile::TempDir;

    const ORDER: &str = r#"
[class]
name = "com.acme.Order"
nature = "entity"
logical_type_name = "acme.Order"

[[methods]]
name = "getQuantity"
returns = "integer"
annotations = [{ kind = "max_length", value = 3 }]
body = { kind = "field", field = "quantity" }

[[methods]]
name = "setQuantity"
parameters = [{ name = "quantity", type = "integer" }]
body = { kind = "set_field", field = "quantity" }

[[methods]]
name = "disableQuantity"
returns = "text"
body = { kind = "when_persistent", value = "Cannot change quantity once placed" }

[[methods]]
name = "getNote"
returns = "text"
annotations = [{ kind = "hidden", when = "until_persisted", where = "all_tables" }]
"#;

    // ── parsing ───────────────────────────────────────────────────────────

    #[test]
    fn parses_class_section() {
        let class = parse_manifest(ORDER).unwrap();
        assert_eq!(class.name, "com.acme.Order");
        assert!(class.has_annotation(|a| matches!(
            a,
            Annotation::DomainObject { nature: Nature::Entity, logical_type_name: Some(n) } if n == "acme.Order"
        )));
        assert_eq!(class.methods.len(), 4);
    }

    #[test]
    fn parses_methods_and_annotations() {
        let class = parse_manifest(ORDER).unwrap();
        let setter = class.find_method("setQuantity").unwrap().1;
        assert_eq!(setter.return_type, TypeRef::Void);
        assert_eq!(setter.parameters[0].type_ref, TypeRef::Integer);

        let note = class.find_method("getNote").unwrap().1;
        assert_eq!(
            note.annotations,
            vec![Annotation::Hidden {
                when: When::UntilPersisted,
                where_: Where::AllTables,
            }]
        );
    }

    #[test]
    fn bodies_follow_target_state() {
        let class = parse_manifest(ORDER).unwrap();
        let disable = class.find_method("disableQuantity").unwrap().1;

        let placed = ObjectAdapter::persistent("com.acme.Order", "1");
        assert_eq!(
            disable.invoke(&placed, &[]).unwrap(),
            Value::from("Cannot change quantity once placed")
        );
        let draft = ObjectAdapter::transient("com.acme.Order");
        assert_eq!(disable.invoke(&draft, &[]).unwrap(), Value::Null);

        let setter = class.find_method("setQuantity").unwrap().1;
        let mut order = ObjectAdapter::transient("com.acme.Order");
        setter.invoke_mut(&mut order, &[Value::Int(4)]).unwrap();
        assert_eq!(order.field("quantity"), Value::Int(4));
    }

    #[test]
    fn validation_bodies() {
        let not_blank = build_body(BodySpec::NotBlank {
            message: "Required".into(),
        })
        .unwrap();
        let method = MethodDescriptor::new("validateName", TypeRef::Text)
            .param(ParameterDescriptor::new("name", TypeRef::Text))
            .body(not_blank);
        let target = ObjectAdapter::transient("a.B");
        assert_eq!(
            method.invoke(&target, &[Value::from("  ")]).unwrap(),
            Value::from("Required")
        );
        assert_eq!(method.invoke(&target, &[Value::from("x")]).unwrap(), Value::Null);
    }

    #[test]
    fn parse_type_ref_variants() {
        assert_eq!(parse_type_ref("void").unwrap(), TypeRef::Void);
        assert_eq!(parse_type_ref("Boolean").unwrap(), TypeRef::Boolean);
        assert_eq!(
            parse_type_ref("ref:com.acme.Customer").unwrap(),
            TypeRef::Reference("com.acme.Customer".into())
        );
        assert_eq!(
            parse_type_ref("list:com.acme.OrderLine").unwrap(),
            TypeRef::Collection("com.acme.OrderLine".into())
        );
        assert!(matches!(
            parse_type_ref("float"),
            Err(ManifestError::UnknownType(_))
        ));
    }

    #[test]
    fn unsupported_values_are_rejected() {
        let raw = "x = 1.5";
        let table: toml::Table = toml::from_str(raw).unwrap();
        assert!(to_value(&table["x"]).is_err());
    }

    // ── load_all ──────────────────────────────────────────────────────────

    #[test]
    fn load_all_returns_error_for_missing_dir() {
        let loader = ClassManifestLoader::new("/absolutely/does/not/exist");
        assert!(matches!(
            loader.load_all(),
            Err(ManifestError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn load_all_skips_invalid_and_foreign_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("order.toml"), ORDER).unwrap();
        fs::write(temp.path().join("broken.toml"), "[class\nname=").unwrap();
        fs::write(temp.path().join("README.md"), "# classes").unwrap();
        fs::write(temp.path().join(AUTHORIZATION_FILE), "[[rules]]").unwrap();
        fs::create_dir(temp.path().join("billing")).unwrap();
        fs::write(
            temp.path().join("billing/invoice.toml"),
            "[class]\nname = \"com.acme.Invoice\"\n",
        )
        .unwrap();

        let classes = ClassManifestLoader::new(temp.path()).load_all().unwrap();
        let names: Vec<_> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["com.acme.Invoice", "com.acme.Order"]);
    }
}
