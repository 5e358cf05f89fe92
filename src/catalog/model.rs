//! catalog::model
//!
//! Command catalog types.
//!
//! # Wire format
//!
//! These types deserialize the legacy introspection document
//! (`list --format=json`). Unknown fields are ignored. The `definition` of a
//! command is kept verbatim as JSON so that renderers can show arguments and
//! options without this crate modeling every legacy attribute.
//!
//! # Namespaces
//!
//! A command's namespace is the part of its name before the first `:`.
//! Commands without a `:` are global. [`Catalog::namespaces`] is always derived
//! from the commands, so it cannot disagree with them.

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Group id used for commands without a namespace.
pub const GLOBAL_NAMESPACE_ID: &str = "_global";

/// Where a command is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Source {
    /// Implemented by this binary.
    Native,
    /// Implemented by the wrapped legacy executable.
    #[default]
    Legacy,
}

/// Application identity shown in catalog headers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub executable: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Arguments and options of a command, kept as opaque JSON objects.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Definition {
    #[serde(default, deserialize_with = "object_or_empty_list")]
    pub arguments: Map<String, Value>,

    #[serde(default, deserialize_with = "object_or_empty_list")]
    pub options: Map<String, Value>,
}

impl Definition {
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty() && self.options.is_empty()
    }
}

/// One command in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub usage: Vec<String>,

    #[serde(default)]
    pub help: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub definition: Definition,

    #[serde(skip)]
    pub source: Source,
}

impl CommandDescriptor {
    /// Create a native command descriptor.
    pub fn native(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hidden: false,
            description: description.into(),
            usage: Vec::new(),
            help: String::new(),
            aliases: Vec::new(),
            definition: Definition::default(),
            source: Source::Native,
        }
    }

    /// Add a usage line.
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage.push(usage.into());
        self
    }

    /// Set the long help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Add an option to the definition.
    pub fn with_option(mut self, name: &str, shortcut: Option<&str>, description: &str) -> Self {
        let mut option = Map::new();
        option.insert("name".into(), Value::String(format!("--{}", name)));
        if let Some(shortcut) = shortcut {
            option.insert("shortcut".into(), Value::String(format!("-{}", shortcut)));
        }
        option.insert("description".into(), Value::String(description.into()));
        self.definition
            .options
            .insert(name.to_string(), Value::Object(option));
        self
    }

    /// Add an argument to the definition.
    pub fn with_argument(mut self, name: &str, required: bool, description: &str) -> Self {
        let mut argument = Map::new();
        argument.insert("name".into(), Value::String(name.to_string()));
        argument.insert("is_required".into(), Value::Bool(required));
        argument.insert("description".into(), Value::String(description.into()));
        self.definition
            .arguments
            .insert(name.to_string(), Value::Object(argument));
        self
    }

    /// The namespace prefix, or `None` for global commands.
    pub fn namespace(&self) -> Option<&str> {
        self.name.split_once(':').map(|(namespace, _)| namespace)
    }

    pub fn is_native(&self) -> bool {
        self.source == Source::Native
    }
}

/// Sort order for catalogs: global commands first, then by namespace, then by name.
pub fn catalog_order(a: &CommandDescriptor, b: &CommandDescriptor) -> Ordering {
    fn key(c: &CommandDescriptor) -> (bool, Option<&str>) {
        (c.namespace().is_some(), c.namespace())
    }
    key(a).cmp(&key(b)).then_with(|| a.name.cmp(&b.name))
}

/// Commands sharing a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceGroup {
    pub id: String,
    pub commands: Vec<String>,
}

/// A list of commands, optionally scoped to one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub application: Application,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_string"
    )]
    pub namespace: Option<String>,

    #[serde(default)]
    pub commands: Vec<CommandDescriptor>,
}

impl Catalog {
    /// The namespace this catalog is limited to, if any.
    pub fn scope(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Look up a command by name.
    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Namespace groups, global first and the rest alphabetical.
    ///
    /// Commands keep their catalog order within a group.
    pub fn namespaces(&self) -> Vec<NamespaceGroup> {
        let mut groups: Vec<(Option<&str>, Vec<String>)> = Vec::new();
        for command in &self.commands {
            let namespace = command.namespace();
            match groups.iter_mut().find(|(id, _)| *id == namespace) {
                Some((_, names)) => names.push(command.name.clone()),
                None => groups.push((namespace, vec![command.name.clone()])),
            }
        }
        groups.sort_by(|(a, _), (b, _)| (a.is_some(), a).cmp(&(b.is_some(), b)));

        groups
            .into_iter()
            .map(|(id, commands)| NamespaceGroup {
                id: id.unwrap_or(GLOBAL_NAMESPACE_ID).to_string(),
                commands,
            })
            .collect()
    }

    /// Drop hidden commands.
    pub fn retain_visible(&mut self) {
        self.commands.retain(|c| !c.hidden);
    }
}

// PHP encodes an empty associative array as `[]`.
fn object_or_empty_list<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        Value::Array(items) if items.is_empty() => Ok(Map::new()),
        Value::Null => Ok(Map::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected an object, found {}",
            other
        ))),
    }
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
