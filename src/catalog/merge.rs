//! catalog::merge
//!
//! Combines the legacy catalog with native commands.
//!
//! # Rules
//!
//! - A native command is inserted when the catalog is unscoped, or when the
//!   catalog is scoped to the native command's namespace.
//! - A legacy command whose name matches an inserted native command is dropped.
//! - Names are unique in the result; the first occurrence wins.
//! - The result is sorted with [`catalog_order`].

use std::collections::HashSet;

use super::model::{catalog_order, Catalog, CommandDescriptor};

/// Merge `native` commands into `fetched`.
pub fn merge(fetched: Catalog, native: &[CommandDescriptor]) -> Catalog {
    let Catalog {
        application,
        namespace,
        commands: legacy,
    } = fetched;

    let visible = native
        .iter()
        .filter(|c| visible_in_scope(c, namespace.as_deref()))
        .cloned();

    let mut seen = HashSet::new();
    let mut commands: Vec<CommandDescriptor> = visible
        .chain(legacy)
        .filter(|c| seen.insert(c.name.clone()))
        .collect();
    commands.sort_by(catalog_order);

    Catalog {
        application,
        namespace,
        commands,
    }
}

fn visible_in_scope(command: &CommandDescriptor, scope: Option<&str>) -> bool {
    match scope {
        None => true,
        Some(scope) => command.namespace() == Some(scope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::{Application, Source};

    fn legacy(name: &str) -> CommandDescriptor {
        CommandDescriptor {
            source: Source::Legacy,
            ..CommandDescriptor::native(name, "legacy")
        }
    }

    fn init() -> CommandDescriptor {
        CommandDescriptor::native("project:init", "Initialize a project")
    }

    fn catalog(namespace: Option<&str>, commands: Vec<CommandDescriptor>) -> Catalog {
        Catalog {
            application: Application {
                name: "Legacy".into(),
                ..Default::default()
            },
            namespace: namespace.map(str::to_string),
            commands,
        }
    }

    fn names(catalog: &Catalog) -> Vec<&str> {
        catalog.commands.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn unscoped_catalog_gains_init() {
        let fetched: Catalog = serde_json::from_str(
            r#"{"application":{"name":"Legacy"},"commands":[{"name":"foo:bar"}]}"#,
        )
        .unwrap();

        let merged = merge(fetched, &[init()]);

        assert_eq!(names(&merged), vec!["foo:bar", "project:init"]);
        let ids: Vec<_> = merged.namespaces().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec!["foo", "project"]);
    }

    #[test]
    fn unrelated_scope_excludes_init() {
        let merged = merge(catalog(Some("foo"), vec![legacy("foo:bar")]), &[init()]);

        assert_eq!(names(&merged), vec!["foo:bar"]);
        assert_eq!(merged.scope(), Some("foo"));
    }

    #[test]
    fn matching_scope_includes_init() {
        let merged = merge(
            catalog(Some("project"), vec![legacy("project:list")]),
            &[init(), CommandDescriptor::native("version", "")],
        );

        assert_eq!(names(&merged), vec!["project:init", "project:list"]);
    }

    #[test]
    fn native_wins_on_collision() {
        let merged = merge(
            catalog(None, vec![legacy("list"), legacy("help")]),
            &[CommandDescriptor::native("list", "native list")],
        );

        assert_eq!(names(&merged), vec!["help", "list"]);
        let list = merged.get("list").unwrap();
        assert!(list.is_native());
        assert_eq!(list.description, "native list");
    }

    #[test]
    fn legacy_duplicates_collapse() {
        let merged = merge(catalog(None, vec![legacy("a:x"), legacy("a:x")]), &[]);
        assert_eq!(names(&merged), vec!["a:x"]);
    }

    #[test]
    fn result_is_sorted_global_first() {
        let merged = merge(
            catalog(None, vec![legacy("z:z"), legacy("b:a"), legacy("help")]),
            &[init(), CommandDescriptor::native("version", "")],
        );

        assert_eq!(
            names(&merged),
            vec!["help", "version", "b:a", "project:init", "z:z"]
        );
    }

    #[test]
    fn application_is_preserved() {
        let mut fetched = catalog(None, vec![]);
        fetched.application.version = Some("4.0.0".into());

        let merged = merge(fetched.clone(), &[]);
        assert_eq!(merged.application, fetched.application);
    }

    #[test]
    fn every_command_namespace_is_listed() {
        let merged = merge(
            catalog(None, vec![legacy("env:list"), legacy("help"), legacy("db:sql")]),
            &[init()],
        );

        let groups = merged.namespaces();
        for command in &merged.commands {
            assert!(groups.iter().any(|g| g.commands.contains(&command.name)));
        }
    }
}
