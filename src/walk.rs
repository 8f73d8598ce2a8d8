//! Depth-first traversal of a settings structure.
//!
//! The walker visits every leaf in declaration order, handing the callback
//! the accumulated key path and a mutable handle. Each resolution pass is
//! one walk bound to a different callback (flag registration, env decoding,
//! file application), so precedence falls out of pass order alone.

use crate::error::LayerfigError;
use crate::schema::{FieldMeta, FieldNode, FieldValue, Section, SourceKind};

/// Per-leaf callback: `(path segments, field handle, field metadata)`.
pub(crate) type Visit<'v> =
    dyn FnMut(&[String], FieldValue<'_>, &FieldMeta) -> Result<(), LayerfigError> + 'v;

/// Visit every non-skipped leaf of `root` for the given source.
///
/// Fields skipped for `source` are omitted; a skipped section hides its
/// whole subtree. Optional sections that are `None` are skipped entirely.
/// The first callback error aborts the walk and is returned unchanged.
pub(crate) fn walk(
    root: &mut dyn Section,
    source: SourceKind,
    visit: &mut Visit<'_>,
) -> Result<(), LayerfigError> {
    let mut path = Vec::new();
    walk_section(root, source, &mut path, visit)
}

fn walk_section(
    section: &mut dyn Section,
    source: SourceKind,
    path: &mut Vec<String>,
    visit: &mut Visit<'_>,
) -> Result<(), LayerfigError> {
    for node in section.fields() {
        match node {
            FieldNode::Leaf(meta, value) => {
                if meta.skipped(source) {
                    continue;
                }
                path.push(meta.segment(source));
                let result = visit(path, value, &meta);
                path.pop();
                result?;
            }
            FieldNode::Section(meta, sub) => {
                if meta.skipped(source) {
                    continue;
                }
                path.push(meta.segment(source));
                let result = walk_section(sub, source, path, visit);
                path.pop();
                result?;
            }
            FieldNode::OptionalSection(meta, Some(sub)) => {
                if meta.skipped(source) {
                    continue;
                }
                path.push(meta.segment(source));
                let result = walk_section(sub, source, path, visit);
                path.pop();
                result?;
            }
            FieldNode::OptionalSection(_, None) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{OptionalSettings, SubSettings, TestSettings};

    fn visited_paths(section: &mut dyn Section, source: SourceKind) -> Vec<String> {
        let mut paths = Vec::new();
        walk(section, source, &mut |path, _, _| {
            paths.push(path.join("."));
            Ok(())
        })
        .unwrap();
        paths
    }

    #[test]
    fn leaves_visited_in_declaration_order() {
        let mut settings = TestSettings::default();
        let paths = visited_paths(&mut settings, SourceKind::Flag);
        assert_eq!(
            paths,
            vec![
                "str", "boolean", "int", "int64", "uint", "uint64", "float", "duration",
                "sub.str",
            ]
        );
    }

    #[test]
    fn skip_all_hides_field_from_every_source() {
        let mut settings = TestSettings::default();
        for source in [SourceKind::Flag, SourceKind::Env, SourceKind::File] {
            assert!(!visited_paths(&mut settings, source).contains(&"skipped".to_string()));
        }
    }

    #[test]
    fn per_source_skip_hides_only_that_source() {
        let mut settings = OptionalSettings::default();
        assert!(!visited_paths(&mut settings, SourceKind::Env).contains(&"secret".to_string()));
        assert!(visited_paths(&mut settings, SourceKind::Flag).contains(&"secret".to_string()));
    }

    #[test]
    fn rename_changes_the_derived_path() {
        let mut settings = TestSettings::default();
        let paths = visited_paths(&mut settings, SourceKind::Env);
        assert!(paths.contains(&"sub.str".to_string()));
        assert!(!paths.contains(&"sub.renamed_str".to_string()));
    }

    #[test]
    fn absent_optional_section_is_skipped() {
        let mut settings = OptionalSettings::default();
        let paths = visited_paths(&mut settings, SourceKind::Flag);
        assert_eq!(paths, vec!["port", "secret"]);
    }

    #[test]
    fn present_optional_section_is_walked() {
        let mut settings = OptionalSettings {
            extra: Some(SubSettings::default()),
            ..OptionalSettings::default()
        };
        let paths = visited_paths(&mut settings, SourceKind::Flag);
        assert_eq!(paths, vec!["port", "secret", "extra.str"]);
    }

    #[test]
    fn skipped_section_hides_its_subtree() {
        struct Root {
            sub: SubSettings,
        }
        impl Section for Root {
            fn fields(&mut self) -> Vec<FieldNode<'_>> {
                vec![FieldNode::section_with(
                    FieldMeta::new("sub").skip(SourceKind::Env),
                    &mut self.sub,
                )]
            }
        }

        let mut root = Root {
            sub: SubSettings::default(),
        };
        assert!(visited_paths(&mut root, SourceKind::Env).is_empty());
        assert_eq!(visited_paths(&mut root, SourceKind::Flag), vec!["sub.str"]);
    }

    #[test]
    fn callback_error_aborts_the_walk() {
        let mut settings = TestSettings::default();
        let mut seen = Vec::new();
        let result = walk(&mut settings, SourceKind::Flag, &mut |path, _, _| {
            seen.push(path.join("-"));
            if path.join("-") == "int" {
                return Err(LayerfigError::KeyCollision { key: "int".into() });
            }
            Ok(())
        });
        assert!(matches!(result, Err(LayerfigError::KeyCollision { .. })));
        assert_eq!(seen.last().unwrap(), "int");
        assert!(!seen.contains(&"sub-str".to_string()));
    }

    #[test]
    fn leaf_mutation_through_the_handle() {
        let mut settings = TestSettings::default();
        walk(&mut settings, SourceKind::Flag, &mut |path, value, _| {
            if path.join("-") == "str"
                && let FieldValue::Str(s) = value
            {
                *s = "mutated".into();
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(settings.str, "mutated");
    }
}
