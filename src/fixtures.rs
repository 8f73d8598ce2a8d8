#[cfg(test)]
pub mod test {
    use crate::duration::Duration;
    use crate::schema::{FieldMeta, FieldNode, Section, SourceKind};

    /// One field per supported leaf kind, a nested section with a renamed
    /// field, and a field hidden from every source.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct TestSettings {
        pub str: String,
        pub boolean: bool,
        pub int: isize,
        pub int64: i64,
        pub uint: usize,
        pub uint64: u64,
        pub float: f64,
        pub duration: Duration,
        pub sub: SubSettings,
        pub skipped: String,
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct SubSettings {
        pub renamed_str: String,
    }

    impl Section for TestSettings {
        fn fields(&mut self) -> Vec<FieldNode<'_>> {
            vec![
                FieldNode::leaf_with(FieldMeta::new("str").help("a string"), &mut self.str),
                FieldNode::leaf_with(FieldMeta::new("boolean").help("a switch"), &mut self.boolean),
                FieldNode::leaf("int", &mut self.int),
                FieldNode::leaf("int64", &mut self.int64),
                FieldNode::leaf("uint", &mut self.uint),
                FieldNode::leaf("uint64", &mut self.uint64),
                FieldNode::leaf("float", &mut self.float),
                FieldNode::leaf_with(
                    FieldMeta::new("duration").help("a timeout"),
                    &mut self.duration,
                ),
                FieldNode::section("sub", &mut self.sub),
                FieldNode::leaf_with(FieldMeta::new("skipped").skip_all(), &mut self.skipped),
            ]
        }
    }

    impl Section for SubSettings {
        fn fields(&mut self) -> Vec<FieldNode<'_>> {
            vec![FieldNode::leaf_with(
                FieldMeta::new("renamed_str").rename_all("str"),
                &mut self.renamed_str,
            )]
        }
    }

    /// Caller-supplied defaults, mirrored by the precedence tests.
    pub fn populated() -> TestSettings {
        TestSettings {
            str: "user-defined".into(),
            boolean: false,
            int: -99,
            int64: -99,
            uint: 99,
            uint64: 99,
            float: 1.99,
            duration: Duration::from_secs(99),
            sub: SubSettings {
                renamed_str: "renamed-user-defined".into(),
            },
            skipped: String::new(),
        }
    }

    /// Fixture with a nullable sub-section and a field hidden from env only.
    #[derive(Debug, Default, PartialEq)]
    pub struct OptionalSettings {
        pub port: i64,
        pub secret: String,
        pub extra: Option<SubSettings>,
    }

    impl Section for OptionalSettings {
        fn fields(&mut self) -> Vec<FieldNode<'_>> {
            vec![
                FieldNode::leaf("port", &mut self.port),
                FieldNode::leaf_with(
                    FieldMeta::new("secret").skip(SourceKind::Env),
                    &mut self.secret,
                ),
                FieldNode::optional_section("extra", self.extra.as_mut()),
            ]
        }
    }
}
