use fileext_core::{ExtensionError, ExtensionRegistrar, FileExtension, RegistrarError};

#[test]
fn undotted_and_blank_inputs_are_invalid_arguments() {
    for value in ["", " ", "\t", "txt", "foo.bar", " .txt", "\u{3000}"] {
        let err = ExtensionRegistrar::new(value).expect_err("must be rejected");
        assert!(
            matches!(err, RegistrarError::InvalidArgument(_)),
            "unexpected error for {value:?}: {err}"
        );
    }
}

#[test]
fn dotted_inputs_are_stored_verbatim() {
    for value in [".txt", ".tar.gz", ".Foo", ".a b", ".x "] {
        let registrar = ExtensionRegistrar::new(value).expect("must be accepted");
        assert_eq!(registrar.extension().as_str(), value);
    }
}

#[test]
fn construction_leaves_optional_fields_unset() {
    let registrar = ExtensionRegistrar::new(".foo").expect("valid extension");
    assert_eq!(registrar.content_type, None);
    assert_eq!(registrar.perceived_type, None);
    assert_eq!(registrar.default_program_id, None);
    assert!(registrar.open_with_program_ids.is_empty());
}

#[test]
fn error_messages_name_the_offending_value() {
    let err = FileExtension::parse("txt").expect_err("undotted");
    assert_eq!(err, ExtensionError::MissingDotPrefix("txt".to_string()));
    assert!(err.to_string().contains("txt"));

    let err = ExtensionRegistrar::new("txt").expect_err("undotted");
    assert!(err.to_string().starts_with("invalid argument"));
}
