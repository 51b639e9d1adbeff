//! Tagged form schemas.
//!
//! The edit form is validated against an explicit list of field descriptors
//! rather than by introspecting a schema object's shape at runtime. The same
//! descriptor list a frontend would use to render the form drives the
//! required-field check here.

/// Kind of widget a field binds to. Informational for renderers; the
/// validator only cares about `required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Select,
    Date,
    Phone,
}

/// Descriptor for a single form field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// Form payloads that can be read field-by-field against a schema.
pub trait FormValues {
    fn field(&self, name: &str) -> Option<&str>;
}

/// Schema of the pass edit form.
pub const PASS_FORM_SCHEMA: &[FieldSpec] = &[
    FieldSpec { name: "firstName", kind: FieldKind::Text, required: true },
    FieldSpec { name: "middleName", kind: FieldKind::Text, required: false },
    FieldSpec { name: "lastName", kind: FieldKind::Text, required: true },
    FieldSpec { name: "gender", kind: FieldKind::Select, required: true },
    FieldSpec { name: "dob", kind: FieldKind::Date, required: true },
    FieldSpec { name: "address", kind: FieldKind::Text, required: true },
    FieldSpec { name: "phoneNum", kind: FieldKind::Phone, required: true },
    FieldSpec { name: "from", kind: FieldKind::Select, required: true },
    FieldSpec { name: "to", kind: FieldKind::Text, required: true },
    FieldSpec { name: "branch", kind: FieldKind::Select, required: true },
    FieldSpec { name: "gradYear", kind: FieldKind::Select, required: true },
    FieldSpec { name: "class", kind: FieldKind::Select, required: true },
    FieldSpec { name: "duration", kind: FieldKind::Select, required: true },
    FieldSpec { name: "travelLane", kind: FieldKind::Select, required: true },
];

/// Collect the names of required fields whose value is missing or blank.
pub fn missing_required_fields<'s>(
    schema: &'s [FieldSpec],
    values: &dyn FormValues,
) -> Vec<&'s str> {
    schema
        .iter()
        .filter(|spec| spec.required)
        .filter(|spec| match values.field(spec.name) {
            Some(value) => value.trim().is_empty(),
            None => true,
        })
        .map(|spec| spec.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapValues(HashMap<&'static str, &'static str>);

    impl FormValues for MapValues {
        fn field(&self, name: &str) -> Option<&str> {
            self.0.get(name).copied()
        }
    }

    fn complete_form() -> MapValues {
        let mut values = HashMap::new();
        for spec in PASS_FORM_SCHEMA {
            values.insert(spec.name, "x");
        }
        MapValues(values)
    }

    #[test]
    fn test_all_required_present() {
        let form = complete_form();
        assert!(missing_required_fields(PASS_FORM_SCHEMA, &form).is_empty());
    }

    #[test]
    fn test_blank_counts_as_missing() {
        let mut form = complete_form();
        form.0.insert("address", "   ");
        form.0.remove("gender");

        let missing = missing_required_fields(PASS_FORM_SCHEMA, &form);
        assert_eq!(missing, vec!["gender", "address"]);
    }

    #[test]
    fn test_optional_fields_ignored() {
        let mut form = complete_form();
        form.0.remove("middleName");
        assert!(missing_required_fields(PASS_FORM_SCHEMA, &form).is_empty());
    }
}
