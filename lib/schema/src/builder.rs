//! Builders for the input and internal feature schemas

use ahash::AHashSet;

use featstore_core::{ANNOTATION_COLUMN, HASH_COLUMN};

use crate::{Check, ColumnSpec, DataType, FrameSchema, SchemaError, Strictness};

/// Build the `(input, internal)` schema pair for a feature store.
///
/// The input schema holds the key columns (`string`, `uint64`), a nullable
/// `annotations` column restricted to `1..=len(class_names)` or `-1`, and a
/// `float32` column per feature. Unknown columns are filtered and the key is
/// unique. The internal schema indexes the input schema by the key columns
/// and adds a `hash` column checked to lie in `[0, 1]`.
pub fn input_and_internal_schemas<F, C, I>(
    feature_names: &[F],
    class_names: &[C],
    index_columns: &[I],
) -> Result<(FrameSchema, FrameSchema), SchemaError>
where
    F: AsRef<str>,
    C: AsRef<str>,
    I: AsRef<str>,
{
    if index_columns.len() != 2 {
        return Err(SchemaError::IndexColumnCount(index_columns.len()));
    }
    if feature_names.is_empty() {
        return Err(SchemaError::EmptyFeatureNames);
    }
    if class_names.is_empty() {
        return Err(SchemaError::EmptyClassNames);
    }
    ensure_distinct(class_names)?;

    let mut reserved = AHashSet::new();
    for name in [ANNOTATION_COLUMN, HASH_COLUMN]
        .into_iter()
        .chain(index_columns.iter().map(|c| c.as_ref()))
    {
        if !reserved.insert(name) {
            return Err(SchemaError::DuplicateName(name.to_string()));
        }
    }
    ensure_distinct(feature_names)?;
    if let Some(clash) = feature_names.iter().find(|f| reserved.contains(f.as_ref())) {
        return Err(SchemaError::ReservedName(clash.as_ref().to_string()));
    }

    let mut columns = vec![
        ColumnSpec::coerced(index_columns[0].as_ref(), DataType::String),
        ColumnSpec::coerced(index_columns[1].as_ref(), DataType::UInt64),
        ColumnSpec::coerced(ANNOTATION_COLUMN, DataType::Int64)
            .with_nullable(true)
            .with_check(Check::AnnotationRange {
                n_classes: class_names.len(),
            }),
    ];
    columns.extend(
        feature_names
            .iter()
            .map(|name| ColumnSpec::coerced(name.as_ref(), DataType::Float32)),
    );

    let input = FrameSchema::new(columns)?
        .with_strictness(Strictness::Filter)
        .with_unique(index_columns)?;

    let internal = input.clone().set_index(index_columns)?.add_columns(vec![
        ColumnSpec::coerced(HASH_COLUMN, DataType::Float64)
            .with_check(Check::Between { min: 0.0, max: 1.0 }),
    ])?;

    Ok((input, internal))
}

fn ensure_distinct<S: AsRef<str>>(names: &[S]) -> Result<(), SchemaError> {
    let mut seen = AHashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_ref()) {
            return Err(SchemaError::DuplicateName(name.as_ref().to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use featstore_core::Frame;

    fn schemas() -> (FrameSchema, FrameSchema) {
        input_and_internal_schemas(&["f1", "f2"], &["healthy", "sick"], &["roi_id", "label"])
            .unwrap()
    }

    #[test]
    fn test_input_schema_layout() {
        let (input, _) = schemas();
        assert!(input.index.is_empty());
        assert_eq!(input.unique, vec!["roi_id", "label"]);
        assert_eq!(input.strict, Strictness::Filter);
        let annotations = input.get_column("annotations").unwrap();
        assert!(annotations.nullable);
        assert_eq!(annotations.dtype, DataType::Int64);
        assert_eq!(input.get_column("f2").unwrap().dtype, DataType::Float32);
    }

    #[test]
    fn test_internal_schema_layout() {
        let (_, internal) = schemas();
        assert_eq!(
            internal.column_names(),
            vec!["roi_id", "label", "annotations", "f1", "f2", "hash"]
        );
        assert_eq!(internal.unique, vec!["roi_id", "label"]);
        let hash = internal.get_column("hash").unwrap();
        assert_eq!(hash.checks, vec![Check::Between { min: 0.0, max: 1.0 }]);
    }

    #[test]
    fn test_index_column_count() {
        let result = input_and_internal_schemas(&["f1"], &["a"], &["roi_id"]);
        assert!(matches!(result, Err(SchemaError::IndexColumnCount(1))));
    }

    #[test]
    fn test_empty_and_duplicate_names() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            input_and_internal_schemas(&empty, &["a"], &["roi_id", "label"]),
            Err(SchemaError::EmptyFeatureNames)
        ));
        assert!(matches!(
            input_and_internal_schemas(&["f1"], &empty, &["roi_id", "label"]),
            Err(SchemaError::EmptyClassNames)
        ));
        assert!(matches!(
            input_and_internal_schemas(&["f1", "f1"], &["a"], &["roi_id", "label"]),
            Err(SchemaError::DuplicateName(_))
        ));
        assert!(matches!(
            input_and_internal_schemas(&["f1"], &["a", "a"], &["roi_id", "label"]),
            Err(SchemaError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_reserved_feature_name() {
        assert!(matches!(
            input_and_internal_schemas(&["hash"], &["a"], &["roi_id", "label"]),
            Err(SchemaError::ReservedName(_))
        ));
        assert!(matches!(
            input_and_internal_schemas(&["label"], &["a"], &["roi_id", "label"]),
            Err(SchemaError::ReservedName(_))
        ));
    }

    #[test]
    fn test_internal_schema_rejects_hash_out_of_range() {
        let (_, internal) = schemas();
        let frame = Frame::new()
            .with_column("roi_id", ["A"])
            .unwrap()
            .with_column("label", [1u64])
            .unwrap()
            .with_column("annotations", [1i64])
            .unwrap()
            .with_column("f1", [0.1])
            .unwrap()
            .with_column("f2", [0.2])
            .unwrap()
            .with_column("hash", [1.5])
            .unwrap();
        assert!(!internal.is_valid(&frame));
    }

    #[test]
    fn test_zero_annotation_is_invalid() {
        let (input, _) = schemas();
        let frame = Frame::new()
            .with_column("roi_id", ["A"])
            .unwrap()
            .with_column("label", [1u64])
            .unwrap()
            .with_column("annotations", [0i64])
            .unwrap()
            .with_column("f1", [0.1])
            .unwrap()
            .with_column("f2", [0.2])
            .unwrap();
        assert!(!input.is_valid(&frame));
    }
}
