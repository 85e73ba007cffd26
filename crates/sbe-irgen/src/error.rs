use sbe_ir::IrError;
use sbe_types::TypeError;

/// Reasons a schema cannot be turned into IR.
///
/// Every variant is fatal: generation never falls back to a best-effort
/// container.
///
/// ```text
///   SchemaError
///   ├── references
///   │   ├── DuplicateType          ← two named types share a name
///   │   ├── UnknownType            ← reference to an undeclared type
///   │   ├── CyclicTypeReference    ← composite refs loop back on themselves
///   │   └── InvalidValueRef        ← value_ref is malformed or dangling
///   ├── versions
///   │   ├── SinceVersionExceedsSchema
///   │   └── SinceVersionOutOfOrder ← newer member declared before older one
///   ├── structure
///   │   ├── NotComposite           ← header/dimension/var-data type is not one
///   │   ├── MissingHeaderField
///   │   ├── MissingDimensionField
///   │   ├── MissingVarDataField
///   │   ├── DuplicateId / DuplicateName
///   │   └── VarDataInBlock         ← variable-length type used as a field
///   ├── values
///   │   ├── InvalidValue           ← literal does not parse for its type
///   │   ├── InvalidEncodingType    ← enum/set over an unusable primitive
///   │   ├── InvalidChoiceBit       ← bit outside the set's width
///   │   └── MissingConstValue
///   ├── layout
///   │   ├── OverlappingOffset      ← explicit offset behind the cursor
///   │   ├── BlockLengthTooSmall    ← declared block narrower than its fields
///   │   └── LayoutOverflow         ← offsets no longer fit an i32
///   ├── Type(TypeError)            ← generated tokens failed to pair up
///   └── Ir(IrError)                ← container rejected the generated tokens
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("type {name} is declared more than once")]
    DuplicateType { name: String },

    #[error("unknown type {name} referenced by {referenced_by}")]
    UnknownType { name: String, referenced_by: String },

    #[error("cyclic type reference: {}", path.join(" -> "))]
    CyclicTypeReference { path: Vec<String> },

    #[error("field {field}: invalid value_ref {value_ref}: {reason}")]
    InvalidValueRef {
        field: String,
        value_ref: String,
        reason: &'static str,
    },

    #[error("{name}: since version {since_version} exceeds schema version {schema_version}")]
    SinceVersionExceedsSchema {
        name: String,
        since_version: u32,
        schema_version: u32,
    },

    #[error(
        "{name} (since version {since_version}) is declared after {previous} (since version {previous_version})"
    )]
    SinceVersionOutOfOrder {
        name: String,
        since_version: u32,
        previous: String,
        previous_version: u32,
    },

    #[error("{role} type {name} must be a composite")]
    NotComposite { name: String, role: &'static str },

    #[error("message header {type_name} needs an unsigned integer {field}")]
    MissingHeaderField {
        type_name: String,
        field: &'static str,
    },

    #[error("group dimension {type_name} needs an unsigned integer {field}")]
    MissingDimensionField {
        type_name: String,
        field: &'static str,
    },

    #[error("var data type {type_name} needs {field}")]
    MissingVarDataField {
        type_name: String,
        field: &'static str,
    },

    #[error("duplicate id {id} in {scope}")]
    DuplicateId { scope: String, id: i32 },

    #[error("duplicate name {name} in {scope}")]
    DuplicateName { scope: String, name: String },

    #[error("field {name} has a variable-length type")]
    VarDataInBlock { name: String },

    #[error("{name}: {source}")]
    InvalidValue {
        name: String,
        #[source]
        source: TypeError,
    },

    #[error("{name}: {encoding_type} cannot encode this type")]
    InvalidEncodingType { name: String, encoding_type: String },

    #[error("set {set}: choice {choice} uses bit {bit} of a {width_bits}-bit set")]
    InvalidChoiceBit {
        set: String,
        choice: String,
        bit: u32,
        width_bits: u32,
    },

    #[error("{name} is constant but has no constant value")]
    MissingConstValue { name: String },

    #[error("{name}: offset {offset} overlaps the previous member ending at {cursor}")]
    OverlappingOffset { name: String, offset: u32, cursor: u32 },

    #[error("{name}: declared block length {declared} is below the computed {computed}")]
    BlockLengthTooSmall {
        name: String,
        declared: u32,
        computed: u32,
    },

    #[error("{name}: layout exceeds the representable size")]
    LayoutOverflow { name: String },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Ir(#[from] IrError),
}
