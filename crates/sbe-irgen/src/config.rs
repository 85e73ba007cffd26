/// Default composite for group dimensions.
pub const DEFAULT_DIMENSION_TYPE: &str = "groupSizeEncoding";

/// Default composite for var-data length prefixes.
pub const DEFAULT_VAR_DATA_TYPE: &str = "varDataEncoding";

/// Knobs for [`IrGenerator`](crate::IrGenerator).
///
/// ```text
/// ┌────────────────────────┬────────────────────────────────────────────┐
/// │ Field                  │ Purpose                                    │
/// ├────────────────────────┼────────────────────────────────────────────┤
/// │ target_version         │ Generate IR as of an older schema version  │
/// │ default_dimension_type │ Dimension composite for groups naming none │
/// │ default_var_data_type  │ Composite for var data naming none         │
/// └────────────────────────┴────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// When set, members introduced after this version are stripped
    /// first (see [`SinceVersionTransform`](crate::SinceVersionTransform)).
    pub target_version: Option<u32>,
    pub default_dimension_type: String,
    pub default_var_data_type: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            target_version: None,
            default_dimension_type: DEFAULT_DIMENSION_TYPE.to_owned(),
            default_var_data_type: DEFAULT_VAR_DATA_TYPE.to_owned(),
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub fn with_target_version(mut self, version: u32) -> Self {
        self.target_version = Some(version);
        self
    }
}
