//! Export configuration.

/// Options controlling the emitted PyTorch source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Name `torch.nn` is imported under.
    pub module_alias: String,
    /// Variable the `Sequential` container is assigned to.
    pub model_name: String,
    /// Spaces before each layer line.
    pub indent: usize,
    /// Whether the input layer contributes its `# input: ...` comment line.
    pub include_input_comment: bool,
    /// Whether to end with `print(model)`.
    pub print_model: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            module_alias: "nn".to_string(),
            model_name: "model".to_string(),
            indent: 4,
            include_input_comment: true,
            print_model: true,
        }
    }
}

impl ExportConfig {
    /// Creates a new ExportConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the alias `torch.nn` is imported under.
    pub fn module_alias(mut self, alias: impl Into<String>) -> Self {
        self.module_alias = alias.into();
        self
    }

    /// Sets the model variable name.
    pub fn model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Sets the indentation width.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets whether the input layer's comment line is emitted.
    pub fn include_input_comment(mut self, include: bool) -> Self {
        self.include_input_comment = include;
        self
    }

    /// Sets whether a trailing print statement is emitted.
    pub fn print_model(mut self, print: bool) -> Self {
        self.print_model = print;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExportConfig::default();
        assert_eq!(config.module_alias, "nn");
        assert_eq!(config.model_name, "model");
        assert_eq!(config.indent, 4);
        assert!(config.include_input_comment);
        assert!(config.print_model);
    }

    #[test]
    fn test_config_builder() {
        let config = ExportConfig::new()
            .module_alias("torch.nn")
            .model_name("net")
            .indent(2)
            .include_input_comment(false)
            .print_model(false);

        assert_eq!(config.module_alias, "torch.nn");
        assert_eq!(config.model_name, "net");
        assert_eq!(config.indent, 2);
        assert!(!config.include_input_comment);
        assert!(!config.print_model);
    }
}
