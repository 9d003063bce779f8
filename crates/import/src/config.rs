use spens_core::TokensDocument;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unsupported tokens file extension: {0:?}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// `.yml` / `.yaml` / `.toml`, case-insensitive.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "yml" | "yaml" => Ok(DocumentFormat::Yaml),
            "toml" => Ok(DocumentFormat::Toml),
            _ => Err(LoadError::UnsupportedFormat(ext)),
        }
    }
}

pub fn parse_tokens(content: &str, format: DocumentFormat) -> Result<TokensDocument, LoadError> {
    let doc = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(content)?,
        DocumentFormat::Toml => toml::from_str(content)?,
    };
    Ok(doc)
}

pub fn load_tokens(path: &Path) -> Result<TokensDocument, LoadError> {
    let format = DocumentFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    let doc = parse_tokens(&content, format)?;
    tracing::debug!(
        path = %path.display(),
        categories = doc.expenses.categories().len(),
        "loaded tokens"
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spens_core::RuleTable;

    const TOKENS_YML: &str = r#"
Configuration:
  AmountField: 'Amount'
  DateField: 'Started Date'
  MerchantField: 'Description'
  TransactionTypeField: 'Type'
  Currency: 'EUR'
  IgnoredStatements: ['MONITO', 'INET']
  TransactionTypeDebit: ['Debit', 'Direct Debit', 'Bill Payment', 'CARD_PAYMENT']
Expenses:
  Shop:
    Amazon:
      - 'Amazon'
  Entertainment:
    Online:
      - 'Microsoft'
      - 'YouTube'
"#;

    const TOKENS_TOML: &str = r#"
[Configuration]
AmountField = "Amount"
DateField = "Started Date"
MerchantField = "Description"
TransactionTypeField = "Type"
TransactionTypeDebit = ["CARD_PAYMENT"]
DateFormats = ["YYYY-MM-DD HH:mm:ss", "DD/MM/YYYY"]

[Expenses.Shop]
Amazon = ["Amazon"]

[Expenses.Entertainment]
Online = ["Microsoft", "YouTube"]
"#;

    fn rule_values(doc: &TokensDocument) -> Vec<String> {
        RuleTable::from_expenses(&doc.expenses)
            .rules()
            .map(|r| format!("{}/{}/{}", r.category, r.subcategory, r.match_value))
            .collect()
    }

    #[test]
    fn parse_yaml_tokens() {
        let doc = parse_tokens(TOKENS_YML, DocumentFormat::Yaml).unwrap();
        let config = &doc.configuration;
        assert_eq!(config.amount_field.as_deref(), Some("Amount"));
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.ignored_statements, vec!["MONITO", "INET"]);
        assert_eq!(config.transaction_type_debit.len(), 4);
        assert_eq!(
            rule_values(&doc),
            vec!["Shop/Amazon/Amazon", "Entertainment/Online/Microsoft", "Entertainment/Online/YouTube"]
        );
    }

    #[test]
    fn parse_toml_tokens_keeps_order() {
        let doc = parse_tokens(TOKENS_TOML, DocumentFormat::Toml).unwrap();
        assert_eq!(doc.configuration.date_formats.len(), 2);
        assert_eq!(doc.configuration.currency, spens_core::config::DEFAULT_CURRENCY);
        assert_eq!(
            rule_values(&doc),
            vec!["Shop/Amazon/Amazon", "Entertainment/Online/Microsoft", "Entertainment/Online/YouTube"]
        );
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let err = parse_tokens("Configuration: [unclosed", DocumentFormat::Yaml).unwrap_err();
        assert!(matches!(err, LoadError::Yaml(_)));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("tokens.yml")).unwrap(), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a/TOKENS.YAML")).unwrap(), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("tokens.toml")).unwrap(), DocumentFormat::Toml);
        assert!(matches!(
            DocumentFormat::from_path(Path::new("tokens.json")),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "json"
        ));
    }

    #[test]
    fn load_tokens_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.yaml");
        std::fs::write(&path, TOKENS_YML).unwrap();
        let doc = load_tokens(&path).unwrap();
        assert_eq!(doc.configuration.merchant_field.as_deref(), Some("Description"));
    }
}
