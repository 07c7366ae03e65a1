use crate::utils::error::{ExtractError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl Into<String>, reason: impl Into<String>) -> ExtractError {
    ExtractError::InvalidConfigValue {
        field: field_name.to_string(),
        value: value.into(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(field_name, url_str, format!("Invalid URL format: {}", e))),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        validate_path(field_name, file)?;

        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => {}
            Some(extension) => {
                return Err(invalid(
                    field_name,
                    file.clone(),
                    format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                ))
            }
            None => {
                return Err(invalid(
                    field_name,
                    file.clone(),
                    "File has no extension or invalid filename",
                ))
            }
        }
    }

    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String], supported: &[&str]) -> Result<()> {
    if formats.is_empty() {
        return Err(invalid(field_name, "", "At least one output format is required"));
    }

    let mut seen = HashSet::new();
    for format in formats {
        if !supported.contains(&format.as_str()) {
            return Err(invalid(
                field_name,
                format.clone(),
                format!("Unsupported format. Valid formats: {}", supported.join(", ")),
            ));
        }
        if !seen.insert(format.as_str()) {
            return Err(invalid(field_name, format.clone(), "Format is listed more than once"));
        }
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api_base_url", "https://sppims-dams.dsdilgp.qld.gov.au").is_ok());
        assert!(validate_url("api_base_url", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("api_base_url", "").is_err());
        assert!(validate_url("api_base_url", "invalid-url").is_err());
        assert!(validate_url("api_base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["layers_rep_IMS.txt".to_string(), "dams.JSON".to_string()];
        assert!(validate_file_extensions("layers", &files, &["json", "txt"]).is_ok());

        let invalid_files = vec!["layers.csv".to_string()];
        assert!(validate_file_extensions("layers", &invalid_files, &["json", "txt"]).is_err());

        let no_extension = vec!["layers".to_string()];
        assert!(validate_file_extensions("layers", &no_extension, &["json", "txt"]).is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        let supported = ["csv", "tsv", "json", "xlsx"];
        assert!(validate_output_formats("formats", &["csv".to_string()], &supported).is_ok());
        assert!(validate_output_formats("formats", &["xlsx".to_string()], &supported).is_ok());
        assert!(validate_output_formats("formats", &[], &supported).is_err());
        assert!(validate_output_formats("formats", &["pdf".to_string()], &supported).is_err());
    }

    #[test]
    fn test_validate_output_formats_rejects_duplicates() {
        let supported = ["csv", "tsv", "json", "xlsx"];
        let formats = vec!["csv".to_string(), "json".to_string(), "csv".to_string()];

        let err = validate_output_formats("output.formats", &formats, &supported).unwrap_err();

        assert!(err.to_string().contains("listed more than once"));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("timeout_seconds", 30u64, 1, 300).is_ok());
        assert!(validate_range("timeout_seconds", 0u64, 1, 300).is_err());
        assert!(validate_range("timeout_seconds", 301u64, 1, 300).is_err());
    }
}
