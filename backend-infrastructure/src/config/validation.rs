use anyhow::{anyhow, Result};

pub fn validate_database_url(value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("database_url is empty"));
    }
    if !(trimmed.starts_with("postgres://") || trimmed.starts_with("postgresql://")) {
        return Err(anyhow!("database_url must start with postgres:// or postgresql://"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_postgres_schemes() {
        assert!(validate_database_url("postgres://u:p@localhost/db").is_ok());
        assert!(validate_database_url("postgresql://localhost/db").is_ok());
    }

    #[test]
    fn rejects_other_urls() {
        assert!(validate_database_url("").is_err());
        assert!(validate_database_url("mysql://localhost/db").is_err());
    }
}
