use crate::{Error, Result};

/// Expand `${NAME}` placeholders using `lookup`.
///
/// An unterminated `${` is left as-is. A name that `lookup` cannot resolve
/// is an error, so a missing secret fails at load time rather than as a 401
/// halfway through the run.
pub fn expand(template: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    let mut result = template.to_string();
    let mut start = 0;

    while let Some(var_start) = result[start..].find("${") {
        let var_start = start + var_start;
        let Some(var_end) = result[var_start..].find('}') else {
            break;
        };
        let var_end = var_start + var_end;

        let name = &result[var_start + 2..var_end];
        let value = lookup(name).ok_or_else(|| {
            Error::Config(format!("environment variable '{}' is not set", name))
        })?;

        result.replace_range(var_start..=var_end, &value);
        start = var_start + value.len();
    }

    Ok(result)
}

/// Expand `${NAME}` placeholders from the process environment.
pub fn expand_env(template: &str) -> Result<String> {
    expand(template, |name| std::env::var(name).ok())
}
