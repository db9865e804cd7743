#![deny(clippy::all, clippy::pedantic)]

use std::fs;
use std::path::PathBuf;

use crate::context::CliError;

pub fn read_value(val: Option<String>, file: Option<PathBuf>) -> Result<String, CliError> {
    if let Some(path) = file {
        fs::read_to_string(&path).map_err(|source| CliError::InputFile {
            path: path.display().to_string(),
            source,
        })
    } else if let Some(v) = val {
        Ok(v)
    } else {
        Err(CliError::InvalidInput("value required".into()))
    }
}

/// Password from `--password-file`, else from `INKPOST_PASSWORD`.
pub fn read_password(file: Option<PathBuf>, env: Option<String>) -> Result<String, CliError> {
    let password = read_value(env, file).map_err(|err| match err {
        CliError::InvalidInput(_) => CliError::InvalidInput(
            "password is required (use --password-file or INKPOST_PASSWORD)".into(),
        ),
        other => other,
    })?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
