use anyhow::{Result, bail};
use std::io::{self, IsTerminal};
use zeroize::Zeroizing;

pub const PASSWORD_VAR: &str = "MONEYMATE_PASSWORD";
pub const NEW_PASSWORD_VAR: &str = "MONEYMATE_NEW_PASSWORD";

/// Read a password from `var`, then from piped stdin if allowed, then from the TTY.
///
/// `allow_stdin` is false for commands whose stdin carries JSON records.
pub fn read_password(var: &str, allow_stdin: bool) -> Result<Zeroizing<String>> {
    if let Some(pw) = from_env(var) {
        return Ok(pw);
    }

    let piped = !io::stdin().is_terminal();
    if allow_stdin && piped {
        if let Some(pw) = read_piped_line()? {
            return Ok(pw);
        }
    }

    if !piped {
        if let Some(pw) = non_empty(rpassword::prompt_password("Password: ")?) {
            return Ok(pw);
        }
    }

    bail!("No password provided; set {var} or run interactively")
}

/// Read the password to switch to, from `NEW_PASSWORD_VAR` or a confirmed prompt.
pub fn read_new_password_with_confirmation() -> Result<Zeroizing<String>> {
    if let Some(pw) = from_env(NEW_PASSWORD_VAR) {
        return Ok(pw);
    }

    if !io::stdin().is_terminal() {
        bail!("No new password provided; set {NEW_PASSWORD_VAR}");
    }

    let Some(first) = non_empty(rpassword::prompt_password("New password: ")?) else {
        bail!("password cannot be empty");
    };
    let second = Zeroizing::new(rpassword::prompt_password("Confirm password: ")?);
    if *first != *second {
        bail!("passwords do not match");
    }

    Ok(first)
}

fn from_env(var: &str) -> Option<Zeroizing<String>> {
    std::env::var(var).ok().and_then(non_empty)
}

fn read_piped_line() -> Result<Option<Zeroizing<String>>> {
    let mut line = Zeroizing::new(String::new());
    io::stdin().read_line(&mut line)?;
    trim_newline(&mut line);
    Ok((!line.is_empty()).then_some(line))
}

/// Wrap a password, treating the empty string as "not provided".
fn non_empty(pw: String) -> Option<Zeroizing<String>> {
    let pw = Zeroizing::new(pw);
    (!pw.is_empty()).then_some(pw)
}

fn trim_newline(s: &mut String) {
    let len = s.trim_end_matches(['\n', '\r']).len();
    s.truncate(len);
}
