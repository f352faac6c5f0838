//! Login screen: a two-field prompt bound to the credential exchange.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use is_terminal::IsTerminal;

use super::View;
use crate::client::ApiClient;

/// The only message shown for a failed login, whatever went wrong
pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";

/// How the password is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretInput {
    /// From the controlling terminal with echo turned off
    Hidden,
    /// As a plain line from the prompt input
    Line,
}

impl SecretInput {
    /// Hidden when stdin is a terminal, plain lines when it is piped
    pub fn detect() -> Self {
        if io::stdin().is_terminal() {
            SecretInput::Hidden
        } else {
            SecretInput::Line
        }
    }
}

/// Submitted login fields
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub identifier: String,
    pub secret: String,
}

impl LoginForm {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Prompt for the fields on `output`, reading answers from `input`.
    ///
    /// A known identifier skips its prompt. A [`SecretInput::Hidden`]
    /// password is read from the terminal without echo.
    pub fn prompt<R: BufRead, W: Write>(
        input: &mut R,
        output: &mut W,
        identifier: Option<String>,
        secrets: SecretInput,
    ) -> io::Result<Self> {
        writeln!(output, "Login")?;

        let identifier = match identifier {
            Some(identifier) => identifier,
            None => ask(input, output, "Username or Email: ")?,
        };
        let secret = match secrets {
            SecretInput::Line => ask(input, output, "Password: ")?,
            SecretInput::Hidden => {
                write!(output, "Password: ")?;
                output.flush()?;
                rpassword::read_password()?
            }
        };

        Ok(Self { identifier, secret })
    }

    /// Both fields are required
    pub fn is_complete(&self) -> bool {
        !self.identifier.trim().is_empty() && !self.secret.is_empty()
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("identifier", &self.identifier)
            .field("secret", &"***")
            .finish()
    }
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<String> {
    write!(output, "{}", label)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}

/// A rejected login; displays as the generic message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginFailure;

impl std::fmt::Display for LoginFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(INVALID_CREDENTIALS)
    }
}

impl std::error::Error for LoginFailure {}

/// Login controller
pub struct LoginView {
    client: Arc<ApiClient>,
}

impl LoginView {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Exchange the form's credentials and store the token.
    ///
    /// On success the profile comes next. All failures map to [`LoginFailure`].
    pub async fn submit(&self, form: &LoginForm) -> Result<View, LoginFailure> {
        if !form.is_complete() {
            return Err(LoginFailure);
        }

        match self.client.login(form.identifier.trim(), &form.secret).await {
            Ok(()) => Ok(View::Profile),
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                Err(LoginFailure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::testing::{MockPlatform, ISSUED_TOKEN, VALID_IDENTIFIER, VALID_SECRET};
    use std::io::Cursor;

    #[test]
    fn test_prompt_reads_both_fields() {
        let mut input = Cursor::new("student\r\ns3cret\n");
        let mut output = Vec::new();

        let form = LoginForm::prompt(&mut input, &mut output, None, SecretInput::Line).unwrap();
        assert_eq!(form, LoginForm::new("student", "s3cret"));

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Username or Email: "));
        assert!(shown.contains("Password: "));
    }

    #[test]
    fn test_prompt_skips_known_identifier() {
        let mut input = Cursor::new("pw\n");
        let mut output = Vec::new();

        let known = Some("jdoe".into());
        let form = LoginForm::prompt(&mut input, &mut output, known, SecretInput::Line).unwrap();
        assert_eq!(form.identifier, "jdoe");
        assert_eq!(form.secret, "pw");
        assert!(!String::from_utf8(output).unwrap().contains("Username"));
    }

    #[test]
    fn test_piped_password_is_read_as_a_line() {
        let mut input = Cursor::new("student\nhunter2\n");
        let mut output = Vec::new();

        let form = LoginForm::prompt(&mut input, &mut output, None, SecretInput::Line).unwrap();
        assert_eq!(form.secret, "hunter2");
        // Only the labels are written back
        assert!(!String::from_utf8(output).unwrap().contains("hunter2"));
    }

    #[test]
    fn test_debug_hides_secret() {
        let form = LoginForm::new("jdoe", "hunter2");
        assert!(!format!("{:?}", form).contains("hunter2"));
    }

    #[tokio::test]
    async fn test_submit_success() {
        let mock = MockPlatform::start().await;
        let session = Arc::new(Session::in_memory());
        let client = Arc::new(ApiClient::new(mock.api_config(), session).unwrap());
        let view = LoginView::new(Arc::clone(&client));

        let next = view
            .submit(&LoginForm::new(VALID_IDENTIFIER, VALID_SECRET))
            .await
            .unwrap();

        assert_eq!(next, View::Profile);
        assert_eq!(client.session().token().as_deref(), Some(ISSUED_TOKEN));
    }

    #[tokio::test]
    async fn test_submit_failures_read_the_same() {
        let mock = MockPlatform::start().await;
        let session = Arc::new(Session::in_memory());
        let client = Arc::new(ApiClient::new(mock.api_config(), session).unwrap());
        let view = LoginView::new(Arc::clone(&client));

        let wrong = view.submit(&LoginForm::new(VALID_IDENTIFIER, "nope")).await;
        let empty = view.submit(&LoginForm::new("", "")).await;

        assert_eq!(wrong, Err(LoginFailure));
        assert_eq!(empty, Err(LoginFailure));
        assert_eq!(LoginFailure.to_string(), "Invalid credentials.");
        assert!(!client.session().is_authenticated());
    }
}
