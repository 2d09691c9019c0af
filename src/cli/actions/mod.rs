pub mod session;

use secrecy::SecretString;

/// Actions the binary can execute.
#[derive(Debug)]
pub enum Action {
    Register {
        name: String,
        email: String,
        password: SecretString,
        password_confirm: SecretString,
    },
    Login {
        email: String,
        password: SecretString,
    },
    Status,
    Whoami,
    Users {
        search: Option<String>,
        page: usize,
    },
}
