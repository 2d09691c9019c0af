use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_VERBOSITY: &str = "verbosity";

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

fn email_arg() -> Arg {
    Arg::new("email")
        .short('e')
        .long("email")
        .help("Account email")
        .env("INGRESSO_EMAIL")
        .required(true)
}

fn password_arg() -> Arg {
    Arg::new("password")
        .short('p')
        .long("password")
        .help("Account password")
        .env("INGRESSO_PASSWORD")
        .required(true)
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("ingresso")
        .about("Authentication session client")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Base URL of the auth service API")
                .default_value("http://localhost:5000")
                .env("INGRESSO_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("INGRESSO_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account, then request a verification email")
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("Display name")
                        .required(true),
                )
                .arg(email_arg())
                .arg(password_arg())
                .arg(
                    Arg::new("password-confirm")
                        .long("password-confirm")
                        .help("Password confirmation")
                        .env("INGRESSO_PASSWORD_CONFIRM")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("login")
                .about("Password login, falling back to an emailed login code on a new-device challenge")
                .arg(email_arg())
                .arg(password_arg()),
        )
        .subcommand(Command::new("status").about("Check whether the session is still valid"))
        .subcommand(Command::new("whoami").about("Show the current account"))
        .subcommand(
            Command::new("users")
                .about("List accounts, filtered and paginated")
                .arg(
                    Arg::new("search")
                        .short('s')
                        .long("search")
                        .help("Substring to match against name or email"),
                )
                .arg(
                    Arg::new("page")
                        .long("page")
                        .help("0-based page index")
                        .default_value("0")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
}
