use clap::{Arg, Command};

pub const NAME: &str = "hash-password";
pub const ARG_IDENTITY: &str = "identity";
pub const ARG_PASSWORD: &str = "password";

#[must_use]
pub fn subcommand() -> Command {
    Command::new(NAME)
        .about("Print a credential record for the table")
        .long_about(
            "Hash a password with a fresh random salt and print the credential record as JSON, \
             ready to be added to KEEPSAKE_CREDENTIALS.",
        )
        .arg(
            Arg::new(ARG_IDENTITY)
                .short('i')
                .long(ARG_IDENTITY)
                .help("Identity the visitor types on the login page")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .long(ARG_PASSWORD)
                .help("Password to hash")
                .env("KEEPSAKE_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}
